use crate::core::checkpoint::resolve_checkpoint;
use crate::core::distributor::dispatch;
use crate::domain::ports::{DocumentStore, Provider};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct CollectorSettings {
    /// Upper bound on concurrent workers per provider run; the effective
    /// count never exceeds the candidate count.
    pub max_workers: usize,
    /// When false every provider runs on a single worker.
    pub concurrency_enabled: bool,
    /// Sleep between passes in looping mode.
    pub check_interval: Duration,
    /// Cap on candidates enumerated per provider per run.
    pub max_candidates: usize,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            max_workers: 100,
            concurrency_enabled: false,
            check_interval: Duration::from_secs(30 * 60),
            max_candidates: 9_999_999,
        }
    }
}

/// Drives collection passes over an explicit, ordered list of providers.
/// Providers are injected at construction; there is no process-wide
/// registry.
pub struct Collector {
    providers: Vec<Arc<dyn Provider>>,
    store: Arc<dyn DocumentStore>,
    settings: CollectorSettings,
}

impl Collector {
    pub fn new(
        providers: Vec<Arc<dyn Provider>>,
        store: Arc<dyn DocumentStore>,
        settings: CollectorSettings,
    ) -> Self {
        tracing::info!(
            providers = providers.len(),
            max_workers = settings.max_workers,
            concurrency = settings.concurrency_enabled,
            "collector initialized"
        );
        Self {
            providers,
            store,
            settings,
        }
    }

    /// Runs collection passes forever, sleeping `check_interval` between
    /// them. Collaborator failures never terminate the loop.
    pub async fn run(&self) {
        let mut pass = 0u64;
        loop {
            tracing::info!(pass, "starting collection pass");
            let started = Instant::now();
            self.run_once().await;
            tracing::info!(pass, elapsed = ?started.elapsed(), "collection pass finished");
            tracing::info!(
                minutes = self.settings.check_interval.as_secs() / 60,
                "sleeping until next pass"
            );
            pass += 1;
            tokio::time::sleep(self.settings.check_interval).await;
        }
    }

    /// One pass: every provider, strictly sequentially. A whole-provider
    /// failure is logged and the pass moves on to the next provider.
    pub async fn run_once(&self) {
        for provider in &self.providers {
            if let Err(e) = self.process_provider(provider).await {
                tracing::error!(
                    provider = provider.name(),
                    error = %e,
                    "provider pass failed, skipping until next cycle"
                );
            }
        }
    }

    async fn process_provider(&self, provider: &Arc<dyn Provider>) -> Result<()> {
        let name = provider.name();
        tracing::info!(provider = name, "processing provider");

        let checkpoint = resolve_checkpoint(self.store.as_ref(), name).await?;
        match checkpoint {
            Some(since) => {
                tracing::info!(provider = name, since = %since, "resuming from stored checkpoint")
            }
            None => {
                tracing::info!(provider = name, "no stored records, running a full backfill")
            }
        }

        let ids = provider
            .list_candidates(checkpoint, self.settings.max_candidates)
            .await?;
        tracing::info!(provider = name, count = ids.len(), "candidates enumerated");

        dispatch(
            Arc::clone(provider),
            Arc::clone(&self.store),
            ids,
            self.settings.max_workers,
            self.settings.concurrency_enabled,
        )
        .await;

        tracing::info!(provider = name, "finished processing provider");
        Ok(())
    }
}
