use clap::Parser;
use house_collector::utils::{logger, validation::Validate};
use house_collector::{
    Collector, CollectorConfig, CollectorSettings, Imovirtual, Olx, Provider, RestStore,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CollectorConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting house-collector");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let store = Arc::new(RestStore::new(&config.store_url)?);

    // Explicit, ordered provider list; passes always run in this order.
    let providers: Vec<Arc<dyn Provider>> = vec![Arc::new(Imovirtual::new()), Arc::new(Olx::new())];

    let settings = CollectorSettings {
        max_workers: config.max_workers,
        concurrency_enabled: config.concurrent,
        check_interval: Duration::from_secs(config.check_interval_min * 60),
        max_candidates: config.max_candidates,
    };
    let collector = Collector::new(providers, store, settings);

    if config.run_once {
        collector.run_once().await;
        tracing::info!("Single pass completed, exiting");
    } else {
        collector.run().await;
    }

    Ok(())
}
