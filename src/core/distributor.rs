use crate::core::pipeline;
use crate::domain::model::ListingId;
use crate::domain::ports::{DocumentStore, Provider};
use futures::future::join_all;
use std::sync::Arc;

/// Partitions identifiers into `min(max_workers, N)` contiguous chunks,
/// front-loading the remainder so sizes differ by at most one. The
/// partition is total and non-overlapping; relative order is preserved.
/// Zero identifiers yield zero chunks.
pub fn chunk_ids(ids: &[ListingId], max_workers: usize) -> Vec<Vec<ListingId>> {
    if ids.is_empty() || max_workers == 0 {
        return Vec::new();
    }
    let workers = max_workers.min(ids.len());
    let base = ids.len() / workers;
    let extra = ids.len() % workers;

    let mut chunks = Vec::with_capacity(workers);
    let mut offset = 0;
    for i in 0..workers {
        let size = base + usize::from(i < extra);
        chunks.push(ids[offset..offset + size].to_vec());
        offset += size;
    }
    chunks
}

/// Dispatches the candidate list to the pipeline. Everything runs on a
/// single worker when concurrency is disabled or the provider's listing
/// call already returned full payloads (`per_item_fetch() == false`);
/// otherwise one task per chunk, statically assigned (no work stealing).
/// Blocks until every worker has finished; all observable effects are store
/// writes and log lines.
pub async fn dispatch(
    provider: Arc<dyn Provider>,
    store: Arc<dyn DocumentStore>,
    ids: Vec<ListingId>,
    max_workers: usize,
    concurrency_enabled: bool,
) {
    if ids.is_empty() {
        tracing::debug!(provider = provider.name(), "no candidates to process");
        return;
    }

    if !concurrency_enabled || !provider.per_item_fetch() {
        tracing::info!(
            provider = provider.name(),
            count = ids.len(),
            "processing candidates on a single worker"
        );
        pipeline::process_chunk(provider.as_ref(), store.as_ref(), &ids).await;
        return;
    }

    let chunks = chunk_ids(&ids, max_workers);
    tracing::info!(
        provider = provider.name(),
        count = ids.len(),
        workers = chunks.len(),
        "processing candidates across worker pool"
    );

    let mut tasks = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let provider = Arc::clone(&provider);
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            pipeline::process_chunk(provider.as_ref(), store.as_ref(), &chunk).await;
        }));
    }

    for result in join_all(tasks).await {
        if let Err(e) = result {
            tracing::error!(error = %e, "worker task panicked");
        }
    }
}
