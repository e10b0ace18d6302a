use crate::core::upsert::{upsert, UpsertOutcome};
use crate::domain::model::ListingId;
use crate::domain::ports::{DocumentStore, Provider};
use crate::utils::error::Result;

/// Runs the fetch-normalize-store pipeline over one chunk, sequentially.
/// A failing identifier is logged and skipped; it never aborts the chunk.
pub async fn process_chunk(
    provider: &dyn Provider,
    store: &dyn DocumentStore,
    ids: &[ListingId],
) {
    tracing::debug!(
        provider = provider.name(),
        count = ids.len(),
        "worker starting chunk"
    );
    for id in ids {
        if let Err(e) = process_one(provider, store, id).await {
            tracing::error!(listing = %id, error = %e, "failed to process listing");
        }
    }
}

pub async fn process_one(
    provider: &dyn Provider,
    store: &dyn DocumentStore,
    id: &ListingId,
) -> Result<UpsertOutcome> {
    tracing::debug!(listing = %id, "processing listing");

    let (mut listing, modified_at) = provider.fetch(id).await?;
    listing.annotate(id, modified_at);

    let outcome = upsert(store, provider.name(), &listing).await?;
    tracing::debug!(listing = %id, ?outcome, "listing stored");
    Ok(outcome)
}
