use crate::domain::model::Listing;
use crate::domain::ports::DocumentStore;
use crate::utils::error::{CollectorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
    /// Stored record was field-for-field identical; no write was performed.
    Unchanged,
}

/// Insert-or-replace-if-changed, keyed by `_id`. The no-write path on an
/// identical record is explicit: re-running a collection pass over unchanged
/// listings performs zero writes. Concurrent upserts on the same `_id` are
/// last-write-wins; no client-side locking.
pub async fn upsert(
    store: &dyn DocumentStore,
    collection: &str,
    listing: &Listing,
) -> Result<UpsertOutcome> {
    let id = listing.id_str().ok_or_else(|| CollectorError::StoreWrite {
        id: "<unknown>".to_string(),
        message: "record carries no _id field".to_string(),
    })?;

    match store.get_by_id(collection, &id).await? {
        None => {
            store.insert(collection, listing).await?;
            tracing::debug!(listing = %id, collection, "new listing inserted");
            Ok(UpsertOutcome::Inserted)
        }
        Some(existing) if existing == *listing => {
            tracing::debug!(listing = %id, collection, "listing unchanged, skipping write");
            Ok(UpsertOutcome::Unchanged)
        }
        Some(_) => {
            store.replace(collection, &id, listing).await?;
            tracing::debug!(listing = %id, collection, "listing replaced");
            Ok(UpsertOutcome::Replaced)
        }
    }
}
