use crate::domain::model::FIELD_DATE_MODIFIED;
use crate::domain::ports::DocumentStore;
use crate::utils::error::Result;
use chrono::{DateTime, FixedOffset};

/// Derives the "since" cutoff for a provider from the store's own state:
/// the `date_modified` of the most recently stored record, or `None` when
/// the collection is empty (full backfill). The value is used as-is; an
/// anomalously future checkpoint is a documented risk, not guarded here.
pub async fn resolve_checkpoint(
    store: &dyn DocumentStore,
    collection: &str,
) -> Result<Option<DateTime<FixedOffset>>> {
    match store.get_latest(collection).await? {
        None => Ok(None),
        Some(latest) => match latest.date_modified() {
            Some(ts) => Ok(Some(ts)),
            None => {
                tracing::warn!(
                    collection,
                    field = FIELD_DATE_MODIFIED,
                    "latest record has no usable timestamp, falling back to a full backfill"
                );
                Ok(None)
            }
        },
    }
}
