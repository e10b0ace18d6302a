use crate::domain::model::{Listing, ListingId};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

/// A site-specific adapter: enumerates candidate listings and fetches one
/// listing at a time. One implementation per external site.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable provider identifier, doubles as the store collection name.
    fn name(&self) -> &str;

    /// True when `fetch` costs a network round trip per identifier, which
    /// makes per-item parallelism worthwhile.
    fn per_item_fetch(&self) -> bool;

    /// Returns candidate identifiers oldest-first, truncated at `max_count`.
    /// Providers that cannot filter by `min_date` must still succeed with a
    /// full list, logging a warning instead of failing. Fails only when the
    /// total page/result count cannot be determined.
    async fn list_candidates(
        &self,
        min_date: Option<DateTime<FixedOffset>>,
        max_count: usize,
    ) -> Result<Vec<ListingId>>;

    /// Fetches and normalizes a single listing, returning the record and
    /// the provider-supplied "last changed" time.
    async fn fetch(&self, id: &ListingId) -> Result<(Listing, DateTime<FixedOffset>)>;
}

/// Narrow contract against the remote document store. One collection per
/// provider; the store is the sole arbiter of `_id` uniqueness.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Record with the maximum `date_modified` in the collection, if any.
    async fn get_latest(&self, collection: &str) -> Result<Option<Listing>>;

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Listing>>;

    async fn insert(&self, collection: &str, listing: &Listing) -> Result<()>;

    /// Full-document replace of the record keyed by `id`.
    async fn replace(&self, collection: &str, id: &str, listing: &Listing) -> Result<()>;
}
