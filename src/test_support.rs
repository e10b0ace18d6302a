//! In-process collaborators for unit tests: an in-memory document store
//! that counts writes and a scriptable provider.

use crate::domain::model::{Listing, ListingId};
use crate::domain::ports::{DocumentStore, Provider};
use crate::utils::error::{CollectorError, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

pub(crate) fn ts(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

pub(crate) fn listing_with(id: &str, price: i64) -> Listing {
    let mut listing = Listing::new();
    listing.insert("_id", id);
    listing.insert("price", price);
    listing
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Listing>>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub(crate) async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.lock().await;
        collections.get(collection).map_or(0, Vec::len)
    }

    pub(crate) async fn seed(&self, collection: &str, listing: Listing) {
        let mut collections = self.collections.lock().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(listing);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_latest(&self, collection: &str) -> Result<Option<Listing>> {
        let collections = self.collections.lock().await;
        let latest = collections.get(collection).and_then(|listings| {
            listings
                .iter()
                .filter_map(|l| l.date_modified().map(|ts| (ts, l)))
                .max_by_key(|(ts, _)| *ts)
                .map(|(_, l)| l.clone())
        });
        Ok(latest)
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Listing>> {
        let collections = self.collections.lock().await;
        let found = collections.get(collection).and_then(|listings| {
            listings
                .iter()
                .find(|l| l.id_str().as_deref() == Some(id))
                .cloned()
        });
        Ok(found)
    }

    async fn insert(&self, collection: &str, listing: &Listing) -> Result<()> {
        let mut collections = self.collections.lock().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(listing.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn replace(&self, collection: &str, id: &str, listing: &Listing) -> Result<()> {
        let mut collections = self.collections.lock().await;
        let listings = collections.entry(collection.to_string()).or_default();
        match listings
            .iter_mut()
            .find(|l| l.id_str().as_deref() == Some(id))
        {
            Some(existing) => {
                *existing = listing.clone();
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            None => Err(CollectorError::StoreWrite {
                id: id.to_string(),
                message: "no record to replace".to_string(),
            }),
        }
    }
}

pub(crate) struct StubProvider {
    name: String,
    per_item: bool,
    ids: Vec<ListingId>,
    listings: HashMap<String, (Listing, DateTime<FixedOffset>)>,
    fail_fetch: HashSet<String>,
    fail_listing: bool,
    pub(crate) seen_min_date: Mutex<Option<Option<DateTime<FixedOffset>>>>,
}

impl StubProvider {
    pub(crate) fn new(name: &str, per_item: bool) -> Self {
        Self {
            name: name.to_string(),
            per_item,
            ids: Vec::new(),
            listings: HashMap::new(),
            fail_fetch: HashSet::new(),
            fail_listing: false,
            seen_min_date: Mutex::new(None),
        }
    }

    pub(crate) fn with_listing(
        mut self,
        id: &str,
        listing: Listing,
        modified_at: DateTime<FixedOffset>,
    ) -> Self {
        self.ids.push(ListingId::new(id));
        self.listings.insert(id.to_string(), (listing, modified_at));
        self
    }

    pub(crate) fn with_failing_fetch(mut self, id: &str) -> Self {
        self.ids.push(ListingId::new(id));
        self.fail_fetch.insert(id.to_string());
        self
    }

    pub(crate) fn with_failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn per_item_fetch(&self) -> bool {
        self.per_item
    }

    async fn list_candidates(
        &self,
        min_date: Option<DateTime<FixedOffset>>,
        max_count: usize,
    ) -> Result<Vec<ListingId>> {
        *self.seen_min_date.lock().await = Some(min_date);
        if self.fail_listing {
            return Err(CollectorError::Listing {
                provider: self.name.clone(),
                message: "could not determine result count".to_string(),
            });
        }
        Ok(self.ids.iter().take(max_count).cloned().collect())
    }

    async fn fetch(&self, id: &ListingId) -> Result<(Listing, DateTime<FixedOffset>)> {
        if self.fail_fetch.contains(id.as_str()) {
            return Err(CollectorError::Fetch {
                id: id.to_string(),
                message: "simulated network failure".to_string(),
            });
        }
        self.listings
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| CollectorError::Fetch {
                id: id.to_string(),
                message: "unknown listing".to_string(),
            })
    }
}
