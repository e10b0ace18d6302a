use crate::domain::model::Listing;
use crate::domain::ports::DocumentStore;
use crate::utils::error::{CollectorError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

/// Client for the remote document store, speaking the narrow per-collection
/// contract over HTTP+JSON:
///
/// - `GET  {base}/{collection}/latest` — most recently modified record (404 = empty)
/// - `GET  {base}/{collection}/{id}`   — record by `_id` (404 = absent)
/// - `POST {base}/{collection}`        — insert
/// - `PUT  {base}/{collection}/{id}`   — full-document replace
///
/// Identifiers are URLs for some providers, so they are pushed as single
/// percent-encoded path segments.
pub struct RestStore {
    client: Client,
    base_url: Url,
}

impl RestStore {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| CollectorError::Config {
            message: format!("invalid store URL {base_url}: {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CollectorError::Config {
                message: format!("store URL {base_url} cannot carry collection paths"),
            });
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_listing(&self, collection: &str, url: Url) -> Result<Option<Listing>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| read_error(collection, &e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(read_error(
                collection,
                &format!("store answered {}", response.status()),
            ));
        }
        let listing = response
            .json::<Listing>()
            .await
            .map_err(|e| read_error(collection, &e.to_string()))?;
        Ok(Some(listing))
    }
}

fn read_error(collection: &str, message: &str) -> CollectorError {
    CollectorError::StoreRead {
        collection: collection.to_string(),
        message: message.to_string(),
    }
}

fn write_error(id: &str, message: &str) -> CollectorError {
    CollectorError::StoreWrite {
        id: id.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn get_latest(&self, collection: &str) -> Result<Option<Listing>> {
        let url = self.endpoint(&[collection, "latest"]);
        self.get_listing(collection, url).await
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Listing>> {
        let url = self.endpoint(&[collection, id]);
        self.get_listing(collection, url).await
    }

    async fn insert(&self, collection: &str, listing: &Listing) -> Result<()> {
        let id = listing.id_str().unwrap_or_else(|| "<unknown>".to_string());
        let url = self.endpoint(&[collection]);
        let response = self
            .client
            .post(url)
            .json(listing)
            .send()
            .await
            .map_err(|e| write_error(&id, &e.to_string()))?;

        if !response.status().is_success() {
            return Err(write_error(
                &id,
                &format!("store answered {}", response.status()),
            ));
        }
        Ok(())
    }

    async fn replace(&self, collection: &str, id: &str, listing: &Listing) -> Result<()> {
        let url = self.endpoint(&[collection, id]);
        let response = self
            .client
            .put(url)
            .json(listing)
            .send()
            .await
            .map_err(|e| write_error(id, &e.to_string()))?;

        if !response.status().is_success() {
            return Err(write_error(
                id,
                &format!("store answered {}", response.status()),
            ));
        }
        Ok(())
    }
}
