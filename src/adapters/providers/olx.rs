use crate::adapters::providers::{parse_offset_timestamp, strip_br};
use crate::domain::model::{FieldValue, Listing, ListingId, FIELD_ID};
use crate::domain::ports::Provider;
use crate::utils::error::{CollectorError, Result};
use crate::utils::retry::{get_with_retry, RetryPolicy};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use std::collections::HashMap;
use tokio::sync::Mutex;

const PROVIDER_NAME: &str = "olx";
const RESULTS_PER_PAGE: usize = 40;

/// olx.pt adapter. The offers API returns full listing payloads with the
/// result pages, so candidates are cached during enumeration and `fetch`
/// never touches the network.
pub struct Olx {
    client: Client,
    retry: RetryPolicy,
    base_url: String,
    offers: Mutex<HashMap<String, serde_json::Value>>,
}

impl Olx {
    pub fn new() -> Self {
        Self::with_base_url("https://www.olx.pt")
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            retry: RetryPolicy::default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            offers: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn offers_url(&self, offset: usize) -> String {
        format!(
            "{}/api/v1/offers/?offset={}&limit={}&category_id=16&sort_by=created_at%3Adesc",
            self.base_url, offset, RESULTS_PER_PAGE
        )
    }
}

impl Default for Olx {
    fn default() -> Self {
        Self::new()
    }
}

fn listing_error(message: impl Into<String>) -> CollectorError {
    CollectorError::Listing {
        provider: PROVIDER_NAME.to_string(),
        message: message.into(),
    }
}

fn fetch_error(id: &ListingId, message: impl Into<String>) -> CollectorError {
    CollectorError::Fetch {
        id: id.to_string(),
        message: message.into(),
    }
}

fn flatten_offer(id: &ListingId, data: &serde_json::Value) -> Result<Listing> {
    let mut listing = Listing::new();

    for key in ["id", "title", "status"] {
        if let Some(value) = data.get(key).cloned().and_then(FieldValue::from_json) {
            listing.insert(key, value);
        }
    }

    if let Some(description) = data.get("description").and_then(|v| v.as_str()) {
        listing.insert("description", strip_br(description));
    }

    let offer_id = data
        .get("id")
        .cloned()
        .and_then(FieldValue::from_json)
        .ok_or_else(|| fetch_error(id, "offer payload carries no id"))?;
    listing.insert(FIELD_ID, offer_id);

    for key in [
        "last_refresh_time",
        "created_time",
        "valid_to_time",
        "pushup_time",
    ] {
        if let Some(raw) = data.get(key).and_then(|v| v.as_str()) {
            match parse_offset_timestamp(raw) {
                Some(ts) => listing.insert(key, ts),
                None => {
                    return Err(fetch_error(id, format!("{key} is not a valid timestamp")))
                }
            }
        }
    }

    if let Some(promotion) = data.get("promotion").and_then(|v| v.as_object()) {
        for (key, value) in promotion {
            if key == "options" || key == "b2c_ad_page" {
                continue;
            }
            if let Some(value) = FieldValue::from_json(value.clone()) {
                listing.insert(key, value);
            }
        }
    }

    // params come as [{key, value: {value | key}}, ...]
    if let Some(params) = data.get("params").and_then(|v| v.as_array()) {
        for param in params {
            let Some(key) = param.get("key").and_then(|v| v.as_str()) else {
                continue;
            };
            let value = param
                .get("value")
                .and_then(|v| v.get("value").or_else(|| v.get("key")))
                .cloned()
                .and_then(FieldValue::from_json);
            match value {
                Some(value) => listing.insert(key, value),
                None => tracing::warn!(listing = %id, param = key, "param cannot be parsed"),
            }
        }
    }

    if let Some(user) = data.get("user") {
        if let Some(value) = user.get("id").cloned().and_then(FieldValue::from_json) {
            listing.insert("user_id", value);
        }
        if let Some(value) = user.get("created").cloned().and_then(FieldValue::from_json) {
            listing.insert("user_created_at", value);
        }
    }

    if let Some(map) = data.get("map") {
        if let Some(value) = map.get("lat").cloned().and_then(FieldValue::from_json) {
            listing.insert("latitude", value);
        }
        if let Some(value) = map.get("lon").cloned().and_then(FieldValue::from_json) {
            listing.insert("longitude", value);
        }
    }

    if let Some(location) = data.get("location").and_then(|v| v.as_object()) {
        for (key, value) in location {
            match value.get("name").cloned().and_then(FieldValue::from_json) {
                Some(name) => listing.insert(key, name),
                None => {
                    tracing::warn!(listing = %id, part = key, "address part cannot be parsed")
                }
            }
        }
    }

    if let Some(photos) = data.get("photos").and_then(|v| v.as_array()) {
        let links: Vec<FieldValue> = photos
            .iter()
            .filter_map(|p| p.get("link").cloned().and_then(FieldValue::from_json))
            .collect();
        listing.insert("photos", FieldValue::List(links));
    }

    if let Some(category) = data.get("category").and_then(|v| v.as_object()) {
        for (key, value) in category {
            if let Some(value) = FieldValue::from_json(value.clone()) {
                listing.insert(format!("category_{key}"), value);
            }
        }
    }

    listing.insert("provider", PROVIDER_NAME);

    Ok(listing)
}

#[async_trait]
impl Provider for Olx {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn per_item_fetch(&self) -> bool {
        false
    }

    async fn list_candidates(
        &self,
        min_date: Option<DateTime<FixedOffset>>,
        max_count: usize,
    ) -> Result<Vec<ListingId>> {
        if min_date.is_some() {
            tracing::warn!(
                provider = PROVIDER_NAME,
                "listing filter by date is not supported, scanning the full result set"
            );
        }

        let response = self
            .client
            .get(self.offers_url(0))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| listing_error(e.to_string()))?;
        let first: serde_json::Value = response
            .json()
            .await
            .map_err(|e| listing_error(e.to_string()))?;

        let total = first
            .pointer("/metadata/visible_total_count")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| listing_error("response carries no visible_total_count"))?
            as usize;
        let num_pages = total / RESULTS_PER_PAGE + 1;
        tracing::info!(provider = PROVIDER_NAME, pages = num_pages, "scanning result pages");

        // Offers are sorted newest-first; walking the pages backwards and
        // reversing within each page yields an oldest-first sequence.
        let mut ids = Vec::new();
        let mut payloads = HashMap::new();
        'pages: for page in (0..num_pages).rev() {
            let url = self.offers_url(page * RESULTS_PER_PAGE);
            tracing::debug!(provider = PROVIDER_NAME, page, url, "scanning page");

            let response = get_with_retry(&self.client, &url, self.retry)
                .await
                .map_err(|e| listing_error(e.to_string()))?;
            let body: serde_json::Value = response
                .json()
                .await
                .map_err(|e| listing_error(e.to_string()))?;
            let offers = body
                .get("data")
                .and_then(|v| v.as_array())
                .ok_or_else(|| listing_error("result page carries no data array"))?;
            tracing::debug!(provider = PROVIDER_NAME, page, count = offers.len(), "found offers");

            for offer in offers.iter().rev() {
                let Some(link) = offer.get("url").and_then(|v| v.as_str()) else {
                    tracing::warn!(provider = PROVIDER_NAME, "offer carries no url, skipping");
                    continue;
                };
                ids.push(ListingId::new(link));
                payloads.insert(link.to_string(), offer.clone());
                if ids.len() >= max_count {
                    break 'pages;
                }
            }
        }

        *self.offers.lock().await = payloads;
        Ok(ids)
    }

    async fn fetch(&self, id: &ListingId) -> Result<(Listing, DateTime<FixedOffset>)> {
        let offers = self.offers.lock().await;
        let data = offers
            .get(id.as_str())
            .ok_or_else(|| fetch_error(id, "listing not present in the last enumeration"))?;

        let listing = flatten_offer(id, data)?;
        let created = listing
            .get("created_time")
            .and_then(FieldValue::as_timestamp)
            .ok_or_else(|| fetch_error(id, "offer carries no usable created_time"))?;

        Ok((listing, created))
    }
}
