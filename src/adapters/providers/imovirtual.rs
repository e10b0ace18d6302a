use crate::adapters::providers::{parse_offset_timestamp, strip_br};
use crate::domain::model::{FieldValue, Listing, ListingId, FIELD_ID};
use crate::domain::ports::Provider;
use crate::utils::error::{CollectorError, Result};
use crate::utils::retry::{get_with_retry, RetryPolicy};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use reqwest::Client;

const PROVIDER_NAME: &str = "imovirtual";
const RESULTS_PER_PAGE: usize = 72;

/// imovirtual.com adapter. The search pages only carry listing URLs, so
/// every candidate costs a dedicated page fetch; the listing data itself is
/// embedded in the page as a `__NEXT_DATA__` JSON blob.
pub struct Imovirtual {
    client: Client,
    retry: RetryPolicy,
    base_url: String,
}

impl Imovirtual {
    pub fn new() -> Self {
        Self::with_base_url("https://www.imovirtual.com")
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            retry: RetryPolicy::default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn search_url(&self, min_date: Option<DateTime<FixedOffset>>, page: usize) -> String {
        match min_date {
            Some(since) => {
                let days = (Utc::now().fixed_offset() - since).num_days().max(1);
                format!(
                    "{}/en/comprar/?search%5Bcreated_since%5D={}&nrAdsPerPage={}&page={}",
                    self.base_url, days, RESULTS_PER_PAGE, page
                )
            }
            None => format!(
                "{}/en/comprar/?nrAdsPerPage={}&page={}",
                self.base_url, RESULTS_PER_PAGE, page
            ),
        }
    }
}

impl Default for Imovirtual {
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

/// Page count of the search result set, taken from the page number that
/// precedes the "next" pager arrow.
fn parse_page_count(body: &str) -> Option<usize> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"(?s)<a[^>]*>\s*(\d+)\s*</a>\s*</li>\s*<li class="pager-next""#).unwrap()
    });
    re.captures(body)?.get(1)?.as_str().parse().ok()
}

fn extract_listing_urls(body: &str) -> Vec<String> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| Regex::new(r#"<article[^>]*\bdata-url="([^"]+)""#).unwrap());
    re.captures_iter(body)
        .map(|caps| caps[1].to_string())
        .collect()
}

fn extract_next_data(body: &str) -> Option<&str> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| {
        Regex::new(r#"(?s)<script id="__NEXT_DATA__"[^>]*>(.*?)</script>"#).unwrap()
    });
    Some(re.captures(body)?.get(1)?.as_str())
}

fn flatten_ad(id: &ListingId, ad: &serde_json::Value) -> Result<Listing> {
    let mut listing = Listing::new();

    for key in ["advertType", "exclusiveOffer", "title", "features"] {
        if let Some(value) = ad.get(key).cloned().and_then(FieldValue::from_json) {
            listing.insert(key, value);
        }
    }

    if let Some(description) = ad.get("description").and_then(|v| v.as_str()) {
        listing.insert("description", strip_br(description));
    }

    if let Some(category) = ad
        .pointer("/category/name/0/value")
        .cloned()
        .and_then(FieldValue::from_json)
    {
        listing.insert("category", category);
    }

    let ad_id = ad
        .get("id")
        .cloned()
        .and_then(FieldValue::from_json)
        .ok_or_else(|| fetch_error(id, "ad payload carries no id"))?;
    listing.insert(FIELD_ID, ad_id);

    if let Some(created) = ad
        .get("createdAt")
        .and_then(|v| v.as_str())
        .and_then(parse_offset_timestamp)
    {
        listing.insert("createdAt", created);
    }

    // characteristics come as [{key, value}, ...] pairs
    if let Some(characteristics) = ad.get("characteristics").and_then(|v| v.as_array()) {
        for entry in characteristics {
            let key = entry.get("key").and_then(|v| v.as_str());
            let value = entry.get("value").cloned().and_then(FieldValue::from_json);
            if let (Some(key), Some(value)) = (key, value) {
                listing.insert(key, value);
            }
        }
    }

    for (field, pointer) in [
        ("longitude", "/location/coordinates/longitude"),
        ("latitude", "/location/coordinates/latitude"),
    ] {
        if let Some(value) = ad.pointer(pointer).cloned().and_then(FieldValue::from_json) {
            listing.insert(field, value);
        }
    }

    if let Some(address) = ad.pointer("/location/address").and_then(|v| v.as_object()) {
        for (key, value) in address {
            if let Some(name) = value
                .get("name")
                .cloned()
                .and_then(FieldValue::from_json)
            {
                listing.insert(key, name);
            }
        }
    }

    Ok(listing)
}

#[async_trait]
impl Provider for Imovirtual {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn per_item_fetch(&self) -> bool {
        true
    }

    async fn list_candidates(
        &self,
        min_date: Option<DateTime<FixedOffset>>,
        max_count: usize,
    ) -> Result<Vec<ListingId>> {
        let first_url = self.search_url(min_date, 1);
        let response = self
            .client
            .get(&first_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| listing_error(e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| listing_error(e.to_string()))?;

        let num_pages = parse_page_count(&body)
            .ok_or_else(|| listing_error("could not determine page count"))?;
        tracing::info!(provider = PROVIDER_NAME, pages = num_pages, "scanning result pages");

        // Results are sorted newest-first; walking the pages backwards and
        // reversing within each page yields an oldest-first sequence.
        let mut ids = Vec::new();
        for page in (1..=num_pages).rev() {
            let url = self.search_url(min_date, page);
            tracing::debug!(provider = PROVIDER_NAME, page, url, "scanning page");

            let response = get_with_retry(&self.client, &url, self.retry)
                .await
                .map_err(|e| listing_error(e.to_string()))?;
            let body = response
                .text()
                .await
                .map_err(|e| listing_error(e.to_string()))?;

            let mut links = extract_listing_urls(&body);
            tracing::debug!(provider = PROVIDER_NAME, page, count = links.len(), "found listings");
            links.reverse();

            for link in links {
                ids.push(ListingId::new(link));
                if ids.len() >= max_count {
                    return Ok(ids);
                }
            }
        }
        Ok(ids)
    }

    async fn fetch(&self, id: &ListingId) -> Result<(Listing, DateTime<FixedOffset>)> {
        let response = get_with_retry(&self.client, id.as_str(), self.retry)
            .await
            .map_err(|e| fetch_error(id, e.to_string()))?;
        let body = response
            .text()
            .await
            .map_err(|e| fetch_error(id, e.to_string()))?;

        let payload = extract_next_data(&body)
            .ok_or_else(|| fetch_error(id, "page carries no __NEXT_DATA__ payload"))?;
        let json: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| fetch_error(id, e.to_string()))?;
        let ad = json
            .pointer("/props/pageProps/ad")
            .ok_or_else(|| fetch_error(id, "payload carries no ad object"))?;

        let listing = flatten_ad(id, ad)?;
        let modified_at = ad
            .get("modifiedAt")
            .and_then(|v| v.as_str())
            .and_then(parse_offset_timestamp)
            .ok_or_else(|| fetch_error(id, "ad carries no usable modifiedAt"))?;

        Ok((listing, modified_at))
    }
}
