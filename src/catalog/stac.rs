//! STAC API search client

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::CatalogConfig;
use crate::error::{Error, Result};

use super::item::{CatalogItem, ItemSet};
use super::query::SearchRequest;
use super::Catalog;

/// Search response page
#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<CatalogItem>,
    #[serde(default)]
    links: Vec<Link>,
}

/// STAC Link, including the pagination fields of the search extension
#[derive(Debug, Clone, Deserialize)]
struct Link {
    rel: String,
    href: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    body: Option<Value>,
    #[serde(default)]
    merge: bool,
}

/// Next page to request
#[derive(Debug, Clone, PartialEq)]
struct PageRequest {
    method: Method,
    url: String,
    body: Option<Value>,
}

/// Client for a STAC API `/search` endpoint
#[derive(Clone)]
pub struct StacClient {
    client: Client,
    config: CatalogConfig,
}

impl StacClient {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Catalog(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn search_url(&self) -> String {
        format!("{}/search", self.config.url.trim_end_matches('/'))
    }

    async fn fetch_page(&self, page: &PageRequest) -> Result<FeatureCollection> {
        let mut request = self.client.request(page.method.clone(), &page.url);
        if let Some(body) = &page.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Catalog(format!("Request to {} failed: {}", page.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Catalog(format!(
                "{} {} returned {}: {}",
                page.method, page.url, status, text
            )));
        }

        response
            .json::<FeatureCollection>()
            .await
            .map_err(|e| Error::Catalog(format!("Invalid search response from {}: {}", page.url, e)))
    }
}

/// Builds the request for the `rel="next"` link of a page, if any
fn next_page(links: &[Link], previous_body: Option<&Value>) -> Option<PageRequest> {
    let link = links.iter().find(|l| l.rel == "next")?;
    let method = match link.method.as_deref().map(str::to_ascii_uppercase).as_deref() {
        Some("POST") => Method::POST,
        _ => Method::GET,
    };

    let body = if method == Method::POST {
        match (&link.body, previous_body) {
            (Some(next), Some(Value::Object(prev))) if link.merge => {
                let mut merged = prev.clone();
                if let Value::Object(fields) = next {
                    merged.extend(fields.clone());
                }
                Some(Value::Object(merged))
            }
            (Some(next), _) => Some(next.clone()),
            (None, prev) => prev.cloned(),
        }
    } else {
        None
    };

    Some(PageRequest {
        method,
        url: link.href.clone(),
        body,
    })
}

#[async_trait]
impl Catalog for StacClient {
    #[instrument(skip(self, request), fields(datetime = %request.datetime))]
    async fn search(&self, request: &SearchRequest) -> Result<ItemSet> {
        let body = serde_json::to_value(request)
            .map_err(|e| Error::Catalog(format!("Failed to encode search: {}", e)))?;

        let mut page = Some(PageRequest {
            method: Method::POST,
            url: self.search_url(),
            body: Some(body),
        });
        let mut items = Vec::new();
        let mut pages = 0usize;

        while let Some(current) = page.take() {
            let collection = self.fetch_page(&current).await?;
            pages += 1;
            debug!(page = pages, features = collection.features.len(), "Fetched search page");

            let empty_page = collection.features.is_empty();
            items.extend(collection.features);

            if items.len() >= self.config.max_items {
                if items.len() > self.config.max_items {
                    warn!(max_items = self.config.max_items, "Truncating search results");
                }
                items.truncate(self.config.max_items);
                break;
            }
            if empty_page {
                break;
            }
            page = next_page(&collection.links, current.body.as_ref());
        }

        Ok(ItemSet::new(items))
    }
}
