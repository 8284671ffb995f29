use crate::scrapers::traits::{CatalogSource, RawItem};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Rotated per request as a simple anti-blocking measure
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)",
    "Mozilla/5.0 (X11; Linux x86_64)",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_0 like Mac OS X)",
    "Mozilla/5.0 (Android 10; Mobile)",
];

/// Why a catalog request produced no items
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("body is not JSON: {0}")]
    Body(#[from] serde_json::Error),
}

/// Vinted catalog API client
pub struct VintedClient {
    client: Client,
}

impl VintedClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    async fn request(&self, url: &Url) -> Result<Value, FetchError> {
        let user_agent = pick_user_agent();
        debug!("Fetching URL: {} as {:?}", url, user_agent);

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::USER_AGENT, user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await?;
        debug!("Downloaded {} bytes of JSON", body.len());
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl CatalogSource for VintedClient {
    async fn fetch(&self, url: &Url) -> Vec<RawItem> {
        match self.request(url).await {
            Ok(body) => extract_items(body),
            Err(err) => {
                warn!("Skipping {}: {}", url, err);
                Vec::new()
            }
        }
    }

    fn source_name(&self) -> &'static str {
        "Vinted"
    }
}

fn pick_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Pull the item list out of a catalog response.
///
/// Accepts a top-level `items` or `data` array, or either key holding an
/// `{"items": [...]}` wrapper. Entries wrapped as `{"item": {...}}` are
/// unwrapped once; non-object entries are dropped. Unknown shapes yield an
/// empty list.
pub fn extract_items(body: Value) -> Vec<RawItem> {
    let Value::Object(mut root) = body else {
        return Vec::new();
    };

    let container = ["items", "data"]
        .iter()
        .filter_map(|key| root.remove(*key))
        .find(|value| match value {
            Value::Array(list) => !list.is_empty(),
            Value::Object(map) => !map.is_empty(),
            _ => false,
        });

    let list = match container {
        Some(Value::Array(list)) => list,
        Some(Value::Object(mut nested)) => match nested.remove("items") {
            Some(Value::Array(list)) => list,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    list.into_iter()
        .filter_map(|entry| match entry {
            Value::Object(mut map) => match map.remove("item") {
                Some(Value::Object(inner)) => Some(inner),
                Some(other) => {
                    map.insert("item".to_string(), other);
                    Some(map)
                }
                None => Some(map),
            },
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(items: &[RawItem]) -> Vec<i64> {
        items.iter().filter_map(|item| item["id"].as_i64()).collect()
    }

    #[test]
    fn top_level_items_array() {
        let items = extract_items(json!({"items": [{"id": 1}, {"id": 2}]}));
        assert_eq!(ids(&items), vec![1, 2]);
    }

    #[test]
    fn top_level_data_array() {
        let items = extract_items(json!({"data": [{"id": 3}]}));
        assert_eq!(ids(&items), vec![3]);
    }

    #[test]
    fn empty_items_falls_through_to_data() {
        let items = extract_items(json!({"items": [], "data": [{"id": 4}]}));
        assert_eq!(ids(&items), vec![4]);
    }

    #[test]
    fn nested_items_wrapper() {
        let items = extract_items(json!({"data": {"items": [{"id": 5}, {"id": 6}]}}));
        assert_eq!(ids(&items), vec![5, 6]);
    }

    #[test]
    fn item_wrappers_are_unwrapped_once() {
        let items = extract_items(json!({
            "items": [{"item": {"id": 7}}, {"id": 8, "item": "not-a-dict"}]
        }));
        assert_eq!(ids(&items), vec![7, 8]);
        assert_eq!(items[1]["item"], "not-a-dict");
    }

    #[test]
    fn non_object_entries_are_dropped() {
        let items = extract_items(json!({"items": [1, "two", {"id": 9}]}));
        assert_eq!(ids(&items), vec![9]);
    }

    #[test]
    fn unrecognised_shapes_are_empty() {
        assert!(extract_items(json!({"results": [{"id": 1}]})).is_empty());
        assert!(extract_items(json!([{"id": 1}])).is_empty());
        assert!(extract_items(json!({"items": {"total": 0}})).is_empty());
        assert!(extract_items(Value::Null).is_empty());
    }

    #[test]
    fn user_agent_comes_from_pool() {
        for _ in 0..20 {
            assert!(USER_AGENTS.contains(&pick_user_agent()));
        }
    }
}
