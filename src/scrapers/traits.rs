use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Map, Value};

/// A raw catalog record, schema not guaranteed
pub type RawItem = Map<String, Value>;

/// Source of catalog search results.
///
/// Implementations never fail: a request that cannot be served yields an
/// empty list and is logged by the implementation.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the raw items for one search URL, in provider order
    async fn fetch(&self, url: &Url) -> Vec<RawItem>;

    /// Get the name of the marketplace
    fn source_name(&self) -> &'static str;
}
