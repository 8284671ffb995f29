use crate::models::RecentEntry;
use anyhow::Result;
use async_trait::async_trait;

/// Delivers one alert per new listing.
///
/// At most one delivery attempt: failures are logged by the implementation
/// and never reach the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, entry: &RecentEntry);
}

/// Optional append-only tabular log of found listings
#[async_trait]
pub trait RowSink: Send + Sync {
    async fn append(&self, entry: &RecentEntry) -> Result<()>;

    /// Get the name of the sink
    fn sink_name(&self) -> &'static str;
}
