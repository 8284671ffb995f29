use crate::models::{Fingerprint, RecentEntry};
use crate::store::dedup::DedupStore;
use crate::store::recent::RecentCache;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Shared owner of the seen set and the recent window.
///
/// The scanner is the only writer; the status server only receives cloned
/// snapshots, never the containers themselves.
#[derive(Clone)]
pub struct Tracker {
    inner: Arc<Mutex<TrackerState>>,
}

struct TrackerState {
    seen: DedupStore,
    recent: RecentCache,
}

/// Point-in-time view served by the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tracked_total: usize,
    pub recent_count: usize,
    pub recent: Vec<RecentEntry>,
}

impl Tracker {
    pub fn new(seen: DedupStore, recent: RecentCache) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TrackerState { seen, recent })),
        }
    }

    /// Mark a fingerprint as seen unless it already was.
    ///
    /// Returns `true` when the caller owns the first sighting and should
    /// notify. A failed log append is logged; the fingerprint stays marked in
    /// memory.
    pub async fn claim(&self, fingerprint: &Fingerprint) -> bool {
        let mut state = self.inner.lock().await;
        if state.seen.has(fingerprint) {
            return false;
        }
        if let Err(err) = state.seen.mark_seen(fingerprint) {
            warn!("Could not persist fingerprint {}: {:#}", fingerprint, err);
        }
        true
    }

    pub async fn record(&self, entry: RecentEntry) {
        self.inner.lock().await.recent.insert(entry);
    }

    pub async fn is_seen(&self, fingerprint: &Fingerprint) -> bool {
        self.inner.lock().await.seen.has(fingerprint)
    }

    pub async fn snapshot(&self, limit: usize) -> Snapshot {
        let state = self.inner.lock().await;
        Snapshot {
            tracked_total: state.seen.len(),
            recent_count: state.recent.len(),
            recent: state.recent.newest(limit).cloned().collect(),
        }
    }

    pub async fn lookup(&self, id: &str) -> Option<RecentEntry> {
        self.inner.lock().await.recent.lookup(id).cloned()
    }
}
