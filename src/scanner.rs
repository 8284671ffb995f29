use crate::models::{RecentEntry, SearchSpec};
use crate::notify::{Notifier, RowSink};
use crate::scrapers::{CatalogSource, Normalizer, RawItem, SearchCatalog};
use crate::store::Tracker;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Counters for one pass over the catalog
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub searches: usize,
    pub items: usize,
    pub notified: usize,
}

/// Polls every search in order, then sleeps a fixed interval.
///
/// Strictly sequential: one slow response delays the whole cycle.
pub struct Scanner {
    catalog: SearchCatalog,
    source: Arc<dyn CatalogSource>,
    normalizer: Normalizer,
    notifier: Arc<dyn Notifier>,
    sink: Option<Arc<dyn RowSink>>,
    tracker: Tracker,
    interval: Duration,
}

impl Scanner {
    pub fn new(
        catalog: SearchCatalog,
        source: Arc<dyn CatalogSource>,
        normalizer: Normalizer,
        notifier: Arc<dyn Notifier>,
        tracker: Tracker,
        interval: Duration,
    ) -> Self {
        Self {
            catalog,
            source,
            normalizer,
            notifier,
            sink: None,
            tracker,
            interval,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn RowSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Run cycles until the process exits
    pub async fn run(&self) {
        info!(
            "Scanner started: {} searches on {}, checking every {} seconds.",
            self.catalog.len(),
            self.source.source_name(),
            self.interval.as_secs()
        );
        loop {
            let report = self.run_cycle().await;
            info!(
                "Cycle done: {} searches, {} items, {} new",
                report.searches, report.items, report.notified
            );
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One sequential pass over the catalog
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();
        for entry in self.catalog.entries() {
            let items = self.source.fetch(&entry.url).await;
            debug!(
                "{} {}: {} items",
                entry.spec.brand,
                entry.spec.category,
                items.len()
            );
            report.searches += 1;
            report.items += items.len();
            for raw in &items {
                if self.process_item(raw, &entry.spec).await {
                    report.notified += 1;
                }
            }
        }
        report
    }

    /// Notify a listing unless already seen. Returns whether it was new.
    ///
    /// The fingerprint is marked before any side effect, and the recent
    /// window is updated whatever the notifier or sink outcome.
    pub async fn process_item(&self, raw: &RawItem, spec: &SearchSpec) -> bool {
        let item = self.normalizer.normalize(raw, spec);
        let fingerprint = item.fingerprint();
        if !self.tracker.claim(&fingerprint).await {
            return false;
        }

        let entry = RecentEntry::found(item);
        self.notifier.send(&entry).await;

        if let Some(sink) = &self.sink {
            if let Err(err) = sink.append(&entry).await {
                warn!("Error writing to {}: {:#}", sink.sink_name(), err);
            }
        }

        info!("Notified: {}", entry.item.title);
        self.tracker.record(entry).await;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Fingerprint;
    use crate::store::{DedupStore, RecentCache};
    use anyhow::Result;
    use async_trait::async_trait;
    use reqwest::Url;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::{tempdir, TempDir};

    /// Serves canned bodies keyed by URL through the real extractor
    #[derive(Default)]
    struct FakeSource {
        bodies: Mutex<HashMap<String, Value>>,
    }

    impl FakeSource {
        fn serve(&self, url: &Url, body: Value) {
            self.bodies.lock().unwrap().insert(url.to_string(), body);
        }
    }

    #[async_trait]
    impl CatalogSource for FakeSource {
        async fn fetch(&self, url: &Url) -> Vec<RawItem> {
            let body = self.bodies.lock().unwrap().get(url.as_str()).cloned();
            body.map(crate::scrapers::extract_items).unwrap_or_default()
        }

        fn source_name(&self) -> &'static str {
            "Fake"
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<RecentEntry>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, entry: &RecentEntry) {
            self.sent.lock().unwrap().push(entry.clone());
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        rows: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl RowSink for RecordingSink {
        async fn append(&self, entry: &RecentEntry) -> Result<()> {
            if self.fail {
                anyhow::bail!("quota exceeded");
            }
            self.rows.lock().unwrap().push(entry.item.id.clone());
            Ok(())
        }

        fn sink_name(&self) -> &'static str {
            "Recording"
        }
    }

    struct Harness {
        scanner: Scanner,
        source: Arc<FakeSource>,
        notifier: Arc<RecordingNotifier>,
        sink: Arc<RecordingSink>,
        tracker: Tracker,
        catalog: SearchCatalog,
        dir: TempDir,
    }

    fn marketplace() -> Url {
        Url::parse("https://www.vinted.it").unwrap()
    }

    fn harness_in(dir: TempDir, failing_sink: bool) -> Harness {
        let catalog = SearchCatalog::from_specs(
            &marketplace(),
            vec![
                SearchSpec::new("Nike", "tuta", 35),
                SearchSpec::new("Adidas", "felpa", 25),
            ],
        )
        .unwrap();
        let tracker = Tracker::new(
            DedupStore::load(dir.path().join("seen_items.txt")),
            RecentCache::new(),
        );
        let source = Arc::new(FakeSource::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let sink = Arc::new(RecordingSink {
            fail: failing_sink,
            ..Default::default()
        });
        let scanner = Scanner::new(
            catalog.clone(),
            source.clone(),
            Normalizer::new(marketplace().as_str()),
            notifier.clone(),
            tracker.clone(),
            Duration::from_secs(15),
        )
        .with_sink(sink.clone());
        Harness {
            scanner,
            source,
            notifier,
            sink,
            tracker,
            catalog,
            dir,
        }
    }

    fn harness() -> Harness {
        harness_in(tempdir().unwrap(), false)
    }

    impl Harness {
        fn url(&self, index: usize) -> &Url {
            &self.catalog.entries()[index].url
        }

        fn sent_ids(&self) -> Vec<String> {
            self.notifier
                .sent
                .lock()
                .unwrap()
                .iter()
                .map(|entry| entry.item.id.clone())
                .collect()
        }

        fn seen_file(&self) -> String {
            std::fs::read_to_string(self.dir.path().join("seen_items.txt")).unwrap_or_default()
        }
    }

    #[tokio::test]
    async fn new_items_are_notified_logged_and_cached() {
        let h = harness();
        h.source.serve(
            h.url(0),
            json!({"items": [
                {"id": 1, "title": "Tuta Nike", "price": 30},
                {"item": {"id": 2, "title": "Tuta Nike nera", "price": {"amount": "28.5"}}}
            ]}),
        );

        let report = h.scanner.run_cycle().await;

        assert_eq!(
            report,
            CycleReport {
                searches: 2,
                items: 2,
                notified: 2
            }
        );
        assert_eq!(h.sent_ids(), vec!["1", "2"]);
        assert_eq!(*h.sink.rows.lock().unwrap(), vec!["1", "2"]);
        assert_eq!(h.seen_file().lines().count(), 2);

        let snapshot = h.tracker.snapshot(50).await;
        assert_eq!(snapshot.tracked_total, 2);
        assert_eq!(snapshot.recent[0].item.id, "2");
        assert_eq!(snapshot.recent[0].item.price_text, "28.50");
        assert_eq!(snapshot.recent[0].item.brand, "Nike");
    }

    #[tokio::test]
    async fn repeated_items_notify_once() {
        let h = harness();
        let body = json!({"items": [{"id": 1, "title": "Tuta Nike", "price": 30}]});
        h.source.serve(h.url(0), body.clone());
        h.source.serve(h.url(1), body);

        h.scanner.run_cycle().await;
        let second = h.scanner.run_cycle().await;

        assert_eq!(second.notified, 0);
        assert_eq!(h.sent_ids(), vec!["1"]);
        assert_eq!(h.sink.rows.lock().unwrap().len(), 1);
        assert_eq!(h.seen_file().lines().count(), 1);
    }

    #[tokio::test]
    async fn unrecognised_body_writes_nothing() {
        let h = harness();
        h.source.serve(h.url(0), json!({"results": [{"id": 1}]}));

        let report = h.scanner.run_cycle().await;

        assert_eq!(report.notified, 0);
        assert!(h.sent_ids().is_empty());
        assert!(h.sink.rows.lock().unwrap().is_empty());
        assert!(!h.dir.path().join("seen_items.txt").exists());
    }

    #[tokio::test]
    async fn restart_skips_fingerprints_from_log() {
        let dir = tempdir().unwrap();
        let known = Fingerprint::from_parts("7", "Felpa Adidas", "20.00");
        std::fs::write(dir.path().join("seen_items.txt"), format!("{}\n", known)).unwrap();

        let h = harness_in(dir, false);
        h.source.serve(
            h.url(1),
            json!({"data": [
                {"id": "7", "title": "Felpa Adidas", "price": "20"},
                {"id": "8", "title": "Felpa Adidas", "price": "20"}
            ]}),
        );

        h.scanner.run_cycle().await;

        assert_eq!(h.sent_ids(), vec!["8"]);
        assert!(h.tracker.lookup("7").await.is_none());
        assert!(h.tracker.lookup("8").await.is_some());
    }

    #[tokio::test]
    async fn sink_failure_does_not_block_dedup_or_cache() {
        let h = harness_in(tempdir().unwrap(), true);
        let raw = crate::scrapers::extract_items(json!({"items": [{"id": 3, "title": "Tuta"}]}));
        let spec = SearchSpec::new("Nike", "tuta", 35);

        assert!(h.scanner.process_item(&raw[0], &spec).await);
        assert!(!h.scanner.process_item(&raw[0], &spec).await);
        assert_eq!(h.sent_ids(), vec!["3"]);
        assert!(h.tracker.lookup("3").await.is_some());
    }
}
