//! End-to-end tests for the scan cycle with stubbed collaborators.
//!
//! Discovery, transport, analysis, and alert channels are replaced by
//! deterministic stubs; the store is a real SQLite database in a temp
//! directory.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use onionwatch::alerts::{AlertChannel, AlertDispatcher};
use onionwatch::analyzer::Analyzer;
use onionwatch::discovery::Discovery;
use onionwatch::error::{MonitorError, Result};
use onionwatch::fetcher::Fetcher;
use onionwatch::models::{Analysis, Entity, Sentiment};
use onionwatch::monitor::{CyclePhase, MonitorService, TriggerOutcome};
use onionwatch::repository::{open_pool, SiteRepository};
use onionwatch::transport::Transport;

struct FixedDiscovery {
    urls: Vec<String>,
}

#[async_trait]
impl Discovery for FixedDiscovery {
    async fn discover(&self) -> HashSet<String> {
        self.urls.iter().cloned().collect()
    }
}

struct FixtureTransport {
    pages: HashMap<String, String>,
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.pages.get(url).cloned().ok_or_else(|| {
            MonitorError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("connection refused: {url}"),
            ))
        })
    }
}

/// Transport that parks every fetch until released.
struct BlockingTransport {
    release: Arc<Notify>,
}

#[async_trait]
impl Transport for BlockingTransport {
    async fn fetch_text(&self, _url: &str) -> Result<String> {
        self.release.notified().await;
        Ok("released".to_string())
    }
}

/// Analyzer returning a fixed label for every page.
struct LabelAnalyzer {
    label: String,
}

#[async_trait]
impl Analyzer for LabelAnalyzer {
    async fn classify(&self, _text: &str) -> Result<Analysis> {
        Ok(Analysis::new(self.label.as_str(), 0.95, "stub-model"))
    }

    async fn extract_entities(&self, _text: &str) -> Result<Vec<Entity>> {
        Ok(vec![])
    }
}

/// Analyzer whose classify always fails.
struct FailingAnalyzer;

#[async_trait]
impl Analyzer for FailingAnalyzer {
    async fn classify(&self, _text: &str) -> Result<Analysis> {
        Err(MonitorError::Inference("model unavailable".to_string()))
    }

    async fn extract_entities(&self, _text: &str) -> Result<Vec<Entity>> {
        Ok(vec![])
    }
}

/// Alert channel recording every delivered URL.
struct RecordingChannel {
    delivered: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl AlertChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, url: &str, _summary: &str) -> Result<()> {
        self.delivered.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

struct Harness {
    service: Arc<MonitorService>,
    store: SiteRepository,
    delivered: Arc<Mutex<Vec<String>>>,
    _dir: tempfile::TempDir,
}

fn build_harness(
    discovered: &[&str],
    pages: HashMap<String, String>,
    analyzer: Arc<dyn Analyzer>,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let pool = open_pool(&dir.path().join("test.db")).unwrap();
    let store = SiteRepository::new(pool);

    let delivered = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = AlertDispatcher::new(vec![Box::new(RecordingChannel {
        delivered: delivered.clone(),
    })]);

    let service = Arc::new(MonitorService::new(
        store.clone(),
        Arc::new(FixedDiscovery {
            urls: discovered.iter().map(|s| s.to_string()).collect(),
        }),
        Fetcher::new(Arc::new(FixtureTransport { pages }), Duration::from_secs(15)),
        analyzer,
        dispatcher,
        Duration::from_secs(86_400),
    ));

    Harness {
        service,
        store,
        delivered,
        _dir: dir,
    }
}

#[tokio::test]
async fn test_negative_page_end_to_end() {
    let url = "http://abc123.onion";
    let harness = build_harness(
        &[url],
        HashMap::from([(url.to_string(), "<html>bad stuff</html>".to_string())]),
        Arc::new(LabelAnalyzer {
            label: "NEGATIVE".to_string(),
        }),
    );

    assert!(harness.store.get_all().await.unwrap().is_empty());

    let report = harness.service.run_once().await;
    assert_eq!(report.discovered, 1);
    assert_eq!(report.fetched, 1);
    assert_eq!(report.analyzed, 1);
    assert_eq!(report.alerted, 1);

    let site = harness.store.get_by_url(url).await.unwrap().unwrap();
    assert_eq!(site.content.as_deref(), Some("<html>bad stuff</html>"));
    assert_eq!(site.sentiment, Some(Sentiment::Negative));
    assert_eq!(site.analysis.unwrap().label, "NEGATIVE");

    // The dispatcher fired exactly once, for exactly this url.
    assert_eq!(*harness.delivered.lock().unwrap(), vec![url.to_string()]);
}

#[tokio::test]
async fn test_positive_page_does_not_alert() {
    let url = "http://abc123.onion";
    let harness = build_harness(
        &[url],
        HashMap::from([(url.to_string(), "<html>all fine</html>".to_string())]),
        Arc::new(LabelAnalyzer {
            label: "POSITIVE".to_string(),
        }),
    );

    let report = harness.service.run_once().await;
    assert_eq!(report.alerted, 0);

    let site = harness.store.get_by_url(url).await.unwrap().unwrap();
    assert_eq!(site.sentiment, Some(Sentiment::Positive));
    assert!(harness.delivered.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_repeated_discovery_keeps_one_record() {
    let url = "http://abc123.onion";
    let harness = build_harness(
        &[url],
        HashMap::from([(url.to_string(), "<html>page</html>".to_string())]),
        Arc::new(LabelAnalyzer {
            label: "POSITIVE".to_string(),
        }),
    );

    harness.service.run_once().await;
    let second = harness.service.run_once().await;

    assert_eq!(second.discovered, 0);
    assert_eq!(harness.store.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_fetch_leaves_record_without_content() {
    let url = "http://dead.onion";
    let harness = build_harness(
        &[url],
        HashMap::new(),
        Arc::new(LabelAnalyzer {
            label: "NEGATIVE".to_string(),
        }),
    );

    let report = harness.service.run_once().await;
    assert_eq!(report.fetched, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(report.alerted, 0);

    let site = harness.store.get_by_url(url).await.unwrap().unwrap();
    assert!(site.content.is_none());
    assert!(site.sentiment.is_none());
}

#[tokio::test]
async fn test_classification_failure_skips_record_only() {
    let url = "http://abc123.onion";
    let harness = build_harness(
        &[url],
        HashMap::from([(url.to_string(), "<html>page</html>".to_string())]),
        Arc::new(FailingAnalyzer),
    );

    let report = harness.service.run_once().await;
    assert_eq!(report.fetched, 1);
    assert_eq!(report.analyzed, 0);
    assert_eq!(report.alerted, 0);

    // The record survives unanalyzed; the cycle completed.
    let site = harness.store.get_by_url(url).await.unwrap().unwrap();
    assert!(site.analysis.is_none());
}

#[tokio::test]
async fn test_trigger_is_single_flight() {
    let dir = tempfile::tempdir().unwrap();
    let pool = open_pool(&dir.path().join("test.db")).unwrap();
    let store = SiteRepository::new(pool);

    let release = Arc::new(Notify::new());
    let service = Arc::new(MonitorService::new(
        store,
        Arc::new(FixedDiscovery {
            urls: vec!["http://slow.onion".to_string()],
        }),
        Fetcher::new(
            Arc::new(BlockingTransport {
                release: release.clone(),
            }),
            Duration::from_secs(15),
        ),
        Arc::new(LabelAnalyzer {
            label: "POSITIVE".to_string(),
        }),
        AlertDispatcher::new(vec![]),
        Duration::from_secs(86_400),
    ));

    let mut phases = service.phase_changes();

    assert_eq!(service.clone().trigger(), TriggerOutcome::Started);

    // Wait until the cycle is parked inside the fetch stage.
    while *phases.borrow_and_update() != CyclePhase::Fetching {
        phases.changed().await.unwrap();
    }

    // A second trigger while the first cycle is in flight is rejected.
    assert_eq!(service.clone().trigger(), TriggerOutcome::AlreadyRunning);

    // notify_one stores a permit, so the parked fetch wakes even if it
    // had not yet reached its await point.
    release.notify_one();

    while *phases.borrow_and_update() != CyclePhase::Idle {
        phases.changed().await.unwrap();
    }

    // Once the cycle finished, triggering works again.
    release.notify_one();
    assert_eq!(service.clone().trigger(), TriggerOutcome::Started);
}
