//! The scan cycle orchestrator.
//!
//! One cycle walks Discovering -> Fetching -> Analyzing -> Persisting ->
//! Notifying strictly in order, then the loop sleeps until the next
//! scheduled cycle or a manual trigger. A single-flight guard ensures at
//! most one cycle is ever in flight; a trigger while a cycle runs is
//! rejected, never run concurrently.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tracing::{error, info, warn};

use crate::alerts::AlertDispatcher;
use crate::analyzer::Analyzer;
use crate::discovery::Discovery;
use crate::fetcher::Fetcher;
use crate::models::Analysis;
use crate::repository::SiteRepository;

/// Phase of the monitoring loop, published for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Discovering,
    Fetching,
    Analyzing,
    Persisting,
    Notifying,
}

impl CyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Discovering => "discovering",
            CyclePhase::Fetching => "fetching",
            CyclePhase::Analyzing => "analyzing",
            CyclePhase::Persisting => "persisting",
            CyclePhase::Notifying => "notifying",
        }
    }
}

/// Counters from one completed cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// New URLs inserted this cycle.
    pub discovered: usize,
    /// Total tracked URLs at fetch time.
    pub known: usize,
    /// URLs fetched successfully.
    pub fetched: usize,
    /// URLs that failed or timed out.
    pub failed: usize,
    /// Records that made it through analysis.
    pub analyzed: usize,
    /// Negative findings dispatched to alert channels.
    pub alerted: usize,
}

/// Result of asking for a manual cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A cycle was started in the background.
    Started,
    /// A cycle is already in flight; the request was rejected.
    AlreadyRunning,
}

/// Orchestrates discovery, fetching, analysis, persistence, and alerts.
///
/// All collaborators are explicit dependencies with process lifetime,
/// injected at construction; the service holds no ambient globals.
pub struct MonitorService {
    store: SiteRepository,
    discovery: Arc<dyn Discovery>,
    fetcher: Fetcher,
    analyzer: Arc<dyn Analyzer>,
    alerts: AlertDispatcher,
    scan_interval: Duration,
    cycle_guard: Arc<Mutex<()>>,
    phase_tx: watch::Sender<CyclePhase>,
}

impl MonitorService {
    pub fn new(
        store: SiteRepository,
        discovery: Arc<dyn Discovery>,
        fetcher: Fetcher,
        analyzer: Arc<dyn Analyzer>,
        alerts: AlertDispatcher,
        scan_interval: Duration,
    ) -> Self {
        let (phase_tx, _) = watch::channel(CyclePhase::Idle);
        Self {
            store,
            discovery,
            fetcher,
            analyzer,
            alerts,
            scan_interval,
            cycle_guard: Arc::new(Mutex::new(())),
            phase_tx,
        }
    }

    /// Current phase of the loop.
    pub fn phase(&self) -> CyclePhase {
        *self.phase_tx.borrow()
    }

    /// Subscribe to phase changes.
    pub fn phase_changes(&self) -> watch::Receiver<CyclePhase> {
        self.phase_tx.subscribe()
    }

    fn set_phase(&self, phase: CyclePhase) {
        self.phase_tx.send_replace(phase);
    }

    /// Run the scheduled loop until process shutdown.
    pub async fn run(self: Arc<Self>) {
        info!(
            interval_secs = self.scan_interval.as_secs(),
            "Monitoring loop started"
        );
        loop {
            {
                let _guard = self.cycle_guard.clone().lock_owned().await;
                self.run_cycle().await;
            }
            tokio::time::sleep(self.scan_interval).await;
        }
    }

    /// Start a manual cycle in the background.
    ///
    /// Single-flight: if any cycle (scheduled or manual) is in flight the
    /// trigger is rejected.
    pub fn trigger(self: Arc<Self>) -> TriggerOutcome {
        match self.cycle_guard.clone().try_lock_owned() {
            Ok(guard) => {
                tokio::spawn(async move {
                    let _guard = guard;
                    self.run_cycle().await;
                });
                TriggerOutcome::Started
            }
            Err(_) => TriggerOutcome::AlreadyRunning,
        }
    }

    /// Run exactly one cycle, waiting if one is already in flight.
    pub async fn run_once(&self) -> CycleReport {
        let _guard = self.cycle_guard.clone().lock_owned().await;
        self.run_cycle().await
    }

    async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();
        info!("Starting scan cycle");

        self.set_phase(CyclePhase::Discovering);
        let discovered = self.discovery.discover().await;
        for url in &discovered {
            match self.store.upsert_url(url).await {
                Ok(true) => report.discovered += 1,
                Ok(false) => {}
                Err(e) => warn!(url = %url, error = %e, "Failed to record discovered url"),
            }
        }

        let urls = match self.store.list_urls().await {
            Ok(urls) => urls,
            Err(e) => {
                error!(error = %e, "Could not list tracked urls; abandoning cycle");
                self.set_phase(CyclePhase::Idle);
                return report;
            }
        };
        report.known = urls.len();

        self.set_phase(CyclePhase::Fetching);
        let pages = self.fetcher.fetch_all(&urls).await;
        report.fetched = pages.values().filter(|o| o.is_fetched()).count();
        report.failed = pages.len() - report.fetched;

        self.set_phase(CyclePhase::Analyzing);
        let mut analyzed = Vec::new();
        for (url, outcome) in &pages {
            let Some(content) = outcome.content() else {
                continue;
            };
            // A classification failure skips this record only; the rest
            // of the cycle proceeds, same as a failed fetch.
            let analysis = match self.analyzer.classify(content).await {
                Ok(analysis) => analysis,
                Err(e) => {
                    warn!(url = %url, error = %e, "Classification failed; skipping record");
                    continue;
                }
            };
            let keywords = self.analyzer.extract_keywords(content);
            let entities = match self.analyzer.extract_entities(content).await {
                Ok(entities) => entities,
                Err(e) => {
                    warn!(url = %url, error = %e, "Entity extraction failed");
                    Vec::new()
                }
            };
            analyzed.push((url.clone(), content.to_string(), analysis, keywords, entities));
        }
        report.analyzed = analyzed.len();

        self.set_phase(CyclePhase::Persisting);
        let mut negatives: Vec<(String, Analysis)> = Vec::new();
        for (url, content, analysis, keywords, entities) in &analyzed {
            let sentiment = analysis.sentiment();
            if let Err(e) = self
                .store
                .update_result(url, content, analysis, sentiment, keywords, entities)
                .await
            {
                warn!(url = %url, error = %e, "Failed to persist analysis");
                continue;
            }
            if sentiment.is_negative() {
                negatives.push((url.clone(), analysis.clone()));
            }
        }

        self.set_phase(CyclePhase::Notifying);
        for (url, analysis) in &negatives {
            self.alerts.notify(url, analysis).await;
            report.alerted += 1;
        }

        self.set_phase(CyclePhase::Idle);
        info!(
            discovered = report.discovered,
            known = report.known,
            fetched = report.fetched,
            failed = report.failed,
            analyzed = report.analyzed,
            alerted = report.alerted,
            "Scan cycle finished"
        );
        report
    }
}
