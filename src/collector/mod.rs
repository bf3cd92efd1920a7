//! Per-test background collection
//!
//! One [`TestCollector`] owns the polling loop for a single
//! (test name, endpoint port) pair: fetch, parse, filter, snapshot,
//! append, aggregate. The loop runs until it is asked to stop; fetch
//! and parse failures are counted, never fatal.

mod history;
mod snapshot;

pub use history::SnapshotHistory;
pub use snapshot::Snapshot;

use crate::filter::{FilterEngine, RemovalCounts, TestType};
use crate::resources::ResourceMonitor;
use crate::scrape::ScrapeClient;
use crate::types::{HistoryCapacity, Port, TestName};
use crate::{constants, exposition, stats};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Read-model of one collector's state, for summaries and dashboards
#[derive(Debug, Clone, Serialize)]
pub struct TestSummary {
    pub test_name: TestName,
    pub port: Port,
    pub is_running: bool,
    pub started_at: DateTime<Utc>,
    pub last_collected_at: Option<DateTime<Utc>>,
    pub total_collections: u64,
    pub collection_errors: u64,
    pub history_points: usize,
    pub metrics_removed: RemovalCounts,
    pub performance: stats::PerformanceSummary,
}

/// State shared between a collection loop and its readers
///
/// The history buffer has a single writer (the owning loop); readers
/// take a point-in-time copy under the read lock, so a tick appending
/// concurrently never corrupts a read.
#[derive(Debug)]
pub struct CollectorState {
    test_name: TestName,
    port: Port,
    test_type: Option<TestType>,
    started_at: DateTime<Utc>,
    running: AtomicBool,
    collected: AtomicU64,
    collection_errors: AtomicU64,
    history: RwLock<SnapshotHistory>,
    summary: RwLock<stats::PerformanceSummary>,
    removed: RwLock<RemovalCounts>,
    last_collected_at: RwLock<Option<DateTime<Utc>>>,
}

impl CollectorState {
    fn new(test_name: TestName, port: Port, capacity: HistoryCapacity) -> Self {
        let test_type = TestType::infer(test_name.as_str());
        Self {
            test_name,
            port,
            test_type,
            started_at: Utc::now(),
            running: AtomicBool::new(true),
            collected: AtomicU64::new(0),
            collection_errors: AtomicU64::new(0),
            history: RwLock::new(SnapshotHistory::new(capacity)),
            summary: RwLock::new(stats::PerformanceSummary::default()),
            removed: RwLock::new(RemovalCounts::default()),
            last_collected_at: RwLock::new(None),
        }
    }

    /// The test this collector is bound to
    #[must_use]
    pub fn test_name(&self) -> &TestName {
        &self.test_name
    }

    /// Inferred filtering category for this test
    #[must_use]
    pub fn test_type(&self) -> Option<TestType> {
        self.test_type
    }

    /// Whether the polling loop is still active
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// How many fetches have failed so far (never decreases)
    #[must_use]
    pub fn collection_errors(&self) -> u64 {
        self.collection_errors.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of the snapshot history, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<Arc<Snapshot>> {
        self.history.read().expect("history lock poisoned").to_vec()
    }

    /// The cached aggregate computed after the most recent append
    #[must_use]
    pub fn performance(&self) -> stats::PerformanceSummary {
        *self.summary.read().expect("summary lock poisoned")
    }

    /// Full status summary for this test
    #[must_use]
    pub fn summary(&self) -> TestSummary {
        TestSummary {
            test_name: self.test_name.clone(),
            port: self.port,
            is_running: self.is_running(),
            started_at: self.started_at,
            last_collected_at: *self
                .last_collected_at
                .read()
                .expect("timestamp lock poisoned"),
            total_collections: self.collected.load(Ordering::Relaxed),
            collection_errors: self.collection_errors(),
            history_points: self.history.read().expect("history lock poisoned").len(),
            metrics_removed: *self.removed.read().expect("removal lock poisoned"),
            performance: self.performance(),
        }
    }

    /// Recompute and cache the window aggregate
    fn recompute_summary(&self) {
        let window = self.history();
        let refs: Vec<&Snapshot> = window.iter().map(Arc::as_ref).collect();
        let summary = stats::summarize(self.test_type, &refs);
        *self.summary.write().expect("summary lock poisoned") = summary;
    }

    fn record_snapshot(&self, snapshot: Snapshot, removed: &RemovalCounts) -> u64 {
        let timestamp = snapshot.timestamp;
        self.history
            .write()
            .expect("history lock poisoned")
            .push(snapshot);
        self.removed
            .write()
            .expect("removal lock poisoned")
            .merge(removed);
        *self
            .last_collected_at
            .write()
            .expect("timestamp lock poisoned") = Some(timestamp);
        self.collected.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// A running (or stopped) collector: shared state plus the task driving
/// its polling loop
#[derive(Debug)]
pub struct TestCollector {
    state: Arc<CollectorState>,
    stop: Arc<Notify>,
    task: JoinHandle<()>,
}

impl TestCollector {
    /// Spawn the polling loop for one test
    ///
    /// The collector starts in the running state immediately; the first
    /// poll happens right away, subsequent polls every `poll_interval`.
    /// An overrunning tick delays the next one instead of stacking
    /// concurrent fetches.
    #[must_use]
    pub fn spawn(
        test_name: TestName,
        port: Port,
        poll_interval: std::time::Duration,
        capacity: HistoryCapacity,
        client: ScrapeClient,
        engine: Arc<FilterEngine>,
    ) -> Self {
        let state = Arc::new(CollectorState::new(test_name, port, capacity));
        let stop = Arc::new(Notify::new());

        let loop_state = Arc::clone(&state);
        let loop_stop = Arc::clone(&stop);
        let task = tokio::spawn(async move {
            collection_loop(loop_state, loop_stop, poll_interval, client, engine).await;
        });

        info!(
            test = %state.test_name,
            port = %state.port,
            interval_ms = poll_interval.as_millis(),
            "started metrics collection"
        );

        Self { state, stop, task }
    }

    /// Shared state handle for queries
    #[must_use]
    pub fn state(&self) -> Arc<CollectorState> {
        Arc::clone(&self.state)
    }

    /// Signal the loop to stop and wait (bounded) for it to finish
    ///
    /// The in-flight tick, if any, completes first; after the timeout
    /// the task is aborted rather than left orphaned.
    pub async fn stop(self) -> Arc<CollectorState> {
        self.state.running.store(false, Ordering::Release);
        self.stop.notify_one();

        let mut task = self.task;
        match tokio::time::timeout(constants::registry::STOP_TIMEOUT, &mut task).await {
            Ok(_) => {}
            Err(_) => {
                task.abort();
                warn!(
                    test = %self.state.test_name,
                    "collector did not stop within timeout, aborting task"
                );
            }
        }

        info!(test = %self.state.test_name, "stopped metrics collection");
        self.state
    }
}

/// The polling loop: one tick per interval until stopped
async fn collection_loop(
    state: Arc<CollectorState>,
    stop: Arc<Notify>,
    poll_interval: std::time::Duration,
    client: ScrapeClient,
    engine: Arc<FilterEngine>,
) {
    let mut monitor = ResourceMonitor::new();
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = stop.notified() => break,
            _ = interval.tick() => {
                if !state.running.load(Ordering::Acquire) {
                    break;
                }
                collect_once(&state, &client, &engine, &mut monitor).await;
            }
        }
    }

    // Final flush: leave the cached aggregate consistent with whatever
    // made it into the history before readers see the stopped state
    state.recompute_summary();
    state.running.store(false, Ordering::Release);
}

/// One tick: fetch, parse, filter, snapshot, append, aggregate
async fn collect_once(
    state: &CollectorState,
    client: &ScrapeClient,
    engine: &FilterEngine,
    monitor: &mut ResourceMonitor,
) {
    let body = match client.fetch(state.port).await {
        Ok(body) => body,
        Err(e) => {
            let errors = state.collection_errors.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                test = %state.test_name,
                port = %state.port,
                errors,
                error = %e,
                "metrics fetch failed"
            );
            return;
        }
    };

    let records = exposition::parse_document(&body);
    if records.is_empty() {
        debug!(test = %state.test_name, "scrape response contained no metrics");
        return;
    }

    let outcome = engine.apply(state.test_type, records);
    let snapshot = Snapshot {
        timestamp: Utc::now(),
        test_name: state.test_name.clone(),
        port: state.port,
        performance_stats: stats::categorize(&outcome.retained),
        system_resources: monitor.sample(),
        metrics: outcome.retained,
    };

    let collected = state.record_snapshot(snapshot, &outcome.removed);
    state.recompute_summary();

    if collected % constants::registry::PROGRESS_LOG_EVERY == 0 {
        info!(
            test = %state.test_name,
            points = collected,
            "collected data points"
        );
    }
}
