//! Collector registry and lifecycle management
//!
//! Owns the set of active collectors, keyed by test name: at most one
//! running collector per test. Start/stop failures are reported as
//! boolean returns and log lines, never as panics or errors that could
//! take down unrelated collectors.

use crate::collector::{CollectorState, Snapshot, TestCollector, TestSummary};
use crate::config::CollectorConfig;
use crate::export;
use crate::filter::FilterEngine;
use crate::scrape::{ScrapeClient, ScrapeError};
use crate::types::{Port, TestName};
use anyhow::{Context, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Registry of per-test collectors
///
/// Queries (`history`, `summary`) are safe to call concurrently with
/// running collectors: they read point-in-time copies of each buffer.
/// Histories of stopped collectors stay readable for export until
/// [`purge`](CollectorRegistry::purge) is called, when the
/// configuration retains them.
#[derive(Debug)]
pub struct CollectorRegistry {
    active: DashMap<TestName, TestCollector>,
    retained: DashMap<TestName, Arc<CollectorState>>,
    client: ScrapeClient,
    engine: Arc<FilterEngine>,
    config: CollectorConfig,
}

impl CollectorRegistry {
    /// Create a registry from configuration
    pub fn new(config: CollectorConfig) -> Result<Self, ScrapeError> {
        let client = ScrapeClient::new(config.host.clone(), config.fetch_timeout)?;
        Ok(Self {
            active: DashMap::new(),
            retained: DashMap::new(),
            client,
            engine: Arc::new(FilterEngine::new()),
            config,
        })
    }

    /// Create a registry with default configuration
    pub fn with_defaults() -> Result<Self, ScrapeError> {
        Self::new(CollectorConfig::default())
    }

    /// Start collection for a test
    ///
    /// Returns `false` (and logs a warning) if a collector with this
    /// test name is already registered. `interval` defaults to the
    /// configured poll interval.
    pub fn start(&self, test_name: TestName, port: Port, interval: Option<Duration>) -> bool {
        let interval = interval.unwrap_or(self.config.poll_interval);

        match self.active.entry(test_name.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                warn!(test = %test_name, "metrics collection already running");
                false
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                // A restart under the same name supersedes any history
                // retained from a previous run
                self.retained.remove(&test_name);

                let collector = TestCollector::spawn(
                    test_name,
                    port,
                    interval,
                    self.config.history_capacity,
                    self.client.clone(),
                    Arc::clone(&self.engine),
                );
                entry.insert(collector);
                true
            }
        }
    }

    /// Stop collection for a test
    ///
    /// Returns `false` (and logs a warning) if no collector with this
    /// test name is registered. Waits a bounded time for the in-flight
    /// poll to finish; the collected history stays readable afterwards
    /// when retention is enabled.
    pub async fn stop(&self, test_name: &str) -> bool {
        let Some((name, collector)) = self.active.remove(test_name) else {
            warn!(test = test_name, "metrics collection not running");
            return false;
        };

        let state = collector.stop().await;
        if self.config.retain_on_stop {
            self.retained.insert(name, state);
        }
        true
    }

    /// Stop every registered collector
    ///
    /// Used on process-level interruption so no background work is
    /// orphaned and histories are available for a final export.
    pub async fn stop_all(&self) {
        let names: Vec<TestName> = self.active.iter().map(|e| e.key().clone()).collect();
        for name in names {
            self.stop(name.as_str()).await;
        }
        info!("stopped all metrics collection");
    }

    /// Whether a collector for this test is currently registered
    #[must_use]
    pub fn is_active(&self, test_name: &str) -> bool {
        self.active.contains_key(test_name)
    }

    /// Number of currently registered collectors
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Point-in-time copy of a test's snapshot history, oldest first
    ///
    /// Empty when the test is unknown. Includes histories retained from
    /// stopped collectors.
    #[must_use]
    pub fn history(&self, test_name: &str) -> Vec<Arc<Snapshot>> {
        if let Some(collector) = self.active.get(test_name) {
            return collector.state().history();
        }
        if let Some(state) = self.retained.get(test_name) {
            return state.history();
        }
        Vec::new()
    }

    /// Status and derived statistics for a test
    ///
    /// `None` when the test is unknown.
    #[must_use]
    pub fn summary(&self, test_name: &str) -> Option<TestSummary> {
        if let Some(collector) = self.active.get(test_name) {
            return Some(collector.state().summary());
        }
        self.retained.get(test_name).map(|state| state.summary())
    }

    /// Summaries for every known test, running or retained
    #[must_use]
    pub fn all_summaries(&self) -> HashMap<TestName, TestSummary> {
        let mut summaries = HashMap::new();
        for entry in self.active.iter() {
            summaries.insert(entry.key().clone(), entry.value().state().summary());
        }
        for entry in self.retained.iter() {
            summaries
                .entry(entry.key().clone())
                .or_insert_with(|| entry.value().summary());
        }
        summaries
    }

    /// Drop the retained history of a stopped test
    ///
    /// Returns `false` if nothing was retained under that name. Active
    /// collectors are not affected; stop them first.
    pub fn purge(&self, test_name: &str) -> bool {
        self.retained.remove(test_name).is_some()
    }

    /// Export a test's history as a JSON snapshot file
    ///
    /// Writes `continuous_metrics_<test>_<timestamp>.json` into the
    /// configured export directory and returns the path.
    pub fn export_history(&self, test_name: &str) -> Result<PathBuf> {
        let history = self.history(test_name);
        if history.is_empty() {
            anyhow::bail!("no collected data for test '{}'", test_name);
        }
        export::write_history(&self.config.export_dir, test_name, &history)
            .with_context(|| format!("failed to export history for test '{}'", test_name))
    }
}
