//! Continuous metrics collection for MQTT load-test runs
//!
//! Each running load test exposes a Prometheus-style text endpoint;
//! this crate polls those endpoints on a fixed interval, filters out
//! metrics that are meaningless for the test's category, keeps a
//! bounded rolling history of snapshots per test, derives performance
//! statistics (success rate, latency percentiles, throughput) and
//! exports histories as JSON for the reporting tooling.
//!
//! # Overview
//!
//! - [`exposition`] parses scrape responses into [`MetricRecord`]s
//! - [`filter`] strips test-irrelevant and noise metrics per test type
//! - [`collector`] runs one polling loop per test with a bounded
//!   snapshot history
//! - [`registry`] starts, stops and queries collectors
//! - [`stats`] derives success rates, percentiles and throughput
//!
//! ```no_run
//! use mqtt_bench_metrics::registry::CollectorRegistry;
//! use mqtt_bench_metrics::types::{Port, TestName};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let registry = CollectorRegistry::with_defaults()?;
//!
//! let name = TestName::new("connection soak".to_string())?;
//! registry.start(name.clone(), Port::new(9090).unwrap(), None);
//!
//! // ... the test runs, snapshots accumulate ...
//!
//! registry.stop(name.as_str()).await;
//! let report = registry.export_history(name.as_str())?;
//! println!("history written to {}", report.display());
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod constants;
pub mod exposition;
pub mod export;
pub mod filter;
pub mod logging;
pub mod registry;
pub mod resources;
pub mod scrape;
pub mod stats;
pub mod types;

pub use collector::{Snapshot, SnapshotHistory, TestSummary};
pub use config::CollectorConfig;
pub use exposition::{parse_document, MetricRecord, MetricType};
pub use filter::{FilterEngine, FilterOutcome, RemovalReason, TestType};
pub use registry::CollectorRegistry;
pub use scrape::{ScrapeClient, ScrapeError};
pub use stats::{LatencyPercentiles, PerformanceSummary};
pub use types::{HistoryCapacity, Port, TestName, ValidationError};
