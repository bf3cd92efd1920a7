//! Derived statistics over snapshot windows
//!
//! All functions here are pure over their inputs; the collector caches
//! the latest [`PerformanceSummary`] so repeated reads are cheap.

use crate::collector::Snapshot;
use crate::constants::stats as tables;
use crate::exposition::MetricRecord;
use crate::filter::TestType;
use serde::Serialize;
use std::collections::BTreeMap;

/// Nearest-rank latency percentiles over a sample window (milliseconds)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencyPercentiles {
    pub p50: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

impl LatencyPercentiles {
    /// Compute all four percentiles from an unsorted sample set
    ///
    /// With zero samples every percentile reports 0.
    #[must_use]
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            p50: nearest_rank(&sorted, 50),
            p90: nearest_rank(&sorted, 90),
            p95: nearest_rank(&sorted, 95),
            p99: nearest_rank(&sorted, 99),
        }
    }
}

/// Nearest-rank selection on an already-sorted sample set
///
/// The rank is `len * percentile / 100`, truncated, clamped to the last
/// index; no interpolation.
#[must_use]
pub fn nearest_rank(sorted: &[f64], percentile: u8) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = sorted.len() * usize::from(percentile) / 100;
    sorted[rank.min(sorted.len() - 1)]
}

/// Success rate in percent; 0 when no attempts were recorded
#[must_use]
pub fn success_rate(successes: f64, failures: f64) -> f64 {
    let attempts = successes + failures;
    if attempts > 0.0 {
        successes / attempts * 100.0
    } else {
        0.0
    }
}

/// Error rate in percent; 0 when no attempts were recorded
#[must_use]
pub fn error_rate(successes: f64, failures: f64) -> f64 {
    let attempts = successes + failures;
    if attempts > 0.0 {
        failures / attempts * 100.0
    } else {
        0.0
    }
}

/// Rate of change of a monotonically increasing counter between the two
/// most recent snapshots, per second
///
/// Returns 0 with fewer than two snapshots, zero elapsed time, or a
/// counter missing from either snapshot.
#[must_use]
pub fn counter_delta_rate(window: &[&Snapshot], counter: &str) -> f64 {
    let [.., previous, latest] = window else {
        return 0.0;
    };

    let (Some(before), Some(after)) = (previous.metric_value(counter), latest.metric_value(counter))
    else {
        return 0.0;
    };

    let elapsed = (latest.timestamp - previous.timestamp)
        .to_std()
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    if elapsed > 0.0 {
        (after - before) / elapsed
    } else {
        0.0
    }
}

/// Collect latency-class samples (names containing `duration` or
/// `latency`) across a snapshot window, restricted to the plausible
/// 0..10s range
#[must_use]
pub fn latency_samples(window: &[&Snapshot]) -> Vec<f64> {
    window
        .iter()
        .flat_map(|snapshot| snapshot.metrics.iter())
        .filter(|record| {
            record.name.contains("duration") || record.name.contains("latency")
        })
        .map(|record| record.value)
        .filter(|value| *value > 0.0 && *value < tables::LATENCY_SAMPLE_MAX_MS)
        .collect()
}

/// Aggregate statistics derived from one test's snapshot window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PerformanceSummary {
    /// Successes / attempts, percent
    pub success_rate: f64,
    /// Failures / attempts, percent
    pub error_rate: f64,
    /// Success-counter delta per second between the last two snapshots
    pub throughput: f64,
    /// Latency distribution over the window
    pub latency: LatencyPercentiles,
    /// Success counter value in the latest snapshot
    pub successes: f64,
    /// Failure counter value in the latest snapshot
    pub failures: f64,
    /// Number of latency samples backing the percentiles
    pub latency_sample_count: usize,
}

/// Compute the full summary for a snapshot window
///
/// Success/failure counters are chosen by test category (connection or
/// publish class); tests matching no category use the connection pair.
#[must_use]
pub fn summarize(test_type: Option<TestType>, window: &[&Snapshot]) -> PerformanceSummary {
    let (success_counter, failure_counter) = test_type
        .unwrap_or(TestType::Connection)
        .rate_counters();

    let latest = match window.last() {
        Some(snapshot) => snapshot,
        None => return PerformanceSummary::default(),
    };

    let successes = latest.metric_value(success_counter).unwrap_or(0.0);
    let failures = latest.metric_value(failure_counter).unwrap_or(0.0);

    let samples = latency_samples(window);

    PerformanceSummary {
        success_rate: success_rate(successes, failures),
        error_rate: error_rate(successes, failures),
        throughput: counter_delta_rate(window, success_counter),
        latency: LatencyPercentiles::from_samples(&samples),
        successes,
        failures,
        latency_sample_count: samples.len(),
    }
}

/// Count metrics per workload category for one batch
///
/// These counts become the snapshot's `performance_stats` map.
#[must_use]
pub fn categorize(metrics: &[MetricRecord]) -> BTreeMap<String, f64> {
    let mut connection = 0u64;
    let mut publish = 0u64;
    let mut subscribe = 0u64;
    let mut errors = 0u64;
    let mut latency = 0u64;
    let mut system = 0u64;

    for record in metrics {
        let name = record.name.to_lowercase();
        if tables::CONNECTION_METRIC_NAMES.contains(&name.as_str()) {
            connection += 1;
        } else if tables::PUBLISH_METRIC_NAMES.contains(&name.as_str()) {
            publish += 1;
        } else if tables::SUBSCRIBE_METRIC_NAMES.contains(&name.as_str()) {
            subscribe += 1;
        } else if tables::ERROR_METRIC_NAMES.contains(&name.as_str()) {
            errors += 1;
        } else if name.contains("duration") || name.contains("latency") {
            latency += 1;
        } else if name.starts_with("erlang_vm_") || name.starts_with("system_") {
            system += 1;
        }
    }

    let mut counts = BTreeMap::new();
    counts.insert("total_metrics".to_string(), metrics.len() as f64);
    counts.insert("connection_metrics".to_string(), connection as f64);
    counts.insert("publish_metrics".to_string(), publish as f64);
    counts.insert("subscribe_metrics".to_string(), subscribe as f64);
    counts.insert("error_metrics".to_string(), errors as f64);
    counts.insert("latency_metrics".to_string(), latency as f64);
    counts.insert("system_metrics".to_string(), system as f64);
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Port, TestName};
    use chrono::{Duration as ChronoDuration, Utc};

    fn snapshot_with(metrics: Vec<MetricRecord>, seconds_offset: i64) -> Snapshot {
        Snapshot {
            timestamp: Utc::now() + ChronoDuration::seconds(seconds_offset),
            test_name: TestName::new("conn".to_string()).unwrap(),
            port: Port::new(9090).unwrap(),
            metrics,
            performance_stats: BTreeMap::new(),
            system_resources: BTreeMap::new(),
        }
    }

    #[test]
    fn test_nearest_rank_reference_values() {
        let sorted = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(nearest_rank(&sorted, 50), 30.0);
        assert_eq!(nearest_rank(&sorted, 90), 50.0);
        assert_eq!(nearest_rank(&sorted, 95), 50.0);
        assert_eq!(nearest_rank(&sorted, 99), 50.0);
    }

    #[test]
    fn test_percentiles_empty_samples_report_zero() {
        let percentiles = LatencyPercentiles::from_samples(&[]);
        assert_eq!(percentiles, LatencyPercentiles::default());
    }

    #[test]
    fn test_percentiles_single_sample() {
        let percentiles = LatencyPercentiles::from_samples(&[42.0]);
        assert_eq!(percentiles.p50, 42.0);
        assert_eq!(percentiles.p99, 42.0);
    }

    #[test]
    fn test_percentiles_sort_unsorted_input() {
        let percentiles = LatencyPercentiles::from_samples(&[50.0, 10.0, 40.0, 20.0, 30.0]);
        assert_eq!(percentiles.p50, 30.0);
        assert_eq!(percentiles.p90, 50.0);
    }

    #[test]
    fn test_success_rate_zero_attempts() {
        assert_eq!(success_rate(0.0, 0.0), 0.0);
        assert_eq!(error_rate(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_success_and_error_rates() {
        assert_eq!(success_rate(95.0, 5.0), 95.0);
        assert_eq!(error_rate(95.0, 5.0), 5.0);
    }

    #[test]
    fn test_counter_delta_rate_ten_per_second() {
        let older = snapshot_with(vec![MetricRecord::new("connect_succ", 40.0)], 0);
        let newer = snapshot_with(vec![MetricRecord::new("connect_succ", 50.0)], 1);
        let window = [&older, &newer];

        let rate = counter_delta_rate(&window, "connect_succ");
        assert!((rate - 10.0).abs() < 0.5, "rate was {rate}");
    }

    #[test]
    fn test_counter_delta_rate_needs_two_snapshots() {
        let only = snapshot_with(vec![MetricRecord::new("connect_succ", 40.0)], 0);
        assert_eq!(counter_delta_rate(&[&only], "connect_succ"), 0.0);
        assert_eq!(counter_delta_rate(&[], "connect_succ"), 0.0);
    }

    #[test]
    fn test_counter_delta_rate_zero_elapsed() {
        let first = snapshot_with(vec![MetricRecord::new("connect_succ", 40.0)], 0);
        let mut second = snapshot_with(vec![MetricRecord::new("connect_succ", 50.0)], 0);
        second.timestamp = first.timestamp;
        assert_eq!(counter_delta_rate(&[&first, &second], "connect_succ"), 0.0);
    }

    #[test]
    fn test_latency_samples_filter_range_and_names() {
        let snapshot = snapshot_with(
            vec![
                MetricRecord::new("publish_latency", 12.5),
                MetricRecord::new("mqtt_client_connect_duration", 80.0),
                MetricRecord::new("publish_latency", 0.0),
                MetricRecord::new("publish_latency", 50_000.0),
                MetricRecord::new("pub_succ", 7.0),
            ],
            0,
        );

        let samples = latency_samples(&[&snapshot]);
        assert_eq!(samples, vec![12.5, 80.0]);
    }

    #[test]
    fn test_summarize_connection_window() {
        let older = snapshot_with(
            vec![
                MetricRecord::new("connect_succ", 90.0),
                MetricRecord::new("connect_fail", 5.0),
                MetricRecord::new("mqtt_client_connect_duration", 30.0),
            ],
            0,
        );
        let newer = snapshot_with(
            vec![
                MetricRecord::new("connect_succ", 95.0),
                MetricRecord::new("connect_fail", 5.0),
                MetricRecord::new("mqtt_client_connect_duration", 40.0),
            ],
            1,
        );

        let summary = summarize(Some(TestType::Connection), &[&older, &newer]);

        assert_eq!(summary.successes, 95.0);
        assert_eq!(summary.failures, 5.0);
        assert_eq!(summary.success_rate, 95.0);
        assert_eq!(summary.error_rate, 5.0);
        assert!(summary.throughput > 0.0);
        assert_eq!(summary.latency_sample_count, 2);
    }

    #[test]
    fn test_summarize_empty_window() {
        assert_eq!(summarize(Some(TestType::Publish), &[]), PerformanceSummary::default());
    }

    #[test]
    fn test_categorize_counts() {
        let metrics = vec![
            MetricRecord::new("connect_succ", 1.0),
            MetricRecord::new("pub_succ", 2.0),
            MetricRecord::new("recv", 3.0),
            MetricRecord::new("connect_fail", 1.0),
            MetricRecord::new("e2e_latency", 10.0),
            MetricRecord::new("erlang_vm_threads", 8.0),
            MetricRecord::new("something_else", 9.0),
        ];

        let counts = categorize(&metrics);
        assert_eq!(counts["total_metrics"], 7.0);
        assert_eq!(counts["connection_metrics"], 1.0);
        assert_eq!(counts["publish_metrics"], 1.0);
        assert_eq!(counts["subscribe_metrics"], 1.0);
        assert_eq!(counts["error_metrics"], 1.0);
        assert_eq!(counts["latency_metrics"], 1.0);
        assert_eq!(counts["system_metrics"], 1.0);
    }
}
