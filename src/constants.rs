//! Constants used throughout the metrics collector
//!
//! This module centralizes default values and the metric-name tables
//! used by the filter engine, to improve maintainability and reduce
//! duplication.

use std::time::Duration;

/// Scrape and polling constants
pub mod scrape {
    use super::Duration;

    /// Default interval between polls of a test's metrics endpoint
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

    /// Timeout for a single fetch of the metrics endpoint
    ///
    /// A timed-out fetch is counted as a collection error; the polling
    /// loop keeps running.
    pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

    /// Default host serving the per-test metrics endpoints
    pub const DEFAULT_HOST: &str = "localhost";
}

/// Snapshot history constants
pub mod history {
    /// Maximum data points retained per test (oldest evicted first)
    pub const DEFAULT_CAPACITY: usize = 1000;
}

/// Registry lifecycle constants
pub mod registry {
    use super::Duration;

    /// How long `stop` waits for a collector task to finish its
    /// in-flight tick before giving up on a clean shutdown
    pub const STOP_TIMEOUT: Duration = Duration::from_secs(2);

    /// Emit a progress log line every this many collected snapshots
    pub const PROGRESS_LOG_EVERY: u64 = 10;
}

/// Metric-name tables driving the filter engine
///
/// The load-test binary exposes its own workload counters alongside a
/// large amount of runtime-internal noise; these tables separate the two.
pub mod filter {
    /// Key performance names that survive the zero-value rule even when
    /// their current value is 0 and they are not in a test type's keep
    /// list. Names containing `duration` or `latency` are treated the
    /// same way.
    pub const ALWAYS_INTERESTING: &[&str] =
        &["connect_succ", "connect_fail", "pub_succ", "pub_fail", "recv"];

    /// Name prefixes of runtime-internal metrics unrelated to the
    /// workload under test
    pub const SUBSYSTEM_PREFIXES: &[&str] = &[
        "erlang_vm_memory_",
        "erlang_vm_msacc_",
        "erlang_vm_statistics_",
        "erlang_vm_dirty_",
        "erlang_vm_ets_",
        "erlang_vm_logical_",
        "erlang_vm_port_",
        "erlang_vm_process_",
        "erlang_vm_schedulers",
        "erlang_vm_smp_",
        "erlang_vm_threads",
        "erlang_vm_time_",
        "erlang_vm_wordsize_",
        "erlang_vm_atom_",
        "erlang_vm_allocators",
        "erlang_vm_thread_pool_",
    ];

    /// Histogram component suffixes whose zero-valued samples carry no
    /// information
    pub const HISTOGRAM_SUFFIXES: &[&str] = &["_bucket", "_count", "_sum"];

    /// Help texts that merely repeat the metric name; such records add
    /// nothing to a report
    pub const REDUNDANT_HELP_TEXTS: &[&str] = &[
        "connection_idle",
        "recv",
        "connect_fail",
        "pub_fail",
        "pub_overrun",
        "connect_retried",
        "connect_succ",
        "sub_fail",
        "reconnect_succ",
        "sub",
        "publish_latency",
        "pub_succ",
        "connection_timeout",
        "connection_refused",
        "unreachable",
        "pub",
    ];
}

/// Metric-name tables driving per-snapshot category counts
pub mod stats {
    /// Connection establishment and churn counters (exact match)
    pub const CONNECTION_METRIC_NAMES: &[&str] =
        &["connect_succ", "connect_retried", "reconnect_succ", "connection_idle"];

    /// Publish-side counters (exact match)
    pub const PUBLISH_METRIC_NAMES: &[&str] = &["pub", "pub_succ", "pub_overrun", "publish_latency"];

    /// Subscribe-side counters (exact match)
    pub const SUBSCRIBE_METRIC_NAMES: &[&str] = &["sub", "recv"];

    /// Failure counters of any class (exact match)
    pub const ERROR_METRIC_NAMES: &[&str] = &[
        "connect_fail",
        "pub_fail",
        "sub_fail",
        "unreachable",
        "connection_refused",
        "connection_timeout",
    ];

    /// Upper bound for a latency sample to be considered plausible (ms);
    /// anything at or above this is a counter or a unit mix-up, not a
    /// latency observation
    pub const LATENCY_SAMPLE_MAX_MS: f64 = 10_000.0;
}
