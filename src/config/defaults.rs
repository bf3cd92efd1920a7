//! Default values for configuration fields
//!
//! Centralizes the default value functions used in serde
//! deserialization.

use crate::constants;
use crate::types::HistoryCapacity;
use std::path::PathBuf;
use std::time::Duration;

/// Default host serving the metrics endpoints
#[inline]
pub fn host() -> String {
    constants::scrape::DEFAULT_HOST.to_string()
}

/// Default interval between polls
#[inline]
pub fn poll_interval() -> Duration {
    constants::scrape::DEFAULT_POLL_INTERVAL
}

/// Default timeout for a single fetch
#[inline]
pub fn fetch_timeout() -> Duration {
    constants::scrape::FETCH_TIMEOUT
}

/// Default bound on snapshots retained per test
#[inline]
pub fn history_capacity() -> HistoryCapacity {
    HistoryCapacity::try_new(constants::history::DEFAULT_CAPACITY).expect("1000 is non-zero")
}

/// Whether a stopped collector's history stays readable for export
#[inline]
pub fn retain_on_stop() -> bool {
    true
}

/// Default directory for exported snapshot files
#[inline]
pub fn export_dir() -> PathBuf {
    PathBuf::from("reports")
}
