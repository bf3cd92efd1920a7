//! Configuration type definitions

use crate::types::{duration_serde, HistoryCapacity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Collector configuration
///
/// All fields have serde defaults so a partial (or empty) TOML document
/// yields a working configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CollectorConfig {
    /// Host serving the per-test metrics endpoints
    pub host: String,
    /// Interval between polls of each endpoint (seconds)
    #[serde(with = "duration_serde")]
    pub poll_interval: Duration,
    /// Timeout for a single fetch (seconds)
    #[serde(with = "duration_serde")]
    pub fetch_timeout: Duration,
    /// Maximum snapshots retained per test
    pub history_capacity: HistoryCapacity,
    /// Keep a stopped collector's history readable for export
    pub retain_on_stop: bool,
    /// Directory for exported snapshot files
    pub export_dir: PathBuf,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            host: super::defaults::host(),
            poll_interval: super::defaults::poll_interval(),
            fetch_timeout: super::defaults::fetch_timeout(),
            history_capacity: super::defaults::history_capacity(),
            retain_on_stop: super::defaults::retain_on_stop(),
            export_dir: super::defaults::export_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CollectorConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.history_capacity.get(), 1000);
        assert!(config.retain_on_stop);
        assert_eq!(config.export_dir, PathBuf::from("reports"));
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        let config: CollectorConfig = toml::from_str("").unwrap();
        assert_eq!(config, CollectorConfig::default());
    }

    #[test]
    fn test_partial_document_overrides() {
        let config: CollectorConfig = toml::from_str(
            r#"
            host = "10.0.0.5"
            poll_interval = 2
            history_capacity = 200
            "#,
        )
        .unwrap();

        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.history_capacity.get(), 200);
        // Untouched fields keep their defaults
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_history_capacity_rejected() {
        let result: Result<CollectorConfig, _> = toml::from_str("history_capacity = 0");
        assert!(result.is_err());
    }
}
