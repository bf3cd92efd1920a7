//! One poll tick's worth of collected data

use crate::exposition::MetricRecord;
use crate::types::{Port, TestName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single collected data point for one test
///
/// Immutable once appended to a history: readers receive shared
/// references (via `Arc`) and nothing mutates a stored snapshot.
/// The serialized form is the export format consumed by the reporting
/// tooling: `timestamp` (ISO-8601), `test_name`, `port`, `metrics`,
/// `performance_stats`, `system_resources`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub test_name: TestName,
    pub port: Port,
    pub metrics: Vec<MetricRecord>,
    pub performance_stats: BTreeMap<String, f64>,
    pub system_resources: BTreeMap<String, f64>,
}

impl Snapshot {
    /// Look up the value of a metric by exact name
    ///
    /// Returns the first sample with that name, in document order.
    #[must_use]
    pub fn metric_value(&self, name: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|record| record.name == name)
            .map(|record| record.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposition::MetricRecord;

    fn snapshot() -> Snapshot {
        Snapshot {
            timestamp: Utc::now(),
            test_name: TestName::new("conn".to_string()).unwrap(),
            port: Port::new(9090).unwrap(),
            metrics: vec![
                MetricRecord::new("connect_succ", 10.0),
                MetricRecord::new("connect_succ", 99.0),
                MetricRecord::new("recv", 3.0),
            ],
            performance_stats: BTreeMap::new(),
            system_resources: BTreeMap::new(),
        }
    }

    #[test]
    fn test_metric_value_first_match() {
        let snapshot = snapshot();
        assert_eq!(snapshot.metric_value("connect_succ"), Some(10.0));
        assert_eq!(snapshot.metric_value("recv"), Some(3.0));
        assert_eq!(snapshot.metric_value("missing"), None);
    }

    #[test]
    fn test_snapshot_export_field_names() {
        let json = serde_json::to_value(snapshot()).unwrap();
        for field in [
            "timestamp",
            "test_name",
            "port",
            "metrics",
            "performance_stats",
            "system_resources",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(json["test_name"], "conn");
        assert_eq!(json["port"], 9090);
    }
}
