//! Snapshot history export
//!
//! Writes one JSON document per test: an ordered array of snapshot
//! objects in the format consumed by the reporting tooling.

use crate::collector::Snapshot;
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Write a test's snapshot history into `dir`
///
/// The file is named `continuous_metrics_<test>_<YYYYmmdd_HHMMSS>.json`;
/// the test name is lowercased with whitespace replaced so the file name
/// stays shell-friendly. The directory is created if missing.
pub fn write_history(dir: &Path, test_name: &str, history: &[Arc<Snapshot>]) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let file_name = format!(
        "continuous_metrics_{}_{}.json",
        sanitize_test_name(test_name),
        timestamp
    );
    let path = dir.join(file_name);

    let snapshots: Vec<&Snapshot> = history.iter().map(Arc::as_ref).collect();
    let file = fs::File::create(&path)
        .with_context(|| format!("failed to create export file {}", path.display()))?;
    serde_json::to_writer_pretty(file, &snapshots)
        .with_context(|| format!("failed to serialize history to {}", path.display()))?;

    info!(
        test = test_name,
        points = history.len(),
        path = %path.display(),
        "exported snapshot history"
    );
    Ok(path)
}

fn sanitize_test_name(test_name: &str) -> String {
    test_name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposition::MetricRecord;
    use crate::types::{Port, TestName};
    use std::collections::BTreeMap;

    fn history() -> Vec<Arc<Snapshot>> {
        vec![Arc::new(Snapshot {
            timestamp: Utc::now(),
            test_name: TestName::new("Conn Soak".to_string()).unwrap(),
            port: Port::new(9090).unwrap(),
            metrics: vec![MetricRecord::new("connect_succ", 12.0)],
            performance_stats: BTreeMap::new(),
            system_resources: BTreeMap::new(),
        })]
    }

    #[test]
    fn test_sanitize_test_name() {
        assert_eq!(sanitize_test_name("Conn Soak Test"), "conn_soak_test");
        assert_eq!(sanitize_test_name("publish"), "publish");
    }

    #[test]
    fn test_write_history_creates_parseable_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_history(dir.path(), "Conn Soak", &history())?;

        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("continuous_metrics_conn_soak_"));
        assert!(name.ends_with(".json"));

        let content = fs::read_to_string(&path)?;
        let parsed: serde_json::Value = serde_json::from_str(&content)?;
        let points = parsed.as_array().expect("export must be a JSON array");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0]["test_name"], "Conn Soak");
        assert_eq!(points[0]["port"], 9090);
        assert_eq!(points[0]["metrics"][0]["name"], "connect_succ");

        Ok(())
    }

    #[test]
    fn test_write_history_creates_missing_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let nested = dir.path().join("reports").join("filtered");

        let path = write_history(&nested, "publish", &history())?;
        assert!(path.exists());

        Ok(())
    }
}
