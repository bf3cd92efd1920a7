//! Host resource sampling for snapshot enrichment
//!
//! Every snapshot carries a `system_resources` map so a report can
//! correlate workload numbers with machine load at collection time.

use std::collections::BTreeMap;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Samples host CPU and memory usage
///
/// Owned by a single collection loop; `sample()` refreshes only the CPU
/// and memory readings it needs. The first CPU reading after creation
/// may be zero - sysinfo needs two refreshes to compute usage.
pub struct ResourceMonitor {
    system: System,
}

impl ResourceMonitor {
    /// Create a monitor refreshing only CPU and memory state
    #[must_use]
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );
        Self { system }
    }

    /// Refresh and return the current resource readings
    pub fn sample(&mut self) -> BTreeMap<String, f64> {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let total = self.system.total_memory();
        let used = self.system.used_memory();
        let memory_percent = if total > 0 {
            used as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let mut resources = BTreeMap::new();
        resources.insert(
            "cpu_usage_percent".to_string(),
            f64::from(self.system.global_cpu_usage()),
        );
        resources.insert("memory_usage_percent".to_string(), memory_percent);
        resources.insert("memory_used_gb".to_string(), used as f64 / BYTES_PER_GIB);
        resources.insert("memory_total_gb".to_string(), total as f64 / BYTES_PER_GIB);
        resources
    }
}

impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new()
    }
}
