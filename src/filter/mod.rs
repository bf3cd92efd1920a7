//! Test-specific metric filtering
//!
//! Reduces a parsed metric batch to the subset that is meaningful for a
//! given test category. Filtering is deterministic, order-preserving and
//! idempotent: a batch that already passed the filter passes again
//! unchanged.

mod rules;

pub use rules::{FilterRules, RuleSet, TestType};

use crate::constants::filter as tables;
use crate::exposition::MetricRecord;
use serde::Serialize;
use tracing::debug;

/// Why a record was removed from a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalReason {
    /// Name is in the test type's invalid list
    TestSpecificInvalid,
    /// Name belongs to a runtime-internal subsystem
    SubsystemInternal,
    /// Histogram bucket/count/sum sample with value 0
    ZeroHistogramBucket,
    /// Help text is known boilerplate
    RedundantHelpText,
    /// Zero value on a non-critical metric
    ZeroValueNonCritical,
}

impl RemovalReason {
    /// Human-readable reason, as written into logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TestSpecificInvalid => "test-specific invalid",
            Self::SubsystemInternal => "subsystem-internal metric",
            Self::ZeroHistogramBucket => "zero-value histogram bucket",
            Self::RedundantHelpText => "redundant help text",
            Self::ZeroValueNonCritical => "zero value, non-critical",
        }
    }
}

impl std::fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-reason removal counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovalCounts {
    pub test_specific_invalid: u64,
    pub subsystem_internal: u64,
    pub zero_histogram_bucket: u64,
    pub redundant_help_text: u64,
    pub zero_value_non_critical: u64,
}

impl RemovalCounts {
    fn record(&mut self, reason: RemovalReason) {
        match reason {
            RemovalReason::TestSpecificInvalid => self.test_specific_invalid += 1,
            RemovalReason::SubsystemInternal => self.subsystem_internal += 1,
            RemovalReason::ZeroHistogramBucket => self.zero_histogram_bucket += 1,
            RemovalReason::RedundantHelpText => self.redundant_help_text += 1,
            RemovalReason::ZeroValueNonCritical => self.zero_value_non_critical += 1,
        }
    }

    /// Accumulate another set of counts into this one
    pub fn merge(&mut self, other: &RemovalCounts) {
        self.test_specific_invalid += other.test_specific_invalid;
        self.subsystem_internal += other.subsystem_internal;
        self.zero_histogram_bucket += other.zero_histogram_bucket;
        self.redundant_help_text += other.redundant_help_text;
        self.zero_value_non_critical += other.zero_value_non_critical;
    }

    /// Total records removed across all reasons
    #[must_use]
    pub fn total(&self) -> u64 {
        self.test_specific_invalid
            + self.subsystem_internal
            + self.zero_histogram_bucket
            + self.redundant_help_text
            + self.zero_value_non_critical
    }
}

/// Result of filtering one batch
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Retained records, in original order
    pub retained: Vec<MetricRecord>,
    /// How many records each rule removed
    pub removed: RemovalCounts,
}

/// The filter engine: rule tables plus the generic exclusion logic
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    rules: RuleSet,
}

impl FilterEngine {
    /// Create an engine with the built-in rule tables
    #[must_use]
    pub fn new() -> Self {
        Self { rules: RuleSet::new() }
    }

    /// Filter a batch of records for one test category
    ///
    /// Decision order per record, first match wins:
    /// 1. name in the test type's invalid list;
    /// 2. name starts with a runtime-internal subsystem prefix;
    /// 3. histogram bucket/count/sum suffix with value exactly 0;
    /// 4. help text is known boilerplate;
    /// 5. value exactly 0 and the name is neither kept nor a key
    ///    performance name.
    ///
    /// A name in the keep list survives rules 2-5 regardless of value.
    #[must_use]
    pub fn apply(&self, test_type: Option<TestType>, records: Vec<MetricRecord>) -> FilterOutcome {
        let rules = self.rules.rules_for(test_type);

        let mut outcome = FilterOutcome {
            retained: Vec::with_capacity(records.len()),
            removed: RemovalCounts::default(),
        };

        for record in records {
            match classify(rules, &record) {
                Some(reason) => {
                    debug!(
                        metric = %record.name,
                        value = record.value,
                        reason = %reason,
                        "removed metric"
                    );
                    outcome.removed.record(reason);
                }
                None => outcome.retained.push(record),
            }
        }

        outcome
    }
}

/// Decide whether one record is dropped, and why
fn classify(rules: &FilterRules, record: &MetricRecord) -> Option<RemovalReason> {
    let name = record.name.as_str();

    if rules.invalid_metrics.contains(name) {
        return Some(RemovalReason::TestSpecificInvalid);
    }

    // Explicit allow beats every pattern-based rule below
    if rules.keep_metrics.contains(name) {
        return None;
    }

    if tables::SUBSYSTEM_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
    {
        return Some(RemovalReason::SubsystemInternal);
    }

    if record.value == 0.0
        && tables::HISTOGRAM_SUFFIXES
            .iter()
            .any(|suffix| name.ends_with(suffix))
    {
        return Some(RemovalReason::ZeroHistogramBucket);
    }

    if !record.help_text.is_empty()
        && tables::REDUNDANT_HELP_TEXTS.contains(&record.help_text.as_str())
    {
        return Some(RemovalReason::RedundantHelpText);
    }

    if record.value == 0.0 && !is_always_interesting(name) {
        return Some(RemovalReason::ZeroValueNonCritical);
    }

    None
}

/// Key performance names survive zero-value filtering unconditionally
fn is_always_interesting(name: &str) -> bool {
    tables::ALWAYS_INTERESTING.contains(&name)
        || name.contains("duration")
        || name.contains("latency")
}
