//! Per-test-type filter rule tables
//!
//! Each test category declares which workload counters are meaningless
//! for it (`invalid_metrics`) and which must always survive value-based
//! filtering (`keep_metrics`).

use crate::types::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Category of a load test, used to select filtering rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestType {
    /// Connection-establishment tests
    Connection,
    /// Publish throughput/latency tests
    Publish,
    /// Subscribe/receive tests
    Subscribe,
    /// Fan-out broadcast tests
    Broadcast,
}

impl TestType {
    /// Get the canonical lowercase tag for this test type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Publish => "publish",
            Self::Subscribe => "subscribe",
            Self::Broadcast => "broadcast",
        }
    }

    /// Classify a free-form test name onto a rule table
    ///
    /// Broadcast is checked before the others so a "broadcast publish"
    /// run is not shadowed by the publish match; connection before
    /// publish so "conn" prefixes win. Returns `None` for names that
    /// match no category; such tests get only the generic exclusion
    /// rules.
    #[must_use]
    pub fn infer(test_name: &str) -> Option<Self> {
        let lowered = test_name.to_lowercase();
        if lowered.contains("broadcast") {
            Some(Self::Broadcast)
        } else if lowered.contains("conn") {
            Some(Self::Connection)
        } else if lowered.contains("pub") {
            Some(Self::Publish)
        } else if lowered.contains("sub") || lowered.contains("recv") {
            Some(Self::Subscribe)
        } else {
            None
        }
    }

    /// Names of the success/failure counter pair used for rate
    /// aggregation on this kind of test
    #[must_use]
    pub const fn rate_counters(self) -> (&'static str, &'static str) {
        match self {
            Self::Connection => ("connect_succ", "connect_fail"),
            Self::Publish | Self::Broadcast => ("pub_succ", "pub_fail"),
            Self::Subscribe => ("sub", "sub_fail"),
        }
    }
}

impl FromStr for TestType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connection" => Ok(Self::Connection),
            "publish" => Ok(Self::Publish),
            "subscribe" => Ok(Self::Subscribe),
            "broadcast" => Ok(Self::Broadcast),
            other => Err(ValidationError::UnknownTestType(other.to_string())),
        }
    }
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allow/deny lists for one test type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRules {
    /// Metric names that carry no meaning for this kind of test
    pub invalid_metrics: HashSet<&'static str>,
    /// Metric names that must never be dropped by value-based rules
    pub keep_metrics: HashSet<&'static str>,
}

impl FilterRules {
    fn new(invalid: &[&'static str], keep: &[&'static str]) -> Self {
        Self {
            invalid_metrics: invalid.iter().copied().collect(),
            keep_metrics: keep.iter().copied().collect(),
        }
    }
}

/// The full mapping from test type to its filter rules
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: HashMap<TestType, FilterRules>,
    empty: FilterRules,
}

impl RuleSet {
    /// Build the built-in rule tables
    ///
    /// Connection tests drop publish/subscribe counters, publish tests
    /// drop subscribe counters, and so on; each type keeps its own
    /// workload counters plus the shared connection-health names.
    #[must_use]
    pub fn new() -> Self {
        let mut rules = HashMap::new();

        rules.insert(
            TestType::Connection,
            FilterRules::new(
                &[
                    "pub_fail",
                    "pub_overrun",
                    "pub_succ",
                    "pub",
                    "sub_fail",
                    "sub",
                    "reconnect_succ",
                    "publish_latency",
                ],
                &[
                    "connect_succ",
                    "connect_fail",
                    "connect_retried",
                    "connection_timeout",
                    "connection_refused",
                    "unreachable",
                    "connection_idle",
                    "recv",
                ],
            ),
        );

        rules.insert(
            TestType::Publish,
            FilterRules::new(
                &["sub_fail", "sub", "reconnect_succ", "connect_retried"],
                &[
                    "pub_succ",
                    "pub_fail",
                    "pub_overrun",
                    "pub",
                    "publish_latency",
                    "connect_succ",
                    "connect_fail",
                    "connection_timeout",
                    "connection_refused",
                    "unreachable",
                    "connection_idle",
                    "recv",
                ],
            ),
        );

        rules.insert(
            TestType::Subscribe,
            FilterRules::new(
                &["pub_fail", "pub_overrun", "pub_succ", "pub", "publish_latency"],
                &[
                    "sub_fail",
                    "sub",
                    "reconnect_succ",
                    "connect_succ",
                    "connect_fail",
                    "connect_retried",
                    "connection_timeout",
                    "connection_refused",
                    "unreachable",
                    "connection_idle",
                    "recv",
                ],
            ),
        );

        rules.insert(
            TestType::Broadcast,
            FilterRules::new(
                &["connect_retried"],
                &[
                    "pub_succ",
                    "pub_fail",
                    "pub_overrun",
                    "pub",
                    "publish_latency",
                    "sub_fail",
                    "sub",
                    "reconnect_succ",
                    "connect_succ",
                    "connect_fail",
                    "connection_timeout",
                    "connection_refused",
                    "unreachable",
                    "connection_idle",
                    "recv",
                ],
            ),
        );

        Self {
            rules,
            empty: FilterRules::default(),
        }
    }

    /// Get the rules for a test type; tests matching no category get
    /// empty tables (only the generic exclusion rules apply)
    #[must_use]
    pub fn rules_for(&self, test_type: Option<TestType>) -> &FilterRules {
        test_type
            .and_then(|t| self.rules.get(&t))
            .unwrap_or(&self.empty)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_categories() {
        assert_eq!(TestType::infer("conn"), Some(TestType::Connection));
        assert_eq!(TestType::infer("connection soak"), Some(TestType::Connection));
        assert_eq!(TestType::infer("publish burst"), Some(TestType::Publish));
        assert_eq!(TestType::infer("sub fanin"), Some(TestType::Subscribe));
        assert_eq!(TestType::infer("broadcast storm"), Some(TestType::Broadcast));
        assert_eq!(TestType::infer("smoke"), None);
    }

    #[test]
    fn test_infer_broadcast_not_shadowed_by_publish() {
        // "broadcast pub" must classify as broadcast even though it
        // also contains "pub"
        assert_eq!(TestType::infer("broadcast pub"), Some(TestType::Broadcast));
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert_eq!("publish".parse::<TestType>().unwrap(), TestType::Publish);
        assert!("banana".parse::<TestType>().is_err());
    }

    #[test]
    fn test_invalid_and_keep_tables_are_disjoint() {
        let rules = RuleSet::new();
        for test_type in [
            TestType::Connection,
            TestType::Publish,
            TestType::Subscribe,
            TestType::Broadcast,
        ] {
            let table = rules.rules_for(Some(test_type));
            for name in &table.invalid_metrics {
                assert!(
                    !table.keep_metrics.contains(name),
                    "{name} is both invalid and kept for {test_type}"
                );
            }
        }
    }

    #[test]
    fn test_unclassified_test_gets_empty_tables() {
        let rules = RuleSet::new();
        let table = rules.rules_for(None);
        assert!(table.invalid_metrics.is_empty());
        assert!(table.keep_metrics.is_empty());
    }
}
