//! Validated types used throughout the collector
//!
//! These newtypes enforce their invariants at construction time so the
//! rest of the crate never has to re-check them.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::num::{NonZeroU16, NonZeroUsize};
use thiserror::Error;

/// Validation errors for constrained types
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("test name cannot be empty or whitespace")]
    EmptyTestName,

    #[error("port cannot be 0")]
    InvalidPort,

    #[error("history capacity cannot be 0")]
    InvalidHistoryCapacity,

    #[error("unknown test type: {0}")]
    UnknownTestType(String),
}

/// A validated test name that cannot be empty or whitespace-only
///
/// One collector runs per test name, and the name doubles as the key
/// into the registry and the filter rule tables.
///
/// # Examples
/// ```
/// use mqtt_bench_metrics::types::TestName;
///
/// let name = TestName::new("connection soak".to_string()).unwrap();
/// assert_eq!(name.as_str(), "connection soak");
///
/// assert!(TestName::new("   ".to_string()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TestName(String);

impl TestName {
    /// Create a new `TestName` after validation
    pub fn new(name: String) -> Result<Self, ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyTestName);
        }
        Ok(Self(name))
    }

    /// Get the test name as a string slice
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TestName {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TestName {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TestName {
    type Error = ValidationError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl TryFrom<&str> for TestName {
    type Error = ValidationError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::new(name.to_string())
    }
}

impl<'de> Deserialize<'de> for TestName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

/// A non-zero TCP port for a scrape endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Port(NonZeroU16);

impl Port {
    /// Create a new `Port`, rejecting 0
    #[must_use]
    pub fn new(port: u16) -> Option<Self> {
        NonZeroU16::new(port).map(Self)
    }

    /// Get the port number
    #[must_use]
    #[inline]
    pub const fn get(self) -> u16 {
        self.0.get()
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Port {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let port = u16::deserialize(deserializer)?;
        Self::new(port).ok_or_else(|| serde::de::Error::custom(ValidationError::InvalidPort))
    }
}

/// Maximum number of snapshots retained per test (non-zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HistoryCapacity(NonZeroUsize);

impl HistoryCapacity {
    /// Create a new capacity, rejecting 0
    #[must_use]
    pub fn try_new(capacity: usize) -> Option<Self> {
        NonZeroUsize::new(capacity).map(Self)
    }

    /// Get the capacity
    #[must_use]
    #[inline]
    pub const fn get(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for HistoryCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for HistoryCapacity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let capacity = usize::deserialize(deserializer)?;
        Self::try_new(capacity)
            .ok_or_else(|| serde::de::Error::custom(ValidationError::InvalidHistoryCapacity))
    }
}

/// Helper for deserializing Duration from seconds
///
/// TOML/JSON configs specify intervals and timeouts in seconds, so we
/// need custom serde to convert from u64 seconds to Duration
pub mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
