//! Bounded snapshot history with FIFO eviction

use super::Snapshot;
use crate::types::HistoryCapacity;
use std::collections::VecDeque;
use std::sync::Arc;

/// A bounded ring of snapshots for one test
///
/// Appending beyond capacity evicts the oldest entry, so the buffer
/// always holds the most recent `capacity` ticks in chronological
/// order. Entries are `Arc`-shared so point-in-time reads are cheap and
/// never observe a partially appended buffer.
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    entries: VecDeque<Arc<Snapshot>>,
    capacity: HistoryCapacity,
}

impl SnapshotHistory {
    /// Create an empty history bounded to `capacity` entries
    #[must_use]
    pub fn new(capacity: HistoryCapacity) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Append a snapshot, evicting the oldest entry when full
    pub fn push(&mut self, snapshot: Snapshot) {
        if self.entries.len() == self.capacity.get() {
            self.entries.pop_front();
        }
        self.entries.push_back(Arc::new(snapshot));
    }

    /// Number of retained snapshots
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history holds no snapshots yet
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity bound
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Point-in-time copy of the buffer, oldest first
    #[must_use]
    pub fn to_vec(&self) -> Vec<Arc<Snapshot>> {
        self.entries.iter().cloned().collect()
    }

    /// The most recent snapshot, if any
    #[must_use]
    pub fn latest(&self) -> Option<&Arc<Snapshot>> {
        self.entries.back()
    }
}
