//! Index statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::index::btree::NodeKind;

/// Statistics tracked by a [`BPlusTree`](crate::index::BPlusTree).
///
/// Fields are atomic so that `search(&self)` can count hits and misses
/// without needing `&mut self`. All updates use `Ordering::Relaxed`: each
/// counter only needs to be exact on its own.
///
/// # Example
/// ```
/// use bplus_index::index::BPlusTree;
///
/// let mut tree = BPlusTree::new(3).unwrap();
/// tree.insert(1, "a");
/// tree.insert(2, "b");
/// tree.insert(3, "c");
///
/// let snapshot = tree.stats().snapshot();
/// assert_eq!(snapshot.inserts, 3);
/// assert_eq!(snapshot.root_splits, 1);
/// ```
#[derive(Debug)]
pub struct IndexStats {
    /// Number of values inserted.
    pub inserts: AtomicU64,

    /// Number of leaf splits (including a leaf root).
    pub leaf_splits: AtomicU64,

    /// Number of internal node splits (including an internal root).
    pub internal_splits: AtomicU64,

    /// Number of times the root split and the tree grew one level.
    pub root_splits: AtomicU64,

    /// Number of searches that found the key.
    pub search_hits: AtomicU64,

    /// Number of searches that did not.
    pub search_misses: AtomicU64,
}

impl IndexStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self {
            inserts: AtomicU64::new(0),
            leaf_splits: AtomicU64::new(0),
            internal_splits: AtomicU64::new(0),
            root_splits: AtomicU64::new(0),
            search_hits: AtomicU64::new(0),
            search_misses: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_split(&self, kind: NodeKind) {
        let counter = match kind {
            NodeKind::Leaf => &self.leaf_splits,
            NodeKind::Internal => &self.internal_splits,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_search(&self, found: bool) {
        let counter = if found {
            &self.search_hits
        } else {
            &self.search_misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            leaf_splits: self.leaf_splits.load(Ordering::Relaxed),
            internal_splits: self.internal_splits.load(Ordering::Relaxed),
            root_splits: self.root_splits.load(Ordering::Relaxed),
            search_hits: self.search_hits.load(Ordering::Relaxed),
            search_misses: self.search_misses.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.inserts.store(0, Ordering::Relaxed);
        self.leaf_splits.store(0, Ordering::Relaxed);
        self.internal_splits.store(0, Ordering::Relaxed);
        self.root_splits.store(0, Ordering::Relaxed);
        self.search_hits.store(0, Ordering::Relaxed);
        self.search_misses.store(0, Ordering::Relaxed);
    }
}

impl Default for IndexStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time copy of [`IndexStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub inserts: u64,
    pub leaf_splits: u64,
    pub internal_splits: u64,
    pub root_splits: u64,
    pub search_hits: u64,
    pub search_misses: u64,
}

impl StatsSnapshot {
    /// Total splits of any kind.
    pub fn splits(&self) -> u64 {
        self.leaf_splits + self.internal_splits
    }

    /// Fraction of searches that found their key (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.search_hits + self.search_misses;
        if total == 0 {
            0.0
        } else {
            self.search_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ inserts: {}, splits: {} (leaf {}, internal {}, root {}), hits: {}, misses: {}, hit_rate: {:.2}% }}",
            self.inserts,
            self.splits(),
            self.leaf_splits,
            self.internal_splits,
            self.root_splits,
            self.search_hits,
            self.search_misses,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = IndexStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
        assert_eq!(stats.snapshot().hit_rate(), 0.0);
    }

    #[test]
    fn test_record_split_by_kind() {
        let stats = IndexStats::new();
        stats.record_split(NodeKind::Leaf);
        stats.record_split(NodeKind::Leaf);
        stats.record_split(NodeKind::Internal);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.leaf_splits, 2);
        assert_eq!(snapshot.internal_splits, 1);
        assert_eq!(snapshot.splits(), 3);
    }

    #[test]
    fn test_hit_rate() {
        let stats = IndexStats::new();
        for _ in 0..3 {
            stats.record_search(true);
        }
        stats.record_search(false);

        assert_eq!(stats.snapshot().hit_rate(), 0.75);
    }

    #[test]
    fn test_stats_reset() {
        let stats = IndexStats::new();
        stats.inserts.fetch_add(100, Ordering::Relaxed);
        stats.record_search(true);

        stats.reset();

        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_stats_display() {
        let stats = IndexStats::new();
        stats.inserts.fetch_add(10, Ordering::Relaxed);
        stats.record_split(NodeKind::Leaf);
        for _ in 0..4 {
            stats.record_search(true);
        }
        stats.record_search(false);

        let display = format!("{}", stats.snapshot());

        assert!(display.contains("inserts: 10"));
        assert!(display.contains("splits: 1"));
        assert!(display.contains("80.00%"));
    }
}
