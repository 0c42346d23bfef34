//! Index structures.
//!
//! - [`btree`] - In-memory B+ tree
//! - [`IndexStats`] - Insert, split and search counters

pub mod btree;
mod stats;

pub use btree::{BPlusTree, Leaves, LevelOrder, Node, SharedIndex};
pub use stats::{IndexStats, StatsSnapshot};
