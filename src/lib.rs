//! bplus-index - An in-memory B+ tree index over identifier-keyed records.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          bplus-index                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Ingestion (ingest/)                         │   │
//! │  │   load_records → join_on → filter_eq → collapse_symptoms │   │
//! │  │            load_into (DedupPolicy)                       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                     (identifier, record)                        │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Index (index/)                              │   │
//! │  │   BPlusTree: insert + split propagation, search,         │   │
//! │  │   depth, level_order, validate                           │   │
//! │  │   Node: Leaf { key, bucket } | Internal { sep, child }   │   │
//! │  │   SharedIndex (RwLock) + IndexStats                      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Configuration and the crate-wide [`Error`]
//! - [`index`] - The B+ tree and its statistics
//! - [`ingest`] - Record loading, joining and loading into the index
//!
//! # Quick Start
//! ```
//! use bplus_index::BPlusTree;
//!
//! let mut tree = BPlusTree::new(4)?;
//! tree.insert(902465, "first report");
//! tree.insert(902465, "follow-up");
//!
//! assert_eq!(tree.search(&902465), Some(&["first report", "follow-up"][..]));
//! assert_eq!(tree.search(&1), None);
//! # Ok::<(), bplus_index::Error>(())
//! ```

pub mod common;
pub mod index;
pub mod ingest;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_CAPACITY, MIN_CAPACITY};
pub use common::{Error, IndexConfig, Result};

pub use index::{BPlusTree, IndexStats, SharedIndex, StatsSnapshot};
pub use ingest::{DedupPolicy, LoadReport, Record};
