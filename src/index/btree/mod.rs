//! B+ tree index implementation.
//!
//! - [`Node`] - Leaf or internal node ([`LeafNode`], [`InternalNode`])
//! - [`BPlusTree`] - Insertion with split propagation, search, introspection
//! - [`LevelOrder`] - Lazy level-by-level key listing
//! - [`Leaves`] - Leaves left to right
//! - [`SharedIndex`] - Lock wrapper for hosts sharing one tree across threads

mod levels;
mod node;
mod shared;
mod tree;

pub use levels::{Leaves, LevelOrder};
pub use node::{InternalNode, LeafEntry, LeafNode, Node, NodeKind, Split};
pub use shared::SharedIndex;
pub use tree::BPlusTree;
