//! Thread-shareable wrapper around a [`BPlusTree`].

use std::borrow::Borrow;

use parking_lot::RwLock;

use crate::common::Result;
use crate::index::btree::BPlusTree;
use crate::index::stats::StatsSnapshot;

/// A [`BPlusTree`] behind a reader-writer lock.
///
/// The tree itself has no internal synchronization. Hosts that share one
/// index across threads wrap it here: inserts take the write lock and are
/// fully serialized, searches run concurrently with each other but never
/// alongside an insert.
///
/// # Thread Safety
/// - `insert`: exclusive `RwLock::write`
/// - `search`, `depth`, `len`, `with_tree`: shared `RwLock::read`
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use bplus_index::index::{BPlusTree, SharedIndex};
///
/// let index = Arc::new(SharedIndex::new(BPlusTree::new(4).unwrap()));
/// index.insert(7, "seven");
/// assert_eq!(index.search(&7), Some(vec!["seven"]));
/// ```
pub struct SharedIndex<K, V> {
    tree: RwLock<BPlusTree<K, V>>,
}

impl<K, V> SharedIndex<K, V> {
    pub fn new(tree: BPlusTree<K, V>) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.read().is_empty()
    }

    /// See [`BPlusTree::depth`].
    pub fn depth(&self) -> Result<usize> {
        self.tree.read().depth()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.tree.read().stats().snapshot()
    }

    /// Run `f` with shared access to the tree.
    pub fn with_tree<R>(&self, f: impl FnOnce(&BPlusTree<K, V>) -> R) -> R {
        f(&self.tree.read())
    }

    pub fn into_inner(self) -> BPlusTree<K, V> {
        self.tree.into_inner()
    }
}

impl<K: Ord, V: Clone> SharedIndex<K, V> {
    /// Copy of the bucket stored under `key`.
    ///
    /// The read lock is released before returning, so the values are cloned.
    pub fn search<Q>(&self, key: &Q) -> Option<Vec<V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.read().search(key).map(<[V]>::to_vec)
    }
}

impl<K: Ord + Clone, V> SharedIndex<K, V> {
    pub fn insert(&self, key: K, value: V) {
        self.tree.write().insert(key, value);
    }
}

impl<K, V> From<BPlusTree<K, V>> for SharedIndex<K, V> {
    fn from(tree: BPlusTree<K, V>) -> Self {
        Self::new(tree)
    }
}
