//! The B+ tree index.

use std::borrow::Borrow;
use std::fmt;
use std::io::Write;
use std::mem;
use std::sync::atomic::Ordering;

use tracing::{debug, info, trace, warn};

use crate::common::{Error, IndexConfig, Result};
use crate::index::btree::{InternalNode, Leaves, LevelOrder, Node, Split};
use crate::index::stats::IndexStats;

/// An in-memory B+ tree mapping each key to the bucket of values inserted under it.
///
/// All values live in the leaves. Internal nodes only route: a key `k`
/// descends into the first child whose separator is greater than `k`.
///
/// # Balance
/// Every node is split as soon as it holds `capacity` keys, and splits
/// propagate upward until some ancestor has room. The tree only grows when the
/// root itself splits, so every leaf is always at the same depth.
///
/// # Example
/// ```
/// use bplus_index::index::BPlusTree;
///
/// let mut tree = BPlusTree::new(4).unwrap();
/// for key in [10, 20, 30, 40] {
///     tree.insert(key, key * 100);
/// }
///
/// assert_eq!(tree.depth().unwrap(), 1);
/// assert_eq!(tree.root_keys(), vec![&30]);
/// assert_eq!(tree.search(&20), Some(&[2000][..]));
/// assert_eq!(tree.search(&25), None);
/// ```
pub struct BPlusTree<K, V> {
    root: Node<K, V>,

    /// Maximum keys per node (immutable after construction).
    capacity: usize,

    /// Number of distinct keys.
    len: usize,

    stats: IndexStats,
}

impl<K, V> BPlusTree<K, V> {
    /// Create an empty tree whose nodes split at `capacity` keys.
    ///
    /// # Errors
    /// - `Error::InvalidConfiguration` if `capacity < 3`
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self::with_config(IndexConfig::new(capacity)?))
    }

    /// Create an empty tree from an already validated config.
    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            root: Node::new_leaf(),
            capacity: config.capacity(),
            len: 0,
            stats: IndexStats::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of distinct keys in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> &Node<K, V> {
        &self.root
    }

    /// Keys held by the root node.
    pub fn root_keys(&self) -> Vec<&K> {
        self.root.keys().collect()
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }

    /// Breadth-first listing of the keys of every node at the requested levels.
    ///
    /// Level 0 is the root. Yields one `(level, keys)` item per node, left to
    /// right within a level. The iterator is lazy and stops once it has passed
    /// the deepest requested level; call again to start over from the root.
    pub fn level_order<I>(&self, levels: I) -> LevelOrder<'_, K, V>
    where
        I: IntoIterator<Item = usize>,
    {
        LevelOrder::new(&self.root, levels)
    }

    /// Every leaf, left to right (ascending key order).
    ///
    /// Walks the whole tree depth-first; each call starts over from the root.
    pub fn leaves(&self) -> Leaves<'_, K, V> {
        Leaves::new(&self.root)
    }

    /// Number of edges from the root to the leaves.
    ///
    /// Walks every path rather than trusting a single one.
    ///
    /// # Errors
    /// - `Error::CorruptedTree` if two leaves sit at different depths
    pub fn depth(&self) -> Result<usize> {
        leaf_depth(&self.root, 0)
    }
}

impl<K: Ord, V> BPlusTree<K, V> {
    /// Values stored under `key`, in insertion order, or `None` if absent.
    pub fn search<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = &self.root;
        let found = loop {
            match node {
                Node::Internal(internal) => node = internal.child(internal.find_child_index(key)),
                Node::Leaf(leaf) => break leaf.get(key),
            }
        };
        self.stats.record_search(found.is_some());
        found
    }

    /// Check every structural invariant of the tree.
    ///
    /// - keys strictly ascending within each node
    /// - every key within the range its ancestors' separators allow
    /// - no node at or above capacity, no empty node below the root
    /// - every leaf at the same depth
    /// - distinct key count matches `len()`
    ///
    /// # Errors
    /// - `Error::CorruptedTree` describing the first violation found
    pub fn validate(&self) -> Result<()> {
        let mut walk = Validation {
            capacity: self.capacity,
            leaf_depth: None,
            keys: 0,
        };
        walk.visit(&self.root, 0, None, None).inspect_err(|e| {
            warn!(error = %e, "index validation failed");
        })?;

        if walk.keys != self.len {
            return Err(Error::CorruptedTree(format!(
                "leaves hold {} keys but the index counted {}",
                walk.keys, self.len
            )));
        }
        Ok(())
    }
}

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    /// Insert `value` under `key`.
    ///
    /// Afterwards `search(&key)` returns `value` as the last element of its
    /// bucket. A leaf that fills up is split, and the split is carried up
    /// through every full ancestor; if the root splits, a new root is created
    /// above it.
    pub fn insert(&mut self, key: K, value: V) {
        let inserts = self.stats.inserts.fetch_add(1, Ordering::Relaxed) + 1;
        trace!(inserts, keys = self.len, "insert");

        if insert_into(&mut self.root, key, value, self.capacity, &self.stats) {
            self.len += 1;
        }

        if self.root.is_full(self.capacity) {
            self.split_root();
        }
    }

    fn split_root(&mut self) {
        let old_root = mem::replace(&mut self.root, Node::new_leaf());
        let kind = old_root.kind();
        let Split {
            separator,
            left,
            right,
        } = old_root.split();

        info!(
            ?kind,
            left_keys = left.len(),
            right_keys = right.len(),
            "root split, tree grew one level"
        );

        self.root = Node::Internal(InternalNode::new(left, separator, right));
        self.stats.record_split(kind);
        self.stats.root_splits.fetch_add(1, Ordering::Relaxed);
    }
}

impl<K: fmt::Debug, V> BPlusTree<K, V> {
    /// Write every node in pre-order, one `level N: [keys]` line per node.
    ///
    /// # Errors
    /// - I/O errors from `writer`
    pub fn write_tree<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_subtree(&self.root, 0, writer)
    }

    /// Write every level from the root down, one `level N: [keys]` line per node.
    ///
    /// # Errors
    /// - `Error::CorruptedTree` if the leaves are not at one depth
    /// - I/O errors from `writer`
    pub fn write_levels<W: Write>(&self, writer: &mut W) -> Result<()> {
        let depth = self.depth()?;
        for (level, keys) in self.level_order(0..=depth) {
            writeln!(writer, "level {level}: {keys:?}")?;
        }
        Ok(())
    }

    /// Write every leaf left to right, one line per leaf listing each key
    /// with its bucket: `leaf N: [k1: [v, v], k2: [v]]`.
    ///
    /// # Errors
    /// - I/O errors from `writer`
    pub fn write_leaves<W: Write>(&self, writer: &mut W) -> Result<()>
    where
        V: fmt::Display,
    {
        for (n, leaf) in self.leaves().enumerate() {
            write!(writer, "leaf {n}: [")?;
            for (i, entry) in leaf.entries().iter().enumerate() {
                if i > 0 {
                    write!(writer, ", ")?;
                }
                write!(writer, "{:?}: [", entry.key())?;
                for (j, value) in entry.bucket().iter().enumerate() {
                    if j > 0 {
                        write!(writer, ", ")?;
                    }
                    write!(writer, "{value}")?;
                }
                write!(writer, "]")?;
            }
            writeln!(writer, "]")?;
        }
        Ok(())
    }
}

impl<K: fmt::Debug, V> fmt::Debug for BPlusTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BPlusTree")
            .field("capacity", &self.capacity)
            .field("len", &self.len)
            .field("root_keys", &self.root.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Insert below `node`, splitting any child that fills up on the way back.
///
/// Returns `true` if `key` was new. The caller checks `node` itself.
fn insert_into<K, V>(
    node: &mut Node<K, V>,
    key: K,
    value: V,
    capacity: usize,
    stats: &IndexStats,
) -> bool
where
    K: Ord + Clone,
{
    match node {
        Node::Leaf(leaf) => leaf.add(key, value),
        Node::Internal(internal) => {
            let index = internal.find_child_index(&key);
            let child = internal.child_mut(index);
            let added = insert_into(child, key, value, capacity, stats);

            if child.is_full(capacity) {
                let kind = internal.split_child(index);
                stats.record_split(kind);
                debug!(
                    ?kind,
                    child = index,
                    parent_keys = internal.len(),
                    "split child node"
                );
            }
            added
        }
    }
}

fn leaf_depth<K, V>(node: &Node<K, V>, level: usize) -> Result<usize> {
    let Node::Internal(internal) = node else {
        return Ok(level);
    };

    let mut children = internal.children();
    let expected = match children.next() {
        Some(first) => leaf_depth(first, level + 1)?,
        None => {
            return Err(Error::CorruptedTree(format!(
                "internal node at level {level} has no children"
            )))
        }
    };
    for child in children {
        let depth = leaf_depth(child, level + 1)?;
        if depth != expected {
            return Err(Error::CorruptedTree(format!(
                "leaves at depths {expected} and {depth} below level {level}"
            )));
        }
    }
    Ok(expected)
}

fn write_subtree<K, V, W>(node: &Node<K, V>, level: usize, writer: &mut W) -> Result<()>
where
    K: fmt::Debug,
    W: Write,
{
    let keys: Vec<&K> = node.keys().collect();
    writeln!(writer, "level {level}: {keys:?}")?;
    for child in node.children() {
        write_subtree(child, level + 1, writer)?;
    }
    Ok(())
}

struct Validation {
    capacity: usize,
    leaf_depth: Option<usize>,
    keys: usize,
}

impl Validation {
    /// `lower <= k < upper` must hold for every key below `node`.
    fn visit<K: Ord, V>(
        &mut self,
        node: &Node<K, V>,
        level: usize,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Result<()> {
        let keys: Vec<&K> = node.keys().collect();

        if keys.len() >= self.capacity {
            return Err(Error::CorruptedTree(format!(
                "node at level {level} holds {} keys with capacity {}",
                keys.len(),
                self.capacity
            )));
        }
        if level > 0 && keys.is_empty() {
            return Err(Error::CorruptedTree(format!(
                "empty node at level {level}"
            )));
        }
        if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::CorruptedTree(format!(
                "keys out of order in node at level {level}"
            )));
        }
        let below = lower.is_some_and(|lo| keys.first().is_some_and(|k| *k < lo));
        let above = upper.is_some_and(|hi| keys.last().is_some_and(|k| *k >= hi));
        if below || above {
            return Err(Error::CorruptedTree(format!(
                "node at level {level} holds keys outside its separator range"
            )));
        }

        match node {
            Node::Leaf(leaf) => {
                if leaf.entries().iter().any(|entry| entry.bucket().is_empty()) {
                    return Err(Error::CorruptedTree(format!(
                        "empty bucket in leaf at level {level}"
                    )));
                }
                match self.leaf_depth {
                    None => self.leaf_depth = Some(level),
                    Some(depth) if depth != level => {
                        return Err(Error::CorruptedTree(format!(
                            "leaves at depths {depth} and {level}"
                        )));
                    }
                    Some(_) => {}
                }
                self.keys += leaf.len();
            }
            Node::Internal(internal) => {
                if internal.child_count() != internal.len() + 1 {
                    return Err(Error::CorruptedTree(format!(
                        "internal node at level {level} has {} children for {} keys",
                        internal.child_count(),
                        internal.len()
                    )));
                }
                for (i, child) in internal.children().enumerate() {
                    let lo = if i == 0 { lower } else { Some(keys[i - 1]) };
                    let hi = keys.get(i).copied().or(upper);
                    self.visit(child, level + 1, lo, hi)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
impl<K, V> BPlusTree<K, V> {
    /// Wrap a hand-built root, bypassing insertion.
    pub(crate) fn from_root(root: Node<K, V>, capacity: usize, len: usize) -> Self {
        Self {
            root,
            capacity,
            len,
            stats: IndexStats::new(),
        }
    }
}
