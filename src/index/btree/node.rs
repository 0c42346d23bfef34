//! B+ tree node representation.
//!
//! A [`Node`] is either a [`LeafNode`] holding sorted keys with their value
//! buckets, or an [`InternalNode`] holding sorted separator keys and the
//! children between them.
//!
//! # Layout
//! ```text
//! Leaf:      [ (k0, [v, v]) (k1, [v]) (k2, [v, v, v]) ]
//!
//! Internal:  first   (s0, c1)   (s1, c2)
//!              │        │          │
//!           k < s0  s0 <= k < s1  k >= s1
//! ```
//!
//! Both kinds keep keys and payload together in one entry vector, so the two
//! can never drift apart. An internal node stores its leftmost child on its own
//! and pairs every other child with the separator on its left, which makes
//! `children == keys + 1` hold by construction.

use std::borrow::Borrow;
use std::mem;

/// Which kind of node a split happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Internal,
}

/// A single tree node.
#[derive(Debug, Clone)]
pub enum Node<K, V> {
    Leaf(LeafNode<K, V>),
    Internal(InternalNode<K, V>),
}

/// Result of splitting a full node in two.
///
/// The separator is the smallest key reachable through `right` and is what the
/// parent installs between the two siblings.
#[derive(Debug)]
pub struct Split<K, V> {
    pub separator: K,
    pub left: Node<K, V>,
    pub right: Node<K, V>,
}

impl<K, V> Node<K, V> {
    /// Create an empty leaf (the initial root of every tree).
    pub fn new_leaf() -> Self {
        Node::Leaf(LeafNode::new())
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Leaf(_) => NodeKind::Leaf,
            Node::Internal(_) => NodeKind::Internal,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Number of keys held by this node.
    pub fn len(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.len(),
            Node::Internal(internal) => internal.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once the node holds `capacity` keys and has to be split.
    pub fn is_full(&self, capacity: usize) -> bool {
        self.len() >= capacity
    }

    /// Keys of this node in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        let (leaf, internal) = match self {
            Node::Leaf(leaf) => (Some(leaf.keys()), None),
            Node::Internal(internal) => (None, Some(internal.keys())),
        };
        leaf.into_iter().flatten().chain(internal.into_iter().flatten())
    }

    /// Children of this node, left to right. Empty for a leaf.
    pub fn children(&self) -> impl Iterator<Item = &Node<K, V>> + '_ {
        let children = match self {
            Node::Leaf(_) => None,
            Node::Internal(internal) => Some(internal.children()),
        };
        children.into_iter().flatten()
    }
}

impl<K: Ord + Clone, V> Node<K, V> {
    /// Split this node into two siblings of the same kind.
    ///
    /// Purely structural: the caller decides where the siblings and the
    /// separator go.
    pub fn split(self) -> Split<K, V> {
        match self {
            Node::Leaf(leaf) => {
                let (separator, left, right) = leaf.split();
                Split {
                    separator,
                    left: Node::Leaf(left),
                    right: Node::Leaf(right),
                }
            }
            Node::Internal(internal) => {
                let (separator, left, right) = internal.split();
                Split {
                    separator,
                    left: Node::Internal(left),
                    right: Node::Internal(right),
                }
            }
        }
    }
}

// ============================================================================
// Leaf
// ============================================================================

/// A key and every value inserted under it, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafEntry<K, V> {
    key: K,
    bucket: Vec<V>,
}

impl<K, V> LeafEntry<K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Never empty.
    pub fn bucket(&self) -> &[V] {
        &self.bucket
    }
}

/// Leaf node: sorted keys, each with a non-empty bucket of values.
#[derive(Debug, Clone)]
pub struct LeafNode<K, V> {
    entries: Vec<LeafEntry<K, V>>,
}

impl<K, V> LeafNode<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|entry| &entry.key)
    }

    pub fn entries(&self) -> &[LeafEntry<K, V>] {
        &self.entries
    }
}

impl<K: Ord, V> LeafNode<K, V> {
    /// Insert `value` under `key`, keeping entries sorted.
    ///
    /// An existing key gets the value appended to its bucket. Returns `true`
    /// if `key` was not present before.
    pub fn add(&mut self, key: K, value: V) -> bool {
        match self.entries.binary_search_by(|entry| entry.key.cmp(&key)) {
            Ok(pos) => {
                self.entries[pos].bucket.push(value);
                false
            }
            Err(pos) => {
                self.entries.insert(
                    pos,
                    LeafEntry {
                        key,
                        bucket: vec![value],
                    },
                );
                true
            }
        }
    }

    /// Bucket stored under `key`, if any.
    pub fn get<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entries
            .binary_search_by(|entry| entry.key.borrow().cmp(key))
            .ok()
            .map(|pos| self.entries[pos].bucket.as_slice())
    }
}

impl<K: Clone, V> LeafNode<K, V> {
    /// Split at `mid = len / 2`: left keeps `[0, mid)`, right takes `[mid, len)`.
    ///
    /// The separator is a copy of the right leaf's first key, which stays in
    /// the leaf since all values live at the leaf level.
    fn split(mut self) -> (K, Self, Self) {
        debug_assert!(self.entries.len() >= 2, "leaf split needs two keys");
        let mid = self.entries.len() / 2;
        let right = self.entries.split_off(mid);
        let separator = right[0].key.clone();
        (separator, self, Self { entries: right })
    }
}

impl<K, V> Default for LeafNode<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Internal
// ============================================================================

/// A separator and the child holding keys `>=` it (up to the next separator).
#[derive(Debug, Clone)]
struct Branch<K, V> {
    separator: K,
    child: Box<Node<K, V>>,
}

/// Internal node: sorted separators with one more child than separators.
#[derive(Debug, Clone)]
pub struct InternalNode<K, V> {
    first: Box<Node<K, V>>,
    branches: Vec<Branch<K, V>>,
}

impl<K, V> InternalNode<K, V> {
    /// Two-child node, as created when a root splits.
    pub fn new(left: Node<K, V>, separator: K, right: Node<K, V>) -> Self {
        Self {
            first: Box::new(left),
            branches: vec![Branch {
                separator,
                child: Box::new(right),
            }],
        }
    }

    /// Number of separator keys.
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.branches.iter().map(|branch| &branch.separator)
    }

    /// Always `len() + 1`.
    pub fn child_count(&self) -> usize {
        self.branches.len() + 1
    }

    pub fn children(&self) -> impl Iterator<Item = &Node<K, V>> + '_ {
        std::iter::once(&*self.first).chain(self.branches.iter().map(|branch| &*branch.child))
    }

    /// # Panics
    /// Panics if `index >= child_count()`.
    pub fn child(&self, index: usize) -> &Node<K, V> {
        match index {
            0 => &self.first,
            i => &self.branches[i - 1].child,
        }
    }

    /// # Panics
    /// Panics if `index >= child_count()`.
    pub fn child_mut(&mut self, index: usize) -> &mut Node<K, V> {
        match index {
            0 => &mut self.first,
            i => &mut self.branches[i - 1].child,
        }
    }

    /// Index of the child to descend into for `key`.
    ///
    /// The first `i` with `key < keys[i]`, or the last child if `key` is not
    /// below any separator.
    pub fn find_child_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.branches
            .partition_point(|branch| branch.separator.borrow() <= key)
    }

    /// Replace child `index` with the two halves of `split`.
    ///
    /// The separator lands at key position `index` and the right half becomes
    /// child `index + 1`, so every existing range stays where it was.
    pub fn insert_split(&mut self, index: usize, split: Split<K, V>) {
        let Split {
            separator,
            left,
            right,
        } = split;
        *self.child_mut(index) = left;
        self.branches.insert(
            index,
            Branch {
                separator,
                child: Box::new(right),
            },
        );
    }
}

impl<K: Ord + Clone, V> InternalNode<K, V> {
    /// Split child `index` in place, splicing both halves into this node.
    ///
    /// Returns the kind of the child that was split.
    pub fn split_child(&mut self, index: usize) -> NodeKind {
        let child = mem::replace(self.child_mut(index), Node::new_leaf());
        let kind = child.kind();
        self.insert_split(index, child.split());
        kind
    }

    /// Split at `mid = len / 2`: left keeps keys `[0, mid)`, key `mid` moves
    /// up as the separator, right takes keys `(mid, len)`.
    ///
    /// The separator's child becomes the right node's leftmost child, so both
    /// halves keep one more child than keys.
    fn split(mut self) -> (K, Self, Self) {
        debug_assert!(self.branches.len() >= 2, "internal split needs two keys");
        let mid = self.branches.len() / 2;
        let mut upper = self.branches.split_off(mid);
        let Branch { separator, child } = upper.remove(0);
        let right = Self {
            first: child,
            branches: upper,
        };
        (separator, self, right)
    }
}
