//! Tree traversals: breadth-first by level, and leaves left to right.

use std::collections::{BTreeSet, VecDeque};

use crate::index::btree::{LeafNode, Node};

/// Lazy breadth-first walk yielding `(level, keys)` for every node on a
/// requested level.
///
/// Created by [`BPlusTree::level_order`](crate::index::BPlusTree::level_order).
/// Nodes below the deepest requested level are never visited.
pub struct LevelOrder<'a, K, V> {
    queue: VecDeque<(usize, &'a Node<K, V>)>,
    levels: BTreeSet<usize>,
}

impl<'a, K, V> LevelOrder<'a, K, V> {
    pub(crate) fn new<I>(root: &'a Node<K, V>, levels: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let levels: BTreeSet<usize> = levels.into_iter().collect();
        let mut queue = VecDeque::new();
        if !levels.is_empty() {
            queue.push_back((0, root));
        }
        Self { queue, levels }
    }

    fn deepest(&self) -> usize {
        self.levels.last().copied().unwrap_or(0)
    }
}

impl<'a, K, V> Iterator for LevelOrder<'a, K, V> {
    type Item = (usize, Vec<&'a K>);

    fn next(&mut self) -> Option<Self::Item> {
        let deepest = self.deepest();
        while let Some((level, node)) = self.queue.pop_front() {
            if level < deepest {
                self.queue
                    .extend(node.children().map(|child| (level + 1, child)));
            }
            if self.levels.contains(&level) {
                return Some((level, node.keys().collect()));
            }
        }
        None
    }
}

/// Depth-first walk yielding every leaf from the smallest keys to the largest.
///
/// Created by [`BPlusTree::leaves`](crate::index::BPlusTree::leaves).
pub struct Leaves<'a, K, V> {
    stack: Vec<&'a Node<K, V>>,
}

impl<'a, K, V> Leaves<'a, K, V> {
    pub(crate) fn new(root: &'a Node<K, V>) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a, K, V> Iterator for Leaves<'a, K, V> {
    type Item = &'a LeafNode<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node {
                Node::Leaf(leaf) => return Some(leaf),
                Node::Internal(internal) => {
                    // Leftmost child on top.
                    let start = self.stack.len();
                    self.stack.extend(internal.children());
                    self.stack[start..].reverse();
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::index::BPlusTree;

    fn tree_of(capacity: usize, keys: impl IntoIterator<Item = u32>) -> BPlusTree<u32, ()> {
        let mut tree = BPlusTree::new(capacity).unwrap();
        for k in keys {
            tree.insert(k, ());
        }
        tree
    }

    fn collect(tree: &BPlusTree<u32, ()>, levels: &[usize]) -> Vec<(usize, Vec<u32>)> {
        tree.level_order(levels.iter().copied())
            .map(|(level, keys)| (level, keys.into_iter().copied().collect()))
            .collect()
    }

    #[test]
    fn test_root_only() {
        let tree = tree_of(4, [3, 1, 2]);
        assert_eq!(collect(&tree, &[0]), vec![(0, vec![1, 2, 3])]);
        assert!(collect(&tree, &[1]).is_empty());
    }

    #[test]
    fn test_selected_levels_in_bfs_order() {
        let tree = tree_of(3, 1..=5);

        assert_eq!(
            collect(&tree, &[2, 0]),
            vec![
                (0, vec![3]),
                (2, vec![1]),
                (2, vec![2]),
                (2, vec![3]),
                (2, vec![4, 5]),
            ]
        );
        assert_eq!(collect(&tree, &[1]), vec![(1, vec![2]), (1, vec![4])]);
    }

    #[test]
    fn test_no_levels_requested() {
        let tree = tree_of(3, 1..=5);
        assert_eq!(tree.level_order([]).count(), 0);
    }

    #[test]
    fn test_restartable() {
        let tree = tree_of(3, 1..=20);
        let first = collect(&tree, &[0, 1, 2, 3]);
        let second = collect(&tree, &[0, 1, 2, 3]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_is_lazy() {
        let tree = tree_of(3, 1..=50);
        let mut walk = tree.level_order([0, 1]);
        let (level, _) = walk.next().unwrap();
        assert_eq!(level, 0);
        assert!(walk.all(|(level, _)| level == 1));
    }

    #[test]
    fn test_leaves_single_leaf_root() {
        let tree = tree_of(4, [2, 1]);
        let leaves: Vec<Vec<u32>> = tree
            .leaves()
            .map(|leaf| leaf.keys().copied().collect())
            .collect();
        assert_eq!(leaves, vec![vec![1, 2]]);
    }

    #[test]
    fn test_leaves_match_deepest_level() {
        let tree = tree_of(3, 1..=20);
        let depth = tree.depth().unwrap();

        let from_leaves: Vec<Vec<u32>> = tree
            .leaves()
            .map(|leaf| leaf.keys().copied().collect())
            .collect();
        let from_levels: Vec<Vec<u32>> = collect(&tree, &[depth])
            .into_iter()
            .map(|(_, keys)| keys)
            .collect();
        assert_eq!(from_leaves, from_levels);
    }
}
