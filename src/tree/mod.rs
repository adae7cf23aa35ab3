use core::{borrow::Borrow, cmp::Ordering, ops::Bound};

use crate::node::{Color, NIL, NodeStore, Side};

mod insert;
mod remove;
mod rotate;

/// Red-black tree engine over an index arena.
///
/// Holds the node store, the root index and the live node count. The public
/// map type wraps it and adds the optional post-mutation verification hook.
#[derive(Debug, Clone)]
pub(crate) struct RbTree<K, V> {
    pub(crate) store: NodeStore<K, V>,

    /// Index of the root node, NIL when the tree is empty
    pub(crate) root: usize,

    /// Number of live nodes reachable from root
    pub(crate) len: usize,
}

impl<K, V> RbTree<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            store: NodeStore::new(),
            root: NIL,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            store: NodeStore::with_capacity(capacity),
            root: NIL,
            len: 0,
        }
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn clear(&mut self) {
        self.store.clear();
        self.root = NIL;
        self.len = 0;
    }

    /// Follows `side` links from `idx` down to the last node on that spine.
    pub(crate) fn extreme(&self, mut idx: usize, side: Side) -> usize {
        while idx != NIL {
            let next = self.store.child(idx, side);
            if next == NIL {
                break;
            }
            idx = next;
        }
        idx
    }

    #[inline]
    pub(crate) fn first(&self) -> usize {
        self.extreme(self.root, Side::Left)
    }

    #[inline]
    pub(crate) fn last(&self) -> usize {
        self.extreme(self.root, Side::Right)
    }

    /// In-order neighbour of `idx` in direction `side`: the successor for
    /// `Side::Right`, the predecessor for `Side::Left`. NIL past either end.
    pub(crate) fn step(&self, idx: usize, side: Side) -> usize {
        let child = self.store.child(idx, side);
        if child != NIL {
            return self.extreme(child, side.opposite());
        }

        let mut current = idx;
        let mut parent = self.store.parent(current);
        while parent != NIL && self.store.child(parent, side) == current {
            current = parent;
            parent = self.store.parent(current);
        }
        parent
    }

    /// Zero-based in-order position of the live node `idx`.
    pub(crate) fn index_rank(&self, mut idx: usize) -> usize {
        let mut rank = self.store.subtree_len(self.store.left(idx));
        let mut parent = self.store.parent(idx);
        while parent != NIL {
            if self.store.right(parent) == idx {
                rank += self.store.subtree_len(self.store.left(parent)) + 1;
            }
            idx = parent;
            parent = self.store.parent(idx);
        }
        rank
    }

    /// Node at in-order position `k`, or NIL when out of range.
    pub(crate) fn select(&self, k: usize) -> usize {
        if k >= self.len {
            return NIL;
        }

        let mut current = self.root;
        let mut remaining_rank = k;

        while current != NIL {
            let node = self.store.node(current);
            let left_len = self.store.subtree_len(node.left);

            match remaining_rank.cmp(&left_len) {
                Ordering::Less => current = node.left,
                Ordering::Equal => return current,
                Ordering::Greater => {
                    remaining_rank -= left_len + 1;
                    current = node.right;
                }
            }
        }
        NIL
    }

    /// Recomputes subtree lengths from `idx` up to the root.
    pub(crate) fn refresh_to_root(&mut self, mut idx: usize) {
        while idx != NIL {
            self.store.refresh_subtree_len(idx);
            idx = self.store.parent(idx);
        }
    }

    /// Number of nodes on the longest root-to-node path.
    pub(crate) fn height(&self) -> usize {
        self.subtree_height(self.root)
    }

    fn subtree_height(&self, idx: usize) -> usize {
        if idx == NIL {
            return 0;
        }
        let node = self.store.node(idx);
        1 + self
            .subtree_height(node.left)
            .max(self.subtree_height(node.right))
    }

    /// Black nodes on the leftmost root-to-leaf path.
    pub(crate) fn black_height(&self) -> usize {
        let mut idx = self.root;
        let mut blacks = 0;
        while idx != NIL {
            if self.store.color(idx) == Color::Black {
                blacks += 1;
            }
            idx = self.store.left(idx);
        }
        blacks
    }

    /// Points `parent`'s link that currently names `old` at `new`, or makes
    /// `new` the root when `parent` is NIL. Does not touch `new`'s parent.
    pub(crate) fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if parent == NIL {
            self.root = new;
        } else if self.store.left(parent) == old {
            self.store.node_mut(parent).left = new;
        } else {
            self.store.node_mut(parent).right = new;
        }
    }

    /// Puts the subtree rooted at `new` in `old`'s position.
    pub(crate) fn transplant(&mut self, old: usize, new: usize) {
        let parent = self.store.parent(old);
        self.replace_child(parent, old, new);
        self.store.set_parent(new, parent);
    }
}

impl<K, V> RbTree<K, V> {
    /// Index of the node holding `key`, or NIL.
    pub(crate) fn find<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;

        while current != NIL {
            let node = self.store.node(current);
            match key.cmp(node.key.borrow()) {
                Ordering::Equal => return current,
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
            }
        }
        NIL
    }

    /// Number of keys strictly less than `key`.
    pub(crate) fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        let mut rank = 0;

        while current != NIL {
            let node = self.store.node(current);
            match key.cmp(node.key.borrow()) {
                Ordering::Less => current = node.left,
                Ordering::Equal => return rank + self.store.subtree_len(node.left),
                Ordering::Greater => {
                    rank += self.store.subtree_len(node.left) + 1;
                    current = node.right;
                }
            }
        }
        rank
    }

    /// First node whose key lies on the inner side of a start bound.
    pub(crate) fn lower_bound<Q>(&self, bound: Bound<&Q>) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        let mut best = NIL;

        while current != NIL {
            let node = self.store.node(current);
            let key = node.key.borrow();
            let inside = match bound {
                Bound::Included(start) => key >= start,
                Bound::Excluded(start) => key > start,
                Bound::Unbounded => true,
            };
            if inside {
                best = current;
                current = node.left;
            } else {
                current = node.right;
            }
        }
        best
    }

    /// Last node whose key lies on the inner side of an end bound.
    pub(crate) fn upper_bound<Q>(&self, bound: Bound<&Q>) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        let mut best = NIL;

        while current != NIL {
            let node = self.store.node(current);
            let key = node.key.borrow();
            let inside = match bound {
                Bound::Included(end) => key <= end,
                Bound::Excluded(end) => key < end,
                Bound::Unbounded => true,
            };
            if inside {
                best = current;
                current = node.right;
            } else {
                current = node.left;
            }
        }
        best
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloc::vec::Vec;

    pub(crate) fn build(keys: &[i32]) -> RbTree<i32, i32> {
        let mut tree = RbTree::new();
        for &key in keys {
            tree.insert(key, key * 10);
            assert_eq!(tree.verify(), Ok(()), "after inserting {key}");
        }
        tree
    }

    fn in_order(tree: &RbTree<i32, i32>) -> Vec<i32> {
        let mut keys = Vec::new();
        let mut idx = tree.first();
        while idx != NIL {
            keys.push(tree.store.node(idx).key);
            idx = tree.step(idx, Side::Right);
        }
        keys
    }

    #[test]
    fn test_find_on_empty_tree() {
        let tree = RbTree::<i32, i32>::new();
        assert_eq!(tree.find(&1), NIL);
        assert_eq!(tree.first(), NIL);
        assert_eq!(tree.last(), NIL);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.black_height(), 0);
    }

    #[test]
    fn test_find_existing_and_missing() {
        let tree = build(&[5, 3, 8, 1, 4, 7, 9]);
        for key in [1, 3, 4, 5, 7, 8, 9] {
            let idx = tree.find(&key);
            assert_ne!(idx, NIL);
            assert_eq!(tree.store.node(idx).key, key);
        }
        for key in [0, 2, 6, 10] {
            assert_eq!(tree.find(&key), NIL);
        }
    }

    #[test]
    fn test_step_walks_both_directions() {
        let tree = build(&[5, 3, 8, 1, 4, 7, 9]);
        assert_eq!(in_order(&tree), [1, 3, 4, 5, 7, 8, 9]);

        let mut keys = Vec::new();
        let mut idx = tree.last();
        while idx != NIL {
            keys.push(tree.store.node(idx).key);
            idx = tree.step(idx, Side::Left);
        }
        assert_eq!(keys, [9, 8, 7, 5, 4, 3, 1]);
    }

    #[test]
    fn test_rank_and_select_agree() {
        let tree = build(&[50, 25, 75, 12, 37, 62, 87, 6, 18, 31, 43]);
        let sorted = in_order(&tree);

        for (pos, key) in sorted.iter().enumerate() {
            assert_eq!(tree.rank(key), pos);
            let idx = tree.select(pos);
            assert_eq!(tree.store.node(idx).key, *key);
            assert_eq!(tree.index_rank(idx), pos);
        }
        assert_eq!(tree.rank(&0), 0);
        assert_eq!(tree.rank(&40), 6);
        assert_eq!(tree.rank(&100), sorted.len());
        assert_eq!(tree.select(sorted.len()), NIL);
    }

    #[test]
    fn test_bounds() {
        let tree = build(&[10, 20, 30, 40, 50]);
        let key_at = |idx: usize| tree.store.node(idx).key;

        assert_eq!(key_at(tree.lower_bound(Bound::Included(&20))), 20);
        assert_eq!(key_at(tree.lower_bound(Bound::Excluded(&20))), 30);
        assert_eq!(key_at(tree.lower_bound(Bound::Included(&25))), 30);
        assert_eq!(key_at(tree.lower_bound(Bound::Unbounded)), 10);
        assert_eq!(tree.lower_bound(Bound::Excluded(&50)), NIL);

        assert_eq!(key_at(tree.upper_bound(Bound::Included(&40))), 40);
        assert_eq!(key_at(tree.upper_bound(Bound::Excluded(&40))), 30);
        assert_eq!(key_at(tree.upper_bound(Bound::Included(&45))), 40);
        assert_eq!(key_at(tree.upper_bound(Bound::Unbounded)), 50);
        assert_eq!(tree.upper_bound(Bound::Excluded(&10)), NIL);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut tree = build(&[1, 2, 3]);
        tree.clear();
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.root, NIL);
        assert_eq!(tree.store.slot_count(), 0);
        assert_eq!(tree.verify(), Ok(()));
    }
}
