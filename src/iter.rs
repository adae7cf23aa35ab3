use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::{
    node::{NIL, Node, Side},
    tree::RbTree,
};

/// An in-order iterator over the entries of an [`RbMap`](crate::RbMap).
///
/// Walks successor links through parent back-references, so each step is
/// amortized O(1) and no stack is kept.
pub struct Iter<'a, K, V> {
    tree: &'a RbTree<K, V>,
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(tree: &'a RbTree<K, V>) -> Self {
        Self {
            tree,
            front: tree.first(),
            back: tree.last(),
            remaining: tree.len(),
        }
    }

    /// Iterator over the inclusive slot span `front..=back`.
    pub(crate) fn span(tree: &'a RbTree<K, V>, front: usize, back: usize) -> Self {
        let remaining = if front == NIL || back == NIL {
            0
        } else {
            let (first, last) = (tree.index_rank(front), tree.index_rank(back));
            if first > last { 0 } else { last - first + 1 }
        };

        Self {
            tree,
            front,
            back,
            remaining,
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        let node = tree.store.node(self.front);
        self.front = tree.step(self.front, Side::Right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        let node = tree.store.node(self.back);
        self.back = tree.step(self.back, Side::Left);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// An in-order iterator over a sub-range of an [`RbMap`](crate::RbMap).
pub struct Range<'a, K, V>(pub(crate) Iter<'a, K, V>);

impl<'a, K, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Range<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back()
    }
}

impl<K, V> FusedIterator for Range<'_, K, V> {}

/// An in-order iterator over the keys of an [`RbMap`](crate::RbMap).
pub struct Keys<'a, K, V>(pub(crate) Iter<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(key, _)| key)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of an [`RbMap`](crate::RbMap), in key order.
pub struct Values<'a, K, V>(pub(crate) Iter<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, value)| value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

/// A slot split into its child links and a mutable view of its entry.
struct SlotMut<'a, K, V> {
    left: usize,
    right: usize,
    entry: Option<(&'a K, &'a mut V)>,
}

/// A mutable in-order iterator over the entries of an [`RbMap`](crate::RbMap).
///
/// Creation splits every arena slot into its links and its entry once; the
/// walk itself is lazy, driven by one stack of pending nodes per end.
pub struct IterMut<'a, K, V> {
    slots: Vec<SlotMut<'a, K, V>>,
    front: Vec<usize>,
    back: Vec<usize>,
    remaining: usize,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(tree: &'a mut RbTree<K, V>) -> Self {
        let (root, remaining) = (tree.root, tree.len);

        let mut slots: Vec<SlotMut<'a, K, V>> = (0..tree.store.slot_count())
            .map(|_| SlotMut {
                left: NIL,
                right: NIL,
                entry: None,
            })
            .collect();
        for (idx, node) in tree.store.live_mut() {
            let Node {
                key,
                value,
                left,
                right,
                ..
            } = node;
            slots[idx] = SlotMut {
                left: *left,
                right: *right,
                entry: Some((&*key, value)),
            };
        }

        let mut iter = Self {
            slots,
            front: Vec::new(),
            back: Vec::new(),
            remaining,
        };
        iter.descend(root, Side::Left);
        iter.descend(root, Side::Right);
        iter
    }

    /// Pushes `idx` and its spine toward `side` onto the stack of the end
    /// that walks toward `side`.
    fn descend(&mut self, mut idx: usize, side: Side) {
        let stack = match side {
            Side::Left => &mut self.front,
            Side::Right => &mut self.back,
        };
        while idx != NIL {
            stack.push(idx);
            let slot = &self.slots[idx];
            idx = match side {
                Side::Left => slot.left,
                Side::Right => slot.right,
            };
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.front.pop()?;
        self.descend(self.slots[idx].right, Side::Left);
        self.remaining -= 1;
        self.slots[idx].entry.take()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.back.pop()?;
        self.descend(self.slots[idx].left, Side::Right);
        self.remaining -= 1;
        self.slots[idx].entry.take()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// A mutable iterator over the values of an [`RbMap`](crate::RbMap), in key
/// order.
pub struct ValuesMut<'a, K, V>(pub(crate) IterMut<'a, K, V>);

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, value)| value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// An owning in-order iterator over the entries of an [`RbMap`](crate::RbMap).
///
/// Each step unlinks the current minimum (or maximum, from the back) from the
/// tree it owns, so entries are moved out one at a time in O(log n).
pub struct IntoIter<K, V> {
    tree: RbTree<K, V>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(tree: RbTree<K, V>) -> Self {
        Self { tree }
    }

    fn pop(&mut self, idx: usize) -> Option<(K, V)> {
        if idx == NIL {
            return None;
        }
        Some(self.tree.remove_at(idx))
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let first = self.tree.first();
        self.pop(first)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let last = self.tree.last();
        self.pop(last)
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}
