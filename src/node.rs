use alloc::vec::Vec;
use core::mem;

/// Index standing in for the absent child (and the root's parent).
pub(crate) const NIL: usize = usize::MAX;

/// Red-Black tree node colors used to maintain tree balance properties.
///
/// Red-Black trees maintain balance by ensuring:
/// - Red nodes have black children
/// - All paths from root to leaves have equal black node counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    /// Red node - must have black children, cannot be adjacent to other red nodes
    Red,
    /// Black node - can have children of any color, contributes to black height
    Black,
}

/// Which child link of a node is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A node in the Red-Black tree holding one entry and its structural links.
#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,

    pub(crate) value: V,

    /// Index of parent node in the arena (NIL if this is root)
    pub(crate) parent: usize,

    /// Index of left child node in the arena (NIL if no left child)
    pub(crate) left: usize,

    /// Index of right child node in the arena (NIL if no right child)
    pub(crate) right: usize,

    pub(crate) color: Color,

    /// Number of nodes in this node's subtree, itself included.
    /// Used for rank and select queries
    pub(crate) subtree_len: usize,
}

/// Arena owning every node of a tree.
///
/// Child links are owning indices into `slots`, parent links are plain back
/// references. Vacated slots are kept on a free stack and handed out again by
/// the next allocation, so churn does not grow the arena.
#[derive(Debug, Clone)]
pub(crate) struct NodeStore<K, V> {
    slots: Vec<Option<Node<K, V>>>,

    /// Stack of vacated slot indices available for reuse
    free: Vec<usize>,
}

impl<K, V> NodeStore<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    /// Number of slots in the arena, vacant ones included.
    #[inline]
    pub(crate) const fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    #[inline]
    pub(crate) const fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    #[inline]
    pub(crate) const fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Stores a fresh red leaf and returns its index.
    pub(crate) fn allocate(&mut self, key: K, value: V, parent: usize) -> usize {
        let node = Node {
            key,
            value,
            parent,
            left: NIL,
            right: NIL,
            color: Color::Red,
            subtree_len: 1,
        };

        match self.free.pop() {
            Some(idx) => {
                debug_assert!(self.slots[idx].is_none());
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    /// Vacates `idx` and hands its node back to the caller.
    pub(crate) fn release(&mut self, idx: usize) -> Node<K, V> {
        let Some(node) = self.slots[idx].take() else {
            unreachable!("released vacant slot {idx}");
        };
        self.free.push(idx);
        node
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    #[inline]
    pub(crate) const fn node(&self, idx: usize) -> &Node<K, V> {
        let Some(node) = &self.slots.as_slice()[idx] else {
            panic!("live link points at vacant slot");
        };
        node
    }

    #[inline]
    pub(crate) const fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        let Some(node) = &mut self.slots.as_mut_slice()[idx] else {
            panic!("live link points at vacant slot");
        };
        node
    }

    /// Exchanges the key and value of two distinct live nodes, leaving their
    /// links and colors in place.
    pub(crate) fn swap_entries(&mut self, a: usize, b: usize) {
        debug_assert_ne!(a, b);
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.slots.split_at_mut(hi);
        let (Some(x), Some(y)) = (&mut head[lo], &mut tail[0]) else {
            unreachable!("swapped entries of a vacant slot");
        };
        mem::swap(&mut x.key, &mut y.key);
        mem::swap(&mut x.value, &mut y.value);
    }

    /// Occupied slots with their indices, in arena order.
    pub(crate) fn live_mut(&mut self) -> impl Iterator<Item = (usize, &mut Node<K, V>)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_mut().map(|node| (idx, node)))
    }

    /// Color of `idx`; the absent child counts as black.
    #[inline]
    pub(crate) const fn color(&self, idx: usize) -> Color {
        if idx == NIL {
            Color::Black
        } else {
            self.node(idx).color
        }
    }

    #[inline]
    pub(crate) const fn set_color(&mut self, idx: usize, color: Color) {
        if idx != NIL {
            self.node_mut(idx).color = color;
        }
    }

    #[inline]
    pub(crate) fn is_red(&self, idx: usize) -> bool {
        self.color(idx) == Color::Red
    }

    #[inline]
    pub(crate) fn is_black(&self, idx: usize) -> bool {
        self.color(idx) == Color::Black
    }

    #[inline]
    pub(crate) const fn parent(&self, idx: usize) -> usize {
        if idx == NIL { NIL } else { self.node(idx).parent }
    }

    #[inline]
    pub(crate) const fn set_parent(&mut self, idx: usize, parent: usize) {
        if idx != NIL {
            self.node_mut(idx).parent = parent;
        }
    }

    #[inline]
    pub(crate) const fn left(&self, idx: usize) -> usize {
        if idx == NIL { NIL } else { self.node(idx).left }
    }

    #[inline]
    pub(crate) const fn right(&self, idx: usize) -> usize {
        if idx == NIL { NIL } else { self.node(idx).right }
    }

    #[inline]
    pub(crate) const fn child(&self, idx: usize, side: Side) -> usize {
        match side {
            Side::Left => self.left(idx),
            Side::Right => self.right(idx),
        }
    }

    #[inline]
    pub(crate) const fn set_child(&mut self, idx: usize, side: Side, child: usize) {
        let node = self.node_mut(idx);
        match side {
            Side::Left => node.left = child,
            Side::Right => node.right = child,
        }
    }

    /// Which child of its parent `idx` is. `idx` must not be the root.
    #[inline]
    pub(crate) const fn side_of(&self, idx: usize) -> Side {
        let parent = self.parent(idx);
        debug_assert!(parent != NIL);
        if self.left(parent) == idx {
            Side::Left
        } else {
            Side::Right
        }
    }

    #[inline]
    pub(crate) const fn subtree_len(&self, idx: usize) -> usize {
        if idx == NIL {
            0
        } else {
            self.node(idx).subtree_len
        }
    }

    /// Recomputes the subtree length of `idx` from its children.
    pub(crate) const fn refresh_subtree_len(&mut self, idx: usize) {
        if idx == NIL {
            return;
        }

        let node = self.node(idx);
        let total = 1 + self.subtree_len(node.left) + self.subtree_len(node.right);
        self.node_mut(idx).subtree_len = total;
    }
}
