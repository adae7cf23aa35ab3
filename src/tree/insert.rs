use core::{cmp::Ordering, mem};

use log::trace;

use super::RbTree;
use crate::node::{Color, NIL, Side};

impl<K: Ord, V> RbTree<K, V> {
    /// Inserts `key`, or overwrites the value stored under an equal key.
    ///
    /// Returns the previous value on overwrite. An overwrite leaves the tree
    /// shape, colors and the stored key untouched.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        if self.root == NIL {
            let idx = self.store.allocate(key, value, NIL);
            self.store.set_color(idx, Color::Black);
            self.root = idx;
            self.len = 1;
            return None;
        }

        let mut parent = self.root;
        let side = loop {
            let node = self.store.node(parent);
            let side = match key.cmp(&node.key) {
                Ordering::Equal => {
                    let slot = &mut self.store.node_mut(parent).value;
                    return Some(mem::replace(slot, value));
                }
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };

            let next = self.store.child(parent, side);
            if next == NIL {
                break side;
            }
            parent = next;
        };

        let idx = self.store.allocate(key, value, parent);
        self.store.set_child(parent, side, idx);
        self.len += 1;

        self.refresh_to_root(parent);
        self.fix_insertion_violations(idx);

        None
    }

    /// Restores the red-black properties after `node` was attached as a red
    /// leaf. Only the red-uncle case moves up the tree; every other case ends
    /// the loop.
    fn fix_insertion_violations(&mut self, mut node: usize) {
        loop {
            let parent = self.store.parent(node);

            if parent == NIL {
                trace!("insert case 1: slot {node} is root");
                self.store.set_color(node, Color::Black);
                return;
            }

            if self.store.is_black(parent) {
                return;
            }

            // A red parent is never the root, so the grandparent exists.
            let grandparent = self.store.parent(parent);
            let parent_side = self.store.side_of(parent);
            let uncle = self.store.child(grandparent, parent_side.opposite());

            if self.store.is_red(uncle) {
                trace!("insert case 3: red uncle, recoloring at slot {grandparent}");
                self.store.set_color(parent, Color::Black);
                self.store.set_color(uncle, Color::Black);
                self.store.set_color(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            if self.store.side_of(node) != parent_side {
                trace!("insert case 4: inner grandchild at slot {node}");
                self.rotate(parent, parent_side);
                node = parent;
            }

            trace!("insert case 5: outer grandchild at slot {node}");
            let parent = self.store.parent(node);
            self.store.set_color(parent, Color::Black);
            self.store.set_color(grandparent, Color::Red);
            self.rotate(grandparent, parent_side.opposite());
            return;
        }
    }
}
