use core::borrow::Borrow;

use log::trace;

use super::RbTree;
use crate::node::{Color, NIL, Side};

impl<K, V> RbTree<K, V> {
    /// Removes the entry stored under `key`, returning it. A missing key
    /// leaves the tree untouched.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let target = self.find(key);
        if target == NIL {
            return None;
        }
        Some(self.remove_at(target))
    }

    /// Removes the live node `idx` and returns its entry.
    ///
    /// A node with two children trades key and value with its in-order
    /// predecessor, and the predecessor's slot is the one spliced out.
    pub(crate) fn remove_at(&mut self, mut idx: usize) -> (K, V) {
        let left = self.store.left(idx);
        if left != NIL && self.store.right(idx) != NIL {
            let predecessor = self.extreme(left, Side::Right);
            self.store.swap_entries(idx, predecessor);
            idx = predecessor;
        }

        let child = match self.store.left(idx) {
            NIL => self.store.right(idx),
            left => left,
        };

        if self.store.is_black(idx) {
            if self.store.is_red(child) {
                // The red child takes over the removed black.
                self.store.set_color(child, Color::Black);
            } else {
                self.fix_deletion_violations(idx);
            }
        }

        let parent = self.store.parent(idx);
        self.transplant(idx, child);
        self.refresh_to_root(parent);
        self.store.set_color(self.root, Color::Black);
        self.len -= 1;

        let node = self.store.release(idx);
        (node.key, node.value)
    }

    /// Repairs the black-height deficit caused by removing the black leaf
    /// `node`. Runs while `node` is still linked; it stands in for the
    /// absent child that will replace it.
    fn fix_deletion_violations(&mut self, mut node: usize) {
        loop {
            let parent = self.store.parent(node);
            if parent == NIL {
                return;
            }

            let side = self.store.side_of(node);
            let mut sibling = self.store.child(parent, side.opposite());

            if self.store.is_red(sibling) {
                trace!("delete case 2: red sibling at slot {sibling}");
                self.store.set_color(parent, Color::Red);
                self.store.set_color(sibling, Color::Black);
                self.rotate(parent, side);
                sibling = self.store.child(parent, side.opposite());
            }

            let near = self.store.child(sibling, side);
            let far = self.store.child(sibling, side.opposite());

            if self.store.is_black(near) && self.store.is_black(far) {
                if self.store.is_black(parent) {
                    trace!("delete case 3: pushing deficit up to slot {parent}");
                    self.store.set_color(sibling, Color::Red);
                    node = parent;
                    continue;
                }

                trace!("delete case 4: red parent at slot {parent}");
                self.store.set_color(sibling, Color::Red);
                self.store.set_color(parent, Color::Black);
                return;
            }

            if self.store.is_black(far) {
                trace!("delete case 5: red near nephew at slot {near}");
                self.store.set_color(sibling, Color::Red);
                self.store.set_color(near, Color::Black);
                self.rotate(sibling, side.opposite());
                sibling = self.store.child(parent, side.opposite());
            }

            trace!("delete case 6: red far nephew under slot {sibling}");
            let far = self.store.child(sibling, side.opposite());
            let parent_color = self.store.color(parent);
            self.store.set_color(sibling, parent_color);
            self.store.set_color(parent, Color::Black);
            self.store.set_color(far, Color::Black);
            self.rotate(parent, side);
            return;
        }
    }
}
