use log::trace;

use super::RbTree;
use crate::node::{NIL, Side};

impl<K, V> RbTree<K, V> {
    /// Single rotation moving `pivot` down toward `dir`.
    ///
    /// The child on the opposite side is promoted into `pivot`'s position and
    /// its inner subtree is re-hung under `pivot`. Colors are left alone;
    /// callers recolor as part of the fixup case that rotated.
    pub(crate) fn rotate(&mut self, pivot: usize, dir: Side) {
        if pivot == NIL {
            return;
        }

        let promoted = self.store.child(pivot, dir.opposite());
        debug_assert_ne!(promoted, NIL, "rotation without a child to promote");
        if promoted == NIL {
            return;
        }
        trace!("rotate {dir:?} at slot {pivot}, promoting slot {promoted}");

        let inner = self.store.child(promoted, dir);
        self.store.set_child(pivot, dir.opposite(), inner);
        self.store.set_parent(inner, pivot);

        let parent = self.store.parent(pivot);
        self.store.set_parent(promoted, parent);
        self.replace_child(parent, pivot, promoted);

        self.store.set_child(promoted, dir, pivot);
        self.store.set_parent(pivot, promoted);

        self.store.refresh_subtree_len(pivot);
        self.store.refresh_subtree_len(promoted);
    }
}
