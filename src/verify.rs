use crate::{
    error::InvariantError,
    node::{NIL, Side},
    tree::RbTree,
};

impl<K: Ord, V> RbTree<K, V> {
    /// Re-derives every structural invariant from scratch. O(n).
    pub(crate) fn verify(&self) -> Result<(), InvariantError<'_, K>> {
        let live = self.store.live_count();
        if live != self.len {
            return Err(InvariantError::LenMismatch {
                recorded: self.len,
                counted: live,
            });
        }

        if self.root == NIL {
            return Ok(());
        }

        let root = self.store.node(self.root);
        if self.store.is_red(self.root) {
            return Err(InvariantError::RedRoot { key: &root.key });
        }
        if root.parent != NIL {
            return Err(InvariantError::BrokenParentLink { key: &root.key });
        }

        let (_, counted) = self.verify_subtree(self.root, None, None)?;
        if counted != self.len {
            return Err(InvariantError::LenMismatch {
                recorded: self.len,
                counted,
            });
        }
        Ok(())
    }

    /// Checks the subtree at `idx` whose keys must lie strictly between
    /// `lower` and `upper`. Returns its black height (absent children count
    /// as one) and its node count.
    fn verify_subtree<'a>(
        &'a self,
        idx: usize,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
    ) -> Result<(usize, usize), InvariantError<'a, K>> {
        if idx == NIL {
            return Ok((1, 0));
        }

        let node = self.store.node(idx);
        let key = &node.key;

        if lower.is_some_and(|lower| key <= lower) || upper.is_some_and(|upper| key >= upper) {
            return Err(InvariantError::OutOfOrder { key });
        }

        for side in [Side::Left, Side::Right] {
            let child = self.store.child(idx, side);
            if child == NIL {
                continue;
            }
            let child_node = self.store.node(child);
            if child_node.parent != idx {
                return Err(InvariantError::BrokenParentLink {
                    key: &child_node.key,
                });
            }
            if self.store.is_red(idx) && self.store.is_red(child) {
                return Err(InvariantError::RedViolation {
                    key: &child_node.key,
                    parent: key,
                });
            }
        }

        let (left_height, left_len) = self.verify_subtree(node.left, lower, Some(key))?;
        let (right_height, right_len) = self.verify_subtree(node.right, Some(key), upper)?;

        if left_height != right_height {
            return Err(InvariantError::BlackHeight {
                key,
                left: left_height,
                right: right_height,
            });
        }

        let counted = 1 + left_len + right_len;
        if node.subtree_len != counted {
            return Err(InvariantError::SubtreeLen {
                key,
                recorded: node.subtree_len,
                counted,
            });
        }

        let height = if self.store.is_black(idx) {
            left_height + 1
        } else {
            left_height
        };
        Ok((height, counted))
    }
}
