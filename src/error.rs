use core::fmt::{self, Debug, Display};

/// A broken red-black tree invariant, as reported by [`RbMap::verify`].
///
/// Each variant borrows the key of the node where the check failed, so the
/// defect can be located. These signal a bug in the balancing engine, never a
/// caller mistake.
///
/// [`RbMap::verify`]: crate::RbMap::verify
#[derive(Debug, PartialEq, Eq)]
pub enum InvariantError<'a, K> {
    /// The root node is red.
    RedRoot {
        /// Key held by the root
        key: &'a K,
    },
    /// A red node has a red child.
    RedViolation {
        /// Key of the red child
        key: &'a K,
        /// Key of its red parent
        parent: &'a K,
    },
    /// The two subtrees of a node hold different numbers of black nodes on
    /// their paths to the absent children.
    BlackHeight {
        /// Key of the unbalanced node
        key: &'a K,
        /// Black height of the left subtree
        left: usize,
        /// Black height of the right subtree
        right: usize,
    },
    /// A key is not strictly between the keys bounding its subtree.
    OutOfOrder {
        /// Key found in the wrong place
        key: &'a K,
    },
    /// A child's parent back-reference does not name the node that links it.
    BrokenParentLink {
        /// Key of the child with the stale back-reference
        key: &'a K,
    },
    /// A node's cached subtree length disagrees with its children.
    SubtreeLen {
        /// Key of the node
        key: &'a K,
        /// Length cached on the node
        recorded: usize,
        /// Length counted from the children
        counted: usize,
    },
    /// The map's length disagrees with the number of live nodes.
    LenMismatch {
        /// Length the map reports
        recorded: usize,
        /// Nodes actually found
        counted: usize,
    },
}

impl<'a, K> InvariantError<'a, K> {
    /// Key of the node where the violation was found, if the violation is
    /// tied to a single node.
    pub fn key(&self) -> Option<&'a K> {
        match *self {
            InvariantError::RedRoot { key }
            | InvariantError::RedViolation { key, .. }
            | InvariantError::BlackHeight { key, .. }
            | InvariantError::OutOfOrder { key }
            | InvariantError::BrokenParentLink { key }
            | InvariantError::SubtreeLen { key, .. } => Some(key),
            InvariantError::LenMismatch { .. } => None,
        }
    }
}

impl<K: Debug> Display for InvariantError<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantError::RedRoot { key } => write!(f, "root {key:?} is red"),
            InvariantError::RedViolation { key, parent } => {
                write!(f, "red node {key:?} has red parent {parent:?}")
            }
            InvariantError::BlackHeight { key, left, right } => write!(
                f,
                "node {key:?} has black height {left} on the left and {right} on the right"
            ),
            InvariantError::OutOfOrder { key } => write!(f, "key {key:?} is out of order"),
            InvariantError::BrokenParentLink { key } => {
                write!(f, "node {key:?} does not point back at its parent")
            }
            InvariantError::SubtreeLen {
                key,
                recorded,
                counted,
            } => write!(
                f,
                "node {key:?} records subtree length {recorded} but has {counted}"
            ),
            InvariantError::LenMismatch { recorded, counted } => {
                write!(f, "map reports {recorded} entries but holds {counted}")
            }
        }
    }
}

impl<K: Debug> core::error::Error for InvariantError<'_, K> {}
