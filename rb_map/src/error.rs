use crate::node::NodePos;

/// Result type of the map queries.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by the queries of [`RbMap`](crate::RbMap).
///
/// None of them are produced by a mutating call, so a failed query never leaves
/// the map in a different state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The query needs at least one entry but the map is empty.
    #[error("the map is empty")]
    EmptyTree,
    /// The requested key is not in the map.
    #[error("key not found")]
    KeyNotFound,
    /// The key holds the minimum of the map.
    #[error("no predecessor: the key is the minimum")]
    NoPredecessor,
    /// The key holds the maximum of the map.
    #[error("no successor: the key is the maximum")]
    NoSuccessor,
}

/// Precondition failures of the rotation primitive.
///
/// The rebalancing code only rotates around nodes whose shape it has already
/// checked, so any of these means the tree is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum RotationError {
    #[error("rotation target is not a live node")]
    NullRotationTarget,
    #[error("invalid rotation direction, only left and right are valid")]
    InvalidDirection,
    #[error("{direction:?} rotation impossible, the lifted child is missing")]
    RotationImpossible { direction: NodePos },
}

/// First broken property found by [`RbMap::check_invariants`](crate::RbMap::check_invariants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("keys are not in binary search tree order")]
    UnorderedKeys,
    #[error("the root is red")]
    RedRoot,
    #[error("a red node has a red child")]
    RedRedEdge,
    #[error("paths to leaves have different black heights ({left} vs {right})")]
    BlackHeightMismatch { left: usize, right: usize },
    #[error("a child does not point back to its parent")]
    BrokenParentLink,
    #[error("the map holds {stored} entries but {reachable} are reachable from the root")]
    CountMismatch { stored: usize, reachable: usize },
}
