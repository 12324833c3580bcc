use thiserror::Error;

use crate::NodeId;

/// Failures of tree operations. Every failing operation leaves the tree unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("reference node {reference:?} is not a child of {parent:?}")]
    InvalidReference { parent: NodeId, reference: NodeId },

    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),

    #[error("node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("node {node:?} cannot be inserted into {parent:?}")]
    HierarchyRequest { parent: NodeId, node: NodeId },

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {0:?} carries no character data")]
    NotCharacterData(NodeId),
}

pub type Result<T, E = TreeError> = core::result::Result<T, E>;
