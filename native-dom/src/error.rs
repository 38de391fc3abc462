use crate::node::NodeId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomError {
    /// No registry entry for the normalized tag name
    #[error("No native view registered for tag <{0}>")]
    ElementNotRegistered(String),

    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Cannot insert {child:?} into {parent:?}: it would become its own ancestor")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Node {0:?} is a leaf and cannot have children")]
    LeafNode(NodeId),

    #[error("Node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("Node {0:?} is still attached to a parent")]
    StillAttached(NodeId),

    #[error("Invalid registry config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DomError>;
