mod arena;
mod types;

pub use arena::{ChildList, NodeArena};
pub use types::{Node, NodeId, NodeType, TEXT_NODE_NAME, TextNode};
