use crate::element::Element;
use smartstring::alias::String as SmartString;

pub const TEXT_NODE_NAME: &str = "#text";

/// Slot index plus the generation of the slot when the node was created.
///
/// Ids kept past `dispose` stop resolving once the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
}

/// Leaf holding text content; it never gets a native object of its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    text: SmartString,
}

impl TextNode {
    pub fn new(text: &str) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

pub enum Node {
    Element(Element),
    Text(TextNode),
}

impl Node {
    pub fn text(content: &str) -> Self {
        Self::Text(TextNode::new(content))
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Element(_) => NodeType::Element,
            Node::Text(_) => NodeType::Text,
        }
    }

    /// Tag name for elements, `#text` for text nodes
    pub fn node_name(&self) -> &str {
        match self {
            Node::Element(element) => element.tag_name(),
            Node::Text(_) => TEXT_NODE_NAME,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }
}
