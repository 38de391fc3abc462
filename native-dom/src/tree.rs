//! Logical tree with native synchronization.
//!
//! Structural changes go through [`NodeArena`]; this layer mirrors them onto
//! the native objects of the affected elements. Text children never get a
//! native object: they set the parent's text property instead. Element
//! children are inserted into the parent's native child list unless the
//! attachment policy of the pair says otherwise.

use crate::element::{AttachmentPolicy, Element, ViewMetadata};
use crate::error::{DomError, Result};
use crate::native::{FactoryResolver, NativeView};
use crate::node::{Node, NodeArena, NodeId, NodeType, TextNode};
use crate::platform::Platform;
use crate::registry::ElementRegistry;

pub struct ViewTree {
    nodes: NodeArena,
    platform: Platform,
}

impl ViewTree {
    pub fn new(platform: Platform) -> Self {
        Self {
            nodes: NodeArena::new(),
            platform,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Read-only structural view (children, parents, siblings)
    pub fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    /// Create an element for a registered tag. Fails if the tag is unknown.
    pub fn create_element(&mut self, registry: &ElementRegistry, tag_name: &str) -> Result<NodeId> {
        let entry = registry.get_element(tag_name)?;
        let element = Element::new(tag_name, entry.resolve_factory, entry.meta, self.platform)
            .with_class(entry.element_class);
        Ok(self.nodes.create(Node::Element(element)))
    }

    /// Create an element from an explicit factory and metadata
    pub fn create_element_with(
        &mut self,
        tag_name: &str,
        resolve_factory: FactoryResolver,
        meta: ViewMetadata,
    ) -> NodeId {
        let element = Element::new(tag_name, resolve_factory, meta, self.platform);
        self.nodes.create(Node::Element(element))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.nodes.create(Node::text(text))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id)?.as_element()
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id)?.as_element_mut()
    }

    pub fn text(&self, id: NodeId) -> Option<&TextNode> {
        self.nodes.get(id)?.as_text()
    }

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.nodes.node_type(id)
    }

    pub fn child_nodes(&self, id: NodeId) -> &[NodeId] {
        self.nodes.child_nodes(id)
    }

    pub fn item(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.nodes.item(parent, index)
    }

    pub fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.parent_node(id)
    }

    /// Native object of an element, created on first call
    pub fn ensure_materialized(&mut self, id: NodeId) -> Result<&mut dyn NativeView> {
        let node = self.nodes.get_mut(id).ok_or(DomError::NodeNotFound(id))?;
        match node.as_element_mut() {
            Some(element) => Ok(element.ensure_materialized()),
            None => Err(DomError::NotAnElement(id)),
        }
    }

    /// Native object of an element if it already exists
    pub fn peer(&self, id: NodeId) -> Option<&dyn NativeView> {
        self.element(id)?.peer()
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or last) and mirror the change
    /// onto the native hierarchy. A child that already has a parent is
    /// removed from it first, natively included.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<()> {
        let reference = self.nodes.check_insert(parent, child, reference)?;

        if let Some(old_parent) = self.nodes.parent_node(child) {
            self.remove_child(old_parent, child)?;
        }
        self.nodes.insert_before(parent, child, reference)?;

        if let Some(Node::Text(text)) = self.nodes.get(child) {
            let content = text.text().to_string();
            if let Some(element) = self.element_mut(parent) {
                element.update_text(&content);
            }
            return Ok(());
        }

        self.attach_native(parent, child);
        Ok(())
    }

    /// Remove `child` from `parent`, taking its native object out of the
    /// parent's native child list if it was placed there
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.nodes.remove_child(parent, child)?;

        if let Some((Node::Element(parent_el), Node::Element(child_el))) =
            self.nodes.get_pair_mut(parent, child)
        {
            if child_el.is_attached() {
                if let (Some(parent_view), Some(child_view)) =
                    (parent_el.peer_mut(), child_el.peer())
                {
                    parent_view.remove_child(child_view);
                    tracing::debug!(
                        parent = parent_view.handle().0,
                        child = child_view.handle().0,
                        "removed native child"
                    );
                }
                child_el.set_attached(false);
            }
        }
        Ok(())
    }

    /// Free a parentless subtree. Native objects are released with it.
    pub fn dispose(&mut self, id: NodeId) -> Result<()> {
        let removed = self.nodes.dispose(id)?;
        tracing::debug!(node = ?id, count = removed.len(), "disposed subtree");
        Ok(())
    }

    /// Position among the preceding siblings whose native objects sit in
    /// the parent's native child list
    fn native_index(&self, parent: NodeId, child: NodeId) -> usize {
        self.nodes
            .child_nodes(parent)
            .iter()
            .take_while(|id| **id != child)
            .filter(|id| self.element(**id).is_some_and(Element::is_attached))
            .count()
    }

    fn attach_native(&mut self, parent: NodeId, child: NodeId) {
        let (Some(parent_el), Some(child_el)) = (self.element(parent), self.element(child)) else {
            return;
        };
        if !AttachmentPolicy::embeds(parent_el.attachment(), child_el.attachment()) {
            tracing::debug!(
                parent = parent_el.tag_name(),
                child = child_el.tag_name(),
                "keeping child out of the native hierarchy"
            );
            return;
        }

        let index = self.native_index(parent, child);
        let Some((Node::Element(parent_el), Node::Element(child_el))) =
            self.nodes.get_pair_mut(parent, child)
        else {
            return;
        };

        let child_view = child_el.ensure_materialized();
        let parent_view = parent_el.ensure_materialized();
        parent_view.insert_child(index, child_view);
        tracing::debug!(
            parent = parent_view.handle().0,
            child = child_view.handle().0,
            index,
            "inserted native child"
        );
        child_el.set_attached(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{StubView, ViewHandle, resolve_to, stub_factory};
    use crate::registry::ElementOptions;
    use crate::value::AttrValue;

    fn registry() -> ElementRegistry {
        let registry = ElementRegistry::new();
        for (tag, type_name) in [
            ("View", "Ti.UI.View"),
            ("Label", "Ti.UI.Label"),
            ("Window", "Ti.UI.Window"),
        ] {
            registry.register_element(ElementOptions::new(
                tag,
                resolve_to(stub_factory(type_name)),
                ViewMetadata::new(type_name),
            ));
        }
        registry
    }

    fn native_children(tree: &ViewTree, id: NodeId) -> Vec<ViewHandle> {
        tree.peer(id)
            .and_then(StubView::from_view)
            .map(|v| v.children().to_vec())
            .unwrap_or_default()
    }

    fn handle(tree: &mut ViewTree, id: NodeId) -> ViewHandle {
        tree.ensure_materialized(id).unwrap().handle()
    }

    #[test]
    fn test_create_element_unknown_tag() {
        let mut tree = ViewTree::new(Platform::Ios);
        assert!(matches!(
            tree.create_element(&registry(), "scroll-view"),
            Err(DomError::ElementNotRegistered(_))
        ));
    }

    #[test]
    fn test_text_child_updates_parent_text() {
        let registry = registry();
        let mut tree = ViewTree::new(Platform::Ios);
        let label = tree.create_element(&registry, "Label").unwrap();
        let text = tree.create_text("hello");

        tree.insert_before(label, text, None).unwrap();

        assert_eq!(tree.item(label, 0), Some(text));
        assert!(!tree.element(label).unwrap().is_materialized());
        assert_eq!(
            tree.element(label).unwrap().get_attribute("text"),
            Some(AttrValue::from("hello"))
        );
        assert!(native_children(&tree, label).is_empty());
    }

    #[test]
    fn test_appending_materializes_parent_and_child() {
        let registry = registry();
        let mut tree = ViewTree::new(Platform::Ios);
        let parent = tree.create_element(&registry, "View").unwrap();
        let child = tree.create_element(&registry, "View").unwrap();

        tree.append_child(parent, child).unwrap();

        assert!(tree.element(parent).unwrap().is_materialized());
        assert!(tree.element(child).unwrap().is_attached());
        let child_handle = handle(&mut tree, child);
        assert_eq!(native_children(&tree, parent), vec![child_handle]);
    }

    #[test]
    fn test_detached_child_stays_out_of_native_list() {
        let registry = registry();
        let mut tree = ViewTree::new(Platform::Ios);
        let parent = tree.create_element(&registry, "View").unwrap();
        let window = tree.create_element(&registry, "Window").unwrap();
        tree.element_mut(window).unwrap().meta_mut().detached = Some(true);

        tree.append_child(parent, window).unwrap();

        assert_eq!(tree.item(parent, 0), Some(window));
        assert!(!tree.element(window).unwrap().is_attached());
        tree.ensure_materialized(parent).unwrap();
        assert!(native_children(&tree, parent).is_empty());
    }

    #[test]
    fn test_parent_detaching_children() {
        let registry = registry();
        let mut tree = ViewTree::new(Platform::Ios);
        let parent = tree.create_element(&registry, "View").unwrap();
        let child = tree.create_element(&registry, "View").unwrap();
        tree.element_mut(parent).unwrap().meta_mut().detach_children = Some(true);

        tree.append_child(parent, child).unwrap();

        tree.ensure_materialized(parent).unwrap();
        assert!(native_children(&tree, parent).is_empty());
    }

    #[test]
    fn test_native_index_skips_detached_and_text_siblings() {
        let registry = registry();
        let mut tree = ViewTree::new(Platform::Ios);
        let parent = tree.create_element(&registry, "View").unwrap();
        let text = tree.create_text("caption");
        let window = tree.create_element(&registry, "Window").unwrap();
        tree.element_mut(window).unwrap().meta_mut().detached = Some(true);
        let a = tree.create_element(&registry, "View").unwrap();
        let b = tree.create_element(&registry, "View").unwrap();

        tree.append_child(parent, text).unwrap();
        tree.append_child(parent, window).unwrap();
        tree.append_child(parent, b).unwrap();
        tree.insert_before(parent, a, Some(b)).unwrap();

        assert_eq!(tree.child_nodes(parent), &[text, window, a, b]);
        let expected = vec![handle(&mut tree, a), handle(&mut tree, b)];
        assert_eq!(native_children(&tree, parent), expected);
    }

    #[test]
    fn test_moving_child_between_parents() {
        let registry = registry();
        let mut tree = ViewTree::new(Platform::Ios);
        let first = tree.create_element(&registry, "View").unwrap();
        let second = tree.create_element(&registry, "View").unwrap();
        let child = tree.create_element(&registry, "View").unwrap();

        tree.append_child(first, child).unwrap();
        tree.append_child(second, child).unwrap();

        let child_handle = handle(&mut tree, child);
        assert!(native_children(&tree, first).is_empty());
        assert_eq!(native_children(&tree, second), vec![child_handle]);
        assert_eq!(tree.parent_node(child), Some(second));
    }

    #[test]
    fn test_remove_detached_child_leaves_native_list_alone() {
        let registry = registry();
        let mut tree = ViewTree::new(Platform::Ios);
        let parent = tree.create_element(&registry, "View").unwrap();
        let attached = tree.create_element(&registry, "View").unwrap();
        let window = tree.create_element(&registry, "Window").unwrap();
        tree.element_mut(window).unwrap().meta_mut().detached = Some(true);

        tree.append_child(parent, attached).unwrap();
        tree.append_child(parent, window).unwrap();
        tree.ensure_materialized(window).unwrap();
        tree.remove_child(parent, window).unwrap();

        let attached_handle = handle(&mut tree, attached);
        assert_eq!(native_children(&tree, parent), vec![attached_handle]);
        assert_eq!(tree.child_nodes(parent), &[attached]);
    }

    #[test]
    fn test_dispose_requires_removal() {
        let registry = registry();
        let mut tree = ViewTree::new(Platform::Ios);
        let parent = tree.create_element(&registry, "View").unwrap();
        let child = tree.create_element(&registry, "View").unwrap();
        tree.append_child(parent, child).unwrap();

        assert!(matches!(
            tree.dispose(child),
            Err(DomError::StillAttached(_))
        ));
        tree.remove_child(parent, child).unwrap();
        tree.dispose(child).unwrap();
        assert!(tree.get(child).is_none());
        assert!(matches!(
            tree.ensure_materialized(child),
            Err(DomError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_disposed_id_does_not_reach_reused_slot() {
        let registry = registry();
        let mut tree = ViewTree::new(Platform::Ios);
        let parent = tree.create_element(&registry, "View").unwrap();
        let old = tree.create_element(&registry, "View").unwrap();
        tree.dispose(old).unwrap();
        let label = tree.create_element(&registry, "Label").unwrap();

        assert!(matches!(
            tree.append_child(parent, old),
            Err(DomError::NodeNotFound(_))
        ));
        assert!(tree.child_nodes(parent).is_empty());
        assert!(tree.element(old).is_none());
        assert_eq!(tree.element(label).map(Element::tag_name), Some("Label"));
    }

    #[test]
    fn test_ensure_materialized_rejects_text() {
        let mut tree = ViewTree::new(Platform::Ios);
        let text = tree.create_text("x");
        assert!(matches!(
            tree.ensure_materialized(text),
            Err(DomError::NotAnElement(_))
        ));
    }
}
