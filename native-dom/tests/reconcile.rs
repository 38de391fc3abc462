use native_dom::native::{StubLog, StubView, resolve_to, stub_factory, stub_factory_with_log};
use native_dom::{
    AttrValue, ElementClass, ElementOptions, ElementRegistry, EventListener, NativeView, NodeId,
    Platform, ViewHandle, ViewMetadata, ViewTree,
};
use parking_lot::Mutex;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn registry() -> ElementRegistry {
    let registry = ElementRegistry::new();
    let elements = [
        ("View", ViewMetadata::new("Ti.UI.View")),
        ("Label", ViewMetadata::new("Ti.UI.Label")),
        (
            "Button",
            ViewMetadata::new("Ti.UI.Button").with_text_property("title"),
        ),
        (
            "NavigationWindow",
            ViewMetadata::new("Ti.UI.iOS.NavigationWindow").with_detached(true),
        ),
        (
            "TabGroup",
            ViewMetadata::new("Ti.UI.TabGroup").with_detach_children(true),
        ),
    ];
    for (tag, meta) in elements {
        let type_name = meta.type_name.clone().unwrap_or_default();
        registry.register_element(ElementOptions::new(
            tag,
            resolve_to(stub_factory(&type_name)),
            meta,
        ));
    }
    registry
}

fn stub(tree: &ViewTree, id: NodeId) -> &StubView {
    tree.peer(id)
        .and_then(StubView::from_view)
        .expect("materialized stub view")
}

fn handles(tree: &mut ViewTree, ids: &[NodeId]) -> Vec<ViewHandle> {
    ids.iter()
        .map(|id| tree.ensure_materialized(*id).unwrap().handle())
        .collect()
}

fn spy() -> (Rc<Cell<u32>>, EventListener) {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    (count, EventListener::new(move |_| c.set(c.get() + 1)))
}

#[test]
fn test_attributes_and_listeners_flush_on_materialization() {
    init_tracing();
    let registry = registry();
    let mut tree = ViewTree::new(Platform::Ios);
    let view = tree.create_element(&registry, "view").unwrap();
    let (clicks, listener) = spy();

    let element = tree.element_mut(view).unwrap();
    element.set_attribute("backgroundColor", "#000000");
    element.on("click", listener);

    tree.ensure_materialized(view)
        .unwrap()
        .fire_event("click", AttrValue::Nil);

    assert_eq!(clicks.get(), 1);
    assert_eq!(
        stub(&tree, view).property("backgroundColor"),
        Some(&AttrValue::from("#000000"))
    );
}

#[test]
fn test_text_children_set_the_resolved_text_property() {
    let registry = registry();
    let mut tree = ViewTree::new(Platform::Ios);

    for (tag, property) in [("Label", "text"), ("Button", "title")] {
        let element = tree.create_element(&registry, tag).unwrap();
        let text = tree.create_text("text");
        tree.insert_before(element, text, None).unwrap();

        tree.ensure_materialized(element).unwrap();
        let view = stub(&tree, element);
        assert_eq!(view.property(property), Some(&AttrValue::from("text")));
        assert!(view.children().is_empty());
    }
}

#[test]
fn test_insert_before_matches_native_order() {
    let registry = registry();
    let mut tree = ViewTree::new(Platform::Ios);
    let parent = tree.create_element(&registry, "View").unwrap();
    let [a, b, c, d] = [(); 4].map(|_| tree.create_element(&registry, "View").unwrap());

    tree.append_child(parent, a).unwrap();
    tree.append_child(parent, b).unwrap();
    tree.append_child(parent, c).unwrap();
    tree.insert_before(parent, d, Some(b)).unwrap();

    assert_eq!(tree.item(parent, 0), Some(a));
    assert_eq!(tree.item(parent, 1), Some(d));
    assert_eq!(tree.item(parent, 2), Some(b));
    assert_eq!(tree.item(parent, 3), Some(c));
    assert_eq!(tree.item(parent, 4), None);

    let expected = handles(&mut tree, &[a, d, b, c]);
    assert_eq!(stub(&tree, parent).children(), expected.as_slice());
}

#[test]
fn test_detached_elements_never_reach_native_parents() {
    let registry = registry();
    let mut tree = ViewTree::new(Platform::Ios);
    let parent = tree.create_element(&registry, "View").unwrap();
    let window = tree.create_element(&registry, "navigation-window").unwrap();
    let sibling = tree.create_element(&registry, "View").unwrap();

    tree.append_child(parent, window).unwrap();
    tree.append_child(parent, sibling).unwrap();

    assert_eq!(tree.child_nodes(parent), &[window, sibling]);
    let expected = handles(&mut tree, &[sibling]);
    assert_eq!(stub(&tree, parent).children(), expected.as_slice());
}

#[test]
fn test_detach_children_parent_keeps_native_list_empty() {
    let registry = registry();
    let mut tree = ViewTree::new(Platform::Ios);
    let tabs = tree.create_element(&registry, "tab-group").unwrap();
    let first = tree.create_element(&registry, "View").unwrap();
    let second = tree.create_element(&registry, "View").unwrap();

    tree.append_child(tabs, first).unwrap();
    tree.insert_before(tabs, second, Some(first)).unwrap();

    assert_eq!(tree.child_nodes(tabs), &[second, first]);
    tree.ensure_materialized(tabs).unwrap();
    assert!(stub(&tree, tabs).children().is_empty());
}

#[test]
fn test_remove_child_updates_both_trees() {
    let registry = registry();
    let mut tree = ViewTree::new(Platform::Ios);
    let parent = tree.create_element(&registry, "View").unwrap();
    let [a, b, c] = [(); 3].map(|_| tree.create_element(&registry, "View").unwrap());

    tree.ensure_materialized(parent).unwrap();
    assert!(stub(&tree, parent).children().is_empty());

    for child in [a, b, c] {
        tree.append_child(parent, child).unwrap();
    }
    tree.remove_child(parent, b).unwrap();

    assert_eq!(tree.child_nodes(parent), &[a, c]);
    assert_eq!(tree.item(parent, 1), Some(c));
    assert_eq!(tree.parent_node(b), None);
    let expected = handles(&mut tree, &[a, c]);
    assert_eq!(stub(&tree, parent).children(), expected.as_slice());

    // Inserting after a removal lands at the contiguous native position
    tree.insert_before(parent, b, Some(c)).unwrap();
    let expected = handles(&mut tree, &[a, b, c]);
    assert_eq!(stub(&tree, parent).children(), expected.as_slice());
}

#[test]
fn test_listener_lifecycle_across_materialization() {
    let registry = registry();
    let mut tree = ViewTree::new(Platform::Ios);
    let button = tree.create_element(&registry, "Button").unwrap();
    let (early, early_listener) = spy();
    let (late, late_listener) = spy();

    tree.element_mut(button)
        .unwrap()
        .on("click", early_listener.clone());
    tree.ensure_materialized(button).unwrap();
    tree.element_mut(button)
        .unwrap()
        .on("click", late_listener.clone());

    let fire = |tree: &mut ViewTree| {
        tree.ensure_materialized(button)
            .unwrap()
            .fire_event("click", AttrValue::Nil)
    };

    fire(&mut tree);
    fire(&mut tree);
    assert_eq!((early.get(), late.get()), (2, 2));

    let element = tree.element_mut(button).unwrap();
    element.off("click", &early_listener);
    element.off("click", &late_listener);
    fire(&mut tree);
    assert_eq!((early.get(), late.get()), (2, 2));
}

#[test]
fn test_namespaced_attributes_follow_tree_platform() {
    let registry = registry();
    let mut tree = ViewTree::new(Platform::Android);
    let view = tree.create_element(&registry, "View").unwrap();

    let element = tree.element_mut(view).unwrap();
    element.set_attribute_ns("top", 5, Some("android"));
    element.set_attribute_ns("left", 7, Some("ios"));
    assert_eq!(element.get_attribute("top"), Some(AttrValue::Int(5)));
    assert_eq!(element.get_attribute("left"), None);

    tree.ensure_materialized(view).unwrap();
    let view = stub(&tree, view);
    assert_eq!(view.property("top"), Some(&AttrValue::Int(5)));
    assert_eq!(view.property("left"), None);
}

struct NavigationWindow;

impl ElementClass for NavigationWindow {
    fn materialized(&self, peer: &mut dyn NativeView) {
        peer.set_property("navBarHidden", AttrValue::Bool(true));
    }
}

#[test]
fn test_element_class_from_registry() {
    let log: StubLog = Arc::new(Mutex::new(Vec::new()));
    let registry = ElementRegistry::new();
    registry.register_element(
        ElementOptions::new(
            "NavigationWindow",
            resolve_to(stub_factory_with_log("Ti.UI.iOS.NavigationWindow", log.clone())),
            ViewMetadata::new("Ti.UI.iOS.NavigationWindow").with_detached(true),
        )
        .with_class(Arc::new(NavigationWindow)),
    );

    let mut tree = ViewTree::new(Platform::Ios);
    let window = tree.create_element(&registry, "navigation-window").unwrap();
    tree.element_mut(window).unwrap().set_attribute("title", "Home");
    tree.ensure_materialized(window).unwrap();

    let view = stub(&tree, window);
    assert_eq!(view.property("navBarHidden"), Some(&AttrValue::Bool(true)));
    assert_eq!(view.property("title"), Some(&AttrValue::from("Home")));

    let entries = log.lock();
    assert_eq!(entries.len(), 3);
    assert!(entries[1].ends_with(".navBarHidden = true"));
    assert!(entries[2].ends_with(".title = Home"));
}
