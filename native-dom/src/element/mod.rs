mod meta;

pub use meta::{Attachment, AttachmentPolicy, DEFAULT_TEXT_PROPERTY, ViewMetadata};

use crate::native::{EventListener, FactoryResolver, NativeView};
use crate::platform::Platform;
use crate::value::AttrValue;
use smartstring::alias::String as SmartString;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-tag customization of how an element's native object is prepared
pub trait ElementClass: Send + Sync {
    /// Runs once on a freshly created peer, before buffered attributes and
    /// listeners are applied
    fn materialized(&self, _peer: &mut dyn NativeView) {}
}

#[derive(Debug, Clone)]
struct PendingAttribute {
    value: AttrValue,
    namespace: Option<SmartString>,
}

/// Attributes and listeners recorded before the native object exists
#[derive(Debug, Default)]
pub struct PendingState {
    attributes: Vec<(SmartString, PendingAttribute)>,
    listeners: HashMap<SmartString, Vec<EventListener>>,
}

impl PendingState {
    fn set(&mut self, name: &str, value: AttrValue, namespace: Option<&str>) {
        let entry = PendingAttribute {
            value,
            namespace: namespace.map(Into::into),
        };
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = entry,
            None => self.attributes.push((name.into(), entry)),
        }
    }

    fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, attr)| &attr.value)
    }

    fn add_listener(&mut self, event: &str, listener: EventListener) {
        let list = self.listeners.entry(event.into()).or_default();
        if !list.contains(&listener) {
            list.push(listener);
        }
    }

    fn remove_listener(&mut self, event: &str, listener: &EventListener) {
        if let Some(list) = self.listeners.get_mut(event) {
            list.retain(|l| l != listener);
            if list.is_empty() {
                self.listeners.remove(event);
            }
        }
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }
}

/// Buffered until the first call to [`Element::ensure_materialized`],
/// live afterwards. There is no way back.
pub enum PeerState {
    Buffered(PendingState),
    Materialized(Box<dyn NativeView>),
}

/// A node backed by a lazily created native object
pub struct Element {
    tag_name: SmartString,
    meta: ViewMetadata,
    resolve_factory: FactoryResolver,
    element_class: Option<Arc<dyn ElementClass>>,
    platform: Platform,
    state: PeerState,
    attached: bool,
}

impl Element {
    pub fn new(
        tag_name: &str,
        resolve_factory: FactoryResolver,
        meta: ViewMetadata,
        platform: Platform,
    ) -> Self {
        Self {
            tag_name: tag_name.into(),
            meta,
            resolve_factory,
            element_class: None,
            platform,
            state: PeerState::Buffered(PendingState::default()),
            attached: false,
        }
    }

    pub fn with_class(mut self, class: Option<Arc<dyn ElementClass>>) -> Self {
        self.element_class = class;
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn meta(&self) -> &ViewMetadata {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut ViewMetadata {
        &mut self.meta
    }

    pub fn attachment(&self) -> AttachmentPolicy {
        self.meta.attachment()
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn state(&self) -> &PeerState {
        &self.state
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self.state, PeerState::Materialized(_))
    }

    /// Whether the peer currently sits in its parent's native child list
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub(crate) fn set_attached(&mut self, attached: bool) {
        self.attached = attached;
    }

    fn targets_platform(&self, namespace: Option<&str>) -> bool {
        namespace.is_none_or(|ns| self.platform.matches_namespace(ns))
    }

    pub fn get_attribute(&self, name: &str) -> Option<AttrValue> {
        self.get_attribute_ns(name, None)
    }

    pub fn get_attribute_ns(&self, name: &str, namespace: Option<&str>) -> Option<AttrValue> {
        if !self.targets_platform(namespace) {
            return None;
        }
        match &self.state {
            PeerState::Buffered(_) => self.get_element_attribute(name),
            PeerState::Materialized(peer) => peer.get_property(name),
        }
    }

    /// Read from the pre-materialization buffer only. Always `None` once
    /// the native object exists.
    pub fn get_element_attribute(&self, name: &str) -> Option<AttrValue> {
        match &self.state {
            PeerState::Buffered(pending) => pending.get(name).cloned(),
            PeerState::Materialized(_) => None,
        }
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<AttrValue>) {
        self.set_attribute_ns(name, value, None);
    }

    /// Writes with a namespace other than the running platform are dropped
    pub fn set_attribute_ns(
        &mut self,
        name: &str,
        value: impl Into<AttrValue>,
        namespace: Option<&str>,
    ) {
        if !self.targets_platform(namespace) {
            tracing::debug!(
                tag = %self.tag_name,
                attribute = name,
                namespace = ?namespace,
                platform = %self.platform,
                "dropping attribute for another platform"
            );
            return;
        }

        let value = value.into();
        match &mut self.state {
            PeerState::Buffered(pending) => {
                tracing::trace!(tag = %self.tag_name, attribute = name, "buffering attribute");
                pending.set(name, value, namespace);
            }
            PeerState::Materialized(peer) => peer.set_property(name, value),
        }
    }

    pub fn on(&mut self, event: &str, listener: EventListener) {
        match &mut self.state {
            PeerState::Buffered(pending) => pending.add_listener(event, listener),
            PeerState::Materialized(peer) => peer.add_event_listener(event, listener),
        }
    }

    pub fn off(&mut self, event: &str, listener: &EventListener) {
        match &mut self.state {
            PeerState::Buffered(pending) => pending.remove_listener(event, listener),
            PeerState::Materialized(peer) => peer.remove_event_listener(event, listener),
        }
    }

    /// Write text content to whichever property this kind of element
    /// displays text through
    pub fn update_text(&mut self, content: &str) {
        let property: SmartString = self.meta.text_property_name().into();
        self.set_attribute(&property, content);
    }

    pub fn peer(&self) -> Option<&dyn NativeView> {
        match &self.state {
            PeerState::Materialized(peer) => Some(peer.as_ref()),
            PeerState::Buffered(_) => None,
        }
    }

    pub fn peer_mut(&mut self) -> Option<&mut dyn NativeView> {
        match &mut self.state {
            PeerState::Materialized(peer) => Some(peer.as_mut()),
            PeerState::Buffered(_) => None,
        }
    }

    /// Return the native object, creating it on first call.
    ///
    /// Creation flushes every buffered attribute and listener onto the new
    /// object exactly once and discards the buffer.
    pub fn ensure_materialized(&mut self) -> &mut dyn NativeView {
        if let PeerState::Buffered(pending) = &mut self.state {
            let pending = std::mem::take(pending);
            let peer = self.create_peer(pending);
            self.state = PeerState::Materialized(peer);
        }

        match &mut self.state {
            PeerState::Materialized(peer) => peer.as_mut(),
            PeerState::Buffered(_) => unreachable!("element state was just materialized"),
        }
    }

    fn create_peer(&self, pending: PendingState) -> Box<dyn NativeView> {
        let factory = (self.resolve_factory)();
        let mut peer = factory();

        if let Some(class) = &self.element_class {
            class.materialized(peer.as_mut());
        }

        let PendingState {
            attributes,
            listeners,
        } = pending;
        let attribute_count = attributes.len();

        for (name, attr) in attributes {
            if self.targets_platform(attr.namespace.as_deref()) {
                peer.set_property(&name, attr.value);
            }
        }
        for (event, list) in listeners {
            for listener in list {
                peer.add_event_listener(&event, listener);
            }
        }

        tracing::debug!(
            tag = %self.tag_name,
            native = peer.type_name(),
            handle = peer.handle().0,
            attributes = attribute_count,
            "materialized native view"
        );
        peer
    }
}
