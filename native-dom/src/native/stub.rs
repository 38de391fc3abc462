use super::{EventListener, NativeView, ViewEvent, ViewFactory, ViewHandle, view_factory};
use crate::value::AttrValue;
use parking_lot::Mutex;
use smartstring::alias::String as SmartString;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// Shared operation log, filled by every [`StubView`] created with it
pub type StubLog = Arc<Mutex<Vec<String>>>;

/// In-memory native object for tests and debugging
///
/// Records properties, the native child list and listeners instead of
/// driving a real toolkit.
pub struct StubView {
    handle: ViewHandle,
    type_name: SmartString,
    properties: HashMap<SmartString, AttrValue>,
    children: Vec<ViewHandle>,
    listeners: HashMap<SmartString, Vec<EventListener>>,
    log: Option<StubLog>,
}

impl StubView {
    pub fn new(type_name: &str) -> Self {
        Self {
            handle: ViewHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed)),
            type_name: type_name.into(),
            properties: HashMap::new(),
            children: Vec::new(),
            listeners: HashMap::new(),
            log: None,
        }
    }

    pub fn with_log(type_name: &str, log: StubLog) -> Self {
        let mut view = Self::new(type_name);
        view.log = Some(log);
        view.record(&format!("create {}({})", type_name, view.handle.0));
        view
    }

    /// Downcast a native object created by a stub factory
    pub fn from_view(view: &dyn NativeView) -> Option<&StubView> {
        view.as_any().downcast_ref::<StubView>()
    }

    /// Native child list, in native order
    pub fn children(&self) -> &[ViewHandle] {
        &self.children
    }

    pub fn property(&self, name: &str) -> Option<&AttrValue> {
        self.properties.get(name)
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }

    fn record(&self, msg: &str) {
        tracing::trace!(view = self.handle.0, "{}", msg);
        if let Some(log) = &self.log {
            log.lock().push(msg.to_string());
        }
    }
}

impl NativeView for StubView {
    fn handle(&self) -> ViewHandle {
        self.handle
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn get_property(&self, name: &str) -> Option<AttrValue> {
        self.properties.get(name).cloned()
    }

    fn set_property(&mut self, name: &str, value: AttrValue) {
        self.record(&format!(
            "set {}.{} = {}",
            self.handle.0,
            name,
            value.to_display_string()
        ));
        self.properties.insert(name.into(), value);
    }

    fn insert_child(&mut self, index: usize, child: &dyn NativeView) {
        let child = child.handle();
        let index = index.min(self.children.len());
        self.record(&format!("insert {} into {} at {}", child.0, self.handle.0, index));
        self.children.insert(index, child);
    }

    fn remove_child(&mut self, child: &dyn NativeView) {
        let child = child.handle();
        if let Some(pos) = self.children.iter().position(|h| *h == child) {
            self.record(&format!("remove {} from {}", child.0, self.handle.0));
            self.children.remove(pos);
        }
    }

    fn add_event_listener(&mut self, event: &str, listener: EventListener) {
        let list = self.listeners.entry(event.into()).or_default();
        if !list.contains(&listener) {
            list.push(listener);
        }
    }

    fn remove_event_listener(&mut self, event: &str, listener: &EventListener) {
        if let Some(list) = self.listeners.get_mut(event) {
            list.retain(|l| l != listener);
        }
    }

    fn fire_event(&self, event: &str, payload: AttrValue) {
        let Some(list) = self.listeners.get(event) else {
            return;
        };
        let evt = ViewEvent {
            name: event.into(),
            payload,
        };
        // Listeners may be removed while firing
        for listener in list.clone() {
            listener.call(&evt);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Factory producing fresh [`StubView`]s of the given native kind
pub fn stub_factory(type_name: &str) -> ViewFactory {
    let type_name: SmartString = type_name.into();
    view_factory(move || Box::new(StubView::new(&type_name)))
}

/// Like [`stub_factory`], recording every native operation into `log`
pub fn stub_factory_with_log(type_name: &str, log: StubLog) -> ViewFactory {
    let type_name: SmartString = type_name.into();
    view_factory(move || Box::new(StubView::with_log(&type_name, log.clone())))
}
