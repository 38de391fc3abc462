mod stub;

pub use stub::{StubLog, StubView, stub_factory, stub_factory_with_log};

use crate::value::AttrValue;
use smartstring::alias::String as SmartString;
use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// Toolkit-assigned identity of a native object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewHandle(pub u64);

/// Event delivered by a native object to its listeners
#[derive(Debug, Clone)]
pub struct ViewEvent {
    pub name: SmartString,
    pub payload: AttrValue,
}

/// Listener callback. Two listeners are the same listener only if they
/// share the same allocation, so `off` must be given a clone of the
/// handle passed to `on`.
#[derive(Clone)]
pub struct EventListener(Rc<dyn Fn(&ViewEvent)>);

impl EventListener {
    pub fn new(callback: impl Fn(&ViewEvent) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    pub fn call(&self, event: &ViewEvent) {
        (self.0)(event)
    }
}

impl PartialEq for EventListener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for EventListener {}

impl fmt::Debug for EventListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventListener({:p})", Rc::as_ptr(&self.0))
    }
}

/// Capabilities the reconciler needs from a native toolkit object.
///
/// Implemented by adapters over the real toolkit and by [`StubView`].
pub trait NativeView {
    fn handle(&self) -> ViewHandle;

    /// Label of the underlying native kind
    fn type_name(&self) -> &str;

    fn get_property(&self, name: &str) -> Option<AttrValue>;

    fn set_property(&mut self, name: &str, value: AttrValue);

    /// Insert `child` at `index` in the native child list; an index past
    /// the end appends
    fn insert_child(&mut self, index: usize, child: &dyn NativeView);

    fn remove_child(&mut self, child: &dyn NativeView);

    /// Bind `listener` to `event`; binding the same listener twice is a no-op
    fn add_event_listener(&mut self, event: &str, listener: EventListener);

    fn remove_event_listener(&mut self, event: &str, listener: &EventListener);

    fn fire_event(&self, event: &str, payload: AttrValue);

    fn as_any(&self) -> &dyn Any;
}

/// Zero-argument native object constructor
pub type ViewFactory = Arc<dyn Fn() -> Box<dyn NativeView> + Send + Sync>;

/// Late-bound access to a [`ViewFactory`], called only when the factory is needed
pub type FactoryResolver = Arc<dyn Fn() -> ViewFactory + Send + Sync>;

pub fn view_factory<F>(create: F) -> ViewFactory
where
    F: Fn() -> Box<dyn NativeView> + Send + Sync + 'static,
{
    Arc::new(create)
}

/// Resolver that always hands out the given factory
pub fn resolve_to(factory: ViewFactory) -> FactoryResolver {
    Arc::new(move || factory.clone())
}
