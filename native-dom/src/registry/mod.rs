mod normalize;

pub use normalize::{camelize, normalize_tag_name};

use crate::element::{ElementClass, ViewMetadata};
use crate::error::{DomError, Result};
use crate::native::{FactoryResolver, ViewFactory};
use parking_lot::{Mutex, RwLock, const_mutex};
use smartstring::alias::String as SmartString;
use std::collections::HashMap;
use std::sync::Arc;

static GLOBAL_REGISTRY: Mutex<Option<Arc<ElementRegistry>>> = const_mutex(None);

/// Registration request for one tag
pub struct ElementOptions {
    pub tag_name: SmartString,
    pub resolve_factory: FactoryResolver,
    pub meta: ViewMetadata,
    pub element_class: Option<Arc<dyn ElementClass>>,
}

impl ElementOptions {
    pub fn new(tag_name: &str, resolve_factory: FactoryResolver, meta: ViewMetadata) -> Self {
        Self {
            tag_name: tag_name.into(),
            resolve_factory,
            meta,
            element_class: None,
        }
    }

    pub fn with_class(mut self, class: Arc<dyn ElementClass>) -> Self {
        self.element_class = Some(class);
        self
    }
}

/// Stored registration: how to build the native object and what to know about it
#[derive(Clone)]
pub struct ElementEntry {
    pub resolve_factory: FactoryResolver,
    pub meta: ViewMetadata,
    pub element_class: Option<Arc<dyn ElementClass>>,
}

struct RegistryInner {
    elements: HashMap<SmartString, ElementEntry>,
    default_meta: ViewMetadata,
}

/// Maps normalized tag names to native view factories and metadata.
///
/// Construct one with [`ElementRegistry::new`] and pass it around, or use
/// the shared [`ElementRegistry::global`] instance.
pub struct ElementRegistry {
    inner: RwLock<RegistryInner>,
}

impl ElementRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                elements: HashMap::new(),
                default_meta: ViewMetadata::default(),
            }),
        }
    }

    /// Process-wide instance, created on first access
    pub fn global() -> Arc<ElementRegistry> {
        GLOBAL_REGISTRY
            .lock()
            .get_or_insert_with(|| Arc::new(ElementRegistry::new()))
            .clone()
    }

    /// Drop the process-wide instance; the next [`ElementRegistry::global`]
    /// call starts from an empty registry. Holders of the old `Arc` keep it.
    pub fn reset_global() {
        GLOBAL_REGISTRY.lock().take();
    }

    /// Register a tag. Registering an already known tag keeps the existing
    /// entry, logs a warning and returns `false`.
    pub fn register_element(&self, options: ElementOptions) -> bool {
        let tag = normalize_tag_name(&options.tag_name);
        let mut inner = self.inner.write();

        if inner.elements.contains_key(tag.as_str()) {
            tracing::warn!(
                "Element <{}> already registered. Unregister the current one before trying to register it again.",
                tag
            );
            return false;
        }

        let meta = options.meta.merged_over(&inner.default_meta);
        tracing::debug!(tag = %tag, type_name = ?meta.type_name, "registered element");
        inner.elements.insert(
            tag.into(),
            ElementEntry {
                resolve_factory: options.resolve_factory,
                meta,
                element_class: options.element_class,
            },
        );
        true
    }

    /// Remove a tag, failing if it was never registered
    pub fn unregister_element(&self, tag_name: &str) -> Result<()> {
        let tag = normalize_tag_name(tag_name);
        self.inner
            .write()
            .elements
            .remove(tag.as_str())
            .map(|_| ())
            .ok_or(DomError::ElementNotRegistered(tag))
    }

    /// Check if a tag is registered
    pub fn has_element(&self, tag_name: &str) -> bool {
        let tag = normalize_tag_name(tag_name);
        self.inner.read().elements.contains_key(tag.as_str())
    }

    /// Get a copy of a tag's registration
    pub fn get_element(&self, tag_name: &str) -> Result<ElementEntry> {
        let tag = normalize_tag_name(tag_name);
        self.inner
            .read()
            .elements
            .get(tag.as_str())
            .cloned()
            .ok_or(DomError::ElementNotRegistered(tag))
    }

    /// Resolve the factory for a tag. The resolver runs on every call,
    /// outside the registry lock.
    pub fn get_view_factory(&self, tag_name: &str) -> Result<ViewFactory> {
        let resolve = self.get_element(tag_name)?.resolve_factory;
        Ok(resolve())
    }

    /// Get the metadata stored for a tag
    pub fn get_view_metadata(&self, tag_name: &str) -> Result<ViewMetadata> {
        self.get_element(tag_name).map(|entry| entry.meta)
    }

    /// Replace the stored metadata as given; the default metadata is not
    /// merged in
    pub fn set_view_metadata(&self, tag_name: &str, meta: ViewMetadata) -> Result<()> {
        let tag = normalize_tag_name(tag_name);
        let mut inner = self.inner.write();
        match inner.elements.get_mut(tag.as_str()) {
            Some(entry) => {
                entry.meta = meta;
                Ok(())
            }
            None => Err(DomError::ElementNotRegistered(tag)),
        }
    }

    /// Base metadata merged into every element registered from now on
    pub fn default_view_metadata(&self) -> ViewMetadata {
        self.inner.read().default_meta.clone()
    }

    /// Replace the base metadata for later registrations
    pub fn set_default_view_metadata(&self, meta: ViewMetadata) {
        self.inner.write().default_meta = meta;
    }

    /// Registered normalized tag names, sorted
    pub fn tag_names(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .inner
            .read()
            .elements
            .keys()
            .map(|k| k.to_string())
            .collect();
        tags.sort();
        tags
    }

    /// Number of registered tags
    pub fn len(&self) -> usize {
        self.inner.read().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::new()
    }
}
