use crate::element::ViewMetadata;
use crate::error::Result;
use crate::platform::Platform;
use crate::registry::ElementRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Registry configuration, usually shipped as JSON next to the app:
///
/// ```json
/// {
///   "platform": "ios",
///   "default_metadata": { "detach_children": false },
///   "metadata": { "button": { "text_property": "title" } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Overrides the detected platform
    pub platform: Option<Platform>,
    /// Base metadata for elements registered after the config is applied
    pub default_metadata: ViewMetadata,
    /// Per-tag metadata merged over already registered entries
    pub metadata: BTreeMap<String, ViewMetadata>,
}

impl RegistryConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }

    /// Install the default metadata and merge per-tag overrides. Overrides
    /// for tags that are not registered are skipped with a warning.
    pub fn apply(&self, registry: &ElementRegistry) -> Result<()> {
        registry.set_default_view_metadata(self.default_metadata.clone());

        for (tag, meta) in &self.metadata {
            if !registry.has_element(tag) {
                tracing::warn!(tag = %tag, "metadata override for unregistered element");
                continue;
            }
            let current = registry.get_view_metadata(tag)?;
            registry.set_view_metadata(tag, meta.merged_over(&current))?;
        }
        Ok(())
    }
}
