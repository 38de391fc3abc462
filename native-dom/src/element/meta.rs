use crate::value::AttrValue;
use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;
use std::collections::BTreeMap;

pub const DEFAULT_TEXT_PROPERTY: &str = "text";

/// Static per-tag metadata stored in the registry and copied into each element.
///
/// Every field is optional so metadata can be layered: when merged over a
/// base, fields set here win and unset ones fall through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewMetadata {
    /// Label for the underlying native kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<SmartString>,
    /// Peer is never inserted into a native parent's child list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detached: Option<bool>,
    /// Children's peers are never inserted into this element's child list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detach_children: Option<bool>,
    /// Native property that receives text children
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_property: Option<SmartString>,
    #[serde(flatten)]
    pub extra: BTreeMap<SmartString, AttrValue>,
}

impl ViewMetadata {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Default::default()
        }
    }

    pub fn with_detached(mut self, detached: bool) -> Self {
        self.detached = Some(detached);
        self
    }

    pub fn with_detach_children(mut self, detach_children: bool) -> Self {
        self.detach_children = Some(detach_children);
        self
    }

    pub fn with_text_property(mut self, property: &str) -> Self {
        self.text_property = Some(property.into());
        self
    }

    pub fn with_extra(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn is_detached(&self) -> bool {
        self.detached.unwrap_or(false)
    }

    pub fn detaches_children(&self) -> bool {
        self.detach_children.unwrap_or(false)
    }

    pub fn text_property_name(&self) -> &str {
        self.text_property.as_deref().unwrap_or(DEFAULT_TEXT_PROPERTY)
    }

    /// Shallow merge of `self` over `base`
    pub fn merged_over(&self, base: &ViewMetadata) -> ViewMetadata {
        let mut extra = base.extra.clone();
        extra.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        ViewMetadata {
            type_name: self.type_name.clone().or_else(|| base.type_name.clone()),
            detached: self.detached.or(base.detached),
            detach_children: self.detach_children.or(base.detach_children),
            text_property: self
                .text_property
                .clone()
                .or_else(|| base.text_property.clone()),
            extra,
        }
    }

    pub fn attachment(&self) -> AttachmentPolicy {
        AttachmentPolicy {
            node: Attachment::from_detached(self.is_detached()),
            children: Attachment::from_detached(self.detaches_children()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Embedded,
    Detached,
}

impl Attachment {
    fn from_detached(detached: bool) -> Self {
        if detached {
            Attachment::Detached
        } else {
            Attachment::Embedded
        }
    }
}

/// How an element takes part in the native hierarchy: `node` governs its own
/// peer, `children` governs the peers of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentPolicy {
    pub node: Attachment,
    pub children: Attachment,
}

impl AttachmentPolicy {
    /// Whether `child`'s peer goes into the native child list of `parent`
    pub fn embeds(parent: AttachmentPolicy, child: AttachmentPolicy) -> bool {
        parent.children == Attachment::Embedded && child.node == Attachment::Embedded
    }
}
