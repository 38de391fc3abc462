pub mod config;
pub mod element;
pub mod error;
pub mod native;
pub mod node;
pub mod platform;
pub mod registry;
pub mod tree;
pub mod value;

// Re-export key types
pub use config::RegistryConfig;
pub use element::{Element, ElementClass, ViewMetadata};
pub use error::{DomError, Result};
pub use native::{EventListener, FactoryResolver, NativeView, ViewEvent, ViewFactory, ViewHandle};
pub use node::{NodeId, NodeType, TextNode};
pub use platform::Platform;
pub use registry::{ElementOptions, ElementRegistry};
pub use tree::ViewTree;
pub use value::AttrValue;
