//! Node type descriptors for DOM trees described by XML Schema.
//!
//! A [`SchemaTypeLoader`] reads an XSD document (and its imports) into an immutable
//! [`TypeTable`] of [`NodeType`], [`AttributeInfo`] and [`ChildInfo`] descriptors, grouped into a
//! [`SchemaTypeCollection`] per target namespace. Generated [`SchemaRegistry`] implementations bind
//! typed handles to these descriptors.

// TODO xs:redefine is not supported yet

pub mod annotation;
pub mod attribute_type;
pub mod collection;
pub mod error;
pub mod import;
pub mod loader;
pub mod node_type;
pub mod registry;
pub mod xstypes;

mod builtins;
mod mapping_context;
mod type_table;
mod values;


pub use annotation::Annotation;
pub use attribute_type::{AttributeRule, AttributeType, AttributeTypeId, ValueKind};
pub use builtins::MIXED_TEXT_FIELD;
pub use collection::SchemaTypeCollection;
pub use error::DomError;
pub use import::{
    FileImportResolver, Import, ImportError, ImportResolver, SchemaSource, StaticImportResolver,
    XML_SCHEMA,
};
pub use loader::{LoadOptions, SchemaTypeLoader};
pub use node_type::{
    AttributeId, AttributeInfo, ChildCountRule, ChildId, ChildInfo, NodeType, NodeTypeId,
    RootElement, RootElementId,
};
pub use registry::{Binding, SchemaRegistry};
pub use type_table::TypeTable;
pub use xstypes::{QName, XML_NAMESPACE, XS_NAMESPACE};
