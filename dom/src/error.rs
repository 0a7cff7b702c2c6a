use std::path::PathBuf;

use thiserror::Error;

use super::xstypes::QName;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("failed to parse schema document {location:?}")]
    Xml {
        location: String,
        #[source]
        source: roxmltree::Error,
    },
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("schema document {0:?} has no target namespace")]
    MissingTargetNamespace(String),
    #[error("failed to resolve prefix {0:?} to a namespace URI")]
    NamePrefixNotResolved(String),
    #[error("{kind} {name} is not declared")]
    UnresolvedReference { kind: &'static str, name: QName },
    #[error("invalid value {value:?} in <{element}>")]
    InvalidValue { element: String, value: String },
    #[error("element {0} has both a default and a fixed value")]
    DefaultAndFixed(QName),
    #[error("{0} is derived from or refers to itself")]
    CircularDerivation(QName),
    #[error("node type {0} not found")]
    NodeTypeNotFound(QName),
    #[error("root element {0} not found")]
    RootElementNotFound(QName),
    #[error("node type {node_type} has no attribute {name:?}")]
    AttributeNotFound { node_type: QName, name: String },
    #[error("node type {node_type} has no child {name:?}")]
    ChildNotFound { node_type: QName, name: String },
    #[error("no type collection is loaded for namespace {0:?}")]
    NamespaceNotLoaded(String),
    #[error("binding {0} does not match the loaded schema")]
    BindingMismatch(String),
    #[error("{value:?} is not a value of {type_name}")]
    ValueNotInEnumeration {
        type_name: &'static str,
        value: String,
    },
}
