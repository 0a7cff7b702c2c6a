use std::collections::HashMap;
use std::fmt;

use super::collection::SchemaTypeCollection;
use super::error::DomError;
use super::node_type::{
    AttributeId, ChildId, NodeType, NodeTypeId, RootElement, RootElementId,
};

/// A table of typed handles for one schema, bound against loaded type collections.
///
/// Implementations are generated from the schema. Binding fails on the first symbol the
/// resolvers do not know; a bound registry is immutable.
pub trait SchemaRegistry: Sized {
    /// The target namespace of the schema
    const NAMESPACE: &'static str;

    /// Resolves every handle through `get_node_type` and `get_root_element`, which map a
    /// (namespace, name) pair to the descriptor.
    fn bind<'a, N, R>(get_node_type: N, get_root_element: R) -> Result<Self, DomError>
    where
        N: Fn(&str, &str) -> Result<&'a NodeType, DomError>,
        R: Fn(&str, &str) -> Result<&'a RootElement, DomError>;

    /// Every handle of the registry together with the key it was resolved from.
    fn bindings(&self) -> Vec<Binding>;

    /// Binds against a single collection, which resolves names in any loaded namespace.
    fn initialize(collection: &SchemaTypeCollection) -> Result<Self, DomError> {
        Self::bind(
            |namespace, name| collection.get_node_type(namespace, name),
            |namespace, name| collection.get_root_element(namespace, name),
        )
    }

    /// Binds against one collection per namespace.
    fn initialize_with_collections(
        collections: &HashMap<String, SchemaTypeCollection>,
    ) -> Result<Self, DomError> {
        let collection_for = |namespace: &str| {
            collections
                .get(namespace)
                .ok_or_else(|| DomError::NamespaceNotLoaded(namespace.to_string()))
        };
        Self::bind(
            |namespace, name| collection_for(namespace)?.get_node_type_local(name),
            |namespace, name| collection_for(namespace)?.get_root_element_local(name),
        )
    }

    /// Checks every handle against a fresh lookup in `collection`.
    fn verify(&self, collection: &SchemaTypeCollection) -> Result<(), DomError> {
        self.bindings()
            .iter()
            .try_for_each(|binding| binding.verify(collection))
    }
}

/// One handle of a registry and the key it resolves from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Binding {
    NodeType {
        namespace: &'static str,
        name: &'static str,
        id: NodeTypeId,
    },
    Attribute {
        node_type: NodeTypeId,
        name: &'static str,
        id: AttributeId,
    },
    Child {
        node_type: NodeTypeId,
        name: &'static str,
        id: ChildId,
    },
    RootElement {
        namespace: &'static str,
        name: &'static str,
        id: RootElementId,
    },
}

impl Binding {
    /// Resolves the key again and compares the result with the stored handle.
    pub fn verify(&self, collection: &SchemaTypeCollection) -> Result<(), DomError> {
        let mismatch = || DomError::BindingMismatch(self.to_string());
        let matches = match *self {
            Self::NodeType {
                namespace,
                name,
                id,
            } => collection.get_node_type(namespace, name)?.id() == id,
            Self::Attribute {
                node_type,
                name,
                id,
            } => {
                let node_type = collection.node_type(node_type).ok_or_else(mismatch)?;
                node_type.attribute_id(name)? == id
            }
            Self::Child {
                node_type,
                name,
                id,
            } => {
                let node_type = collection.node_type(node_type).ok_or_else(mismatch)?;
                node_type.child_id(name)? == id
            }
            Self::RootElement {
                namespace,
                name,
                id,
            } => collection.get_root_element(namespace, name)?.id() == id,
        };
        if matches {
            Ok(())
        } else {
            Err(mismatch())
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeType {
                namespace, name, ..
            } => write!(f, "node type {namespace}:{name}"),
            Self::Attribute {
                node_type, name, ..
            } => write!(f, "attribute {name:?} of node type #{}", node_type.index()),
            Self::Child {
                node_type, name, ..
            } => write!(f, "child {name:?} of node type #{}", node_type.index()),
            Self::RootElement {
                namespace, name, ..
            } => write!(f, "root element {namespace}:{name}"),
        }
    }
}
