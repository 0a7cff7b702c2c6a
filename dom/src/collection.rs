use std::sync::Arc;

use super::attribute_type::{AttributeType, AttributeTypeId};
use super::error::DomError;
use super::node_type::{
    AttributeId, AttributeInfo, ChildId, ChildInfo, NodeType, NodeTypeId, RootElement,
    RootElementId,
};
use super::type_table::TypeTable;
use super::xstypes::QName;

/// The node types of one target namespace.
///
/// All collections loaded together share one [`TypeTable`], so lookups by namespace reach the
/// types of every loaded namespace.
#[derive(Clone, Debug)]
pub struct SchemaTypeCollection {
    target_namespace: String,
    namespaces: Vec<(Option<String>, String)>,
    table: Arc<TypeTable>,
}

impl SchemaTypeCollection {
    pub(crate) fn new(
        target_namespace: String,
        namespaces: Vec<(Option<String>, String)>,
        table: Arc<TypeTable>,
    ) -> Self {
        Self {
            target_namespace,
            namespaces,
            table,
        }
    }

    pub fn target_namespace(&self) -> &str {
        &self.target_namespace
    }

    /// Namespace declarations of the schema document, as (prefix, URI) pairs.
    pub fn namespaces(&self) -> &[(Option<String>, String)] {
        &self.namespaces
    }

    pub fn table(&self) -> &TypeTable {
        &self.table
    }

    pub fn shared_table(&self) -> Arc<TypeTable> {
        Arc::clone(&self.table)
    }

    pub fn get_node_type(&self, namespace: &str, name: &str) -> Result<&NodeType, DomError> {
        let name = QName::with_namespace(namespace, name);
        self.table
            .find_node_type(&name)
            .ok_or(DomError::NodeTypeNotFound(name))
    }

    /// Looks up a node type of the target namespace.
    pub fn get_node_type_local(&self, name: &str) -> Result<&NodeType, DomError> {
        self.get_node_type(&self.target_namespace, name)
    }

    pub fn get_root_element(&self, namespace: &str, name: &str) -> Result<&RootElement, DomError> {
        let name = QName::with_namespace(namespace, name);
        self.table
            .find_root_element(&name)
            .ok_or(DomError::RootElementNotFound(name))
    }

    pub fn get_root_element_local(&self, name: &str) -> Result<&RootElement, DomError> {
        self.get_root_element(&self.target_namespace, name)
    }

    /// Node types of the target namespace, in creation order.
    pub fn node_types(&self) -> impl Iterator<Item = &NodeType> {
        self.node_types_in(&self.target_namespace)
    }

    pub fn node_types_in<'s>(&'s self, namespace: &'s str) -> impl Iterator<Item = &'s NodeType> {
        self.table
            .node_types()
            .iter()
            .filter(move |node_type| node_type.name().namespace() == Some(namespace))
    }

    pub fn root_elements(&self) -> impl Iterator<Item = &RootElement> {
        self.table
            .root_elements()
            .iter()
            .filter(|root| root.name().namespace() == Some(self.target_namespace.as_str()))
    }

    /// Named attribute types of the target namespace.
    pub fn attribute_types(&self) -> impl Iterator<Item = &AttributeType> {
        self.table.attribute_types().iter().filter(|attribute_type| {
            attribute_type
                .name()
                .map_or(false, |name| name.namespace() == Some(self.target_namespace.as_str()))
        })
    }

    pub fn node_type(&self, id: NodeTypeId) -> Option<&NodeType> {
        self.table.node_type(id)
    }

    pub fn attribute_type(&self, id: AttributeTypeId) -> Option<&AttributeType> {
        self.table.attribute_type(id)
    }

    pub fn root_element(&self, id: RootElementId) -> Option<&RootElement> {
        self.table.root_element(id)
    }

    pub fn attribute_info(&self, id: AttributeId) -> Option<&AttributeInfo> {
        self.node_type(id.owner())?.attribute(id)
    }

    pub fn child_info(&self, id: ChildId) -> Option<&ChildInfo> {
        self.node_type(id.owner())?.child(id)
    }

    pub fn lineage(&self, id: NodeTypeId) -> impl Iterator<Item = &NodeType> {
        self.table.lineage(id)
    }

    pub fn is_assignable(&self, base: NodeTypeId, derived: NodeTypeId) -> bool {
        self.table.is_assignable(base, derived)
    }
}
