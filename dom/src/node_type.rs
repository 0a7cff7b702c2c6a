use std::collections::HashMap;

use super::annotation::Annotation;
use super::attribute_type::AttributeTypeId;
use super::error::DomError;
use super::xstypes::QName;

/// Handle of a [`NodeType`] within its type table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeTypeId(pub(crate) u32);

impl NodeTypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of an [`AttributeInfo`].
///
/// `owner` is the node type whose definition created the descriptor and `index` its slot in every
/// node type inheriting it. A redefinition in a derived type, including every descriptor an
/// extension restates, is owned by the derived type and keeps the base slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId {
    pub(crate) owner: NodeTypeId,
    pub(crate) index: u32,
}

impl AttributeId {
    pub fn owner(self) -> NodeTypeId {
        self.owner
    }

    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Handle of a [`ChildInfo`], see [`AttributeId`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildId {
    pub(crate) owner: NodeTypeId,
    pub(crate) index: u32,
}

impl ChildId {
    pub fn owner(self) -> NodeTypeId {
        self.owner
    }

    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Handle of a [`RootElement`] within its type table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootElementId(pub(crate) u32);

impl RootElementId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttributeInfo {
    pub(crate) id: AttributeId,
    pub(crate) defining_type: NodeTypeId,
    pub(crate) name: String,
    pub(crate) attribute_type: AttributeTypeId,
    pub(crate) default_value: Option<String>,
    pub(crate) is_element: bool,
    pub(crate) annotations: Vec<Annotation>,
}

impl AttributeInfo {
    pub fn id(&self) -> AttributeId {
        self.id
    }

    /// The field name; empty for the value attribute.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.id.index()
    }

    pub fn owning_type(&self) -> NodeTypeId {
        self.id.owner
    }

    /// The node type that introduced this slot; differs from the owning type for redefinitions.
    pub fn defining_type(&self) -> NodeTypeId {
        self.defining_type
    }

    pub fn attribute_type(&self) -> AttributeTypeId {
        self.attribute_type
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Whether the attribute stands for a single child element of simple type.
    pub fn is_element(&self) -> bool {
        self.is_element
    }

    pub fn is_value_attribute(&self) -> bool {
        self.name.is_empty()
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// Occurrence bounds of a child; `max` of `None` means unbounded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChildCountRule {
    pub min: u32,
    pub max: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChildInfo {
    pub(crate) id: ChildId,
    pub(crate) defining_type: NodeTypeId,
    pub(crate) name: String,
    pub(crate) node_type: NodeTypeId,
    pub(crate) is_list: bool,
    pub(crate) count_rule: Option<ChildCountRule>,
    pub(crate) substitutions: Vec<RootElementId>,
    pub(crate) annotations: Vec<Annotation>,
}

impl ChildInfo {
    pub fn id(&self) -> ChildId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.id.index()
    }

    pub fn owning_type(&self) -> NodeTypeId {
        self.id.owner
    }

    pub fn defining_type(&self) -> NodeTypeId {
        self.defining_type
    }

    pub fn node_type(&self) -> NodeTypeId {
        self.node_type
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }

    pub fn count_rule(&self) -> Option<ChildCountRule> {
        self.count_rule
    }

    /// Members of the substitution group of the declared element, which may appear in its place.
    pub fn substitutions(&self) -> &[RootElementId] {
        &self.substitutions
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// A global element, allowed at the document root or as a free-standing fragment.
#[derive(Clone, Debug, PartialEq)]
pub struct RootElement {
    pub(crate) id: RootElementId,
    pub(crate) name: QName,
    pub(crate) field_name: String,
    pub(crate) node_type: NodeTypeId,
    pub(crate) substitutions: Vec<RootElementId>,
}

impl RootElement {
    pub fn id(&self) -> RootElementId {
        self.id
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn node_type(&self) -> NodeTypeId {
        self.node_type
    }

    pub fn substitutions(&self) -> &[RootElementId] {
        &self.substitutions
    }
}

/// A frozen node type: its attributes and children include everything inherited from the base.
#[derive(Clone, Debug)]
pub struct NodeType {
    pub(crate) id: NodeTypeId,
    pub(crate) name: QName,
    pub(crate) base: Option<NodeTypeId>,
    pub(crate) is_abstract: bool,
    pub(crate) attributes: Vec<AttributeInfo>,
    pub(crate) children: Vec<ChildInfo>,
    pub(crate) id_attribute: Option<AttributeId>,
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) attribute_names: HashMap<String, usize>,
    pub(crate) child_names: HashMap<String, usize>,
}

impl NodeType {
    pub fn id(&self) -> NodeTypeId {
        self.id
    }

    pub fn name(&self) -> &QName {
        &self.name
    }

    pub fn base_type(&self) -> Option<NodeTypeId> {
        self.base
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn attributes(&self) -> &[AttributeInfo] {
        &self.attributes
    }

    pub fn children(&self) -> &[ChildInfo] {
        &self.children
    }

    /// Attributes whose slot was introduced by this type.
    pub fn own_attributes(&self) -> impl Iterator<Item = &AttributeInfo> {
        self.attributes
            .iter()
            .filter(move |a| a.defining_type == self.id)
    }

    /// Children whose slot was introduced by this type.
    pub fn own_children(&self) -> impl Iterator<Item = &ChildInfo> {
        self.children
            .iter()
            .filter(move |c| c.defining_type == self.id)
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn get_attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attribute_names
            .get(name)
            .map(|&index| &self.attributes[index])
    }

    pub fn get_child(&self, name: &str) -> Option<&ChildInfo> {
        self.child_names
            .get(name)
            .map(|&index| &self.children[index])
    }

    pub fn attribute_id(&self, name: &str) -> Result<AttributeId, DomError> {
        self.get_attribute(name)
            .map(AttributeInfo::id)
            .ok_or_else(|| DomError::AttributeNotFound {
                node_type: self.name.clone(),
                name: name.to_string(),
            })
    }

    pub fn child_id(&self, name: &str) -> Result<ChildId, DomError> {
        self.get_child(name)
            .map(ChildInfo::id)
            .ok_or_else(|| DomError::ChildNotFound {
                node_type: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Resolves an attribute handle; `None` if the handle does not belong to this type's lineage.
    pub fn attribute(&self, id: AttributeId) -> Option<&AttributeInfo> {
        self.attributes.get(id.index()).filter(|a| a.id == id)
    }

    pub fn child(&self, id: ChildId) -> Option<&ChildInfo> {
        self.children.get(id.index()).filter(|c| c.id == id)
    }

    /// The attribute holding the simple content of the element, if any.
    pub fn value_attribute(&self) -> Option<&AttributeInfo> {
        self.get_attribute("")
    }

    pub fn id_attribute(&self) -> Option<&AttributeInfo> {
        self.id_attribute.and_then(|id| self.attribute(id))
    }
}
