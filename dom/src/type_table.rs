use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, warn};

use super::annotation::Annotation;
use super::attribute_type::{AttributeType, AttributeTypeId, ValueKind};
use super::error::DomError;
use super::node_type::{
    AttributeId, AttributeInfo, ChildCountRule, ChildId, ChildInfo, NodeType, NodeTypeId,
    RootElement, RootElementId,
};
use super::xstypes::QName;

#[derive(Clone, Debug)]
pub(crate) struct AttributeDefinition {
    pub(crate) name: String,
    pub(crate) attribute_type: AttributeTypeId,
    pub(crate) default_value: Option<String>,
    pub(crate) is_element: bool,
    pub(crate) annotations: Vec<Annotation>,
}

#[derive(Clone, Debug)]
pub(crate) struct ChildDefinition {
    pub(crate) name: String,
    pub(crate) node_type: NodeTypeId,
    pub(crate) is_list: bool,
    pub(crate) count_rule: Option<ChildCountRule>,
    /// Name of the global element this child refers to, for substitution groups.
    pub(crate) reference: Option<QName>,
    pub(crate) annotations: Vec<Annotation>,
}

/// A node type before freezing: only the fields declared by the type itself.
#[derive(Clone, Debug, Default)]
pub(crate) struct NodeTypeDefinition {
    pub(crate) base: Option<NodeTypeId>,
    pub(crate) is_abstract: bool,
    pub(crate) attributes: Vec<AttributeDefinition>,
    pub(crate) children: Vec<ChildDefinition>,
    pub(crate) annotations: Vec<Annotation>,
}

impl NodeTypeDefinition {
    pub(crate) fn define_attribute(&mut self, attribute: AttributeDefinition) {
        self.attributes.push(attribute);
    }

    pub(crate) fn define_child(&mut self, child: ChildDefinition) {
        self.children.push(child);
    }
}

#[derive(Clone, Debug)]
pub(crate) struct RootElementDefinition {
    pub(crate) name: QName,
    pub(crate) field_name: String,
    pub(crate) node_type: NodeTypeId,
    pub(crate) substitution_group: Option<QName>,
}

/// Collects definitions while schema documents are mapped; see [`TypeTableBuilder::freeze`].
#[derive(Default)]
pub(crate) struct TypeTableBuilder {
    node_types: Vec<(QName, Option<NodeTypeDefinition>)>,
    node_type_names: HashMap<QName, NodeTypeId>,
    attribute_types: Vec<AttributeType>,
    attribute_type_names: HashMap<QName, AttributeTypeId>,
    root_elements: Vec<RootElementDefinition>,
    root_element_names: HashMap<QName, RootElementId>,
    /// Legacy `<idAttribute name="..."/>` annotations, by namespace
    id_attribute_names: HashMap<String, String>,
}

impl TypeTableBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn node_type_id(&self, name: &QName) -> Option<NodeTypeId> {
        self.node_type_names.get(name).copied()
    }

    /// Registers `name` before its definition is complete, so that recursive content models can
    /// refer to it.
    pub(crate) fn reserve_node_type(&mut self, name: QName) -> NodeTypeId {
        let id = NodeTypeId(self.node_types.len() as u32);
        debug!("creating node type {name}");
        self.node_type_names.insert(name.clone(), id);
        self.node_types.push((name, None));
        id
    }

    pub(crate) fn insert_node_type(&mut self, id: NodeTypeId, definition: NodeTypeDefinition) {
        self.node_types[id.index()].1 = Some(definition);
    }

    pub(crate) fn attribute_type_id(&self, name: &QName) -> Option<AttributeTypeId> {
        self.attribute_type_names.get(name).copied()
    }

    pub(crate) fn attribute_type(&self, id: AttributeTypeId) -> &AttributeType {
        &self.attribute_types[id.index()]
    }

    /// Adds an attribute type; named types are registered for lookup by name.
    pub(crate) fn add_attribute_type(
        &mut self,
        name: Option<QName>,
        kind: ValueKind,
    ) -> &mut AttributeType {
        let id = AttributeTypeId(self.attribute_types.len() as u32);
        if let Some(name) = name.as_ref() {
            self.attribute_type_names.insert(name.clone(), id);
        }
        self.attribute_types.push(AttributeType::new(id, name, kind));
        &mut self.attribute_types[id.index()]
    }

    pub(crate) fn root_element_id(&self, name: &QName) -> Option<RootElementId> {
        self.root_element_names.get(name).copied()
    }

    /// Adds a root element unless one with the same name exists; the first declaration wins.
    pub(crate) fn add_root_element(&mut self, root: RootElementDefinition) -> RootElementId {
        if let Some(id) = self.root_element_id(&root.name) {
            return id;
        }
        let id = RootElementId(self.root_elements.len() as u32);
        self.root_element_names.insert(root.name.clone(), id);
        self.root_elements.push(root);
        id
    }

    pub(crate) fn set_id_attribute_name(&mut self, namespace: String, name: String) {
        self.id_attribute_names.insert(namespace, name);
    }

    /// Transitive members of the substitution group headed by `head`.
    fn substitution_members(&self, head: &QName) -> Vec<RootElementId> {
        let mut members = Vec::new();
        let mut seen = HashSet::new();
        let mut pending = VecDeque::from([head.clone()]);
        while let Some(current) = pending.pop_front() {
            for (index, root) in self.root_elements.iter().enumerate() {
                if root.substitution_group.as_ref() == Some(&current) && seen.insert(index) {
                    members.push(RootElementId(index as u32));
                    pending.push_back(root.name.clone());
                }
            }
        }
        members
    }

    /// Merges every definition with its base type, base first, and produces the immutable table.
    pub(crate) fn freeze(self) -> Result<TypeTable, DomError> {
        let mut freezer = Freezer {
            builder: &self,
            frozen: vec![None; self.node_types.len()],
            in_progress: HashSet::new(),
            substitutions: HashMap::new(),
        };
        for index in 0..self.node_types.len() {
            freezer.freeze_node_type(NodeTypeId(index as u32))?;
        }
        let node_types = freezer.frozen.into_iter().flatten().collect();

        let root_elements = self
            .root_elements
            .iter()
            .enumerate()
            .map(|(index, root)| RootElement {
                id: RootElementId(index as u32),
                name: root.name.clone(),
                field_name: root.field_name.clone(),
                node_type: root.node_type,
                substitutions: self.substitution_members(&root.name),
            })
            .collect();

        Ok(TypeTable {
            node_types,
            node_type_names: self.node_type_names,
            attribute_types: self.attribute_types,
            attribute_type_names: self.attribute_type_names,
            root_elements,
            root_element_names: self.root_element_names,
        })
    }
}

struct Freezer<'b> {
    builder: &'b TypeTableBuilder,
    frozen: Vec<Option<NodeType>>,
    in_progress: HashSet<NodeTypeId>,
    substitutions: HashMap<QName, Vec<RootElementId>>,
}

impl Freezer<'_> {
    fn freeze_node_type(&mut self, id: NodeTypeId) -> Result<(), DomError> {
        if self.frozen[id.index()].is_some() {
            return Ok(());
        }
        let builder = self.builder;
        let (name, definition) = &builder.node_types[id.index()];
        let definition = definition
            .as_ref()
            .ok_or_else(|| DomError::NodeTypeNotFound(name.clone()))?;
        if !self.in_progress.insert(id) {
            return Err(DomError::CircularDerivation(name.clone()));
        }

        let (mut attributes, mut children, mut id_attribute) = match definition.base {
            Some(base) => {
                self.freeze_node_type(base)?;
                let base = self.frozen[base.index()]
                    .as_ref()
                    .ok_or_else(|| DomError::CircularDerivation(name.clone()))?;
                (
                    base.attributes.clone(),
                    base.children.clone(),
                    base.id_attribute,
                )
            }
            None => (Vec::new(), Vec::new(), None),
        };

        let inherited_attributes = attributes.len();
        let mut defined = HashSet::new();
        for attribute in &definition.attributes {
            if !defined.insert(attribute.name.as_str()) {
                warn!(
                    "{name}: ignoring duplicate definition of attribute {:?}",
                    attribute.name
                );
                continue;
            }
            let redefined = attributes[..inherited_attributes]
                .iter()
                .position(|a| a.name == attribute.name);
            let (index, defining_type) = match redefined {
                Some(index) => (index, attributes[index].defining_type),
                None => (attributes.len(), id),
            };
            let info = AttributeInfo {
                id: AttributeId {
                    owner: id,
                    index: index as u32,
                },
                defining_type,
                name: attribute.name.clone(),
                attribute_type: attribute.attribute_type,
                default_value: attribute.default_value.clone(),
                is_element: attribute.is_element,
                annotations: attribute.annotations.clone(),
            };
            if index < attributes.len() {
                attributes[index] = info;
            } else {
                attributes.push(info);
            }
        }

        let inherited_children = children.len();
        let mut defined = HashSet::new();
        for child in &definition.children {
            if !defined.insert(child.name.as_str()) {
                warn!(
                    "{name}: ignoring duplicate definition of child {:?}",
                    child.name
                );
                continue;
            }
            let redefined = children[..inherited_children]
                .iter()
                .position(|c| c.name == child.name);
            let (index, defining_type) = match redefined {
                Some(index) => (index, children[index].defining_type),
                None => (children.len(), id),
            };
            let substitutions = match child.reference.as_ref() {
                Some(head) => self.substitutions_of(head),
                None => Vec::new(),
            };
            let info = ChildInfo {
                id: ChildId {
                    owner: id,
                    index: index as u32,
                },
                defining_type,
                name: child.name.clone(),
                node_type: child.node_type,
                is_list: child.is_list,
                count_rule: child.count_rule,
                substitutions,
                annotations: child.annotations.clone(),
            };
            if index < children.len() {
                children[index] = info;
            } else {
                children.push(info);
            }
        }

        for attribute in &attributes {
            if builder.attribute_type(attribute.attribute_type).is_id {
                id_attribute = Some(attribute.id);
            }
        }
        let legacy_id_attribute = name
            .namespace()
            .and_then(|ns| builder.id_attribute_names.get(ns));
        if let Some(legacy) = legacy_id_attribute {
            if let Some(attribute) = attributes.iter().find(|a| &a.name == legacy) {
                id_attribute = Some(attribute.id);
            }
        }

        let attribute_names = attributes
            .iter()
            .enumerate()
            .map(|(index, a)| (a.name.clone(), index))
            .collect();
        let child_names = children
            .iter()
            .enumerate()
            .map(|(index, c)| (c.name.clone(), index))
            .collect();

        self.frozen[id.index()] = Some(NodeType {
            id,
            name: name.clone(),
            base: definition.base,
            is_abstract: definition.is_abstract,
            attributes,
            children,
            id_attribute,
            annotations: definition.annotations.clone(),
            attribute_names,
            child_names,
        });
        self.in_progress.remove(&id);
        Ok(())
    }

    fn substitutions_of(&mut self, head: &QName) -> Vec<RootElementId> {
        if let Some(members) = self.substitutions.get(head) {
            return members.clone();
        }
        let members = self.builder.substitution_members(head);
        self.substitutions.insert(head.clone(), members.clone());
        members
    }
}

/// The immutable result of loading a schema set: every node type, attribute type and root
/// element, addressed by handle.
#[derive(Debug)]
pub struct TypeTable {
    node_types: Vec<NodeType>,
    node_type_names: HashMap<QName, NodeTypeId>,
    attribute_types: Vec<AttributeType>,
    attribute_type_names: HashMap<QName, AttributeTypeId>,
    root_elements: Vec<RootElement>,
    root_element_names: HashMap<QName, RootElementId>,
}

impl TypeTable {
    pub fn node_type(&self, id: NodeTypeId) -> Option<&NodeType> {
        self.node_types.get(id.index())
    }

    pub fn node_types(&self) -> &[NodeType] {
        &self.node_types
    }

    pub fn find_node_type(&self, name: &QName) -> Option<&NodeType> {
        self.node_type_names
            .get(name)
            .and_then(|&id| self.node_type(id))
    }

    pub fn attribute_type(&self, id: AttributeTypeId) -> Option<&AttributeType> {
        self.attribute_types.get(id.index())
    }

    pub fn attribute_types(&self) -> &[AttributeType] {
        &self.attribute_types
    }

    pub fn find_attribute_type(&self, name: &QName) -> Option<&AttributeType> {
        self.attribute_type_names
            .get(name)
            .and_then(|&id| self.attribute_type(id))
    }

    pub fn root_element(&self, id: RootElementId) -> Option<&RootElement> {
        self.root_elements.get(id.index())
    }

    pub fn root_elements(&self) -> &[RootElement] {
        &self.root_elements
    }

    pub fn find_root_element(&self, name: &QName) -> Option<&RootElement> {
        self.root_element_names
            .get(name)
            .and_then(|&id| self.root_element(id))
    }

    /// The node type followed by its base types, most derived first.
    pub fn lineage(&self, id: NodeTypeId) -> impl Iterator<Item = &NodeType> {
        std::iter::successors(self.node_type(id), |node_type| {
            node_type.base.and_then(|base| self.node_type(base))
        })
    }

    /// Whether a node of type `derived` may be used where `base` is expected.
    pub fn is_assignable(&self, base: NodeTypeId, derived: NodeTypeId) -> bool {
        self.lineage(derived).any(|node_type| node_type.id == base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_type(builder: &mut TypeTableBuilder) -> AttributeTypeId {
        builder.add_attribute_type(None, ValueKind::String).id()
    }

    fn attribute(name: &str, attribute_type: AttributeTypeId) -> AttributeDefinition {
        AttributeDefinition {
            name: name.to_string(),
            attribute_type,
            default_value: None,
            is_element: false,
            annotations: Vec::new(),
        }
    }

    #[test]
    fn freeze_merges_base_fields_and_keeps_redefined_slots() {
        let mut builder = TypeTableBuilder::new();
        let string = string_type(&mut builder);
        let base = builder.reserve_node_type(QName::with_namespace("urn:t", "base"));
        let derived = builder.reserve_node_type(QName::with_namespace("urn:t", "derived"));

        let mut definition = NodeTypeDefinition::default();
        definition.define_attribute(attribute("a", string));
        definition.define_attribute(attribute("b", string));
        builder.insert_node_type(base, definition);

        let mut definition = NodeTypeDefinition {
            base: Some(base),
            ..Default::default()
        };
        definition.define_attribute(attribute("c", string));
        definition.define_attribute(attribute("b", string));
        definition.define_attribute(attribute("c", string));
        builder.insert_node_type(derived, definition);

        let table = builder.freeze().unwrap();
        let base = table.node_type(base).unwrap();
        let derived_type = table.node_type(derived).unwrap();

        let names: Vec<_> = derived_type.attributes().iter().map(|a| a.name()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(
            derived_type.attribute_id("a").unwrap(),
            base.attribute_id("a").unwrap()
        );

        let redefined = derived_type.get_attribute("b").unwrap();
        assert_eq!(redefined.index(), 1);
        assert_eq!(redefined.owning_type(), derived);
        assert_eq!(redefined.defining_type(), base.id());
        assert_ne!(redefined.id(), base.attribute_id("b").unwrap());
        assert_eq!(derived_type.own_attributes().count(), 1);
        assert!(table.is_assignable(base.id(), derived));
        assert!(!table.is_assignable(derived, base.id()));
    }

    #[test]
    fn freeze_rejects_circular_derivation() {
        let mut builder = TypeTableBuilder::new();
        let a = builder.reserve_node_type(QName::with_namespace("urn:t", "a"));
        let b = builder.reserve_node_type(QName::with_namespace("urn:t", "b"));
        builder.insert_node_type(
            a,
            NodeTypeDefinition {
                base: Some(b),
                ..Default::default()
            },
        );
        builder.insert_node_type(
            b,
            NodeTypeDefinition {
                base: Some(a),
                ..Default::default()
            },
        );
        assert!(matches!(
            builder.freeze(),
            Err(DomError::CircularDerivation(_))
        ));
    }

    #[test]
    fn first_root_element_wins() {
        let mut builder = TypeTableBuilder::new();
        let node_type = builder.reserve_node_type(QName::with_namespace("urn:t", "t"));
        builder.insert_node_type(node_type, NodeTypeDefinition::default());
        let name = QName::with_namespace("urn:t", "root");
        let first = builder.add_root_element(RootElementDefinition {
            name: name.clone(),
            field_name: "root".into(),
            node_type,
            substitution_group: None,
        });
        let second = builder.add_root_element(RootElementDefinition {
            name,
            field_name: "other".into(),
            node_type,
            substitution_group: None,
        });
        assert_eq!(first, second);
        let table = builder.freeze().unwrap();
        assert_eq!(table.root_elements().len(), 1);
        assert_eq!(table.root_elements()[0].field_name(), "root");
    }
}
