use std::collections::{HashMap, HashSet};

use roxmltree::{Document, Node, NodeId};

use super::{
    annotation::Annotation,
    attribute_type::{AttributeRule, AttributeTypeId, ValueKind},
    builtins::{builtin_simple_type, MIXED_TEXT_FIELD},
    error::DomError,
    node_type::{ChildCountRule, NodeTypeId},
    type_table::{
        AttributeDefinition, ChildDefinition, NodeTypeDefinition, RootElementDefinition,
        TypeTableBuilder,
    },
    values::{actual_value, attribute_value},
    xstypes::{QName, XS_NAMESPACE},
};

/// Identifies a node across all loaded documents: (document index, node id)
type NodeKey = (usize, NodeId);

pub(crate) fn is_xs(node: Node, name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(XS_NAMESPACE)
        && node.tag_name().name() == name
}

fn xs_child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is_xs(*child, name))
}

const PARTICLE_TAGS: [&str; 5] = ["element", "sequence", "choice", "all", "group"];

fn is_particle(node: Node) -> bool {
    PARTICLE_TAGS.iter().any(|tag| is_xs(node, tag))
}

/// The model group (or group reference) of a content model, if any.
fn particle_child<'a, 'input>(node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| is_particle(*child) && !is_xs(*child, "element"))
}

fn target_namespace<'a>(node: Node<'a, '_>) -> Option<&'a str> {
    node.document()
        .root_element()
        .attribute("targetNamespace")
}

fn required_name(node: Node) -> Result<String, DomError> {
    attribute_value(node, "name")?.ok_or_else(|| DomError::InvalidValue {
        element: node.tag_name().name().to_string(),
        value: String::new(),
    })
}

/// `minOccurs`/`maxOccurs` of a particle; `max` of `None` means unbounded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Occurs {
    min: u32,
    max: Option<u32>,
}

impl Occurs {
    fn of(particle: Node) -> Result<Self, DomError> {
        let min = attribute_value(particle, "minOccurs")?.unwrap_or(1);
        let max = match particle.attribute("maxOccurs").map(str::trim) {
            Some("unbounded") => None,
            Some(max) => Some(actual_value(max, particle)?),
            None => Some(1),
        };
        Ok(Self { min, max })
    }

    /// The most relaxed combination of an element's bounds with those of its compositor.
    fn relaxed(self, parent: Occurs) -> Self {
        Self {
            min: self.min.min(parent.min),
            max: self.max.zip(parent.max).map(|(a, b)| a.max(b)),
        }
    }
}

#[derive(Clone, Debug)]
enum ComplexTypeRef<'a, 'input> {
    Named(QName, Node<'a, 'input>),
    Anonymous(Node<'a, 'input>),
    AnyType,
}

#[derive(Clone, Debug)]
enum SimpleTypeRef<'a, 'input> {
    Builtin(QName),
    Named(QName, Node<'a, 'input>),
    Anonymous(Node<'a, 'input>),
}

#[derive(Clone, Debug)]
enum TypeRef<'a, 'input> {
    Complex(ComplexTypeRef<'a, 'input>),
    Simple(SimpleTypeRef<'a, 'input>),
}

/// An attribute in effect on a complex type.
#[derive(Copy, Clone, Debug)]
struct AttributeUse<'a, 'input> {
    /// The `<xs:attribute>` in the content model (a local declaration or a reference)
    use_node: Node<'a, 'input>,
    /// The declaration carrying the type
    declaration: Node<'a, 'input>,
}

/// Global components of every loaded schema document, by qualified name.
#[derive(Default)]
struct SchemaIndex<'a, 'input> {
    target_namespaces: Vec<String>,
    elements: Vec<(QName, Node<'a, 'input>)>,
    element_names: HashMap<QName, Node<'a, 'input>>,
    complex_types: Vec<(QName, Node<'a, 'input>)>,
    complex_type_names: HashMap<QName, Node<'a, 'input>>,
    simple_types: HashMap<QName, Node<'a, 'input>>,
    attributes: HashMap<QName, Node<'a, 'input>>,
    groups: HashMap<QName, Node<'a, 'input>>,
    attribute_groups: HashMap<QName, Node<'a, 'input>>,
}

impl<'a, 'input: 'a> SchemaIndex<'a, 'input> {
    fn build(documents: &'a [Document<'input>]) -> Self {
        let mut index = Self::default();
        for document in documents {
            let schema = document.root_element();
            let namespace = target_namespace(schema).unwrap_or_default();
            if !index.target_namespaces.iter().any(|ns| ns == namespace) {
                index.target_namespaces.push(namespace.to_string());
            }

            for child in schema.children().filter(Node::is_element) {
                if child.tag_name().namespace() != Some(XS_NAMESPACE) {
                    continue;
                }
                let Some(name) = child.attribute("name") else {
                    continue;
                };
                let name = QName::with_namespace(namespace, name);
                match child.tag_name().name() {
                    "element" => {
                        if !index.element_names.contains_key(&name) {
                            index.element_names.insert(name.clone(), child);
                            index.elements.push((name, child));
                        }
                    }
                    "complexType" => {
                        if !index.complex_type_names.contains_key(&name) {
                            index.complex_type_names.insert(name.clone(), child);
                            index.complex_types.push((name, child));
                        }
                    }
                    "simpleType" => {
                        index.simple_types.entry(name).or_insert(child);
                    }
                    "attribute" => {
                        index.attributes.entry(name).or_insert(child);
                    }
                    "group" => {
                        index.groups.entry(name).or_insert(child);
                    }
                    "attributeGroup" => {
                        index.attribute_groups.entry(name).or_insert(child);
                    }
                    _ => {}
                }
            }
        }
        index
    }
}

/// Maps the XSD documents of one schema set onto node type definitions.
pub(crate) struct MappingContext<'a, 'input> {
    documents: &'a [Document<'input>],
    index: SchemaIndex<'a, 'input>,
    builder: TypeTableBuilder,

    /// Names that generated local type names must not collide with
    type_name_set: HashSet<String>,
    local_type_names: HashMap<NodeKey, QName>,
    /// Named simple types whose base or item type is being mapped
    simple_types_in_progress: HashSet<QName>,
}

impl<'a, 'input: 'a> MappingContext<'a, 'input> {
    pub(crate) fn new(documents: &'a [Document<'input>]) -> Self {
        let index = SchemaIndex::build(documents);
        let type_name_set = index
            .elements
            .iter()
            .chain(index.complex_types.iter())
            .map(|(name, _)| name.local_name.clone())
            .collect();
        Self {
            documents,
            index,
            builder: TypeTableBuilder::new(),
            type_name_set,
            local_type_names: HashMap::new(),
            simple_types_in_progress: HashSet::new(),
        }
    }

    /// Creates a root element for every global element, then a node type for every global
    /// complex type.
    pub(crate) fn map_schemas(mut self) -> Result<TypeTableBuilder, DomError> {
        for (name, element) in self.index.elements.clone() {
            let node_type = self.element_node_type(element)?;
            let substitution_group = attribute_value(element, "substitutionGroup")?;
            let field_name = self.field_name(&name);
            self.builder.add_root_element(RootElementDefinition {
                name,
                field_name,
                node_type,
                substitution_group,
            });
        }

        for (name, complex_type) in self.index.complex_types.clone() {
            self.map_complex_type(name, complex_type)?;
        }

        Ok(self.builder)
    }

    fn node_key(&self, node: Node) -> NodeKey {
        let document = self
            .documents
            .iter()
            .position(|document| std::ptr::eq(document, node.document()))
            .unwrap_or(usize::MAX);
        (document, node.id())
    }

    /// The local name if `name` belongs to a loaded namespace, otherwise `namespace:local`.
    fn field_name(&self, name: &QName) -> String {
        match name.namespace() {
            Some(namespace) if !self.index.target_namespaces.iter().any(|ns| ns == namespace) => {
                name.to_string()
            }
            _ => name.local_name.clone(),
        }
    }

    /// The qualified name of a global or local declaration, honoring `form` and the
    /// `elementFormDefault`/`attributeFormDefault` of its schema document.
    fn declaration_name(&self, declaration: Node, form_default: &str) -> Result<QName, DomError> {
        let name = required_name(declaration)?;
        let schema = declaration.document().root_element();
        let is_global = declaration
            .parent_element()
            .map_or(false, |parent| is_xs(parent, "schema"));
        let qualified = is_global
            || match declaration.attribute("form") {
                Some(form) => form == "qualified",
                None => schema.attribute(form_default) == Some("qualified"),
            };
        let namespace = if qualified {
            target_namespace(declaration)
        } else {
            None
        };
        Ok(QName::with_optional_namespace(namespace, name))
    }

    fn element_name(&self, element: Node) -> Result<QName, DomError> {
        self.declaration_name(element, "elementFormDefault")
    }

    fn resolve_type(&self, name: &QName) -> Result<TypeRef<'a, 'input>, DomError> {
        if name.is_xs() {
            if name.local_name == "anyType" {
                return Ok(TypeRef::Complex(ComplexTypeRef::AnyType));
            }
            if builtin_simple_type(&name.local_name).is_some() {
                return Ok(TypeRef::Simple(SimpleTypeRef::Builtin(name.clone())));
            }
        } else if let Some(&node) = self.index.complex_type_names.get(name) {
            return Ok(TypeRef::Complex(ComplexTypeRef::Named(name.clone(), node)));
        } else if let Some(&node) = self.index.simple_types.get(name) {
            return Ok(TypeRef::Simple(SimpleTypeRef::Named(name.clone(), node)));
        }
        Err(DomError::UnresolvedReference {
            kind: "type",
            name: name.clone(),
        })
    }

    fn resolve_simple_type(&self, name: &QName) -> Result<SimpleTypeRef<'a, 'input>, DomError> {
        match self.resolve_type(name)? {
            TypeRef::Simple(simple) => Ok(simple),
            TypeRef::Complex(_) => Err(DomError::UnresolvedReference {
                kind: "simple type",
                name: name.clone(),
            }),
        }
    }

    fn resolve_global(
        table: &HashMap<QName, Node<'a, 'input>>,
        kind: &'static str,
        name: &QName,
    ) -> Result<Node<'a, 'input>, DomError> {
        table
            .get(name)
            .copied()
            .ok_or_else(|| DomError::UnresolvedReference {
                kind,
                name: name.clone(),
            })
    }

    /// The type of an element declaration; elements without one take the type of their
    /// substitution group head, or `xs:anyType`.
    fn element_type(&self, element: Node<'a, 'input>) -> Result<TypeRef<'a, 'input>, DomError> {
        let mut element = element;
        let mut heads = HashSet::new();
        loop {
            if let Some(complex_type) = xs_child(element, "complexType") {
                return Ok(TypeRef::Complex(ComplexTypeRef::Anonymous(complex_type)));
            }
            if let Some(simple_type) = xs_child(element, "simpleType") {
                return Ok(TypeRef::Simple(SimpleTypeRef::Anonymous(simple_type)));
            }
            if let Some(type_name) = attribute_value::<QName>(element, "type")? {
                return self.resolve_type(&type_name);
            }
            let Some(head) = attribute_value::<QName>(element, "substitutionGroup")? else {
                return Ok(TypeRef::Complex(ComplexTypeRef::AnyType));
            };
            if !heads.insert(self.node_key(element)) {
                return Err(DomError::CircularDerivation(head));
            }
            element = Self::resolve_global(&self.index.element_names, "element", &head)?;
        }
    }

    /// The node type of elements declared by `element`.
    fn element_node_type(&mut self, element: Node<'a, 'input>) -> Result<NodeTypeId, DomError> {
        match self.element_type(element)? {
            TypeRef::Complex(complex_type) => self.complex_node_type(complex_type, element),
            TypeRef::Simple(simple_type) => self.wrap_simple_type(simple_type, element),
        }
    }

    fn complex_node_type(
        &mut self,
        complex_type: ComplexTypeRef<'a, 'input>,
        element: Node<'a, 'input>,
    ) -> Result<NodeTypeId, DomError> {
        match complex_type {
            ComplexTypeRef::Named(name, node) => self.map_complex_type(name, node),
            ComplexTypeRef::Anonymous(node) => {
                let name = self.local_type_name(element)?;
                self.map_complex_type(name, node)
            }
            ComplexTypeRef::AnyType => Ok(self.any_type()),
        }
    }

    /// Names the anonymous type of a local element by prefixing the names of enclosing types
    /// until the result is unique.
    fn local_type_name(&mut self, element: Node<'a, 'input>) -> Result<QName, DomError> {
        let key = self.node_key(element);
        if let Some(name) = self.local_type_names.get(&key) {
            return Ok(name.clone());
        }

        let element_name = self.element_name(element)?;
        let mut type_name: Option<String> = None;
        for ancestor in element.ancestors().skip(1) {
            if !is_xs(ancestor, "complexType") {
                continue;
            }
            let outer = ancestor
                .attribute("name")
                .or_else(|| ancestor.parent_element()?.attribute("name"))
                .unwrap_or_default();
            let inner = type_name.as_deref().unwrap_or(&element_name.local_name);
            let candidate = format!("{outer}_{inner}");
            if !self.type_name_set.contains(&candidate) {
                let name = QName::with_optional_namespace(
                    element_name.namespace_name.clone(),
                    candidate.clone(),
                );
                self.type_name_set.insert(candidate);
                self.local_type_names.insert(key, name.clone());
                return Ok(name);
            }
            type_name = Some(candidate);
        }

        Ok(element_name)
    }

    fn any_type(&mut self) -> NodeTypeId {
        let name = QName::with_namespace(XS_NAMESPACE, "anyType");
        if let Some(id) = self.builder.node_type_id(&name) {
            return id;
        }
        let id = self.builder.reserve_node_type(name);
        let mut definition = NodeTypeDefinition::default();
        definition.define_attribute(Self::value_attribute(self.mixed_text_type()));
        self.builder.insert_node_type(id, definition);
        id
    }

    fn mixed_text_type(&mut self) -> AttributeTypeId {
        let name = QName::with_optional_namespace(None::<String>, MIXED_TEXT_FIELD);
        match self.builder.attribute_type_id(&name) {
            Some(id) => id,
            None => self
                .builder
                .add_attribute_type(Some(name), ValueKind::String)
                .id(),
        }
    }

    fn value_attribute(attribute_type: AttributeTypeId) -> AttributeDefinition {
        AttributeDefinition {
            name: String::new(),
            attribute_type,
            default_value: None,
            is_element: false,
            annotations: Vec::new(),
        }
    }

    /// The extension or restriction element of a complex type with simple or complex content.
    fn derivation(complex_type: Node<'a, 'input>) -> Option<(Node<'a, 'input>, bool)> {
        let (content, is_simple) = match xs_child(complex_type, "complexContent") {
            Some(content) => (content, false),
            None => (xs_child(complex_type, "simpleContent")?, true),
        };
        let derivation = xs_child(content, "extension").or_else(|| xs_child(content, "restriction"))?;
        Some((derivation, is_simple))
    }

    /// The named complex base type, unless it is `xs:anyType` or the type itself.
    fn complex_base(
        &self,
        name: &QName,
        complex_type: Node<'a, 'input>,
    ) -> Result<Option<(QName, Node<'a, 'input>)>, DomError> {
        let Some((derivation, _)) = Self::derivation(complex_type) else {
            return Ok(None);
        };
        let Some(base_name) = attribute_value::<QName>(derivation, "base")? else {
            return Ok(None);
        };
        if &base_name == name {
            return Err(DomError::CircularDerivation(base_name));
        }
        match self.resolve_type(&base_name)? {
            TypeRef::Complex(ComplexTypeRef::Named(base_name, node)) => Ok(Some((base_name, node))),
            _ => Ok(None),
        }
    }

    fn map_complex_type(
        &mut self,
        name: QName,
        complex_type: Node<'a, 'input>,
    ) -> Result<NodeTypeId, DomError> {
        if let Some(id) = self.builder.node_type_id(&name) {
            return Ok(id);
        }
        let id = self.builder.reserve_node_type(name.clone());

        let mut definition = NodeTypeDefinition {
            is_abstract: attribute_value(complex_type, "abstract")?.unwrap_or(false),
            annotations: Annotation::annotations_of(complex_type),
            ..Default::default()
        };
        let legacy_id_attribute = definition
            .annotations
            .iter()
            .filter(|annotation| annotation.name == "idAttribute")
            .find_map(|annotation| annotation.attribute("name"));
        if let (Some(namespace), Some(id_attribute)) = (name.namespace(), legacy_id_attribute) {
            self.builder
                .set_id_attribute_name(namespace.to_string(), id_attribute.to_string());
        }

        if let Some((base_name, base)) = self.complex_base(&name, complex_type)? {
            definition.base = Some(self.map_complex_type(base_name, base)?);
        }

        let mut value_type = None;
        if let Some((derivation, true)) = Self::derivation(complex_type) {
            if let Some(base_name) = attribute_value::<QName>(derivation, "base")? {
                if let TypeRef::Simple(simple) = self.resolve_type(&base_name)? {
                    value_type = Some(self.attribute_type(simple)?);
                }
            }
        }
        let is_mixed = attribute_value(complex_type, "mixed")?.unwrap_or(false)
            || match xs_child(complex_type, "complexContent") {
                Some(content) => attribute_value(content, "mixed")?.unwrap_or(false),
                None => false,
            };
        if value_type.is_none() && is_mixed {
            value_type = Some(self.mixed_text_type());
        }

        let mut seen = HashSet::new();
        for particle in self.content_particles(&name, complex_type, &mut seen)? {
            self.walk_particle(particle, &mut definition, &mut Vec::new())?;
        }

        if let Some(value_type) = value_type {
            definition.define_attribute(Self::value_attribute(value_type));
        }

        let mut seen = HashSet::new();
        for attribute_use in self.attribute_uses(&name, complex_type, &mut seen)? {
            let attribute = self.map_attribute_use(attribute_use)?;
            definition.define_attribute(attribute);
        }

        self.builder.insert_node_type(id, definition);
        Ok(id)
    }

    /// The model groups making up the content of a complex type, base type content first.
    fn content_particles(
        &self,
        name: &QName,
        complex_type: Node<'a, 'input>,
        seen: &mut HashSet<NodeKey>,
    ) -> Result<Vec<Node<'a, 'input>>, DomError> {
        if !seen.insert(self.node_key(complex_type)) {
            return Err(DomError::CircularDerivation(name.clone()));
        }
        let Some((derivation, is_simple)) = Self::derivation(complex_type) else {
            return Ok(particle_child(complex_type).into_iter().collect());
        };
        if is_simple {
            return Ok(Vec::new());
        }
        let mut particles = Vec::new();
        if derivation.tag_name().name() == "extension" {
            if let Some((base_name, base)) = self.complex_base(name, complex_type)? {
                particles = self.content_particles(&base_name, base, seen)?;
            }
        }
        particles.extend(particle_child(derivation));
        Ok(particles)
    }

    /// The attributes in effect on a complex type, inherited ones first.
    fn attribute_uses(
        &self,
        name: &QName,
        complex_type: Node<'a, 'input>,
        seen: &mut HashSet<NodeKey>,
    ) -> Result<Vec<AttributeUse<'a, 'input>>, DomError> {
        if !seen.insert(self.node_key(complex_type)) {
            return Err(DomError::CircularDerivation(name.clone()));
        }
        let mut uses = match self.complex_base(name, complex_type)? {
            Some((base_name, base)) => self.attribute_uses(&base_name, base, seen)?,
            None => Vec::new(),
        };
        let holder = Self::derivation(complex_type)
            .map(|(derivation, _)| derivation)
            .unwrap_or(complex_type);
        self.collect_attributes(holder, &mut uses, &mut Vec::new())?;
        Ok(uses)
    }

    /// `groups` holds the attribute groups being expanded, innermost last.
    fn collect_attributes(
        &self,
        holder: Node<'a, 'input>,
        uses: &mut Vec<AttributeUse<'a, 'input>>,
        groups: &mut Vec<NodeKey>,
    ) -> Result<(), DomError> {
        for child in holder.children() {
            if is_xs(child, "attributeGroup") {
                if let Some(reference) = attribute_value::<QName>(child, "ref")? {
                    let group = Self::resolve_global(
                        &self.index.attribute_groups,
                        "attribute group",
                        &reference,
                    )?;
                    let key = self.node_key(group);
                    if groups.contains(&key) {
                        return Err(DomError::CircularDerivation(reference));
                    }
                    groups.push(key);
                    self.collect_attributes(group, uses, groups)?;
                    groups.pop();
                }
            } else if is_xs(child, "attribute") {
                let (name, declaration) = match attribute_value::<QName>(child, "ref")? {
                    Some(reference) => {
                        let declaration = Self::resolve_global(
                            &self.index.attributes,
                            "attribute",
                            &reference,
                        )?;
                        (reference, declaration)
                    }
                    None => (self.declaration_name(child, "attributeFormDefault")?, child),
                };
                let position = uses.iter().position(|existing| {
                    self.attribute_use_name(existing)
                        .map_or(false, |existing| existing == name)
                });
                if child.attribute("use") == Some("prohibited") {
                    if let Some(position) = position {
                        uses.remove(position);
                    }
                    continue;
                }
                let attribute_use = AttributeUse {
                    use_node: child,
                    declaration,
                };
                match position {
                    Some(position) => uses[position] = attribute_use,
                    None => uses.push(attribute_use),
                }
            }
        }
        Ok(())
    }

    fn attribute_use_name(&self, attribute_use: &AttributeUse) -> Result<QName, DomError> {
        match attribute_value::<QName>(attribute_use.use_node, "ref")? {
            Some(reference) => Ok(reference),
            None => self.declaration_name(attribute_use.use_node, "attributeFormDefault"),
        }
    }

    fn map_attribute_use(
        &mut self,
        attribute_use: AttributeUse<'a, 'input>,
    ) -> Result<AttributeDefinition, DomError> {
        let name = self.attribute_use_name(&attribute_use)?;
        let declaration = attribute_use.declaration;
        let attribute_type = if let Some(simple_type) = xs_child(declaration, "simpleType") {
            self.attribute_type(SimpleTypeRef::Anonymous(simple_type))?
        } else if let Some(type_name) = attribute_value::<QName>(declaration, "type")? {
            let simple_type = self.resolve_simple_type(&type_name)?;
            self.attribute_type(simple_type)?
        } else {
            let any_simple_type = QName::with_namespace(XS_NAMESPACE, "anySimpleType");
            self.attribute_type(SimpleTypeRef::Builtin(any_simple_type))?
        };
        let default_value = [attribute_use.use_node, declaration]
            .into_iter()
            .flat_map(|node| [node.attribute("default"), node.attribute("fixed")])
            .flatten()
            .next()
            .map(str::to_string);
        Ok(AttributeDefinition {
            name: self.field_name(&name),
            attribute_type,
            default_value,
            is_element: false,
            annotations: Annotation::annotations_of(declaration),
        })
    }

    /// Collects the elements of a content model. Choices and `all` groups are treated as
    /// sequences; wildcards are ignored. `groups` holds the model groups being expanded.
    fn walk_particle(
        &mut self,
        particle: Node<'a, 'input>,
        definition: &mut NodeTypeDefinition,
        groups: &mut Vec<NodeKey>,
    ) -> Result<(), DomError> {
        match particle.tag_name().name() {
            "element" => self.walk_element(particle, definition),
            "sequence" | "choice" | "all" => {
                for child in particle.children().filter(|child| is_particle(*child)) {
                    self.walk_particle(child, definition, groups)?;
                }
                Ok(())
            }
            "group" => {
                let Some(reference) = attribute_value::<QName>(particle, "ref")? else {
                    return Ok(());
                };
                let group = Self::resolve_global(&self.index.groups, "group", &reference)?;
                let key = self.node_key(group);
                if groups.contains(&key) {
                    return Err(DomError::CircularDerivation(reference));
                }
                let Some(model_group) = particle_child(group) else {
                    return Ok(());
                };
                groups.push(key);
                self.walk_particle(model_group, definition, groups)?;
                groups.pop();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn walk_element(
        &mut self,
        element: Node<'a, 'input>,
        definition: &mut NodeTypeDefinition,
    ) -> Result<(), DomError> {
        let (declaration, name, reference) = match attribute_value::<QName>(element, "ref")? {
            Some(reference) => {
                let declaration =
                    Self::resolve_global(&self.index.element_names, "element", &reference)?;
                (declaration, reference.clone(), Some(reference))
            }
            None => (element, self.element_name(element)?, None),
        };
        let occurs = Occurs::of(element)?;
        let field_name = self.field_name(&name);
        let annotations = Annotation::annotations_of(element);

        let node_type = match self.element_type(declaration)? {
            TypeRef::Simple(simple_type) if occurs.max == Some(1) => {
                let attribute_type = self.attribute_type(simple_type)?;
                let default = declaration.attribute("default");
                let fixed = declaration.attribute("fixed");
                if default.is_some() && fixed.is_some() {
                    return Err(DomError::DefaultAndFixed(name));
                }
                definition.define_attribute(AttributeDefinition {
                    name: field_name,
                    attribute_type,
                    default_value: default.or(fixed).map(str::to_string),
                    is_element: true,
                    annotations,
                });
                return Ok(());
            }
            TypeRef::Simple(simple_type) => self.wrap_simple_type(simple_type, declaration)?,
            TypeRef::Complex(complex_type) => self.complex_node_type(complex_type, declaration)?,
        };

        let occurs = match element.parent_element() {
            Some(parent) if is_xs(parent, "sequence") || is_xs(parent, "choice") => {
                occurs.relaxed(Occurs::of(parent)?)
            }
            _ => occurs,
        };
        let count_rule = (occurs.min > 0 || occurs.max.is_some()).then_some(ChildCountRule {
            min: occurs.min,
            max: occurs.max,
        });
        definition.define_child(ChildDefinition {
            name: field_name,
            node_type,
            is_list: occurs.max.map_or(true, |max| max > 1),
            count_rule,
            reference,
            annotations,
        });
        Ok(())
    }

    /// A node type holding a simple type as its value attribute, for repeated or global
    /// elements of simple type.
    fn wrap_simple_type(
        &mut self,
        simple_type: SimpleTypeRef<'a, 'input>,
        element: Node<'a, 'input>,
    ) -> Result<NodeTypeId, DomError> {
        let (name, annotations) = match &simple_type {
            SimpleTypeRef::Builtin(name) => (name.clone(), Vec::new()),
            SimpleTypeRef::Named(name, node) => (name.clone(), Annotation::annotations_of(*node)),
            SimpleTypeRef::Anonymous(node) => {
                (self.local_type_name(element)?, Annotation::annotations_of(*node))
            }
        };
        if let Some(id) = self.builder.node_type_id(&name) {
            return Ok(id);
        }
        let attribute_type = self.attribute_type(simple_type)?;
        let id = self.builder.reserve_node_type(name);
        let mut definition = NodeTypeDefinition {
            annotations,
            ..Default::default()
        };
        definition.define_attribute(Self::value_attribute(attribute_type));
        self.builder.insert_node_type(id, definition);
        Ok(id)
    }

    fn attribute_type(
        &mut self,
        simple_type: SimpleTypeRef<'a, 'input>,
    ) -> Result<AttributeTypeId, DomError> {
        match simple_type {
            SimpleTypeRef::Builtin(name) => {
                if let Some(id) = self.builder.attribute_type_id(&name) {
                    return Ok(id);
                }
                let builtin = builtin_simple_type(&name.local_name).ok_or_else(|| {
                    DomError::UnresolvedReference {
                        kind: "simple type",
                        name: name.clone(),
                    }
                })?;
                let attribute_type = self.builder.add_attribute_type(Some(name), builtin.kind);
                attribute_type.is_list = builtin.is_list;
                attribute_type.is_id = builtin.is_id;
                if builtin.is_list {
                    attribute_type.length = None;
                }
                Ok(attribute_type.id())
            }
            SimpleTypeRef::Named(name, node) => match self.builder.attribute_type_id(&name) {
                Some(id) => Ok(id),
                None => self.map_simple_type(Some(name), node),
            },
            SimpleTypeRef::Anonymous(node) => self.map_simple_type(None, node),
        }
    }

    /// The attribute type of a simple type given by a `base`/`itemType` attribute or an
    /// inline `<xs:simpleType>` child.
    fn referenced_simple_type(
        &mut self,
        node: Node<'a, 'input>,
        attribute: &str,
    ) -> Result<AttributeTypeId, DomError> {
        if let Some(name) = attribute_value::<QName>(node, attribute)? {
            let simple_type = self.resolve_simple_type(&name)?;
            return self.attribute_type(simple_type);
        }
        match xs_child(node, "simpleType") {
            Some(inline) => self.attribute_type(SimpleTypeRef::Anonymous(inline)),
            None => {
                let name = QName::with_namespace(XS_NAMESPACE, "anySimpleType");
                self.attribute_type(SimpleTypeRef::Builtin(name))
            }
        }
    }

    fn map_simple_type(
        &mut self,
        name: Option<QName>,
        simple_type: Node<'a, 'input>,
    ) -> Result<AttributeTypeId, DomError> {
        let annotations = Annotation::annotations_of(simple_type);
        if let Some(name) = &name {
            if !self.simple_types_in_progress.insert(name.clone()) {
                return Err(DomError::CircularDerivation(name.clone()));
            }
        }

        let (kind, is_list, length, is_id, rules) =
            if let Some(restriction) = xs_child(simple_type, "restriction") {
                let base = self.referenced_simple_type(restriction, "base")?;
                let base = self.builder.attribute_type(base);
                let (length, rules) = Self::restriction_facets(restriction, base.length)?;
                (base.kind, base.is_list, length, base.is_id, rules)
            } else if let Some(list) = xs_child(simple_type, "list") {
                let item = self.referenced_simple_type(list, "itemType")?;
                let item = self.builder.attribute_type(item);
                (item.kind, true, None, false, Vec::new())
            } else {
                // Unions are kept as strings
                (ValueKind::String, false, Some(1), false, Vec::new())
            };

        if let Some(name) = &name {
            self.simple_types_in_progress.remove(name);
        }
        let attribute_type = self.builder.add_attribute_type(name, kind);
        attribute_type.is_list = is_list;
        attribute_type.length = length;
        attribute_type.is_id = is_id;
        attribute_type.rules = rules;
        attribute_type.annotations = annotations;
        Ok(attribute_type.id())
    }

    /// Length and rules of a simple type restriction. `length` sets the length; `minLength` and
    /// `maxLength` can only raise it.
    fn restriction_facets(
        restriction: Node,
        base_length: Option<usize>,
    ) -> Result<(Option<usize>, Vec<AttributeRule>), DomError> {
        let mut length = base_length;
        let mut rules = Vec::new();
        let mut enumeration = Vec::new();
        for facet in restriction.children().filter(Node::is_element) {
            let Some(value) = facet.attribute("value") else {
                continue;
            };
            let number = || value.trim().parse::<f64>().ok();
            match facet.tag_name().name() {
                "enumeration" => enumeration.push(value.to_string()),
                "length" => length = Some(actual_value(value, facet)?),
                "minLength" | "maxLength" => {
                    let bound: usize = actual_value(value, facet)?;
                    length = length.map(|length| length.max(bound));
                }
                "minInclusive" | "minExclusive" => {
                    if let Some(value) = number() {
                        let inclusive = facet.tag_name().name() == "minInclusive";
                        rules.push(AttributeRule::NumericMin { value, inclusive });
                    }
                }
                "maxInclusive" | "maxExclusive" => {
                    if let Some(value) = number() {
                        let inclusive = facet.tag_name().name() == "maxInclusive";
                        rules.push(AttributeRule::NumericMax { value, inclusive });
                    }
                }
                _ => {}
            }
        }
        if !enumeration.is_empty() {
            rules.push(AttributeRule::StringEnum(enumeration));
        }
        Ok((length, rules))
    }
}
