use dom_schema::{ImportResolver, SchemaSource, SchemaTypeLoader, StaticImportResolver};

use super::*;

const SHAPES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns="urn:shapes"
           xmlns:other="urn:other" targetNamespace="urn:shapes" elementFormDefault="qualified">
  <xs:import namespace="urn:other" schemaLocation="other.xsd"/>

  <xs:simpleType name="FillType">
    <xs:restriction base="xs:NMTOKEN">
      <xs:enumeration value="SOLID"/>
      <xs:enumeration value="HATCHED"/>
      <xs:enumeration value="1.0"/>
    </xs:restriction>
  </xs:simpleType>

  <xs:complexType name="shape" abstract="true">
    <xs:attribute name="id" type="xs:ID"/>
    <xs:attribute name="type" type="xs:string"/>
  </xs:complexType>

  <xs:complexType name="circle">
    <xs:complexContent>
      <xs:extension base="shape">
        <xs:sequence>
          <xs:element name="radius" type="xs:float"/>
          <xs:element name="center" type="other:node" minOccurs="0"/>
        </xs:sequence>
        <xs:attribute name="fill" type="FillType"/>
      </xs:extension>
    </xs:complexContent>
  </xs:complexType>

  <xs:complexType name="node">
    <xs:simpleContent>
      <xs:extension base="xs:string"/>
    </xs:simpleContent>
  </xs:complexType>

  <xs:complexType name="hidden">
    <xs:annotation>
      <xs:appinfo>
        <sce.domgen include="false"/>
      </xs:appinfo>
    </xs:annotation>
  </xs:complexType>

  <xs:complexType name="marked">
    <xs:annotation>
      <xs:appinfo>
        <sce.domgen include="true"/>
      </xs:appinfo>
    </xs:annotation>
  </xs:complexType>

  <xs:element name="drawing">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="circle" type="circle" maxOccurs="unbounded"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
  <xs:element name="self" type="node"/>
</xs:schema>
"#;

const OTHER: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns="urn:other"
           targetNamespace="urn:other">
  <xs:complexType name="node">
    <xs:attribute name="x" type="xs:float"/>
  </xs:complexType>
</xs:schema>
"#;

fn load(text: &str) -> SchemaTypeLoader {
    let resolvers: Vec<Box<dyn ImportResolver>> = vec![Box::new(
        StaticImportResolver::new().with_location("other.xsd", SchemaSource::new("other.xsd", OTHER)),
    )];
    SchemaTypeLoader::load(SchemaSource::new("shapes.xsd", text), &resolvers).unwrap()
}

fn options() -> GeneratorOptions {
    GeneratorOptions {
        registry_name: "ShapesSchema".to_string(),
        enums: true,
        source_name: Some("shapes.xsd".to_string()),
        ..Default::default()
    }
}

#[test]
fn classes_follow_the_node_types() {
    let loader = load(SHAPES);
    let registry = registry(&loader, &options()).unwrap();
    assert_eq!(registry.name, "ShapesSchema");
    assert_eq!(registry.namespace, "urn:shapes");

    let names: Vec<_> = registry
        .classes
        .iter()
        .map(|class| (class.struct_name.as_str(), class.type_name.as_str()))
        .collect();
    assert_eq!(
        names,
        [
            ("Drawing", "drawing"),
            ("Circle", "circle"),
            ("Shape", "shape"),
            ("Node", "node"),
            ("Marked", "marked"),
            ("UrnOtherNode", "node"),
        ]
    );

    // Node types are listed in creation order, referenced types before later declarations
    let circle = &registry.classes[1];
    assert_eq!(circle.field_name, "circle");
    let attributes: Vec<_> = circle
        .attributes
        .iter()
        .map(|field| (field.ident.as_str(), field.name.as_str()))
        .collect();
    assert_eq!(
        attributes,
        [
            ("id_attribute", "id"),
            ("type_attribute", "type"),
            ("radius_attribute", "radius"),
            ("fill_attribute", "fill"),
        ]
    );
    assert_eq!(circle.children[0].ident, "center_child");
    assert!(registry.classes[2].is_abstract);

    let node = &registry.classes[3];
    assert_eq!(node.attributes[0].ident, "value_attribute");
    assert_eq!(node.attributes[0].name, "");

    let other_node = &registry.classes[5];
    assert_eq!(other_node.namespace, "urn:other");
    assert_eq!(other_node.field_name, "urn_other_node");

    let roots: Vec<_> = registry
        .root_elements
        .iter()
        .map(|field| (field.ident.as_str(), field.name.as_str()))
        .collect();
    assert_eq!(
        roots,
        [
            ("drawing_root_element", "drawing"),
            ("self_root_element", "self"),
        ]
    );
}

#[test]
fn annotated_only_keeps_marked_types() {
    let loader = load(SHAPES);
    let options = GeneratorOptions {
        annotated_only: true,
        ..options()
    };
    let registry = registry(&loader, &options).unwrap();
    let names: Vec<_> = registry
        .classes
        .iter()
        .map(|class| class.type_name.as_str())
        .collect();
    assert_eq!(names, ["marked"]);
}

#[test]
fn invalid_include_annotation() {
    let text = SHAPES.replace(r#"include="false""#, r#"include="maybe""#);
    let loader = load(&text);
    assert!(matches!(
        registry(&loader, &options()),
        Err(GenerateError::InvalidIncludeAnnotation { value, .. }) if value == "maybe"
    ));
}

#[test]
fn missing_namespace() {
    let loader = load(SHAPES);
    let options = GeneratorOptions {
        schema_namespace: Some("urn:missing".to_string()),
        ..options()
    };
    assert!(matches!(
        registry(&loader, &options),
        Err(GenerateError::MissingNamespace(namespace)) if namespace == "urn:missing"
    ));
}

#[test]
fn enumerations() {
    let loader = load(SHAPES);
    let registry = registry(&loader, &options()).unwrap();
    assert_eq!(registry.enums.len(), 1);
    let fill = &registry.enums[0];
    assert_eq!(fill.ident, "FillType");
    let variants: Vec<_> = fill
        .variants
        .iter()
        .map(|variant| (variant.ident.as_str(), variant.value.as_str()))
        .collect();
    assert_eq!(
        variants,
        [("Solid", "SOLID"), ("Hatched", "HATCHED"), ("_10", "1.0")]
    );

    let registry = super::registry(&loader, &GeneratorOptions::default()).unwrap();
    assert!(registry.enums.is_empty());
}

#[test]
fn generated_source() {
    let loader = load(SHAPES);
    let source = generate(&loader, &options()).unwrap();

    assert!(source.starts_with("// ---"));
    assert!(source.contains("// Generated code, do not edit"));
    assert!(source.contains("// Source: shapes.xsd"));
    assert!(!source.contains("#!["));
    assert!(source.contains(r#"pub const NS: &str = "urn:shapes";"#));
    assert!(source.contains("pub struct Circle {"));
    assert!(source.contains("pub type_attribute: ::dom_schema::AttributeId,"));
    assert!(source.contains("pub center_child: ::dom_schema::ChildId,"));
    assert!(source.contains("pub struct ShapesSchema {"));
    assert!(source.contains("pub urn_other_node: UrnOtherNode,"));
    assert!(source.contains("pub self_root_element: ::dom_schema::RootElementId,"));
    assert!(source.contains("impl ::dom_schema::SchemaRegistry for ShapesSchema {"));
    assert!(source.contains(r#"let ty = get_node_type(NS, "circle")?;"#));
    assert!(source.contains(r#"let ty = get_node_type("urn:other", "node")?;"#));
    assert!(source.contains(r#"fill_attribute: ty.attribute_id("fill")?"#));
    assert!(source.contains(r#"center_child: ty.child_id("center")?"#));
    assert!(source.contains(r#"get_root_element(NS, "drawing")?.id()"#));
    let enums = source.find("pub mod enums {").unwrap();
    assert!(source[enums..].contains("pub enum FillType {"));
    assert!(!source[..enums].contains("pub enum"));
    assert!(source.contains(r#"Self::Hatched => "HATCHED","#));
    assert!(source.contains("impl ::core::str::FromStr for FillType {"));

    syn::parse_file(&source).unwrap();
}

#[test]
fn enums_do_not_compete_with_classes_for_names() {
    let loader = load(
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns="urn:shapes"
                      targetNamespace="urn:shapes">
             <xs:simpleType name="NodeType">
               <xs:restriction base="xs:string">
                 <xs:enumeration value="NODE"/>
                 <xs:enumeration value="JOINT"/>
               </xs:restriction>
             </xs:simpleType>
             <xs:complexType name="node_type">
               <xs:attribute name="type" type="NodeType"/>
             </xs:complexType>
           </xs:schema>"#,
    );
    let registry = registry(&loader, &options()).unwrap();
    assert_eq!(registry.classes[0].struct_name, "NodeType");
    assert_eq!(registry.enums[0].ident, "NodeType");

    let source = generate(&loader, &options()).unwrap();
    let file = syn::parse_file(&source).unwrap();
    let enums = file
        .items
        .iter()
        .find_map(|item| match item {
            syn::Item::Mod(module) if module.ident == "enums" => module.content.as_ref(),
            _ => None,
        })
        .unwrap();
    assert!(enums.1.iter().any(|item| matches!(
        item,
        syn::Item::Enum(enumeration) if enumeration.ident == "NodeType"
    )));
}
