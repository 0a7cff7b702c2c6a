//! The registry to generate, with every name already resolved to a unique identifier.

use log::debug;

use dom_schema::{
    AttributeRule, NodeType, SchemaTypeCollection, ValueKind, XS_NAMESPACE,
};

use super::naming::{self, UniqueNames};
use super::{GenerateError, GeneratorOptions};

pub type Name = String;

/// A handle field and the schema name it is resolved from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub ident: Name,
    pub name: Name,
}

/// The handles of one node type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Class {
    pub struct_name: Name,
    /// Field of the registry holding this class
    pub field_name: Name,
    pub namespace: String,
    pub type_name: Name,
    pub is_abstract: bool,
    pub attributes: Vec<Field>,
    pub children: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumVariant {
    pub ident: Name,
    pub value: String,
}

/// A string enumeration simple type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enumeration {
    pub ident: Name,
    pub type_name: Name,
    pub variants: Vec<EnumVariant>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registry {
    pub name: Name,
    pub namespace: String,
    pub classes: Vec<Class>,
    pub root_elements: Vec<Field>,
    pub enums: Vec<Enumeration>,
}

/// Whether a type is generated, honoring `<sce.domgen include="…"/>`.
fn is_included(node_type: &NodeType, annotated_only: bool) -> Result<bool, GenerateError> {
    let mut include = !annotated_only;
    for annotation in node_type
        .annotations()
        .iter()
        .filter(|annotation| annotation.name == "sce.domgen")
    {
        if let Some(value) = annotation.attribute("include") {
            include = match value.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    return Err(GenerateError::InvalidIncludeAnnotation {
                        type_name: node_type.name().clone(),
                        value: value.to_string(),
                    })
                }
            };
        }
    }
    Ok(include)
}

impl Registry {
    pub fn from_collection(
        collection: &SchemaTypeCollection,
        options: &GeneratorOptions,
    ) -> Result<Self, GenerateError> {
        let target_namespace = collection.target_namespace();

        // Types of the importing schema come first so they win name collisions
        let mut namespaces = vec![target_namespace];
        for (_, namespace) in collection.namespaces() {
            if namespace != XS_NAMESPACE && !namespaces.contains(&namespace.as_str()) {
                namespaces.push(namespace);
            }
        }

        let mut type_names = UniqueNames::new();
        type_names.reserve(options.registry_name.clone());
        let mut registry_fields = UniqueNames::new();

        let mut classes = Vec::new();
        for namespace in &namespaces {
            for node_type in collection.node_types_in(namespace) {
                if !is_included(node_type, options.annotated_only)? {
                    debug!("skipping node type {}", node_type.name());
                    continue;
                }
                classes.push(Self::class(
                    node_type,
                    namespace,
                    &mut type_names,
                    &mut registry_fields,
                ));
            }
        }

        let root_elements = collection
            .root_elements()
            .map(|root| {
                let base = naming::field_name(root.field_name());
                Field {
                    ident: registry_fields.claim([format!("{base}_root_element")]),
                    name: root.field_name().to_string(),
                }
            })
            .collect();

        let enums = if options.enums {
            Self::enums(collection, &namespaces)
        } else {
            Vec::new()
        };

        Ok(Self {
            name: options.registry_name.clone(),
            namespace: target_namespace.to_string(),
            classes,
            root_elements,
            enums,
        })
    }

    fn class(
        node_type: &NodeType,
        namespace: &str,
        type_names: &mut UniqueNames,
        registry_fields: &mut UniqueNames,
    ) -> Class {
        let name = node_type.name();
        let qualified = name.to_string();
        let struct_name = type_names.claim([
            naming::type_name(&name.local_name),
            naming::type_name(&qualified),
        ]);
        let field_name = registry_fields.claim([
            naming::field_name(&name.local_name),
            naming::field_name(&qualified),
        ]);

        let mut fields = UniqueNames::new();
        fields.reserve("ty");
        let attributes = node_type
            .attributes()
            .iter()
            .map(|attribute| {
                let base = if attribute.is_value_attribute() {
                    "value".to_string()
                } else {
                    naming::field_name(attribute.name())
                };
                Field {
                    ident: fields.claim([format!("{base}_attribute")]),
                    name: attribute.name().to_string(),
                }
            })
            .collect();
        let children = node_type
            .children()
            .iter()
            .map(|child| Field {
                ident: fields.claim([format!("{}_child", naming::field_name(child.name()))]),
                name: child.name().to_string(),
            })
            .collect();

        Class {
            struct_name,
            field_name,
            namespace: namespace.to_string(),
            type_name: name.local_name.clone(),
            is_abstract: node_type.is_abstract(),
            attributes,
            children,
        }
    }

    /// Enums are emitted into their own module, so their names only have to be unique among
    /// themselves.
    fn enums(collection: &SchemaTypeCollection, namespaces: &[&str]) -> Vec<Enumeration> {
        let mut type_names = UniqueNames::new();
        let mut enums = Vec::new();
        for attribute_type in collection.table().attribute_types() {
            let Some(name) = attribute_type.name() else {
                continue;
            };
            if !name
                .namespace()
                .map_or(false, |namespace| namespaces.contains(&namespace))
            {
                continue;
            }
            if attribute_type.kind() != ValueKind::String || attribute_type.is_list() {
                continue;
            }
            let Some(values) = attribute_type.rules().iter().find_map(|rule| match rule {
                AttributeRule::StringEnum(values) => Some(values),
                _ => None,
            }) else {
                continue;
            };

            let mut variant_names = UniqueNames::new();
            let mut variants: Vec<EnumVariant> = Vec::new();
            for value in values {
                if variants.iter().any(|variant| &variant.value == value) {
                    continue;
                }
                variants.push(EnumVariant {
                    ident: variant_names.claim([naming::string_variant_to_ident(value)]),
                    value: value.clone(),
                });
            }
            enums.push(Enumeration {
                ident: type_names.claim([
                    naming::type_name(&name.local_name),
                    naming::type_name(&name.to_string()),
                ]),
                type_name: name.local_name.clone(),
                variants,
            });
        }
        enums
    }
}
