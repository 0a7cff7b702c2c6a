use syn::{parse_quote, Expr, FieldValue, Ident, Item};

use super::ist::{Class, Enumeration, Registry};
use super::naming::name_to_ident;

struct RustVisitor<'a> {
    registry: &'a Registry,
    output_items: Vec<Item>,
    enum_items: Vec<Item>,
}

impl<'a> RustVisitor<'a> {
    fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            output_items: Vec::new(),
            enum_items: Vec::new(),
        }
    }

    /// `NS` for the target namespace, a literal for any other.
    fn namespace_expr(&self, namespace: &str) -> Expr {
        if namespace == self.registry.namespace {
            parse_quote!(NS)
        } else {
            parse_quote!(#namespace)
        }
    }

    fn visit_namespace(&mut self) {
        let namespace = &self.registry.namespace;
        self.output_items.push(parse_quote! {
            /// Target namespace of the schema
            pub const NS: &str = #namespace;
        });
    }

    fn visit_class(&mut self, class: &Class) {
        let name = name_to_ident(&class.struct_name);
        let doc = if class.is_abstract {
            format!(" Handles of the abstract node type `{}`.", class.type_name)
        } else {
            format!(" Handles of node type `{}`.", class.type_name)
        };
        let attributes = class.attributes.iter().map(|field| name_to_ident(&field.ident));
        let children = class.children.iter().map(|field| name_to_ident(&field.ident));
        self.output_items.push(parse_quote! {
            #[doc = #doc]
            #[derive(Clone, Debug, PartialEq, Eq)]
            pub struct #name {
                pub ty: ::dom_schema::NodeTypeId,
                #(pub #attributes: ::dom_schema::AttributeId,)*
                #(pub #children: ::dom_schema::ChildId,)*
            }
        });
    }

    fn visit_registry(&mut self) {
        let registry = self.registry;
        let name = name_to_ident(&registry.name);
        let doc = format!(" Typed handles for every symbol of namespace `{}`.", registry.namespace);
        let class_fields: Vec<Ident> = registry
            .classes
            .iter()
            .map(|class| name_to_ident(&class.field_name))
            .collect();
        let class_types = registry
            .classes
            .iter()
            .map(|class| name_to_ident(&class.struct_name));
        let root_fields: Vec<Ident> = registry
            .root_elements
            .iter()
            .map(|root| name_to_ident(&root.ident))
            .collect();
        self.output_items.push(parse_quote! {
            #[doc = #doc]
            #[derive(Clone, Debug, PartialEq, Eq)]
            pub struct #name {
                #(pub #class_fields: #class_types,)*
                #(pub #root_fields: ::dom_schema::RootElementId,)*
            }
        });

        let mut initializers: Vec<FieldValue> = Vec::new();
        let mut bindings: Vec<Expr> = Vec::new();
        for (class, field) in registry.classes.iter().zip(&class_fields) {
            let struct_name = name_to_ident(&class.struct_name);
            let namespace = self.namespace_expr(&class.namespace);
            let type_name = &class.type_name;

            let mut handles: Vec<FieldValue> = vec![parse_quote!(ty: ty.id())];
            bindings.push(parse_quote! {
                ::dom_schema::Binding::NodeType {
                    namespace: #namespace,
                    name: #type_name,
                    id: self.#field.ty,
                }
            });
            for attribute in &class.attributes {
                let ident = name_to_ident(&attribute.ident);
                let name = &attribute.name;
                handles.push(parse_quote!(#ident: ty.attribute_id(#name)?));
                bindings.push(parse_quote! {
                    ::dom_schema::Binding::Attribute {
                        node_type: self.#field.ty,
                        name: #name,
                        id: self.#field.#ident,
                    }
                });
            }
            for child in &class.children {
                let ident = name_to_ident(&child.ident);
                let name = &child.name;
                handles.push(parse_quote!(#ident: ty.child_id(#name)?));
                bindings.push(parse_quote! {
                    ::dom_schema::Binding::Child {
                        node_type: self.#field.ty,
                        name: #name,
                        id: self.#field.#ident,
                    }
                });
            }

            initializers.push(parse_quote! {
                #field: {
                    let ty = get_node_type(#namespace, #type_name)?;
                    #struct_name { #(#handles),* }
                }
            });
        }
        for (root, field) in registry.root_elements.iter().zip(&root_fields) {
            let root_name = &root.name;
            initializers.push(parse_quote!(#field: get_root_element(NS, #root_name)?.id()));
            bindings.push(parse_quote! {
                ::dom_schema::Binding::RootElement {
                    namespace: NS,
                    name: #root_name,
                    id: self.#field,
                }
            });
        }

        self.output_items.push(parse_quote! {
            impl ::dom_schema::SchemaRegistry for #name {
                const NAMESPACE: &'static str = NS;

                fn bind<'a, N, R>(
                    get_node_type: N,
                    get_root_element: R,
                ) -> ::core::result::Result<Self, ::dom_schema::DomError>
                where
                    N: Fn(&str, &str) -> ::core::result::Result<&'a ::dom_schema::NodeType, ::dom_schema::DomError>,
                    R: Fn(&str, &str) -> ::core::result::Result<&'a ::dom_schema::RootElement, ::dom_schema::DomError>,
                {
                    ::core::result::Result::Ok(Self {
                        #(#initializers,)*
                    })
                }

                fn bindings(&self) -> ::std::vec::Vec<::dom_schema::Binding> {
                    ::std::vec::Vec::from([#(#bindings),*])
                }
            }
        });
    }

    fn visit_enum(&mut self, enumeration: &Enumeration) {
        let name = name_to_ident(&enumeration.ident);
        let type_name = &enumeration.type_name;
        let doc = format!(" Values of simple type `{type_name}`.");
        let variants: Vec<Ident> = enumeration
            .variants
            .iter()
            .map(|variant| name_to_ident(&variant.ident))
            .collect();
        let values: Vec<&String> = enumeration
            .variants
            .iter()
            .map(|variant| &variant.value)
            .collect();
        let variant_docs = values
            .iter()
            .map(|value| format!(" Enumeration value `` {value} ``"));

        self.enum_items.push(parse_quote! {
            #[doc = #doc]
            #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
            pub enum #name {
                #(
                    #[doc = #variant_docs]
                    #variants,
                )*
            }
        });
        self.enum_items.push(parse_quote! {
            impl #name {
                pub const VALUES: &'static [Self] = &[#(Self::#variants),*];

                /// The lexical form of the value
                pub fn as_str(self) -> &'static str {
                    match self {
                        #(Self::#variants => #values,)*
                    }
                }
            }
        });
        self.enum_items.push(parse_quote! {
            impl ::core::str::FromStr for #name {
                type Err = ::dom_schema::DomError;

                fn from_str(value: &str) -> ::core::result::Result<Self, Self::Err> {
                    match value {
                        #(#values => ::core::result::Result::Ok(Self::#variants),)*
                        _ => ::core::result::Result::Err(::dom_schema::DomError::ValueNotInEnumeration {
                            type_name: #type_name,
                            value: value.to_string(),
                        }),
                    }
                }
            }
        });
        self.enum_items.push(parse_quote! {
            impl ::core::fmt::Display for #name {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        });
    }
}

/// Renders the registry as Rust source. The output has no inner attributes, so it can be
/// spliced into a module with `include!`. Enums go into a nested `enums` module, keeping them
/// apart from the handle structs and from the `dom_schema` types they may be named after.
pub fn generate(registry: &Registry, header: &str) -> String {
    let mut visitor = RustVisitor::new(registry);
    visitor.visit_namespace();
    for class in &registry.classes {
        visitor.visit_class(class);
    }
    visitor.visit_registry();
    for enumeration in &registry.enums {
        visitor.visit_enum(enumeration);
    }
    if !visitor.enum_items.is_empty() {
        let enum_items = std::mem::take(&mut visitor.enum_items);
        visitor.output_items.push(parse_quote! {
            /// Enumerated simple types of the schema
            pub mod enums {
                #(#enum_items)*
            }
        });
    }

    let root = syn::File {
        shebang: None,
        attrs: Vec::new(),
        items: visitor.output_items,
    };
    format!("{header}\n{}", prettyplease::unparse(&root))
}
