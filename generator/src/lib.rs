//! Generates [`SchemaRegistry`](dom_schema::SchemaRegistry) implementations from loaded schemas.
//!
//! The output holds one struct of handles per node type, a registry struct holding all of them
//! plus the root element handles, and optionally one enum per string enumeration type.

pub mod ist;
pub mod naming;
mod rust;

use log::info;
use thiserror::Error;

use dom_schema::{DomError, QName, SchemaTypeLoader};

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error("schema namespace {0:?} is missing or has no types")]
    MissingNamespace(String),
    #[error("invalid include annotation {value:?} on node type {type_name}")]
    InvalidIncludeAnnotation { type_name: QName, value: String },
}

#[derive(Clone, Debug)]
pub struct GeneratorOptions {
    /// Namespace of the schema to generate; `None` selects the collection of the loaded document
    pub schema_namespace: Option<String>,
    /// Name of the registry struct
    pub registry_name: String,
    /// Only generate node types annotated with `<sce.domgen include="true"/>`
    pub annotated_only: bool,
    /// Generate an enum for every string enumeration type
    pub enums: bool,
    /// Shown in the header of the generated file
    pub source_name: Option<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            schema_namespace: None,
            registry_name: "Schema".to_string(),
            annotated_only: false,
            enums: false,
            source_name: None,
        }
    }
}

/// Builds the registry model for the selected collection.
pub fn registry(
    loader: &SchemaTypeLoader,
    options: &GeneratorOptions,
) -> Result<ist::Registry, GenerateError> {
    let collection = match options.schema_namespace.as_deref() {
        Some(namespace) => loader.type_collection(namespace),
        None => loader.type_collections().first(),
    }
    .ok_or_else(|| {
        GenerateError::MissingNamespace(options.schema_namespace.clone().unwrap_or_default())
    })?;
    ist::Registry::from_collection(collection, options)
}

/// Generates the Rust source of the registry.
pub fn generate(
    loader: &SchemaTypeLoader,
    options: &GeneratorOptions,
) -> Result<String, GenerateError> {
    let registry = registry(loader, options)?;
    info!(
        "generating {} with {} node types and {} root elements",
        registry.name,
        registry.classes.len(),
        registry.root_elements.len()
    );

    let mut header = String::from(
        "// -----------------------------------------------------------------------------\n\
         // Generated code, do not edit\n",
    );
    header.push_str(&format!(
        "// Generator: {} {}\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(source_name) = &options.source_name {
        header.push_str(&format!("// Source: {source_name}\n"));
    }
    header.push_str("// -----------------------------------------------------------------------------\n");

    Ok(rust::generate(&registry, &header))
}

#[cfg(test)]
mod tests;
