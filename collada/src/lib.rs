//! Typed handles for the COLLADA 1.4.1 schema.
//!
//! [`ColladaSchema`] and the enumerations of the schema (in [`enums`]) are generated from
//! `schemas/collada.xsd` when the crate is built. Bind the registry once against the loaded
//! schema and hand it to whatever reads or writes COLLADA documents:
//!
//! ```no_run
//! let (collection, schema) = collada_schema::initialize()?;
//! let mesh = collection.node_type(schema.mesh.ty);
//! # Ok::<(), dom_schema::DomError>(())
//! ```

mod generated {
    include!(concat!(env!("OUT_DIR"), "/collada_schema.rs"));
}

pub use generated::*;

use log::debug;

use dom_schema::{
    DomError, ImportResolver, SchemaRegistry, SchemaSource, SchemaTypeCollection,
    SchemaTypeLoader, StaticImportResolver,
};

/// The bundled schema document
pub const SCHEMA: &str = include_str!("../schemas/collada.xsd");

/// Loads the bundled schema together with the XML namespace schema it imports.
pub fn load() -> Result<SchemaTypeLoader, DomError> {
    let import_resolvers: [Box<dyn ImportResolver>; 1] =
        [Box::new(StaticImportResolver::with_xml_schema())];
    SchemaTypeLoader::load(SchemaSource::new("collada.xsd", SCHEMA), &import_resolvers)
}

/// The type collection of the COLLADA namespace.
pub fn load_collection() -> Result<SchemaTypeCollection, DomError> {
    load()?
        .into_collections()
        .remove(NS)
        .ok_or_else(|| DomError::NamespaceNotLoaded(NS.to_string()))
}

/// Loads the bundled schema and binds the registry against it.
pub fn initialize() -> Result<(SchemaTypeCollection, ColladaSchema), DomError> {
    let collection = load_collection()?;
    let schema = ColladaSchema::initialize(&collection)?;
    debug!("bound {} handles of {NS}", schema.bindings().len());
    Ok((collection, schema))
}

#[cfg(test)]
mod tests;
