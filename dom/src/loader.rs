use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{info, warn};
use roxmltree::Document;

use super::{
    collection::SchemaTypeCollection,
    error::DomError,
    import::{Import, ImportError, ImportResolver, SchemaSource},
    mapping_context::{is_xs, MappingContext},
    type_table::TypeTable,
};

#[derive(Copy, Clone, Debug, Default)]
pub struct LoadOptions {
    /// Allow a XML Document Type Definition (DTD) to occur
    pub allow_dtd: bool,
}

/// Loads a schema document and everything it imports into one [`TypeTable`], with a
/// [`SchemaTypeCollection`] per target namespace.
#[derive(Debug)]
pub struct SchemaTypeLoader {
    table: Arc<TypeTable>,
    collections: Vec<SchemaTypeCollection>,
}

impl SchemaTypeLoader {
    pub fn load(
        source: SchemaSource,
        import_resolvers: &[Box<dyn ImportResolver>],
    ) -> Result<Self, DomError> {
        Self::load_with_options(source, import_resolvers, LoadOptions::default())
    }

    pub fn load_with_options(
        source: SchemaSource,
        import_resolvers: &[Box<dyn ImportResolver>],
        options: LoadOptions,
    ) -> Result<Self, DomError> {
        let sources = gather_sources(source, import_resolvers, options)?;
        let documents = sources
            .iter()
            .map(|source| parse_document(source, options))
            .collect::<Result<Vec<_>, _>>()?;

        let builder = MappingContext::new(&documents).map_schemas()?;
        let table = Arc::new(builder.freeze()?);

        let mut collections: Vec<SchemaTypeCollection> = Vec::new();
        for (document, source) in documents.iter().zip(&sources) {
            let schema = document.root_element();
            let target_namespace = schema
                .attribute("targetNamespace")
                .ok_or_else(|| DomError::MissingTargetNamespace(source.location.clone()))?;
            if collections
                .iter()
                .any(|collection| collection.target_namespace() == target_namespace)
            {
                continue;
            }
            let namespaces = schema
                .namespaces()
                .map(|namespace| {
                    (
                        namespace.name().map(str::to_string),
                        namespace.uri().to_string(),
                    )
                })
                .collect();
            collections.push(SchemaTypeCollection::new(
                target_namespace.to_string(),
                namespaces,
                Arc::clone(&table),
            ));
        }

        info!(
            "loaded {} node types from {} schema documents",
            table.node_types().len(),
            documents.len()
        );
        Ok(Self { table, collections })
    }

    pub fn table(&self) -> &Arc<TypeTable> {
        &self.table
    }

    pub fn type_collection(&self, namespace: &str) -> Option<&SchemaTypeCollection> {
        self.collections
            .iter()
            .find(|collection| collection.target_namespace() == namespace)
    }

    /// All collections, the one of the loaded root document first.
    pub fn type_collections(&self) -> &[SchemaTypeCollection] {
        &self.collections
    }

    pub fn into_collections(self) -> HashMap<String, SchemaTypeCollection> {
        self.collections
            .into_iter()
            .map(|collection| (collection.target_namespace().to_string(), collection))
            .collect()
    }
}

fn parse_document(source: &SchemaSource, options: LoadOptions) -> Result<Document, DomError> {
    let parsing_options = roxmltree::ParsingOptions {
        allow_dtd: options.allow_dtd,
        ..Default::default()
    };
    Document::parse_with_options(&source.text, parsing_options).map_err(|error| DomError::Xml {
        location: source.location.clone(),
        source: error,
    })
}

/// Reads the root document and, transitively, every document it imports or includes. Each
/// namespace is imported once; failed imports are reported and skipped.
fn gather_sources(
    root: SchemaSource,
    import_resolvers: &[Box<dyn ImportResolver>],
    options: LoadOptions,
) -> Result<Vec<SchemaSource>, DomError> {
    let mut resolved_imports: HashSet<Option<String>> = HashSet::new();
    let mut resolved_locations: HashSet<String> = HashSet::from([root.location.clone()]);
    let mut sources = vec![root];

    let mut next = 0;
    while next < sources.len() {
        let mut imports = Vec::new();
        {
            let source = &sources[next];
            let document = parse_document(source, options)?;
            let schema = document.root_element();
            if !is_xs(schema, "schema") {
                return Err(DomError::InvalidValue {
                    element: schema.tag_name().name().to_string(),
                    value: source.location.clone(),
                });
            }
            let target_namespace = schema
                .attribute("targetNamespace")
                .ok_or_else(|| DomError::MissingTargetNamespace(source.location.clone()))?;
            resolved_imports.insert(Some(target_namespace.to_string()));

            for child in schema.children() {
                if is_xs(child, Import::TAG_NAME) || is_xs(child, Import::INCLUDE_TAG_NAME) {
                    imports.push(Import::map_from_xml(
                        child,
                        target_namespace,
                        &source.location,
                    )?);
                }
            }
        }

        for import in imports {
            if import.is_include {
                // Includes are tracked by location, imports by namespace
                let Some(location) = import.resolved_location() else {
                    continue;
                };
                if !resolved_locations.insert(location) {
                    continue;
                }
            } else if !resolved_imports.insert(import.namespace.clone()) {
                continue;
            }

            let resolved = import_resolvers
                .iter()
                .find_map(|resolver| match resolver.resolve_import(&import) {
                    Ok(source) => Some(source),
                    // The resolver does not handle this kind of import; the next one may
                    Err(ImportError::UnsupportedImport) => None,
                    Err(error) => {
                        warn!("error during import resolution: {error}");
                        None
                    }
                });
            match resolved {
                Some(source) => {
                    resolved_locations.insert(source.location.clone());
                    sources.push(source);
                }
                None => warn!("failed to resolve import: {:?}", import),
            }
        }
        next += 1;
    }

    Ok(sources)
}
