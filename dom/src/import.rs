use std::collections::HashMap;
use std::path::{Path, PathBuf};

use roxmltree::Node;
use thiserror::Error;

use super::{error::DomError, values::attribute_value, xstypes::XML_NAMESPACE};

/// The schema of the `xml:` attributes (`xml:base`, `xml:lang`, `xml:space`, `xml:id`).
pub const XML_SCHEMA: &str = include_str!("../schemas/xml.xsd");

/// The text of one schema document together with the location it was read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaSource {
    pub location: String,
    pub text: String,
}

impl SchemaSource {
    pub fn new(location: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            text: text.into(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DomError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DomError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.to_string_lossy(), text))
    }
}

/// This structure represents the `import` and `include` elements; it is not a schema component.
///
/// Note that an import is allowed to have neither a `schemaLocation` nor a `namespace` attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
    pub namespace: Option<String>,
    pub schema_location: Option<String>,
    /// Location of the importing document, for resolving relative schema locations
    pub base_location: String,
    pub is_include: bool,
}

impl Import {
    pub const TAG_NAME: &'static str = "import";
    pub const INCLUDE_TAG_NAME: &'static str = "include";

    pub(crate) fn map_from_xml(
        import: Node,
        target_namespace: &str,
        base_location: &str,
    ) -> Result<Self, DomError> {
        let is_include = import.tag_name().name() == Self::INCLUDE_TAG_NAME;
        let schema_location: Option<String> = attribute_value(import, "schemaLocation")?;
        let namespace: Option<String> = if is_include {
            // An included document contributes to the including document's namespace.
            Some(target_namespace.to_string())
        } else {
            attribute_value(import, "namespace")?
        };

        // § 4.2.6 Schema Representation Constraint: Import Constraints and Semantics
        // 1.1 If the namespace [attribute] is present, then its ·actual value· does not match
        //   the ·actual value· of the enclosing <schema>'s targetNamespace [attribute].
        if !is_include && namespace.as_deref() == Some(target_namespace) {
            return Err(DomError::InvalidValue {
                element: Self::TAG_NAME.to_string(),
                value: target_namespace.to_string(),
            });
        }

        Ok(Self {
            namespace,
            schema_location,
            base_location: base_location.to_string(),
            is_include,
        })
    }

    /// The schema location resolved against the importing document.
    pub fn resolved_location(&self) -> Option<String> {
        self.schema_location
            .as_deref()
            .map(|location| join_location(&self.base_location, location))
    }
}

/// Resolves `location` relative to the document at `base`. URLs and absolute paths are returned
/// unchanged.
pub fn join_location(base: &str, location: &str) -> String {
    if location.contains("://") || Path::new(location).is_absolute() {
        location.to_string()
    } else if base.contains("://") {
        match base.rsplit_once('/') {
            Some((directory, _)) => format!("{directory}/{location}"),
            None => location.to_string(),
        }
    } else {
        let directory = Path::new(base).parent().unwrap_or(Path::new(""));
        directory.join(location).to_string_lossy().into_owned()
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("the resolver does not support the import")]
    UnsupportedImport,
    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("an unspecified error occurred while loading the schema")]
    UnspecifiedLoad(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub trait ImportResolver {
    fn resolve_import(&self, import: &Import) -> Result<SchemaSource, ImportError>;
}

/// Reads imported documents from the file system, relative to the importing document.
#[derive(Copy, Clone, Debug, Default)]
pub struct FileImportResolver;

impl ImportResolver for FileImportResolver {
    fn resolve_import(&self, import: &Import) -> Result<SchemaSource, ImportError> {
        let location = import
            .resolved_location()
            .filter(|location| !location.contains("://"))
            .ok_or(ImportError::UnsupportedImport)?;
        let text = std::fs::read_to_string(&location).map_err(|source| ImportError::Io {
            path: PathBuf::from(&location),
            source,
        })?;
        Ok(SchemaSource::new(location, text))
    }
}

/// Serves imports from documents held in memory, matched by namespace or by schema location.
#[derive(Clone, Debug, Default)]
pub struct StaticImportResolver {
    by_namespace: HashMap<String, SchemaSource>,
    by_location: HashMap<String, SchemaSource>,
}

impl StaticImportResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>, source: SchemaSource) -> Self {
        self.by_namespace.insert(namespace.into(), source);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>, source: SchemaSource) -> Self {
        self.by_location.insert(location.into(), source);
        self
    }

    /// A resolver serving the bundled schema of the XML namespace.
    pub fn with_xml_schema() -> Self {
        Self::new().with_namespace(XML_NAMESPACE, SchemaSource::new("xml.xsd", XML_SCHEMA))
    }
}

impl ImportResolver for StaticImportResolver {
    fn resolve_import(&self, import: &Import) -> Result<SchemaSource, ImportError> {
        let by_location = import
            .schema_location
            .as_ref()
            .and_then(|location| self.by_location.get(location));
        let by_namespace = || {
            import
                .namespace
                .as_ref()
                .filter(|_| !import.is_include)
                .and_then(|namespace| self.by_namespace.get(namespace))
        };
        by_location
            .or_else(by_namespace)
            .cloned()
            .ok_or(ImportError::UnsupportedImport)
    }
}
