use std::fmt;

use super::annotation::Annotation;
use super::xstypes::QName;

/// Handle of an [`AttributeType`] within its type table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeTypeId(pub(crate) u32);

impl AttributeTypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The runtime representation of a simple value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    String,
    DateTime,
    Uri,
    /// An IDREF, i.e. a reference to another node by its ID attribute.
    Reference,
}

impl ValueKind {
    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            Self::Boolean | Self::String | Self::DateTime | Self::Uri | Self::Reference
        )
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A constraint recorded from a restriction facet. Rules are metadata only; they are not
/// evaluated by this crate.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeRule {
    StringEnum(Vec<String>),
    NumericMin { value: f64, inclusive: bool },
    NumericMax { value: f64, inclusive: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttributeType {
    pub(crate) id: AttributeTypeId,
    pub(crate) name: Option<QName>,
    pub(crate) kind: ValueKind,
    pub(crate) is_list: bool,
    /// `None` means unbounded
    pub(crate) length: Option<usize>,
    pub(crate) is_id: bool,
    pub(crate) rules: Vec<AttributeRule>,
    pub(crate) annotations: Vec<Annotation>,
}

impl AttributeType {
    pub(crate) fn new(id: AttributeTypeId, name: Option<QName>, kind: ValueKind) -> Self {
        Self {
            id,
            name,
            kind,
            is_list: false,
            length: Some(1),
            is_id: false,
            rules: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn id(&self) -> AttributeTypeId {
        self.id
    }

    /// The type name; `None` for anonymous simple types.
    pub fn name(&self) -> Option<&QName> {
        self.name.as_ref()
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }

    pub fn length(&self) -> Option<usize> {
        self.length
    }

    pub fn is_id(&self) -> bool {
        self.is_id
    }

    pub fn rules(&self) -> &[AttributeRule] {
        &self.rules
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// The enumeration values, if this is a restriction with enumeration facets.
    pub fn enumeration(&self) -> Option<&[String]> {
        self.rules.iter().find_map(|rule| match rule {
            AttributeRule::StringEnum(values) => Some(values.as_slice()),
            _ => None,
        })
    }
}
