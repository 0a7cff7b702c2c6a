use super::error::DomError;
use std::fmt;

pub type NCName = String;
pub type AnyURI = String;

pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    pub namespace_name: Option<AnyURI>,
    pub local_name: NCName,
}

/// Formats as `namespace:local`, the key under which node types and root elements are registered.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace_name) = self.namespace_name.as_ref() {
            write!(f, "{}:{}", namespace_name, self.local_name)
        } else {
            write!(f, "{}", self.local_name)
        }
    }
}

impl QName {
    pub fn with_namespace(
        namespace_name: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Self {
        Self::with_optional_namespace(Some(namespace_name), local_name)
    }

    pub fn with_optional_namespace(
        namespace_name: Option<impl Into<String>>,
        local_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace_name: namespace_name.map(Into::into),
            local_name: local_name.into(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace_name.as_deref()
    }

    pub fn is_xs(&self) -> bool {
        self.namespace() == Some(XS_NAMESPACE)
    }

    pub fn qualified(
        prefix: impl AsRef<str>,
        local_name: impl Into<String>,
        context: roxmltree::Node,
    ) -> Result<Self, DomError> {
        let prefix = prefix.as_ref();
        let resolved_prefix = if prefix == "xml" {
            // The prefix xml is by definition bound to the namespace name
            // http://www.w3.org/XML/1998/namespace.
            // (Namespaces in XML 1.0, §3, Reserved Prefixes and Namespace Names)
            XML_NAMESPACE
        } else {
            context
                .lookup_namespace_uri(Some(prefix))
                .ok_or_else(|| DomError::NamePrefixNotResolved(prefix.into()))?
        };
        Ok(Self::with_namespace(resolved_prefix, local_name))
    }

    pub fn unqualified(local_name: impl Into<String>, context: roxmltree::Node) -> Self {
        // If there is a default namespace declaration in scope, the expanded name corresponding to
        // an unprefixed name has the URI of the default namespace as its namespace name.
        // (Namespaces in XML 1.0, §6.2)
        let namespace_name = context.lookup_namespace_uri(None);
        QName::with_optional_namespace(namespace_name, local_name)
    }

    pub fn parse(source: &str, context: roxmltree::Node) -> Result<Self, DomError> {
        if let Some((prefix, local)) = source.rsplit_once(':') {
            Self::qualified(prefix, local, context)
        } else {
            Ok(Self::unqualified(source, context))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_colon_separated_key() {
        let name = QName::with_namespace("urn:test", "node");
        assert_eq!(name.to_string(), "urn:test:node");
        let name = QName::with_optional_namespace(None::<String>, "node");
        assert_eq!(name.to_string(), "node");
    }

    #[test]
    fn parse_resolves_prefixes() {
        let doc = roxmltree::Document::parse(
            r#"<root xmlns="urn:default" xmlns:t="urn:t"><child/></root>"#,
        )
        .unwrap();
        let child = doc.root_element().first_element_child().unwrap();
        assert_eq!(
            QName::parse("t:a", child).unwrap(),
            QName::with_namespace("urn:t", "a")
        );
        assert_eq!(
            QName::parse("b", child).unwrap(),
            QName::with_namespace("urn:default", "b")
        );
        assert_eq!(
            QName::parse("xml:base", child).unwrap(),
            QName::with_namespace(XML_NAMESPACE, "base")
        );
        assert!(matches!(
            QName::parse("missing:c", child),
            Err(DomError::NamePrefixNotResolved(prefix)) if prefix == "missing"
        ));
    }
}
