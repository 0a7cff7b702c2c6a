use crate::error::DomError;
use crate::xstypes::QName;
use roxmltree::Node;

pub trait ActualValue<'a>: Sized {
    fn convert(src: &'a str, parent: Node) -> Result<Self, DomError>;
}

fn invalid(src: &str, parent: Node) -> DomError {
    DomError::InvalidValue {
        element: parent.tag_name().name().to_string(),
        value: src.to_string(),
    }
}

impl<'a> ActualValue<'a> for &'a str {
    fn convert(src: &'a str, _parent: Node) -> Result<Self, DomError> {
        Ok(src.trim())
    }
}

impl ActualValue<'_> for String {
    fn convert(src: &'_ str, _parent: Node) -> Result<Self, DomError> {
        Ok(src.to_string())
    }
}

impl ActualValue<'_> for QName {
    fn convert(src: &'_ str, parent: Node) -> Result<Self, DomError> {
        QName::parse(src.trim(), parent)
    }
}

impl ActualValue<'_> for bool {
    fn convert(src: &str, parent: Node) -> Result<Self, DomError> {
        match src.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(invalid(src, parent)),
        }
    }
}

impl ActualValue<'_> for u32 {
    fn convert(src: &str, parent: Node) -> Result<Self, DomError> {
        src.trim().parse().map_err(|_| invalid(src, parent))
    }
}

impl ActualValue<'_> for usize {
    fn convert(src: &str, parent: Node) -> Result<Self, DomError> {
        src.trim().parse().map_err(|_| invalid(src, parent))
    }
}

impl ActualValue<'_> for f64 {
    fn convert(src: &str, parent: Node) -> Result<Self, DomError> {
        match src.trim() {
            "INF" => Ok(f64::INFINITY),
            "-INF" => Ok(f64::NEG_INFINITY),
            other => other.parse().map_err(|_| invalid(src, parent)),
        }
    }
}

impl<'a, T: ActualValue<'a>> ActualValue<'a> for Vec<T> {
    fn convert(src: &'a str, parent: Node) -> Result<Self, DomError> {
        // NOTE: This assumes a list with whiteSpace="collapse"
        src.split_ascii_whitespace()
            .map(|a| ActualValue::convert(a, parent))
            .collect()
    }
}

pub fn actual_value<'a, T: ActualValue<'a>>(x: &'a str, parent: Node) -> Result<T, DomError> {
    T::convert(x, parent)
}

/// Converts the attribute `name` of `node`, if present.
pub fn attribute_value<'a, T: ActualValue<'a>>(
    node: Node<'a, '_>,
    name: &str,
) -> Result<Option<T>, DomError> {
    node.attribute(name)
        .map(|value| actual_value(value, node))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_attribute_values() {
        let doc = roxmltree::Document::parse(
            r#"<e abstract="1" minOccurs=" 2 " maxInclusive="-INF" memberTypes="a b" mixed="maybe"/>"#,
        )
        .unwrap();
        let e = doc.root_element();
        assert_eq!(attribute_value::<bool>(e, "abstract").unwrap(), Some(true));
        assert_eq!(attribute_value::<u32>(e, "minOccurs").unwrap(), Some(2));
        assert_eq!(
            attribute_value::<f64>(e, "maxInclusive").unwrap(),
            Some(f64::NEG_INFINITY)
        );
        assert_eq!(
            attribute_value::<Vec<&str>>(e, "memberTypes").unwrap(),
            Some(vec!["a", "b"])
        );
        assert_eq!(attribute_value::<bool>(e, "absent").unwrap(), None);
        assert!(matches!(
            attribute_value::<bool>(e, "mixed"),
            Err(DomError::InvalidValue { value, .. }) if value == "maybe"
        ));
    }
}
