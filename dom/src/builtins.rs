use std::collections::HashMap;

use lazy_static::lazy_static;

use super::attribute_type::ValueKind;

/// Name of the string type backing the value attribute of mixed content types.
pub const MIXED_TEXT_FIELD: &str = "mixed_text_field";

#[derive(Copy, Clone, Debug)]
pub(crate) struct BuiltinSimpleType {
    pub(crate) kind: ValueKind,
    pub(crate) is_list: bool,
    pub(crate) is_id: bool,
}

const fn scalar(kind: ValueKind) -> BuiltinSimpleType {
    BuiltinSimpleType {
        kind,
        is_list: false,
        is_id: false,
    }
}

const fn list(kind: ValueKind) -> BuiltinSimpleType {
    BuiltinSimpleType {
        kind,
        is_list: true,
        is_id: false,
    }
}

lazy_static! {
    static ref BUILTIN_SIMPLE_TYPES: HashMap<&'static str, BuiltinSimpleType> = {
        use ValueKind::*;
        let mut types = HashMap::new();
        types.insert("anySimpleType", scalar(String));
        types.insert("anyAtomicType", scalar(String));
        types.insert("string", scalar(String));
        types.insert("normalizedString", scalar(String));
        types.insert("token", scalar(String));
        types.insert("language", scalar(String));
        types.insert("Name", scalar(String));
        types.insert("NCName", scalar(String));
        types.insert("NMTOKEN", scalar(String));
        types.insert("NMTOKENS", list(String));
        types.insert("ENTITY", scalar(String));
        types.insert("ENTITIES", list(String));
        types.insert("NOTATION", scalar(String));
        types.insert("QName", scalar(String));
        types.insert("duration", scalar(String));
        types.insert("gYear", scalar(String));
        types.insert("gYearMonth", scalar(String));
        types.insert("gMonth", scalar(String));
        types.insert("gMonthDay", scalar(String));
        types.insert("gDay", scalar(String));
        types.insert(
            "ID",
            BuiltinSimpleType {
                kind: String,
                is_list: false,
                is_id: true,
            },
        );
        types.insert("IDREF", scalar(Reference));
        // References are only resolved for single IDREFs
        types.insert("IDREFS", list(String));
        types.insert("boolean", scalar(Boolean));
        types.insert("float", scalar(Single));
        types.insert("double", scalar(Double));
        types.insert("decimal", scalar(Decimal));
        types.insert("integer", scalar(Int32));
        types.insert("nonNegativeInteger", scalar(UInt32));
        types.insert("positiveInteger", scalar(Decimal));
        types.insert("nonPositiveInteger", scalar(Decimal));
        types.insert("negativeInteger", scalar(Decimal));
        types.insert("long", scalar(Int64));
        types.insert("int", scalar(Int32));
        types.insert("short", scalar(Int16));
        types.insert("byte", scalar(Int8));
        types.insert("unsignedLong", scalar(UInt64));
        types.insert("unsignedInt", scalar(UInt32));
        types.insert("unsignedShort", scalar(UInt16));
        types.insert("unsignedByte", scalar(UInt8));
        types.insert("dateTime", scalar(DateTime));
        types.insert("dateTimeStamp", scalar(DateTime));
        types.insert("date", scalar(DateTime));
        types.insert("time", scalar(DateTime));
        types.insert("anyURI", scalar(Uri));
        types.insert("hexBinary", list(UInt8));
        types.insert("base64Binary", list(UInt8));
        types
    };
}

/// Looks up a built-in simple type of the XML Schema namespace by local name.
pub(crate) fn builtin_simple_type(local_name: &str) -> Option<BuiltinSimpleType> {
    BUILTIN_SIMPLE_TYPES.get(local_name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_types_map_like_the_dom() {
        assert_eq!(builtin_simple_type("integer").unwrap().kind, ValueKind::Int32);
        assert_eq!(
            builtin_simple_type("nonNegativeInteger").unwrap().kind,
            ValueKind::UInt32
        );
        assert_eq!(
            builtin_simple_type("IDREF").unwrap().kind,
            ValueKind::Reference
        );
        let idrefs = builtin_simple_type("IDREFS").unwrap();
        assert_eq!(idrefs.kind, ValueKind::String);
        assert!(idrefs.is_list);
        assert!(builtin_simple_type("ID").unwrap().is_id);
        assert!(builtin_simple_type("anyType").is_none());
    }
}
