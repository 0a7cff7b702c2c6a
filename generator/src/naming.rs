use std::collections::HashSet;

use check_keyword::CheckKeyword;
use heck::{ToPascalCase, ToSnakeCase};
use quote::format_ident;
use syn::Ident;

/// Replaces the separators that may occur in schema names with `_`.
pub fn create_identifier(name: &str) -> String {
    name.replace(['/', '\\', ':', '.', '-'], "_")
}

/// Prefixes names that would not start an identifier.
fn ensure_leading(name: String, fallback: &str) -> String {
    match name.chars().next() {
        None => fallback.to_string(),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => name,
        Some(_) => format!("_{name}"),
    }
}

fn sanitize(name: &str) -> String {
    create_identifier(name).replace(|c: char| !c.is_ascii_alphanumeric() && c != '_', "_")
}

/// Prelude names a generated type must not shadow where the output is glob-imported.
const PRELUDE_TYPES: [&str; 9] = [
    "Box", "Option", "Result", "String", "Vec", "Some", "None", "Ok", "Err",
];

/// The PascalCase type name for a schema name.
pub fn type_name(name: &str) -> String {
    let name = ensure_leading(sanitize(name).to_pascal_case(), "Type");
    if PRELUDE_TYPES.contains(&name.as_str()) {
        format!("{name}Type")
    } else {
        name
    }
}

/// The snake_case field name for a schema name.
pub fn field_name(name: &str) -> String {
    ensure_leading(sanitize(name).to_snake_case(), "field")
}

pub fn name_to_ident(name: &str) -> Ident {
    if ["crate", "self", "super", "Self"].contains(&name) {
        // These are keywords that are not allowed as raw identifiers
        format_ident!("{}_", name)
    } else if name.is_keyword() {
        format_ident!("r#{}", name)
    } else {
        format_ident!("{}", name)
    }
}

/// The name of an enum variant for an enumeration value.
pub fn string_variant_to_ident(variant: &str) -> String {
    if variant.is_empty() {
        return "Empty".to_string();
    }
    let sanitized_name = variant.replace(|c: char| !c.is_ascii_alphanumeric(), "_");
    let pascal = sanitized_name.to_pascal_case();
    match variant.chars().next() {
        Some(first_char) if first_char.is_ascii_alphabetic() && !pascal.is_empty() => pascal,
        _ => format!("_{pascal}"),
    }
}

/// Hands out names that are unique within one scope.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as taken without handing it out.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// The first free candidate, or the first candidate with the smallest free numeric suffix.
    pub fn claim<I>(&mut self, candidates: I) -> String
    where
        I: IntoIterator<Item = String>,
    {
        let mut first = None;
        for candidate in candidates {
            if !self.taken.contains(&candidate) {
                self.taken.insert(candidate.clone());
                return candidate;
            }
            first.get_or_insert(candidate);
        }
        let first = first.unwrap_or_default();
        let name = (2..)
            .map(|suffix| format!("{first}{suffix}"))
            .find(|name| !self.taken.contains(name))
            .unwrap_or_default();
        self.taken.insert(name.clone());
        name
    }
}
