//! Builtin namespace vocabulary.
//!
//! The compiler exposes a single builtin namespace, reached through the `#builtin` marker. Its fields are
//! described here by name; the analyzer decides what each field resolves to.

/// Identifier (after the `#` prefix) that names the builtin namespace.
pub const BUILTIN_NAMESPACE: &str = "builtin";

/// Stable identifier for builtin namespace fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFieldId {
    /// `#builtin.main`: the symbol key of the program entry point.
    Main,
}

/// Metadata for a builtin namespace field.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinFieldInfo {
    pub id: BuiltinFieldId,
    pub name: &'static str,
}

/// Registry of all builtin namespace fields.
pub const BUILTIN_FIELDS: &[BuiltinFieldInfo] = &[BuiltinFieldInfo {
    id: BuiltinFieldId::Main,
    name: "main",
}];

/// Look up a builtin field by its string name.
pub fn field_from_str(name: &str) -> Option<BuiltinFieldId> {
    BUILTIN_FIELDS.iter().find(|f| f.name == name).map(|f| f.id)
}

pub fn field_name(id: BuiltinFieldId) -> &'static str {
    BUILTIN_FIELDS
        .iter()
        .find(|f| f.id == id)
        .map(|f| f.name)
        .unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_is_registered() {
        assert_eq!(field_from_str("main"), Some(BuiltinFieldId::Main));
        assert_eq!(field_name(BuiltinFieldId::Main), "main");
        assert_eq!(field_from_str("Main"), None);
    }
}
