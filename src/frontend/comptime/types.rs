//! Slot shapes and keys.
//!
//! A [`ComptimeType`] tells the analyzer what shape an expression must produce. It is not a type
//! system: it only disambiguates the same syntax in different positions (a field name on the left of
//! `:=` is a key, the body on the right is an unanalyzed AST).

use std::fmt;
use std::rc::Rc;

use cvl_core::lang::builtins::{self, BUILTIN_NAMESPACE, BuiltinFieldId};

use super::value::ComptimeNamespace;

/// A symbol key. Symbols are distinct from every string and from each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(BuiltinFieldId);

impl Symbol {
    /// Key of the program entry point.
    pub const MAIN: Symbol = Symbol(BuiltinFieldId::Main);

    pub fn name(self) -> &'static str {
        builtins::field_name(self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{BUILTIN_NAMESPACE}.{}", self.name())
    }
}

/// A key whose identity is known during analysis.
#[derive(Debug, Clone)]
pub enum NarrowKey {
    String(String),
    /// A symbol key also fixes the shape of the value stored under it.
    Symbol { symbol: Symbol, child: Box<ComptimeType> },
}

impl NarrowKey {
    pub fn field_key(&self) -> FieldKey {
        match self {
            NarrowKey::String(s) => FieldKey::Str(s.clone()),
            NarrowKey::Symbol { symbol, .. } => FieldKey::Symbol(*symbol),
        }
    }

    /// The `main` entry-point key.
    pub fn main() -> Self {
        NarrowKey::Symbol {
            symbol: Symbol::MAIN,
            child: Box::new(ComptimeType::main_entry()),
        }
    }
}

/// Identity of a namespace field, used for lookup and duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Str(String),
    Symbol(Symbol),
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Str(s) => write!(f, ".{s}"),
            FieldKey::Symbol(sym) => write!(f, "{sym}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ComptimeType {
    Void,
    /// `Some` when the key is narrowed.
    Key(Option<NarrowKey>),
    Ast,
    Unknown,
    Type(Option<Box<ComptimeType>>),
    Namespace(Option<Rc<dyn ComptimeNamespace>>),
    Function {
        arg: Box<ComptimeType>,
        ret: Box<ComptimeType>,
    },
    FolderOrFile,
    Tuple(Vec<ComptimeType>),
}

impl ComptimeType {
    /// `function(void) -> folder-or-file`, the shape of `main`.
    pub fn main_entry() -> Self {
        ComptimeType::Function {
            arg: Box::new(ComptimeType::Void),
            ret: Box::new(ComptimeType::FolderOrFile),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ComptimeType::Void => "void",
            ComptimeType::Key(_) => "key",
            ComptimeType::Ast => "ast",
            ComptimeType::Unknown => "unknown",
            ComptimeType::Type(_) => "type",
            ComptimeType::Namespace(_) => "namespace",
            ComptimeType::Function { .. } => "function",
            ComptimeType::FolderOrFile => "folder-or-file",
            ComptimeType::Tuple(_) => "tuple",
        }
    }
}

impl fmt::Display for ComptimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComptimeType::Key(Some(key)) => write!(f, "key({})", key.field_key()),
            ComptimeType::Type(Some(inner)) => write!(f, "type({inner})"),
            ComptimeType::Function { arg, ret } => write!(f, "function({arg}) -> {ret}"),
            ComptimeType::Tuple(items) => {
                write!(f, "tuple(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            other => f.write_str(other.kind_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_entry_shape() {
        assert_eq!(ComptimeType::main_entry().to_string(), "function(void) -> folder-or-file");
    }

    #[test]
    fn display_nested_shapes() {
        let t = ComptimeType::Tuple(vec![
            ComptimeType::Key(Some(NarrowKey::String("a".into()))),
            ComptimeType::Type(Some(Box::new(ComptimeType::Ast))),
            ComptimeType::Key(None),
        ]);
        assert_eq!(t.to_string(), "tuple(key(.a), type(ast), key)");
    }

    #[test]
    fn symbols_and_strings_are_distinct_keys() {
        assert_ne!(NarrowKey::main().field_key(), NarrowKey::String("main".into()).field_key());
        assert_eq!(NarrowKey::main().field_key().to_string(), "#builtin.main");
        assert_eq!(Symbol::MAIN.name(), "main");
    }

    #[test]
    fn main_key_carries_entry_shape() {
        let NarrowKey::Symbol { symbol, child } = NarrowKey::main() else {
            panic!("main must be a symbol key");
        };
        assert_eq!(symbol, Symbol::MAIN);
        assert!(matches!(*child, ComptimeType::Function { .. }));
        let key = ComptimeType::Key(Some(NarrowKey::main()));
        assert_eq!(key.to_string(), "key(#builtin.main)");
    }
}
