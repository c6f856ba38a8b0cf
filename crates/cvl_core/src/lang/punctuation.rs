//! Punctuation vocabulary.
//!
//! Character classes used by the tokenizer to cut raw runs out of the source, and the small set of bare
//! punctuation tokens that become raw leaves in the syntax tree.
//!
//! ## Notes
//! - Structural punctuation (brackets, separators, binders) lives in [`super::precedence`]; this module
//!   only covers what the precedence table does not.
//!
//! ## Examples
//! ```rust
//! use cvl_core::lang::punctuation::{self, RawTag};
//!
//! assert_eq!(punctuation::raw_tag("->"), Some(RawTag::Return));
//! assert!(punctuation::is_operator_char('='));
//! ```

/// Semantic tag of a bare raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawTag {
    /// `.`
    Access,
    /// `->`
    Return,
    /// `_`
    Discard,
}

/// Registry of bare raw tokens.
pub const RAW_TOKENS: &[(&str, RawTag)] = &[(".", RawTag::Access), ("->", RawTag::Return), ("_", RawTag::Discard)];

/// Characters that are always a token of their own.
pub const SINGLE_CHAR_PUNCTUATION: &str = "()[]{},;\"'.`";

/// Characters that glue together into a maximal operator run.
pub const OPERATOR_CHARS: &str = "~!@$%^&*-=+|/<>:";

/// Prefix marking a builtin identifier (`#builtin`).
pub const BUILTIN_PREFIX: char = '#';

/// Prefix marking a field-access identifier (`.name`).
pub const ACCESS_PREFIX: char = '.';

/// Look up the tag of a bare raw token.
pub fn raw_tag(text: &str) -> Option<RawTag> {
    RAW_TOKENS.iter().find(|(s, _)| *s == text).map(|(_, tag)| *tag)
}

/// Whether `c` continues an identifier (ASCII-only).
pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

pub fn is_operator_char(c: char) -> bool {
    OPERATOR_CHARS.contains(c)
}

pub fn is_single_char_punctuation(c: char) -> bool {
    SINGLE_CHAR_PUNCTUATION.contains(c)
}
