//! Precedence descriptor vocabulary.
//!
//! Every structural token of the language is described here: how it behaves on the tokenizer stack
//! ([`Style`]), which precedence tier it belongs to, which semantic tag the node it produces carries,
//! and whether it switches the tokenizer mode.
//!
//! ## Notes
//! - Tiers are **not** written by hand. A token's tier is the index of the [`TokenGroup`] it is declared
//!   in, so every token in one group shares a tier and later groups bind tighter.
//! - Lookup via [`lookup`] is an exact, case-sensitive spelling match.
//! - Tokens that are absent from the table (identifiers, plain spaces, raw punctuation, garbage) are
//!   handled by the tokenizer's fallback rules.
//!
//! ## Examples
//! ```rust
//! use cvl_core::lang::precedence::{self, BinaryTag, Style};
//!
//! let comma = precedence::lookup(",").unwrap();
//! let semi = precedence::lookup(";").unwrap();
//! assert_eq!(comma.tier, semi.tier);
//! assert!(matches!(comma.style, Style::Join { tag: BinaryTag::Separator }));
//! assert!(matches!(semi.style, Style::Join { tag: BinaryTag::Sequence }));
//! ```

/// Precedence rank of a token group. Higher tiers bind tighter.
pub type Tier = u8;

/// Tokenizer mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Regular,
    /// Inside a string literal: everything up to a quote or backslash is literal text.
    InString,
}

/// Semantic tag carried by a block node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockTag {
    /// `[ ... ]`
    List,
    /// `( ... )`
    Code,
    /// `{ ... }`
    Map,
    /// Left operand auto-opened by a `:` closer.
    ColonCall,
    /// Parameter pattern auto-opened by a `=>` closer.
    ArrowFn,
    /// `" ... "`
    String,
    None,
}

/// Semantic tag carried by an operator chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryTag {
    /// `,` and newline.
    Separator,
    /// `;`
    Sequence,
    /// `name :: value`
    Definition,
    /// `.name .= value`
    PublicBinding,
    /// `.name := value`
    VariableBinding,
    /// `a = b`
    Assignment,
}

impl BinaryTag {
    /// Whether this chain declares a namespace field (`.=` / `:=`).
    pub fn is_field_binding(self) -> bool {
        matches!(self, BinaryTag::PublicBinding | BinaryTag::VariableBinding)
    }
}

/// How a token acts on the tokenizer stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Push a frame and start a block.
    ///
    /// `close: None` means the frame is auto-closed: it is popped silently whenever something lower
    /// on the stack needs to close.
    Open { close: Option<&'static str>, tag: BlockTag },
    /// Pop frames until one expecting this spelling is found.
    ///
    /// With `auto_open`, a closer that overshoots wraps the preceding operand into an anonymous block
    /// with that tag instead of reporting a stray close.
    Close { auto_open: Option<BlockTag> },
    /// Form or continue an N-ary chain of same-tier operators.
    Join { tag: BinaryTag },
}

/// Declaration of a single token inside a group.
#[derive(Debug, Clone, Copy)]
pub struct TokenInfo {
    pub spelling: &'static str,
    pub style: Style,
    pub set_mode: Option<Mode>,
}

/// A named group of tokens sharing one tier.
#[derive(Debug, Clone, Copy)]
pub struct TokenGroup {
    pub name: &'static str,
    pub tokens: &'static [TokenInfo],
}

/// Resolved metadata for a token spelling, including its computed tier.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub spelling: &'static str,
    pub style: Style,
    pub set_mode: Option<Mode>,
    pub tier: Tier,
    pub group: &'static str,
}

impl Descriptor {
    /// Whether a frame opened by this token closes itself silently.
    pub fn is_auto_close(&self) -> bool {
        matches!(self.style, Style::Open { close: None, .. })
    }
}

/// Spelling the tokenizer produces for a quote seen while in string mode.
///
/// The prefix keeps the closing quote distinct from the opening quote in the table.
pub const STRING_CLOSE: &str = "<in_string>\"";

/// Spelling the tokenizer produces for a whitespace run containing a newline.
pub const NEWLINE: &str = "\n";

const fn open(spelling: &'static str, close: &'static str, tag: BlockTag) -> TokenInfo {
    TokenInfo {
        spelling,
        style: Style::Open { close: Some(close), tag },
        set_mode: None,
    }
}

const fn close(spelling: &'static str) -> TokenInfo {
    TokenInfo {
        spelling,
        style: Style::Close { auto_open: None },
        set_mode: None,
    }
}

const fn auto_open(spelling: &'static str, tag: BlockTag) -> TokenInfo {
    TokenInfo {
        spelling,
        style: Style::Close { auto_open: Some(tag) },
        set_mode: None,
    }
}

const fn join(spelling: &'static str, tag: BinaryTag) -> TokenInfo {
    TokenInfo {
        spelling,
        style: Style::Join { tag },
        set_mode: None,
    }
}

/// Registry of all structural tokens, in tier order.
pub const GROUPS: &[TokenGroup] = &[
    TokenGroup {
        name: "paren",
        tokens: &[
            open("(", ")", BlockTag::Code),
            open("[", "]", BlockTag::List),
            open("{", "}", BlockTag::Map),
            close(")"),
            close("]"),
            close("}"),
        ],
    },
    TokenGroup {
        name: "sep",
        tokens: &[
            join(",", BinaryTag::Separator),
            join(";", BinaryTag::Sequence),
            join(NEWLINE, BinaryTag::Separator),
        ],
    },
    TokenGroup {
        name: "bind",
        tokens: &[
            join("::", BinaryTag::Definition),
            join(".=", BinaryTag::PublicBinding),
            join(":=", BinaryTag::VariableBinding),
        ],
    },
    TokenGroup {
        name: "right_associative",
        tokens: &[auto_open(":", BlockTag::ColonCall), auto_open("=>", BlockTag::ArrowFn)],
    },
    TokenGroup {
        name: "equals",
        tokens: &[join("=", BinaryTag::Assignment)],
    },
    TokenGroup {
        name: "string",
        tokens: &[
            TokenInfo {
                spelling: "\"",
                style: Style::Open {
                    close: Some(STRING_CLOSE),
                    tag: BlockTag::String,
                },
                set_mode: Some(Mode::InString),
            },
            TokenInfo {
                spelling: STRING_CLOSE,
                style: Style::Close { auto_open: None },
                set_mode: Some(Mode::Regular),
            },
        ],
    },
];

/// Look up a token spelling (exact match).
pub fn lookup(text: &str) -> Option<Descriptor> {
    GROUPS.iter().enumerate().find_map(|(tier, group)| {
        group.tokens.iter().find(|t| t.spelling == text).map(|t| Descriptor {
            spelling: t.spelling,
            style: t.style,
            set_mode: t.set_mode,
            tier: tier as Tier,
            group: group.name,
        })
    })
}

/// Tier of the named group, if it exists.
pub fn group_tier(name: &str) -> Option<Tier> {
    GROUPS.iter().position(|g| g.name == name).map(|i| i as Tier)
}

/// User-facing spelling of a delimiter (strips the in-string marker).
pub fn display(spelling: &str) -> &str {
    spelling.strip_prefix("<in_string>").unwrap_or(spelling)
}
