//! Syntax tree produced by the tokenizer.
//!
//! The tree is deliberately shallow: there is no grammar, so nodes only record *structure* (which items
//! sit inside which bracket, which items sit between which operators). Meaning is assigned later by the
//! analyzer.
//!
//! ## Notes
//! - Every node carries the [`Position`] where it begins.
//! - Whitespace is kept in the tree. Consumers trim it with [`trim_whitespace`] where it does not matter.
//! - A [`Binary`] keeps its operators: its items alternate operand segment, operator, operand segment.

use std::fmt;
use std::sync::Arc;

pub use cvl_core::lang::precedence::{BinaryTag, BlockTag, Tier};
pub use cvl_core::lang::punctuation::RawTag;

/// A location in a source file.
///
/// `line` and `col` are 1-based; `col` counts characters. `offset` is a byte offset into the file text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub file: Arc<str>,
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl Position {
    pub fn new(file: impl Into<Arc<str>>, offset: usize, line: u32, col: u32) -> Self {
        Self {
            file: file.into(),
            offset,
            line,
            col,
        }
    }

    /// Start of `file`, before its first character.
    pub fn start_of(file: impl Into<Arc<str>>) -> Self {
        Self::new(file, 0, 1, 1)
    }

    /// Position attributed to the compiler itself, for things that have no place in user source.
    pub fn compiler() -> Self {
        Self::new("compiler", 0, 0, 0)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

/// A value tagged with the position it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Positioned<T> {
    pub node: T,
    pub pos: Position,
}

impl<T> Positioned<T> {
    pub fn new(node: T, pos: Position) -> Self {
        Self { node, pos }
    }
}

pub type SyntaxNode = Positioned<Node>;

/// How an identifier was spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentTag {
    /// `name`
    Plain,
    /// `.name`
    Access,
    /// `#name`
    Builtin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    /// Identifier text without its prefix.
    pub text: String,
    pub tag: IdentTag,
}

/// A bracketed (or auto-opened) block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Opening spelling, empty for auto-opened blocks.
    pub open: String,
    /// Closing spelling as the user sees it.
    pub close: String,
    pub tag: BlockTag,
    pub items: Vec<SyntaxNode>,
}

/// An N-ary chain of same-tier operators.
#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub tag: BinaryTag,
    pub tier: Tier,
    /// Alternating [`Node::Segment`] and [`Node::Operator`] items, starting and ending with a segment.
    pub items: Vec<SyntaxNode>,
}

impl Binary {
    /// Operand segments, without the operators between them.
    pub fn segments(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.items.iter().step_by(2)
    }

    /// Number of operand segments.
    pub fn arity(&self) -> usize {
        self.items.len().div_ceil(2)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Raw {
    pub text: String,
    pub tag: RawTag,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Ident(Ident),
    /// A whitespace run. `newline` is set when the run contained a line break.
    Whitespace { newline: bool },
    /// An operator inside a [`Binary`].
    Operator(String),
    /// One operand of a [`Binary`].
    Segment(Vec<SyntaxNode>),
    Block(Block),
    Binary(Binary),
    /// Literal text inside a string block (escapes already resolved).
    StringSegment(String),
    Raw(Raw),
    /// Placeholder left where something failed.
    Error,
}

impl Node {
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Node::Whitespace { .. })
    }

    /// Short name of the node kind, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Ident(_) => "identifier",
            Node::Whitespace { .. } => "whitespace",
            Node::Operator(_) => "operator",
            Node::Segment(_) => "operator segment",
            Node::Block(_) => "block",
            Node::Binary(_) => "binary",
            Node::StringSegment(_) => "string segment",
            Node::Raw(_) => "raw token",
            Node::Error => "error",
        }
    }

    /// Child items of container nodes.
    pub fn items(&self) -> Option<&[SyntaxNode]> {
        match self {
            Node::Segment(items) => Some(items),
            Node::Block(b) => Some(&b.items),
            Node::Binary(b) => Some(&b.items),
            _ => None,
        }
    }
}

/// Slice of `items` without leading and trailing whitespace.
pub fn trim_whitespace(items: &[SyntaxNode]) -> &[SyntaxNode] {
    let Some(start) = items.iter().position(|n| !n.node.is_whitespace()) else {
        return &[];
    };
    let end = items
        .iter()
        .rposition(|n| !n.node.is_whitespace())
        .map_or(start, |i| i + 1);
    &items[start..end]
}

/// Visit every node of a tree depth-first, parents before children.
pub fn walk<'a>(items: &'a [SyntaxNode], visit: &mut impl FnMut(&'a SyntaxNode)) {
    crate::stack::ensure_sufficient_stack(|| {
        for item in items {
            visit(item);
            if let Some(children) = item.node.items() {
                walk(children, visit);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws(col: u32) -> SyntaxNode {
        Positioned::new(Node::Whitespace { newline: false }, Position::new("t", 0, 1, col))
    }

    fn ident(text: &str, col: u32) -> SyntaxNode {
        Positioned::new(
            Node::Ident(Ident {
                text: text.to_string(),
                tag: IdentTag::Plain,
            }),
            Position::new("t", 0, 1, col),
        )
    }

    #[test]
    fn trim_drops_outer_whitespace_only() {
        let items = vec![ws(1), ident("a", 2), ws(3), ident("b", 4), ws(5)];
        let trimmed = trim_whitespace(&items);
        assert_eq!(trimmed.len(), 3);
        assert_eq!(trimmed[0].pos.col, 2);
        assert_eq!(trimmed[2].pos.col, 4);
        assert!(trim_whitespace(&[ws(1), ws(2)]).is_empty());
        assert!(trim_whitespace(&[]).is_empty());
    }

    #[test]
    fn binary_segments_skip_operators() {
        let seg = |col| Positioned::new(Node::Segment(vec![ident("x", col)]), Position::new("t", 0, 1, col));
        let op = Positioned::new(Node::Operator(",".into()), Position::new("t", 0, 1, 2));
        let binary = Binary {
            tag: BinaryTag::Separator,
            tier: 1,
            items: vec![seg(1), op.clone(), seg(3), op, seg(5)],
        };
        assert_eq!(binary.arity(), 3);
        let cols: Vec<u32> = binary.segments().map(|s| s.pos.col).collect();
        assert_eq!(cols, vec![1, 3, 5]);
    }

    #[test]
    fn position_display_is_file_line_col() {
        assert_eq!(Position::new("main.cvl", 10, 2, 4).to_string(), "main.cvl:2:4");
        assert_eq!(Position::compiler().to_string(), "compiler:0:0");
    }
}
