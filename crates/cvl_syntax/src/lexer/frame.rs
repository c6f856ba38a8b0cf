//! Open scopes on the tokenizer stack.

use cvl_core::lang::precedence::{self, BinaryTag, BlockTag, Descriptor, Tier};

use crate::ast::{Binary, Block, Node, Position, Positioned, SyntaxNode};

/// Indentation recorded for the root frame, below any real line.
pub const ROOT_INDENT: i64 = -1;

#[derive(Debug)]
pub enum FrameKind {
    Root,
    Block {
        open: &'static str,
        tag: BlockTag,
    },
    Chain {
        tag: BinaryTag,
        /// Finished segments and operators.
        segments: Vec<SyntaxNode>,
        /// Where the segment being filled began.
        segment_pos: Position,
        /// First operator of the chain.
        first_op_pos: Position,
    },
}

/// An open scope.
///
/// `items` is always the list new nodes go into: the block body or the chain segment being filled.
#[derive(Debug)]
pub struct Frame {
    pub pos: Position,
    /// Expected closing spelling, `None` for auto-closed frames.
    pub close: Option<&'static str>,
    pub indent: i64,
    pub tier: Tier,
    pub auto_close: bool,
    pub items: Vec<SyntaxNode>,
    pub kind: FrameKind,
}

impl Frame {
    pub fn root(pos: Position) -> Self {
        Self {
            pos,
            close: None,
            indent: ROOT_INDENT,
            tier: 0,
            auto_close: false,
            items: Vec::new(),
            kind: FrameKind::Root,
        }
    }

    /// A block opened by `opener`, whose style carried `close` and `tag`.
    pub fn block(
        pos: Position,
        opener: &Descriptor,
        close: Option<&'static str>,
        tag: BlockTag,
        indent: usize,
    ) -> Self {
        Self {
            pos,
            close,
            indent: indent as i64,
            tier: opener.tier,
            auto_close: opener.is_auto_close(),
            items: Vec::new(),
            kind: FrameKind::Block {
                open: opener.spelling,
                tag,
            },
        }
    }

    /// A chain whose first segment is `first`, the operand accumulated before operator `op_pos`.
    pub fn chain(tag: BinaryTag, tier: Tier, indent: i64, first: Vec<SyntaxNode>, op_pos: Position) -> Self {
        Self {
            pos: op_pos.clone(),
            close: None,
            indent,
            tier,
            auto_close: true,
            items: first,
            kind: FrameKind::Chain {
                tag,
                segments: Vec::new(),
                segment_pos: op_pos.clone(),
                first_op_pos: op_pos,
            },
        }
    }

    pub fn chain_tag(&self) -> Option<(BinaryTag, &Position)> {
        match &self.kind {
            FrameKind::Chain { tag, first_op_pos, .. } => Some((*tag, first_op_pos)),
            _ => None,
        }
    }

    /// Close the segment being filled, record operator `op` at `op_pos`, and start a new segment
    /// at `next_pos`. Returns `false` if this is not a chain.
    pub fn push_operator(&mut self, op: &str, op_pos: Position, next_pos: Position) -> bool {
        let FrameKind::Chain {
            segments, segment_pos, ..
        } = &mut self.kind
        else {
            return false;
        };
        let items = std::mem::take(&mut self.items);
        let pos = std::mem::replace(segment_pos, next_pos);
        segments.push(segment(items, pos));
        segments.push(Positioned::new(Node::Operator(op.to_string()), op_pos));
        true
    }

    /// Turn the frame into the node it stands for. The root has none.
    pub fn finish(self) -> Option<SyntaxNode> {
        match self.kind {
            FrameKind::Root => None,
            FrameKind::Block { open, tag } => {
                let close = self.close.map(precedence::display).unwrap_or_default();
                Some(Positioned::new(
                    Node::Block(Block {
                        open: open.to_string(),
                        close: close.to_string(),
                        tag,
                        items: self.items,
                    }),
                    self.pos,
                ))
            }
            FrameKind::Chain {
                tag,
                mut segments,
                segment_pos,
                ..
            } => {
                segments.push(segment(self.items, segment_pos));
                let pos = segments.first().map_or(self.pos, |s| s.pos.clone());
                Some(Positioned::new(
                    Node::Binary(Binary {
                        tag,
                        tier: self.tier,
                        items: segments,
                    }),
                    pos,
                ))
            }
        }
    }
}

/// A segment node; it sits at its first item, or at `fallback` when empty.
fn segment(items: Vec<SyntaxNode>, fallback: Position) -> SyntaxNode {
    let pos = items.first().map_or(fallback, |n| n.pos.clone());
    Positioned::new(Node::Segment(items), pos)
}
