//! Compile-time IR: a straight-line arena of instructions.
//!
//! Each instruction's result is addressed by an [`InstrIdx`], which remembers the [`BlockId`] of the
//! block it was issued by. Indices are never valid across blocks; the evaluator rejects them.

use std::fmt;

use cvl_syntax::ast::Position;

use super::types::NarrowKey;
use super::value::AstThunk;

/// Identity of a block, unique within one [`super::Env`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(u32);

impl BlockId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Index of an instruction (and its result) inside one block.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstrIdx {
    block: BlockId,
    index: u32,
}

impl InstrIdx {
    #[inline]
    pub const fn block(self) -> BlockId {
        self.block
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for InstrIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}.{}", self.block.0, self.index)
    }
}

#[derive(Debug, Clone)]
pub enum InstrKind {
    Void,
    /// No runtime value; keeps a position in the instruction stream.
    ComptimeOnly,
    CaptureAst(AstThunk),
    MakeKey(NarrowKey),
    NsInit,
    NsAppend {
        list: InstrIdx,
        key: InstrIdx,
        value: InstrIdx,
    },
    Call {
        method: InstrIdx,
        arg: InstrIdx,
    },
    Break {
        value: InstrIdx,
    },
}

impl InstrKind {
    pub fn name(&self) -> &'static str {
        match self {
            InstrKind::Void => "void",
            InstrKind::ComptimeOnly => "comptime-only",
            InstrKind::CaptureAst(_) => "capture-ast",
            InstrKind::MakeKey(_) => "make-key",
            InstrKind::NsInit => "ns-init",
            InstrKind::NsAppend { .. } => "ns-append",
            InstrKind::Call { .. } => "call",
            InstrKind::Break { .. } => "break",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Instr {
    pub kind: InstrKind,
    pub pos: Position,
}

/// Append-only instruction arena.
#[derive(Debug)]
pub struct Block {
    id: BlockId,
    instrs: Vec<Instr>,
}

impl Block {
    /// Blocks are handed out by [`super::Env::new_block`] so ids stay unique.
    pub(crate) fn new(id: BlockId) -> Self {
        Self {
            id,
            instrs: Vec::new(),
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn push(&mut self, kind: InstrKind, pos: Position) -> InstrIdx {
        let index = self.instrs.len() as u32;
        self.instrs.push(Instr { kind, pos });
        InstrIdx { block: self.id, index }
    }

    /// Look up an instruction, rejecting indices issued by another block.
    pub fn get(&self, idx: InstrIdx) -> Option<&Instr> {
        if idx.block != self.id {
            return None;
        }
        self.instrs.get(idx.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstrIdx, &Instr)> {
        self.instrs.iter().enumerate().map(|(i, instr)| {
            (
                InstrIdx {
                    block: self.id,
                    index: i as u32,
                },
                instr,
            )
        })
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }
}
