//! Tokenizer: turns source text into a syntax tree in one pass.
//!
//! There is no grammar. Every structural token is looked up in the precedence table
//! (`cvl_core::lang::precedence`) and acts on an explicit stack of open scopes:
//!
//! - **open** tokens push a block frame;
//! - **close** tokens pop frames until the one expecting them, reporting what was left unclosed;
//! - **join** tokens build N-ary chains of same-tier operators, wrapping what came before as the first
//!   operand.
//!
//! Indentation takes part in matching: a closer only matches an opener recorded at the same indentation,
//! so a misplaced bracket is reported where it goes wrong instead of at the end of the file.
//!
//! ## Notes
//! - Tokenizing never fails. Problems are collected in [`TokenizeResult::diagnostics`] and a best-effort
//!   tree is always returned.
//! - A whitespace run containing a newline is a separator *unless* it is "soft": at the start of a list,
//!   right before a closing bracket, or at the end of input.
//! - A token's mode switch only applies once the token took effect, so an unmatched closing quote
//!   leaves the tokenizer inside the string it failed to close.
//! - At most [`MAX_NESTING`] scopes may be open at once. Past that, tokenizing stops with
//!   "nesting too deep" and the open scopes are folded as at end of input.

mod cursor;
mod frame;

#[cfg(test)]
mod tests;

pub use cursor::Cursor;

use cvl_core::lang::precedence::{self, BinaryTag, BlockTag, Descriptor, Mode, Style};
use cvl_core::lang::punctuation::{self, ACCESS_PREFIX, BUILTIN_PREFIX};

use crate::ast::{Block, Ident, IdentTag, Node, Position, Positioned, Raw, SyntaxNode};
use crate::diagnostics::Diagnostic;
use frame::Frame;

/// Maximum number of simultaneously open scopes, chains included.
pub const MAX_NESTING: usize = 1024;

/// Output of [`tokenize`].
#[derive(Debug, Clone)]
pub struct TokenizeResult {
    /// Top-level items of the file.
    pub nodes: Vec<SyntaxNode>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Tokenize `text`, attributing positions to `file`.
#[tracing::instrument(skip_all, fields(file = %file, len = text.len()))]
pub fn tokenize(file: &str, text: &str) -> TokenizeResult {
    let result = Tokenizer::new(file, text).run();
    tracing::debug!(
        nodes = result.nodes.len(),
        diagnostics = result.diagnostics.len(),
        "tokenized"
    );
    result
}

struct Tokenizer<'a> {
    cursor: Cursor<'a>,
    stack: Vec<Frame>,
    mode: Mode,
    diagnostics: Vec<Diagnostic>,
}

/// What a lexing step produced.
enum Lexeme<'a> {
    /// A leaf that needs no table lookup.
    Leaf(Node),
    /// Text to classify through the precedence table.
    Token(&'a str),
    /// A newline-containing whitespace run.
    Newline,
}

impl<'a> Tokenizer<'a> {
    fn new(file: &str, text: &'a str) -> Self {
        let cursor = Cursor::new(file, text);
        let root = Frame::root(cursor.position());
        Self {
            cursor,
            stack: vec![root],
            mode: Mode::Regular,
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self) -> TokenizeResult {
        while !self.cursor.is_at_end() {
            if let Err(d) = self.step() {
                self.diagnostics.push(d);
                break;
            }
        }
        if let Err(d) = self.finish() {
            self.diagnostics.push(d);
        }
        let nodes = self.stack.into_iter().next().map(|f| f.items).unwrap_or_default();
        TokenizeResult {
            nodes,
            diagnostics: self.diagnostics,
        }
    }

    fn top(&self) -> Result<&Frame, Diagnostic> {
        self.stack
            .last()
            .ok_or_else(|| Diagnostic::unreachable(Some(self.cursor.position()), "tokenizer stack is empty"))
    }

    fn top_mut(&mut self) -> Result<&mut Frame, Diagnostic> {
        let cursor = &self.cursor;
        self.stack
            .last_mut()
            .ok_or_else(|| Diagnostic::unreachable(Some(cursor.position()), "tokenizer stack is empty"))
    }

    fn push(&mut self, node: Node, pos: Position) -> Result<(), Diagnostic> {
        self.top_mut()?.items.push(Positioned::new(node, pos));
        Ok(())
    }

    /// Pop the top frame and append its node to the frame below.
    fn pop_frame(&mut self) -> Result<(), Diagnostic> {
        if self.stack.len() <= 1 {
            return Err(Diagnostic::unreachable(
                Some(self.cursor.position()),
                "attempted to close the root scope",
            ));
        }
        let node = self.stack.pop().and_then(Frame::finish).ok_or_else(|| {
            Diagnostic::unreachable(Some(self.cursor.position()), "popped a frame that produces no node")
        })?;
        self.top_mut()?.items.push(node);
        Ok(())
    }

    fn step(&mut self) -> Result<(), Diagnostic> {
        let start = self.cursor.position();
        let lexeme = match self.mode {
            Mode::Regular => self.lex_regular(&start),
            Mode::InString => self.lex_in_string(&start),
        };
        match lexeme {
            Lexeme::Leaf(node) => self.push(node, start),
            Lexeme::Newline => {
                if self.is_soft_newline()? {
                    self.push(Node::Whitespace { newline: true }, start)
                } else {
                    self.dispatch(precedence::NEWLINE, start)
                }
            }
            Lexeme::Token(text) => self.dispatch(text, start),
        }
    }

    fn lex_regular(&mut self, start: &Position) -> Lexeme<'a> {
        let Some(first) = self.cursor.peek() else {
            return Lexeme::Leaf(Node::Whitespace { newline: false });
        };
        if punctuation::is_ident_char(first) {
            let text = self.cursor.take_while(punctuation::is_ident_char);
            return ident(text, IdentTag::Plain);
        }
        if first == BUILTIN_PREFIX || first == ACCESS_PREFIX {
            if let Some(lexeme) = self.try_prefixed_ident(start, first) {
                return lexeme;
            }
        }
        if first.is_whitespace() {
            let run = self.cursor.take_while(char::is_whitespace);
            return if run.contains('\n') {
                Lexeme::Newline
            } else {
                Lexeme::Leaf(Node::Whitespace { newline: false })
            };
        }
        self.cursor.take();
        if first == ACCESS_PREFIX && self.cursor.peek().is_some_and(punctuation::is_operator_char) {
            self.cursor.take_while(punctuation::is_operator_char);
        } else if punctuation::is_operator_char(first) {
            self.cursor.take_while(punctuation::is_operator_char);
        }
        Lexeme::Token(self.cursor.slice_from(start))
    }

    /// `#name` or `.name`. Reverts and yields `None` if no identifier follows the prefix.
    fn try_prefixed_ident(&mut self, start: &Position, prefix: char) -> Option<Lexeme<'a>> {
        self.cursor.take();
        let text = self.cursor.take_while(punctuation::is_ident_char);
        if text.is_empty() {
            self.cursor.revert(start);
            return None;
        }
        let tag = if prefix == BUILTIN_PREFIX {
            IdentTag::Builtin
        } else {
            IdentTag::Access
        };
        Some(ident(text, tag))
    }

    fn lex_in_string(&mut self, start: &Position) -> Lexeme<'a> {
        match self.cursor.take() {
            Some('"') => Lexeme::Token(precedence::STRING_CLOSE),
            Some('\\') => {
                let resolved = match self.cursor.take() {
                    Some('\\') => "\\",
                    Some('"') => "\"",
                    Some('n') => "\n",
                    Some('t') => "\t",
                    other => {
                        let shown = other.map_or_else(|| "end of input".to_string(), |c| format!("{c:?}"));
                        self.diagnostics
                            .push(Diagnostic::error(start.clone(), format!("bad escape \\{shown}")));
                        return Lexeme::Leaf(Node::Error);
                    }
                };
                Lexeme::Leaf(Node::StringSegment(resolved.to_string()))
            }
            _ => {
                self.cursor.take_while(|c| c != '"' && c != '\\');
                Lexeme::Leaf(Node::StringSegment(self.cursor.slice_from(start).to_string()))
            }
        }
    }

    fn is_soft_newline(&self) -> Result<bool, Diagnostic> {
        if self.top()?.items.iter().all(|n| n.node.is_whitespace()) {
            return Ok(true);
        }
        let Some(next) = self.cursor.peek() else {
            return Ok(true);
        };
        let mut buf = [0u8; 4];
        Ok(matches!(
            precedence::lookup(next.encode_utf8(&mut buf)).map(|d| d.style),
            Some(Style::Close { auto_open: None })
        ))
    }

    fn dispatch(&mut self, text: &str, start: Position) -> Result<(), Diagnostic> {
        let Some(descriptor) = precedence::lookup(text) else {
            return self.fallback(text, start);
        };
        match descriptor.style {
            Style::Open { close, tag } => {
                if self.stack.len() > MAX_NESTING {
                    return Err(Diagnostic::error(
                        start,
                        format!("nesting too deep: more than {MAX_NESTING} open scopes"),
                    ));
                }
                let frame = Frame::block(start, &descriptor, close, tag, self.cursor.indent());
                self.stack.push(frame);
                self.enter_mode(&descriptor);
                Ok(())
            }
            Style::Close { auto_open } => self.close(&descriptor, auto_open, start),
            Style::Join { tag } => {
                self.join(&descriptor, tag, start)?;
                self.enter_mode(&descriptor);
                Ok(())
            }
        }
    }

    fn enter_mode(&mut self, descriptor: &Descriptor) {
        if let Some(mode) = descriptor.set_mode {
            self.mode = mode;
        }
    }

    fn fallback(&mut self, text: &str, start: Position) -> Result<(), Diagnostic> {
        if let Some(tag) = punctuation::raw_tag(text) {
            return self.push(
                Node::Raw(Raw {
                    text: text.to_string(),
                    tag,
                }),
                start,
            );
        }
        self.diagnostics
            .push(Diagnostic::error(start.clone(), format!("bad token {text:?}")));
        self.push(Node::Error, start)
    }

    fn close(&mut self, closer: &Descriptor, auto_open: Option<BlockTag>, start: Position) -> Result<(), Diagnostic> {
        let current_indent = self.cursor.indent() as i64;
        loop {
            let top = self.top()?;
            if top.close == Some(closer.spelling) && top.indent == current_indent {
                self.pop_frame()?;
                self.enter_mode(closer);
                return Ok(());
            }
            if top.indent < current_indent || top.tier < closer.tier {
                return match auto_open {
                    Some(tag) => self.wrap_operand(closer.spelling, tag, start),
                    None => {
                        self.diagnostics
                            .push(Diagnostic::error(start, "extra close bracket"));
                        Ok(())
                    }
                };
            }
            if !top.auto_close {
                let expected = top.close.map(precedence::display).unwrap_or_default();
                let d = Diagnostic::error(top.pos.clone(), "open bracket missing close bracket").with_note(
                    start.clone(),
                    format!(
                        "expected {expected:?} indent '{}', got {:?} indent '{}'",
                        top.indent,
                        precedence::display(closer.spelling),
                        current_indent
                    ),
                );
                self.diagnostics.push(d);
            }
            self.pop_frame()?;
        }
    }

    /// Wrap the operand before an auto-open closer into an anonymous block.
    fn wrap_operand(&mut self, closer: &'static str, tag: BlockTag, start: Position) -> Result<(), Diagnostic> {
        let top = self.top_mut()?;
        let from = top
            .items
            .iter()
            .position(|n| !n.node.is_whitespace())
            .unwrap_or(top.items.len());
        let wrapped = top.items.split_off(from);
        let pos = wrapped.first().map_or(start, |n| n.pos.clone());
        top.items.push(Positioned::new(
            Node::Block(Block {
                open: String::new(),
                close: precedence::display(closer).to_string(),
                tag,
                items: wrapped,
            }),
            pos,
        ));
        Ok(())
    }

    fn join(&mut self, op: &Descriptor, tag: BinaryTag, start: Position) -> Result<(), Diagnostic> {
        loop {
            let top = self.top()?;
            if top.tier == op.tier {
                let Some((previous, previous_pos)) = top.chain_tag() else {
                    return Err(Diagnostic::unreachable(
                        Some(start),
                        "operator shares a tier with a bracket scope",
                    ));
                };
                if previous != tag {
                    let d = Diagnostic::error(start.clone(), "mixing operators disallowed")
                        .with_note(previous_pos.clone(), "previous operator here");
                    self.diagnostics.push(d);
                }
                break;
            }
            if top.tier < op.tier {
                let indent = top.indent;
                let first = std::mem::take(&mut self.top_mut()?.items);
                self.stack
                    .push(Frame::chain(tag, op.tier, indent, first, start.clone()));
                break;
            }
            if !top.auto_close {
                let d = Diagnostic::error(top.pos.clone(), "item is never closed.")
                    .with_note(start.clone(), "automatically closed here.");
                self.diagnostics.push(d);
            }
            self.pop_frame()?;
        }
        let next = self.cursor.position();
        let spelling = op.spelling;
        if !self.top_mut()?.push_operator(spelling, start.clone(), next) {
            return Err(Diagnostic::unreachable(Some(start), "operator landed outside a chain"));
        }
        Ok(())
    }

    /// Fold every remaining frame into the root at end of input.
    fn finish(&mut self) -> Result<(), Diagnostic> {
        let end = self.cursor.position();
        while self.stack.len() > 1 {
            let top = self.top()?;
            if !top.auto_close {
                let d = Diagnostic::error(top.pos.clone(), "open bracket missing close bracket")
                    .with_note(end.clone(), "reached end of input");
                self.diagnostics.push(d);
            }
            self.pop_frame()?;
        }
        Ok(())
    }
}

fn ident(text: &str, tag: IdentTag) -> Lexeme<'_> {
    Lexeme::Leaf(Node::Ident(Ident {
        text: text.to_string(),
        tag,
    }))
}
