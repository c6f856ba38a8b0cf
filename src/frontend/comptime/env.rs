//! Analysis environment: diagnostics sink, compiler breadcrumb trace, block ids.

use cvl_syntax::ast::Position;
use cvl_syntax::diagnostics::{CompileError, CompileResult, Diagnostic, TraceEntry};

use super::ir::{Block, BlockId};

#[derive(Debug, Default)]
pub struct Env {
    diagnostics: Vec<Diagnostic>,
    trace: Vec<TraceEntry>,
    next_block: u32,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from diagnostics gathered by an earlier stage.
    pub fn with_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            diagnostics,
            ..Self::default()
        }
    }

    pub fn new_block(&mut self) -> Block {
        let id = BlockId::new(self.next_block);
        self.next_block += 1;
        Block::new(id)
    }

    /// Run `f` with a breadcrumb pushed onto the trace.
    pub fn with_trace<T>(&mut self, pos: &Position, label: impl Into<String>, f: impl FnOnce(&mut Env) -> T) -> T {
        self.trace.push(TraceEntry::new(pos.clone(), label));
        let out = f(self);
        self.trace.pop();
        out
    }

    /// An error diagnostic carrying the current trace.
    #[track_caller]
    pub fn diagnostic(&self, pos: &Position, message: impl Into<String>) -> Diagnostic {
        Diagnostic::error(pos.clone(), message).with_trace_prefix(&self.trace)
    }

    #[track_caller]
    pub fn error(&self, pos: &Position, message: impl Into<String>) -> CompileError {
        self.diagnostic(pos, message).into()
    }

    /// An internal invariant violation.
    #[track_caller]
    pub fn unreachable(&self, pos: &Position, message: impl Into<String>) -> CompileError {
        Diagnostic::unreachable(Some(pos.clone()), message)
            .with_trace_prefix(&self.trace)
            .into()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record the error of a failed unit of work and carry on.
    pub fn catch<T>(&mut self, result: CompileResult<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(error = %e, "analysis unit aborted");
                self.push(e.into_diagnostic());
                None
            }
        }
    }

    /// Breadcrumbs currently pushed, outermost first.
    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
