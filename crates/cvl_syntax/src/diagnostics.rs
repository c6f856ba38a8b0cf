//! Compiler diagnostics and their plain-text rendering.
//!
//! A [`Diagnostic`] is an ordered list of entries (the primary message first, then notes) plus a
//! compiler trace describing where in the compiler it was raised. The trace always ends with the Rust
//! source location of the constructor call, captured with `#[track_caller]`.
//!
//! ## Notes
//! - Diagnostics that abort the current unit of work travel as [`CompileError`]. Everything else is
//!   accumulated in a `Vec<Diagnostic>`.
//! - Rendering is plain text: no colors, so output is stable in snapshots and pipes.
//!
//! ## Examples
//! ```rust
//! use cvl_syntax::ast::Position;
//! use cvl_syntax::diagnostics::{Diagnostic, Severity};
//!
//! let d = Diagnostic::error(Position::new("a.cvl", 0, 1, 1), "bad token \"?\"");
//! assert_eq!(d.severity(), Severity::Error);
//! assert_eq!(d.message(), "bad token \"?\"");
//! ```

use std::fmt;
use std::panic::Location;

use crate::ast::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Note,
    /// Internal invariant violation; always a compiler bug.
    Unreachable,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Note => "note",
            Severity::Unreachable => "unreachable",
            Severity::Warning => "warning",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticEntry {
    /// `None` when the problem has no place in any source.
    pub pos: Option<Position>,
    pub severity: Severity,
    pub message: String,
}

/// One step of the compiler's own path to a diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEntry {
    pub pos: Position,
    pub label: String,
}

impl TraceEntry {
    pub fn new(pos: Position, label: impl Into<String>) -> Self {
        Self {
            pos,
            label: label.into(),
        }
    }

    #[track_caller]
    fn here() -> Self {
        let loc = Location::caller();
        Self::new(Position::new(loc.file(), 0, loc.line(), loc.column()), "raised")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub entries: Vec<DiagnosticEntry>,
    pub trace: Vec<TraceEntry>,
}

impl Diagnostic {
    #[track_caller]
    pub fn new(pos: Option<Position>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            entries: vec![DiagnosticEntry {
                pos,
                severity,
                message: message.into(),
            }],
            trace: vec![TraceEntry::here()],
        }
    }

    #[track_caller]
    pub fn error(pos: Position, message: impl Into<String>) -> Self {
        Self::new(Some(pos), Severity::Error, message)
    }

    #[track_caller]
    pub fn unreachable(pos: Option<Position>, message: impl Into<String>) -> Self {
        Self::new(pos, Severity::Unreachable, message)
    }

    /// Append a note entry.
    pub fn with_note(mut self, pos: Position, message: impl Into<String>) -> Self {
        self.entries.push(DiagnosticEntry {
            pos: Some(pos),
            severity: Severity::Note,
            message: message.into(),
        });
        self
    }

    /// Prepend the caller's trace so the constructor location stays last.
    pub fn with_trace_prefix(mut self, prefix: &[TraceEntry]) -> Self {
        let mut trace = prefix.to_vec();
        trace.append(&mut self.trace);
        self.trace = trace;
        self
    }

    pub fn severity(&self) -> Severity {
        self.entries.first().map_or(Severity::Error, |e| e.severity)
    }

    pub fn message(&self) -> &str {
        self.entries.first().map_or("", |e| e.message.as_str())
    }

    pub fn pos(&self) -> Option<&Position> {
        self.entries.first().and_then(|e| e.pos.as_ref())
    }

    pub fn notes(&self) -> &[DiagnosticEntry] {
        self.entries.get(1..).unwrap_or(&[])
    }
}

/// A diagnostic that aborted the current unit of work.
#[derive(Debug, Clone, PartialEq, thiserror::Error, miette::Diagnostic)]
#[error("{}", .0.message())]
#[diagnostic(code(cvl::compile))]
pub struct CompileError(pub Box<Diagnostic>);

impl CompileError {
    pub fn into_diagnostic(self) -> Diagnostic {
        *self.0
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.0
    }
}

impl From<Diagnostic> for CompileError {
    fn from(d: Diagnostic) -> Self {
        CompileError(Box::new(d))
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// The source file excerpts are taken from.
#[derive(Debug, Clone, Copy)]
pub struct SourceFile<'a> {
    pub label: &'a str,
    pub text: &'a str,
}

impl<'a> SourceFile<'a> {
    pub fn new(label: &'a str, text: &'a str) -> Self {
        Self { label, text }
    }

    fn line(&self, line: u32) -> Option<&'a str> {
        let index = usize::try_from(line).ok()?.checked_sub(1)?;
        self.text.split('\n').nth(index)
    }
}

/// Render one diagnostic.
///
/// Each entry is `file:line:col: severity: message`, followed by a line excerpt and a `^` pointer when
/// the position lies in `source`. Trace lines follow as `at file:line:col (label)`.
pub fn render(diagnostic: &Diagnostic, source: &SourceFile<'_>) -> String {
    let mut out = String::new();
    for entry in &diagnostic.entries {
        render_entry(&mut out, entry, source);
    }
    for step in &diagnostic.trace {
        out.push_str(&format!("  at {} ({})\n", step.pos, step.label));
    }
    out
}

/// Render a list of diagnostics, separated by blank lines.
pub fn render_all(diagnostics: &[Diagnostic], source: &SourceFile<'_>) -> String {
    diagnostics
        .iter()
        .map(|d| render(d, source))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_entry(out: &mut String, entry: &DiagnosticEntry, source: &SourceFile<'_>) {
    let Some(pos) = &entry.pos else {
        out.push_str(&format!("??: {}: {}\n", entry.severity, entry.message));
        return;
    };
    out.push_str(&format!("{pos}: {}: {}\n", entry.severity, entry.message));
    if &*pos.file != source.label {
        return;
    }
    let Some(line) = source.line(pos.line) else {
        return;
    };
    let number = pos.line.to_string();
    let pad = " ".repeat(number.len());
    let indent = " ".repeat(pos.col.saturating_sub(1) as usize);
    out.push_str(&format!(" {number} | {line}\n"));
    out.push_str(&format!(" {pad} | {indent}^\n"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: u32, col: u32) -> Position {
        Position::new("main.cvl", 0, line, col)
    }

    fn without_trace(mut d: Diagnostic) -> Diagnostic {
        d.trace.clear();
        d
    }

    #[test]
    fn constructor_location_is_traced() {
        let d = Diagnostic::error(pos(1, 1), "boom");
        assert_eq!(d.trace.len(), 1);
        assert!(d.trace[0].pos.file.ends_with("diagnostics.rs"));
        assert_eq!(d.trace[0].label, "raised");
    }

    #[test]
    fn trace_prefix_keeps_constructor_last() {
        let d = Diagnostic::error(pos(1, 1), "boom")
            .with_trace_prefix(&[TraceEntry::new(pos(2, 3), "analyze field .x")]);
        assert_eq!(d.trace.len(), 2);
        assert_eq!(d.trace[0].label, "analyze field .x");
        assert_eq!(d.trace[1].label, "raised");
    }

    #[test]
    fn renders_excerpt_with_pointer() {
        let source = SourceFile::new("main.cvl", "first\n  (a\nlast");
        let d = without_trace(
            Diagnostic::error(pos(2, 3), "open bracket missing close bracket")
                .with_note(pos(3, 5), "reached end of input"),
        );
        insta::assert_snapshot!(render(&d, &source), @r"
        main.cvl:2:3: error: open bracket missing close bracket
         2 |   (a
           |   ^
        main.cvl:3:5: note: reached end of input
         3 | last
           |     ^
        ");
    }

    #[test]
    fn foreign_positions_have_no_excerpt() {
        let source = SourceFile::new("main.cvl", "x");
        let d = without_trace(Diagnostic::new(Some(Position::compiler()), Severity::Unreachable, "not implemented"));
        assert_eq!(render(&d, &source), "compiler:0:0: unreachable: not implemented\n");

        let d = without_trace(Diagnostic::new(None, Severity::Warning, "odd"));
        assert_eq!(render(&d, &source), "??: warning: odd\n");
    }

    #[test]
    fn trace_lines_follow_entries() {
        let source = SourceFile::new("other.cvl", "");
        let mut d = Diagnostic::error(pos(1, 1), "x");
        d.trace = vec![TraceEntry::new(pos(4, 2), "analyze main")];
        assert_eq!(render(&d, &source), "main.cvl:1:1: error: x\n  at main.cvl:4:2 (analyze main)\n");
    }

    #[test]
    fn compile_error_displays_primary_message() {
        let err = CompileError::from(Diagnostic::error(pos(1, 1), "unknown name"));
        assert_eq!(err.to_string(), "unknown name");
        assert_eq!(err.into_diagnostic().message(), "unknown name");
    }
}
