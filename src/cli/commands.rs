//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::Path;

use cvl_syntax::diagnostics::{Diagnostic, SourceFile, render_all};
use cvl_syntax::lexer;

use crate::frontend::driver::compile_source;

use super::{CliError, CliResult, ExitCode};

/// Maximum source file size (100 MB).
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Read a source file.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read (doesn't exist, permission denied, etc.)
/// - The file exceeds `MAX_SOURCE_SIZE` (100 MB)
pub fn read_source(path: &Path) -> CliResult<String> {
    let shown = path.display();
    let metadata = fs::metadata(path).map_err(|e| CliError::failure(format!("Cannot access file '{shown}': {e}")))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{shown}' is too large ({} bytes, max {MAX_SOURCE_SIZE} bytes)",
            metadata.len()
        )));
    }

    fs::read_to_string(path).map_err(|e| CliError::failure(format!("Error reading file '{shown}': {e}")))
}

/// Print rendered diagnostics to stderr; the exit code says whether there were any.
fn report(diagnostics: &[Diagnostic], label: &str, source: &str) -> ExitCode {
    if diagnostics.is_empty() {
        return ExitCode::SUCCESS;
    }
    eprint!("{}", render_all(diagnostics, &SourceFile::new(label, source)));
    ExitCode::FAILURE
}

fn label_for(path: &Path, label: Option<&str>) -> String {
    label.map_or_else(|| path.display().to_string(), str::to_string)
}

/// Run the full pipeline over a file.
pub fn check_file(path: &Path, label: Option<&str>) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let label = label_for(path, label);
    let output = compile_source(&label, &source);
    tracing::info!(diagnostics = output.diagnostics.len(), "check finished");
    Ok(report(&output.diagnostics, &label, &source))
}

/// Tokenize a file and print its syntax tree.
pub fn parse_file(path: &Path, label: Option<&str>) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let label = label_for(path, label);
    let result = lexer::tokenize(&label, &source);
    println!("{:#?}", result.nodes);
    Ok(report(&result.diagnostics, &label, &source))
}
