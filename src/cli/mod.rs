//! CLI module for the cvl compiler
//!
//! ## Commands
//!
//! - `check <file>` - Run the full pipeline and report diagnostics (also the default action)
//! - `parse <file>` - Tokenize only and print the syntax tree
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Carries a message that is already formatted for display, and the exit code to leave with.
#[derive(Debug)]
pub struct CliError {
    pub message: String,
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// A failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// The cvl compiler
#[derive(Parser, Debug)]
#[command(name = "cvl")]
#[command(version = VERSION)]
#[command(about = "Compile-time namespace language compiler", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// File to check (default action when no subcommand given)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Label used for the file in positions and diagnostics (defaults to the path as given)
    #[arg(long, value_name = "NAME", global = true)]
    pub label: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pipeline and report diagnostics
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Tokenize only and print the syntax tree
    Parse {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code != ExitCode::SUCCESS {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

fn execute(cli: Cli) -> CliResult<ExitCode> {
    let label = cli.label.as_deref();
    match cli.command {
        Some(Command::Check { file }) => commands::check_file(&file, label),
        Some(Command::Parse { file }) => commands::parse_file(&file, label),
        None => match cli.file {
            Some(file) => commands::check_file(&file, label),
            // No command and no file: nothing to do
            None => Err(CliError::failure("Error: no input file (try `cvl --help`)")),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
