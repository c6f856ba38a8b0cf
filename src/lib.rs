#![forbid(unsafe_code)]
//! cvl compiler
//!
//! A compile-time namespace language: source is tokenized into a bracket/operator tree, the file body is
//! lowered as a namespace whose fields are captured lazily, and the `#builtin.main` entry point is
//! resolved on demand.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Compiler bugs**: Report an `unreachable` diagnostic instead of panicking.

pub mod cli;
pub mod frontend;

pub use frontend::ast;
pub use frontend::diagnostics;
pub use frontend::driver::{CompileOutput, compile_source};
pub use frontend::lexer;
