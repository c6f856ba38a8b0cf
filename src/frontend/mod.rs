//! cvl compiler frontend
//!
//! - `container`: splitting bodies into lines and `::` definitions
//! - `comptime`: slot shapes, values, the IR block and its evaluator
//! - `analyzer`: compile-time analysis and namespace lowering
//! - `driver`: the end-to-end pipeline
//!
//! Tokenizing and the syntax tree live in the shared `cvl_syntax` crate.

pub use cvl_syntax::{ast, diagnostics, lexer};

pub mod analyzer;
pub mod comptime;
pub mod container;
pub mod driver;
