//! Shared syntax frontend for the cvl language: cursor, tokenizer/parser, syntax tree, diagnostics.
//!
//! This crate is dependency-light and intended for reuse by the compiler and by future tooling.
//!
//! ## Notes
//! - This crate is intentionally "syntax-only": it does not resolve names, analyze, or evaluate anything.
//! - Lexing and structural parsing are fused: [`lexer::tokenize`] drives an explicit stack of open scopes
//!   and produces the syntax tree directly, without a separate grammar.
//! - Token vocabulary (precedence tiers, tags, raw tokens) comes from `cvl_core::lang` registries.
//!
//! ## Examples
//! ```rust
//! use cvl_syntax::lexer;
//!
//! let result = lexer::tokenize("demo.cvl", "(a)");
//! assert!(result.diagnostics.is_empty());
//! assert_eq!(result.nodes.len(), 1);
//! ```

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod stack;
