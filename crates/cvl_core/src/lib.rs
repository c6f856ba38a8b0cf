//! Provide the canonical language vocabulary for the cvl compiler.
//!
//! This crate is intentionally small and dependency-free. It describes *what* the tokens of the language
//! are (spellings, precedence tiers, styles, semantic tags); it does not tokenize anything itself.
//!
//! ## Notes
//!
//! - This is a "vocabulary" crate: **no IO**, no global state, and no syntax-tree types.
//! - The tokenizer in `cvl_syntax` is the only consumer that interprets the table as a stack machine.

pub mod lang;
