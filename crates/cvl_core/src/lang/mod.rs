//! cvl language vocabulary registries.
//!
//! Callers work with typed tags (e.g. [`precedence::BlockTag`], [`punctuation::RawTag`]) and look up
//! token metadata through the registry tables instead of comparing strings ad hoc.
//!
//! ## Examples
//! ```rust
//! use cvl_core::lang::precedence::{self, Style};
//!
//! let comma = precedence::lookup(",").unwrap();
//! assert!(matches!(comma.style, Style::Join { .. }));
//! ```

pub mod builtins;
pub mod precedence;
pub mod punctuation;
