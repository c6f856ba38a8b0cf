//! Property tests for the tokenizer.
//!
//! Run with: `cargo test -p cvl_syntax --test tokenize_properties`

use cvl_syntax::ast::{SyntaxNode, walk};
use cvl_syntax::diagnostics::Severity;
use cvl_syntax::lexer::tokenize;
use proptest::prelude::*;

/// Source fragments drawn from the language's own punctuation, so bracket and chain logic gets exercised.
fn cvl_like_source() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "(", ")", "[", "]", "{", "}", ",", ";", "\n", "\n  ", " ", "::", ".=", ":=", ":", "=>", "=", "\"",
            "\\", "a", "bc", "#builtin", ".main", ".", "->", "_", "?", "+",
        ]),
        0..48,
    )
    .prop_map(|parts| parts.concat())
}

fn max_offset(nodes: &[SyntaxNode]) -> usize {
    let mut max = 0;
    walk(nodes, &mut |n| max = max.max(n.pos.offset));
    max
}

proptest! {
    #[test]
    fn tokenize_never_panics(source in "\\PC{0,128}") {
        let _ = tokenize("prop.cvl", &source);
    }

    #[test]
    fn structured_input_keeps_invariants(source in cvl_like_source()) {
        let result = tokenize("prop.cvl", &source);
        prop_assert!(max_offset(&result.nodes) <= source.len());
        for d in &result.diagnostics {
            prop_assert!(!d.entries.is_empty());
            prop_assert_ne!(d.severity(), Severity::Unreachable, "internal error on {:?}: {}", source, d.message());
        }
    }

    #[test]
    fn balanced_parens_are_clean(depth in 1usize..12) {
        let source = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
        let result = tokenize("prop.cvl", &source);
        prop_assert!(result.diagnostics.is_empty());
        prop_assert_eq!(result.nodes.len(), 1);
    }
}
