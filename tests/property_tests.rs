//! Property-based tests for the compile driver
//!
//! The driver must turn any input into diagnostics, never a panic.

use cvl::compile_source;
use cvl::diagnostics::{SourceFile, render_all};
use proptest::prelude::*;

fn cvl_like_source() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "(", ")", "[", "]", ",", "\n", "\n  ", " ", "::", ":=", ".=", "=>", "ns", "ns [", "a", "b", "#builtin",
            ".main", ".a", "\"s\"",
        ]),
        0..40,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn compile_never_panics(source in "\\PC{0,96}") {
        let out = compile_source("prop.cvl", &source);
        let _ = render_all(&out.diagnostics, &SourceFile::new("prop.cvl", &source));
    }

    #[test]
    fn every_diagnostic_has_a_message(source in cvl_like_source()) {
        let out = compile_source("prop.cvl", &source);
        for d in &out.diagnostics {
            prop_assert!(!d.message().is_empty());
            prop_assert!(!d.trace.is_empty(), "diagnostic without construction trace: {}", d.message());
        }
    }
}
