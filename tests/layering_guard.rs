//! Layering guardrails for the workspace crates.
//!
//! `cvl_core` is pure vocabulary and must not depend on the syntax crate; `cvl_syntax` must not depend on
//! the compiler crate. These tests scan each manifest's `[dependencies]` table.

fn dependencies(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();
    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((name, _)) = line.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn core_has_no_workspace_dependencies() {
    let deps = dependencies(include_str!("../crates/cvl_core/Cargo.toml"));
    assert!(
        !deps.iter().any(|d| d.starts_with("cvl")),
        "`cvl_core` must not depend on other workspace crates: {deps:?}"
    );
}

#[test]
fn syntax_depends_only_on_core() {
    let deps = dependencies(include_str!("../crates/cvl_syntax/Cargo.toml"));
    let workspace: Vec<&String> = deps.iter().filter(|d| d.starts_with("cvl")).collect();
    assert_eq!(workspace, vec!["cvl_core"]);
}
