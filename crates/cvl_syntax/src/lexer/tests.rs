use super::*;
use crate::ast::{Binary, RawTag, trim_whitespace};

fn lex(text: &str) -> TokenizeResult {
    tokenize("test.cvl", text)
}

fn lex_clean(text: &str) -> Vec<SyntaxNode> {
    let result = lex(text);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics for {text:?}: {:#?}",
        result.diagnostics
    );
    result.nodes
}

fn messages(result: &TokenizeResult) -> Vec<&str> {
    result.diagnostics.iter().map(|d| d.message()).collect()
}

fn only(nodes: &[SyntaxNode]) -> &SyntaxNode {
    let trimmed = trim_whitespace(nodes);
    assert_eq!(trimmed.len(), 1, "expected one node, got {trimmed:#?}");
    &trimmed[0]
}

fn as_block(node: &SyntaxNode) -> &Block {
    match &node.node {
        Node::Block(b) => b,
        other => panic!("expected block, got {other:?}"),
    }
}

fn as_binary(node: &SyntaxNode) -> &Binary {
    match &node.node {
        Node::Binary(b) => b,
        other => panic!("expected binary, got {other:?}"),
    }
}

fn ident_text(node: &SyntaxNode) -> (&str, IdentTag) {
    match &node.node {
        Node::Ident(i) => (i.text.as_str(), i.tag),
        other => panic!("expected identifier, got {other:?}"),
    }
}

fn segment_idents(binary: &Binary) -> Vec<&str> {
    binary
        .segments()
        .map(|s| match &s.node {
            Node::Segment(items) => ident_text(only(items)).0,
            other => panic!("expected segment, got {other:?}"),
        })
        .collect()
}

// ---- Structure ----

#[test]
fn parenthesized_identifier() {
    let nodes = lex_clean("(a)");
    let block = as_block(only(&nodes));
    assert_eq!(block.tag, BlockTag::Code);
    assert_eq!((block.open.as_str(), block.close.as_str()), ("(", ")"));
    assert_eq!(ident_text(only(&block.items)), ("a", IdentTag::Plain));
}

#[test]
fn bracket_tags() {
    let nodes = lex_clean("[a] {b}");
    let trimmed = trim_whitespace(&nodes);
    assert_eq!(as_block(&trimmed[0]).tag, BlockTag::List);
    assert_eq!(as_block(&trimmed[2]).tag, BlockTag::Map);
}

#[test]
fn comma_chain_is_one_binary() {
    let nodes = lex_clean("a, b, c");
    let binary = as_binary(only(&nodes));
    assert_eq!(binary.tag, BinaryTag::Separator);
    assert_eq!(binary.arity(), 3);
    assert_eq!(segment_idents(binary), vec!["a", "b", "c"]);
}

#[test]
fn newline_separates_at_top_level() {
    let nodes = lex_clean("a\nb");
    let binary = as_binary(only(&nodes));
    assert_eq!(binary.tag, BinaryTag::Separator);
    assert_eq!(segment_idents(binary), vec!["a", "b"]);
}

#[test]
fn tighter_operators_nest_in_looser_chains() {
    let nodes = lex_clean("a := b, c");
    let outer = as_binary(only(&nodes));
    assert_eq!(outer.tag, BinaryTag::Separator);
    let Node::Segment(first) = &outer.items[0].node else {
        panic!("expected segment");
    };
    let inner = as_binary(only(first));
    assert_eq!(inner.tag, BinaryTag::VariableBinding);
    assert_eq!(segment_idents(inner), vec!["a", "b"]);
}

#[test]
fn binding_operators() {
    let def = lex_clean("x :: y");
    assert_eq!(as_binary(only(&def)).tag, BinaryTag::Definition);

    let public = lex_clean(".a .= b");
    let binary = as_binary(only(&public));
    assert_eq!(binary.tag, BinaryTag::PublicBinding);
    let Node::Segment(key) = &binary.items[0].node else {
        panic!("expected segment");
    };
    assert_eq!(ident_text(only(key)), ("a", IdentTag::Access));
}

#[test]
fn colon_wraps_preceding_operand() {
    let nodes = lex_clean("f(a: 1)");
    let trimmed = trim_whitespace(&nodes);
    assert_eq!(ident_text(&trimmed[0]).0, "f");
    let call = as_block(&trimmed[1]);
    let inner = trim_whitespace(&call.items);
    let colon = as_block(&inner[0]);
    assert_eq!(colon.tag, BlockTag::ColonCall);
    assert_eq!(colon.open, "");
    assert_eq!(colon.close, ":");
    assert_eq!(ident_text(only(&colon.items)).0, "a");
    assert_eq!(ident_text(&inner[2]).0, "1");
}

#[test]
fn arrow_wraps_parameters() {
    let nodes = lex_clean("x => y");
    let trimmed = trim_whitespace(&nodes);
    let params = as_block(&trimmed[0]);
    assert_eq!(params.tag, BlockTag::ArrowFn);
    assert_eq!(ident_text(only(&params.items)).0, "x");
    assert_eq!(ident_text(&trimmed[2]).0, "y");
}

#[test]
fn soft_newlines_inside_brackets() {
    let nodes = lex_clean("[\n  a\n  b\n]");
    let list = as_block(only(&nodes));
    let binary = as_binary(only(&list.items));
    assert_eq!(binary.tag, BinaryTag::Separator);
    assert_eq!(segment_idents(binary), vec!["a", "b"]);
    assert!(matches!(
        binary.items[0].node,
        Node::Segment(ref items) if matches!(items[0].node, Node::Whitespace { newline: true })
    ));
}

#[test]
fn multiline_bracket_closed_at_opening_indent() {
    let nodes = lex_clean("x (\n  a\n)");
    let trimmed = trim_whitespace(&nodes);
    assert_eq!(as_block(&trimmed[2]).tag, BlockTag::Code);
}

#[test]
fn identifiers_with_prefixes() {
    let nodes = lex_clean("#builtin.main");
    assert_eq!(nodes.len(), 2);
    assert_eq!(ident_text(&nodes[0]), ("builtin", IdentTag::Builtin));
    assert_eq!(ident_text(&nodes[1]), ("main", IdentTag::Access));
}

#[test]
fn raw_tokens() {
    let nodes = lex_clean("a . b -> _");
    let raws: Vec<RawTag> = nodes
        .iter()
        .filter_map(|n| match &n.node {
            Node::Raw(r) => Some(r.tag),
            _ => None,
        })
        .collect();
    assert_eq!(raws, vec![RawTag::Access, RawTag::Return, RawTag::Discard]);
}

// ---- Strings ----

#[test]
fn string_literal_with_escapes() {
    let nodes = lex_clean(r#""a\nb\\""#);
    let string = as_block(only(&nodes));
    assert_eq!(string.tag, BlockTag::String);
    assert_eq!((string.open.as_str(), string.close.as_str()), ("\"", "\""));
    let text: String = string
        .items
        .iter()
        .map(|n| match &n.node {
            Node::StringSegment(s) => s.as_str(),
            other => panic!("expected string segment, got {other:?}"),
        })
        .collect();
    assert_eq!(text, "a\nb\\");
}

#[test]
fn string_contents_are_not_tokenized() {
    let nodes = lex_clean(r#""(, :: #x""#);
    let string = as_block(only(&nodes));
    assert!(matches!(&string.items[..], [n] if n.node == Node::StringSegment("(, :: #x".into())));
}

#[test]
fn bad_escape_is_reported() {
    let result = lex(r#""\q""#);
    assert_eq!(messages(&result), vec!["bad escape \\'q'"]);
}

#[test]
fn unterminated_string() {
    let result = lex("\"abc");
    assert_eq!(messages(&result), vec!["open bracket missing close bracket"]);
}

// ---- Diagnostics ----

#[test]
fn unclosed_paren_reports_once_at_open() {
    let result = lex("(a");
    assert_eq!(messages(&result), vec!["open bracket missing close bracket"]);
    let d = &result.diagnostics[0];
    let pos = d.pos().unwrap();
    assert_eq!((pos.line, pos.col, pos.offset), (1, 1, 0));
    assert_eq!(d.notes()[0].message, "reached end of input");
    assert_eq!(as_block(only(&result.nodes)).tag, BlockTag::Code);
}

#[test]
fn mixing_separators_is_reported() {
    let result = lex("a, b; c");
    assert_eq!(messages(&result), vec!["mixing operators disallowed"]);
    let d = &result.diagnostics[0];
    assert_eq!(d.pos().unwrap().col, 5);
    assert_eq!(d.notes()[0].message, "previous operator here");
    assert_eq!(d.notes()[0].pos.as_ref().unwrap().col, 2);
}

#[test]
fn indentation_mismatch_is_reported() {
    let result = lex("    (a\n  )");
    assert_eq!(
        messages(&result),
        vec!["open bracket missing close bracket", "extra close bracket"]
    );
    let note = &result.diagnostics[0].notes()[0];
    assert_eq!(note.message, "expected \")\" indent '4', got \")\" indent '2'");
}

#[test]
fn stray_closer() {
    let result = lex("a)");
    assert_eq!(messages(&result), vec!["extra close bracket"]);
}

#[test]
fn wrong_closer_recovers() {
    let result = lex("(a]");
    assert_eq!(
        messages(&result),
        vec!["open bracket missing close bracket", "extra close bracket"]
    );
}

#[test]
fn bad_token_continues_lexing() {
    let result = lex("a ? b");
    assert_eq!(messages(&result), vec!["bad token \"?\""]);
    let kinds: Vec<&str> = trim_whitespace(&result.nodes)
        .iter()
        .filter(|n| !n.node.is_whitespace())
        .map(|n| n.node.kind_name())
        .collect();
    assert_eq!(kinds, vec!["identifier", "error", "identifier"]);
}

#[test]
fn lone_prefix_is_not_an_identifier() {
    let result = lex("# a");
    assert_eq!(messages(&result), vec!["bad token \"#\""]);
}

// ---- Positions ----

#[test]
fn positions_are_one_based() {
    let nodes = lex_clean("a\n  bc");
    let binary = as_binary(only(&nodes));
    let segs: Vec<&SyntaxNode> = binary.segments().collect();
    let Node::Segment(second) = &segs[1].node else {
        panic!("expected segment");
    };
    let b = only(second);
    assert_eq!((b.pos.line, b.pos.col, b.pos.offset), (2, 3, 4));
    assert_eq!(&*b.pos.file, "test.cvl");
}

#[test]
fn empty_segment_sits_after_operator() {
    let nodes = lex_clean("a,");
    let binary = as_binary(only(&nodes));
    let last = binary.segments().last().unwrap();
    assert!(matches!(&last.node, Node::Segment(items) if items.is_empty()));
    assert_eq!(last.pos.col, 3);
    assert_eq!(nodes[0].pos.col, 1);
}

#[test]
fn empty_input() {
    let result = lex("");
    assert!(result.nodes.is_empty());
    assert!(result.diagnostics.is_empty());
}

// ---- Limits and recovery ----

#[test]
fn unmatched_closing_quote_stays_in_string() {
    let result = lex("\"a\n  b\" (c");
    assert_eq!(
        messages(&result),
        vec!["extra close bracket", "open bracket missing close bracket"]
    );
    let string = as_block(only(&result.nodes));
    assert_eq!(string.tag, BlockTag::String);
    assert!(
        string
            .items
            .iter()
            .all(|n| matches!(n.node, Node::StringSegment(_)))
    );
}

#[test]
fn deep_nesting_is_capped() {
    let result = lex(&"(".repeat(100_000));
    let first = &result.diagnostics[0];
    assert!(first.message().starts_with("nesting too deep"), "{}", first.message());
    assert_eq!(first.pos().unwrap().col as usize, MAX_NESTING + 1);
    assert_eq!(result.diagnostics.len(), MAX_NESTING + 1);

    let mut depth = 0;
    let mut items = result.nodes.as_slice();
    while let [node] = items {
        depth += 1;
        items = as_block(node).items.as_slice();
    }
    assert_eq!(depth, MAX_NESTING);
    drop(result);
}
