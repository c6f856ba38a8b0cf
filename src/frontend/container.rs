//! Container/binding reader.
//!
//! Splits a flat node sequence (a file body or a bracket body) into separator-delimited lines and
//! pulls `name :: value` definitions out of them. Remaining lines are handed back for analysis.

use std::collections::HashMap;

use cvl_core::lang::precedence::{self, BinaryTag, BlockTag};
use cvl_syntax::ast::{Binary, IdentTag, Node, Position, Positioned, SyntaxNode, trim_whitespace};
use cvl_syntax::diagnostics::CompileResult;

use crate::frontend::comptime::Env;

/// One separator-delimited line.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    pub items: &'a [SyntaxNode],
    pub pos: &'a Position,
}

/// A `::` definition.
#[derive(Debug, Clone)]
pub struct Binding {
    /// Position of the `::` operator.
    pub pos: Position,
    pub value: Vec<SyntaxNode>,
    /// Element path when the name came out of a list pattern; empty for plain names.
    pub path: Vec<usize>,
}

#[derive(Debug, Default)]
pub struct Container<'a> {
    pub bindings: HashMap<String, Binding>,
    /// Lines that are not definitions, in source order.
    pub lines: Vec<Line<'a>>,
}

/// A three-part `lhs op rhs` chain.
#[derive(Debug, Clone, Copy)]
pub struct Binary2<'a> {
    pub tag: BinaryTag,
    pub lhs: &'a SyntaxNode,
    pub op: &'a SyntaxNode,
    pub rhs: &'a SyntaxNode,
}

impl<'a> Binary2<'a> {
    pub fn lhs_items(&self) -> &'a [SyntaxNode] {
        segment_items(self.lhs)
    }

    pub fn rhs_items(&self) -> &'a [SyntaxNode] {
        segment_items(self.rhs)
    }
}

fn segment_items(node: &SyntaxNode) -> &[SyntaxNode] {
    match &node.node {
        Node::Segment(items) => items,
        _ => std::slice::from_ref(node),
    }
}

/// Destructuring target on the left of `::`.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Name { name: String, pos: Position },
    List(Vec<Pattern>),
}

impl Pattern {
    /// Every bound name with its element path.
    pub fn names(&self) -> Vec<(&str, &Position, Vec<usize>)> {
        let mut out = Vec::new();
        self.collect(&mut Vec::new(), &mut out);
        out
    }

    fn collect<'p>(&'p self, path: &mut Vec<usize>, out: &mut Vec<(&'p str, &'p Position, Vec<usize>)>) {
        match self {
            Pattern::Name { name, pos } => out.push((name.as_str(), pos, path.clone())),
            Pattern::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    path.push(i);
                    item.collect(path, out);
                    path.pop();
                }
            }
        }
    }
}

/// Read a container body. Definitions that fail to read are reported and skipped.
#[tracing::instrument(skip_all, fields(nodes = nodes.len()))]
pub fn read_container<'a>(env: &mut Env, pos: &'a Position, nodes: &'a [SyntaxNode]) -> CompileResult<Container<'a>> {
    let lines = split_lines(env, nodes)?.unwrap_or_else(|| vec![Line { items: nodes, pos }]);
    let mut container = Container::default();
    for line in lines {
        if trim_whitespace(line.items).is_empty() {
            continue;
        }
        let read = read_line(env, &mut container, line);
        env.catch(read);
    }
    Ok(container)
}

fn read_line<'a>(env: &mut Env, container: &mut Container<'a>, line: Line<'a>) -> CompileResult<()> {
    let Some(def) = read_binary2(env, line.pos, line.items, |tag| tag == BinaryTag::Definition)? else {
        container.lines.push(line);
        return Ok(());
    };
    let pattern = read_destructure(env, &def.lhs.pos, def.lhs_items())?;
    for (name, name_pos, path) in pattern.names() {
        if let Some(previous) = container.bindings.get(name) {
            let d = env
                .diagnostic(name_pos, format!("Duplicate binding name {name}"))
                .with_note(previous.pos.clone(), "Previous definition here");
            env.push(d);
            let placeholder = Binding {
                pos: previous.pos.clone(),
                value: vec![Positioned::new(Node::Error, previous.pos.clone())],
                path: Vec::new(),
            };
            container.bindings.insert(name.to_string(), placeholder);
        } else {
            let binding = Binding {
                pos: def.op.pos.clone(),
                value: def.rhs_items().to_vec(),
                path,
            };
            container.bindings.insert(name.to_string(), binding);
        }
    }
    Ok(())
}

/// Split `nodes` on the separator tier. `None` when the nodes are not a separator chain.
pub fn split_lines<'a>(env: &Env, nodes: &'a [SyntaxNode]) -> CompileResult<Option<Vec<Line<'a>>>> {
    let trimmed = trim_whitespace(nodes);
    let Some(first) = trimmed.first() else {
        return Ok(None);
    };
    let Node::Binary(binary) = &first.node else {
        return Ok(None);
    };
    if Some(binary.tier) != precedence::group_tier("sep") {
        return Ok(None);
    }
    if let Some(extra) = trimmed.get(1) {
        return Err(env.error(&extra.pos, "Found extra trailing items after separated lines"));
    }
    segments(env, binary).map(Some)
}

fn segments<'a>(env: &Env, binary: &'a Binary) -> CompileResult<Vec<Line<'a>>> {
    binary
        .items
        .iter()
        .filter_map(|item| match &item.node {
            Node::Segment(items) => Some(Ok(Line { items, pos: &item.pos })),
            Node::Operator(_) => None,
            other => Some(Err(env.unreachable(
                &item.pos,
                format!("unexpected {} in operator chain", other.kind_name()),
            ))),
        })
        .collect()
}

/// Read `nodes` as a single `lhs op rhs` chain whose tag satisfies `want`.
///
/// `None` when the line is not such a chain; an error when it is one but has the wrong arity.
pub fn read_binary2<'a>(
    env: &Env,
    pos: &Position,
    nodes: &'a [SyntaxNode],
    want: impl Fn(BinaryTag) -> bool,
) -> CompileResult<Option<Binary2<'a>>> {
    let trimmed = trim_whitespace(nodes);
    let Some(first) = trimmed.first() else {
        return Ok(None);
    };
    let Node::Binary(binary) = &first.node else {
        return Ok(None);
    };
    if !want(binary.tag) {
        return Ok(None);
    }
    let [lhs, op, rhs] = binary.items.as_slice() else {
        return Err(env.error(pos, "Expected LHS op RHS, found not that"));
    };
    if !matches!(op.node, Node::Operator(_)) {
        return Ok(None);
    }
    Ok(Some(Binary2 {
        tag: binary.tag,
        lhs,
        op,
        rhs,
    }))
}

/// Read the target of a definition: a name, or a bracketed list of targets.
pub fn read_destructure(env: &Env, pos: &Position, nodes: &[SyntaxNode]) -> CompileResult<Pattern> {
    let trimmed = trim_whitespace(nodes);
    let Some(target) = trimmed.first() else {
        return Err(env.error(pos, "Expected ident for bind"));
    };
    if let Some(extra) = trimmed.get(1) {
        return Err(env.error(&extra.pos, "Unexpected trailing item in bind lhs"));
    }
    match &target.node {
        Node::Ident(ident) if ident.tag == IdentTag::Plain => Ok(Pattern::Name {
            name: ident.text.clone(),
            pos: target.pos.clone(),
        }),
        Node::Block(block) if block.tag == BlockTag::Map => {
            Err(env.error(&target.pos, "TODO: map pattern destructuring is not supported"))
        }
        Node::Block(block) if matches!(block.tag, BlockTag::List | BlockTag::Code) => {
            let lines = split_lines(env, &block.items)?.unwrap_or_else(|| vec![Line {
                items: &block.items,
                pos: &target.pos,
            }]);
            let mut items = Vec::new();
            for line in lines {
                if trim_whitespace(line.items).is_empty() {
                    continue;
                }
                if read_binary2(env, line.pos, line.items, |tag| tag == BinaryTag::Definition)?.is_some() {
                    return Err(env.error(line.pos, "TODO: map pattern destructuring is not supported"));
                }
                items.push(read_destructure(env, line.pos, line.items)?);
            }
            Ok(Pattern::List(items))
        }
        other => Err(env.error(
            &target.pos,
            format!("Expected ident for bind lhs, found {}", other.kind_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvl_syntax::lexer::tokenize;

    fn read(text: &str) -> (Vec<SyntaxNode>, Env) {
        let result = tokenize("t.cvl", text);
        assert!(result.diagnostics.is_empty(), "{:#?}", result.diagnostics);
        (result.nodes, Env::new())
    }

    #[test]
    fn single_line_without_separator() {
        let (nodes, mut env) = read("a");
        let pos = Position::start_of("t.cvl");
        let c = read_container(&mut env, &pos, &nodes).unwrap();
        assert_eq!(c.lines.len(), 1);
        assert!(c.bindings.is_empty());
    }

    #[test]
    fn definitions_are_separated_from_lines() {
        let (nodes, mut env) = read("x :: a\n.b := c\n\ny :: d");
        let pos = Position::start_of("t.cvl");
        let c = read_container(&mut env, &pos, &nodes).unwrap();
        assert!(env.diagnostics().is_empty());
        assert_eq!(c.lines.len(), 1);
        let mut names: Vec<&String> = c.bindings.keys().collect();
        names.sort();
        assert_eq!(names, vec!["x", "y"]);
        let x = &c.bindings["x"];
        assert_eq!(x.pos.col, 3);
        assert!(matches!(&trim_whitespace(&x.value)[0].node, Node::Ident(i) if i.text == "a"));
    }

    #[test]
    fn duplicate_name_is_replaced_by_error() {
        let (nodes, mut env) = read("x :: a\nx :: b");
        let pos = Position::start_of("t.cvl");
        let c = read_container(&mut env, &pos, &nodes).unwrap();
        assert_eq!(env.diagnostics().len(), 1);
        let d = &env.diagnostics()[0];
        assert_eq!(d.message(), "Duplicate binding name x");
        assert_eq!(d.pos().unwrap().line, 2);
        assert_eq!(d.notes()[0].message, "Previous definition here");
        assert_eq!(d.notes()[0].pos.as_ref().unwrap().line, 1);
        assert!(matches!(c.bindings["x"].value[0].node, Node::Error));
    }

    #[test]
    fn wrong_arity_is_reported_and_skipped() {
        let (nodes, mut env) = read("x :: a :: b\ny :: c");
        let pos = Position::start_of("t.cvl");
        let c = read_container(&mut env, &pos, &nodes).unwrap();
        assert_eq!(env.diagnostics().len(), 1);
        assert_eq!(env.diagnostics()[0].message(), "Expected LHS op RHS, found not that");
        assert!(c.bindings.contains_key("y"));
        assert!(!c.bindings.contains_key("x"));
    }

    #[test]
    fn list_patterns_bind_every_name() {
        let (nodes, mut env) = read("[a, [b, c]] :: v");
        let pos = Position::start_of("t.cvl");
        let c = read_container(&mut env, &pos, &nodes).unwrap();
        assert!(env.diagnostics().is_empty());
        assert_eq!(c.bindings["a"].path, vec![0]);
        assert_eq!(c.bindings["b"].path, vec![1, 0]);
        assert_eq!(c.bindings["c"].path, vec![1, 1]);
    }

    #[test]
    fn map_patterns_are_unsupported() {
        for text in ["{a} :: v", "[a :: b] :: v"] {
            let (nodes, mut env) = read(text);
            let pos = Position::start_of("t.cvl");
            read_container(&mut env, &pos, &nodes).unwrap();
            assert_eq!(env.diagnostics().len(), 1, "{text}");
            assert!(env.diagnostics()[0].message().starts_with("TODO"), "{text}");
        }
    }

    #[test]
    fn bad_bind_target() {
        let (nodes, mut env) = read("#x :: v");
        let pos = Position::start_of("t.cvl");
        read_container(&mut env, &pos, &nodes).unwrap();
        assert_eq!(env.diagnostics()[0].message(), "Expected ident for bind lhs, found identifier");
    }
}
