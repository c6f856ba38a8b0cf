//! Compile-time analyzer.
//!
//! Walks a node sequence under an expected shape (the *slot*) and appends IR to a block. An `ast` slot
//! short-circuits everything: the nodes are captured as a thunk and analyzed later, on first access.
//! Any other slot reads the nodes as an access chain: a base followed by suffixes (`.field`, `(arg)`).
//!
//! ## Notes
//! - Analysis is re-entrant. Reading a namespace field forces its thunk, which analyzes (and evaluates)
//!   the field body in a fresh block while the caller's analysis is still on the stack.
//! - Errors abort the current unit with [`CompileError`](cvl_syntax::diagnostics::CompileError); the
//!   nearest container loop records them and moves on to the next line.

mod builtin;
mod namespace;


pub use builtin::BuiltinNamespace;
pub use namespace::{DeclaredNamespace, Scope, lower_namespace};

use std::rc::Rc;

use cvl_core::lang::builtins::BUILTIN_NAMESPACE;
use cvl_core::lang::precedence::BlockTag;
use cvl_syntax::ast::{Block as BlockNode, Ident, IdentTag, Node, Position, RawTag, SyntaxNode, trim_whitespace};
use cvl_syntax::diagnostics::CompileResult;
use cvl_syntax::stack::ensure_sufficient_stack;

use crate::frontend::comptime::{
    AnalysisResult, AstThunk, Block, ComptimeNamespace, ComptimeType, ComptimeValue, Env, InstrIdx, InstrKind,
    NarrowKey, Value,
};
use crate::frontend::container::read_destructure;

/// Keyword that turns a following list block into a namespace literal.
const NAMESPACE_KEYWORD: &str = "ns";

/// Analyze `nodes` under `slot`, appending instructions to `block`.
pub fn analyze(
    env: &mut Env,
    scope: &Scope,
    slot: &ComptimeType,
    pos: &Position,
    nodes: &[SyntaxNode],
    block: &mut Block,
) -> CompileResult<AnalysisResult> {
    ensure_sufficient_stack(|| analyze_chain(env, scope, slot, pos, nodes, block))
}

fn analyze_chain(
    env: &mut Env,
    scope: &Scope,
    slot: &ComptimeType,
    pos: &Position,
    nodes: &[SyntaxNode],
    block: &mut Block,
) -> CompileResult<AnalysisResult> {
    if matches!(slot, ComptimeType::Ast) {
        let thunk = AstThunk::new(nodes, pos.clone(), scope.clone());
        let idx = block.push(InstrKind::CaptureAst(thunk), pos.clone());
        return Ok(AnalysisResult::deferred(idx, ComptimeType::Ast));
    }

    let items: Vec<&SyntaxNode> = nodes.iter().filter(|n| !n.node.is_whitespace()).collect();
    let Some((first, rest)) = items.split_first() else {
        return Err(env.error(pos, "failed to analyze empty expression"));
    };

    let (mut current, suffixes) = match namespace_literal(first, rest) {
        Some((body_pos, body, rest)) => {
            let ns = lower_namespace(env, scope, body_pos, body)?;
            block.push(InstrKind::ComptimeOnly, first.pos.clone());
            let handle: Rc<dyn ComptimeNamespace> = ns;
            let result = AnalysisResult::concrete(
                ComptimeValue::Namespace(Rc::clone(&handle)),
                ComptimeType::Namespace(Some(handle)),
            );
            (result, rest)
        }
        None => {
            let base_slot = if rest.is_empty() { slot.clone() } else { ComptimeType::Unknown };
            (analyze_base(env, scope, &base_slot, first, block)?, rest)
        }
    };
    for suffix in suffixes {
        current = analyze_suffix(env, scope, current, suffix, block)?;
    }
    Ok(current)
}

/// `ns [ ... ]`: the list body and whatever follows it.
fn namespace_literal<'n, 'a>(
    first: &SyntaxNode,
    rest: &'n [&'a SyntaxNode],
) -> Option<(&'a Position, &'a [SyntaxNode], &'n [&'a SyntaxNode])> {
    let Node::Ident(Ident {
        text,
        tag: IdentTag::Plain,
    }) = &first.node
    else {
        return None;
    };
    if text != NAMESPACE_KEYWORD {
        return None;
    }
    let (&body, rest) = rest.split_first()?;
    match &body.node {
        Node::Block(BlockNode {
            tag: BlockTag::List,
            items,
            ..
        }) => Some((&body.pos, items.as_slice(), rest)),
        _ => None,
    }
}

fn analyze_base(
    env: &mut Env,
    scope: &Scope,
    slot: &ComptimeType,
    node: &SyntaxNode,
    block: &mut Block,
) -> CompileResult<AnalysisResult> {
    match &node.node {
        Node::Ident(Ident {
            text,
            tag: IdentTag::Builtin,
        }) => {
            if text != BUILTIN_NAMESPACE {
                return Err(env.error(&node.pos, format!("unexpected builtin: #{text}")));
            }
            block.push(InstrKind::ComptimeOnly, node.pos.clone());
            let handle: Rc<dyn ComptimeNamespace> = Rc::new(BuiltinNamespace);
            Ok(AnalysisResult::concrete(
                ComptimeValue::Namespace(Rc::clone(&handle)),
                ComptimeType::Namespace(Some(handle)),
            ))
        }
        Node::Ident(Ident {
            text,
            tag: IdentTag::Access,
        }) => match slot {
            ComptimeType::Key(_) => {
                let key = NarrowKey::String(text.clone());
                let idx = block.push(InstrKind::MakeKey(key.clone()), node.pos.clone());
                Ok(AnalysisResult::deferred(idx, ComptimeType::Key(Some(key))))
            }
            other => Err(env.error(
                &node.pos,
                format!("cannot resolve .{text} as {other}; field names are only valid as keys"),
            )),
        },
        Node::Ident(Ident {
            text,
            tag: IdentTag::Plain,
        }) => scope.resolve(env, &node.pos, text, slot),
        Node::Block(b) if b.tag == BlockTag::Code => analyze(env, scope, slot, &node.pos, &b.items, block),
        Node::Block(b) if b.tag == BlockTag::ArrowFn => {
            read_destructure(env, &node.pos, &b.items)?;
            Err(env.error(&node.pos, "not implemented: arrow functions"))
        }
        Node::Error => Err(env.error(&node.pos, "cannot use erroneous binding")),
        other => Err(env.error(&node.pos, format!("cannot analyze {} here", other.kind_name()))),
    }
}

fn analyze_suffix(
    env: &mut Env,
    scope: &Scope,
    lhs: AnalysisResult,
    node: &SyntaxNode,
    block: &mut Block,
) -> CompileResult<AnalysisResult> {
    match &node.node {
        Node::Raw(raw) if raw.tag == RawTag::Access => Ok(lhs),
        Node::Raw(raw) => Err(env.error(&node.pos, format!("unexpected raw: {:?}", raw.text))),
        Node::Ident(Ident {
            text,
            tag: IdentTag::Plain | IdentTag::Access,
        }) => analyze_access(env, lhs, &node.pos, text, block),
        Node::Block(b) if b.tag == BlockTag::Code => analyze_call(
            env,
            &node.pos,
            lhs,
            |env, arg_slot, block| analyze_argument(env, scope, arg_slot, &node.pos, &b.items, block),
            block,
        ),
        other => Err(env.error(&node.pos, format!("unexpected {} after expression", other.kind_name()))),
    }
}

fn analyze_access(
    env: &mut Env,
    lhs: AnalysisResult,
    pos: &Position,
    field: &str,
    block: &mut Block,
) -> CompileResult<AnalysisResult> {
    match &lhs.ty {
        ComptimeType::Namespace(Some(ns)) => ns.get_string(env, pos, field, block),
        ComptimeType::Namespace(None) => Err(env.error(pos, "cannot access on non-narrowed namespace")),
        other => Err(env.error(pos, format!("cannot access .{field} on {other}"))),
    }
}

fn analyze_argument(
    env: &mut Env,
    scope: &Scope,
    slot: &ComptimeType,
    pos: &Position,
    nodes: &[SyntaxNode],
    block: &mut Block,
) -> CompileResult<AnalysisResult> {
    if trim_whitespace(nodes).is_empty() && matches!(slot, ComptimeType::Void) {
        let idx = block.push(InstrKind::Void, pos.clone());
        return Ok(AnalysisResult::deferred(idx, ComptimeType::Void));
    }
    analyze(env, scope, slot, pos, nodes, block)
}

/// Call `method`, analyzing its argument under the method's parameter shape.
pub fn analyze_call(
    env: &mut Env,
    pos: &Position,
    method: AnalysisResult,
    argument: impl FnOnce(&mut Env, &ComptimeType, &mut Block) -> CompileResult<AnalysisResult>,
    block: &mut Block,
) -> CompileResult<AnalysisResult> {
    let ComptimeType::Function { arg, ret } = &method.ty else {
        return Err(env.error(pos, format!("not supported call type: {}", method.ty.kind_name())));
    };
    let arg_result = argument(env, arg, block)?;
    let method_idx = materialize(env, block, &method.value, pos)?;
    let arg_idx = materialize(env, block, &arg_result.value, pos)?;
    let idx = block.push(
        InstrKind::Call {
            method: method_idx,
            arg: arg_idx,
        },
        pos.clone(),
    );
    Ok(AnalysisResult::deferred(idx, (**ret).clone()))
}

/// An instruction index for `value` in `block`, emitting one for concrete values.
pub fn materialize(env: &Env, block: &mut Block, value: &Value, pos: &Position) -> CompileResult<InstrIdx> {
    match value {
        Value::Deferred(idx) if idx.block() == block.id() => Ok(*idx),
        Value::Deferred(idx) => Err(env.unreachable(pos, format!("{idx:?} used outside its block"))),
        Value::Concrete(ComptimeValue::Void) => Ok(block.push(InstrKind::Void, pos.clone())),
        Value::Concrete(ComptimeValue::Key(key)) => Ok(block.push(InstrKind::MakeKey(key.clone()), pos.clone())),
        Value::Concrete(ComptimeValue::Ast(thunk)) => {
            Ok(block.push(InstrKind::CaptureAst(thunk.clone()), pos.clone()))
        }
        Value::Concrete(other) => Err(env.unreachable(
            pos,
            format!("cannot materialize a {} value as an instruction", other.kind_name()),
        )),
    }
}
