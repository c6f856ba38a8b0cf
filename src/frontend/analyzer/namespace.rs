//! Declared namespaces and lexical scope.
//!
//! Lowering a namespace body records its `::` definitions, registers every `key := value` line as a
//! captured thunk, evaluates the construction block and locks the resulting aggregate. Nothing is
//! forced at that point: definitions and fields are analyzed on first access and memoized.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use cvl_core::lang::precedence::BinaryTag;
use cvl_syntax::ast::{Position, SyntaxNode};
use cvl_syntax::diagnostics::{CompileError, CompileResult};

use super::{analyze, materialize};
use crate::frontend::comptime::{
    AnalysisResult, AstThunk, Block, ComptimeNamespace, ComptimeType, ComptimeValue, Env, FieldKey, InstrIdx,
    InstrKind, NsFields, Symbol, evaluate,
};
use crate::frontend::container::{Binding, Line, read_binary2, read_container};

/// Trace label prefix for a definition or field being forced.
const RESOLVE_LABEL: &str = "resolve ";

/// The namespace a piece of source was written in. The root scope has no bindings.
#[derive(Debug, Clone, Default)]
pub struct Scope(Option<Weak<DeclaredNamespace>>);

impl Scope {
    pub fn root() -> Self {
        Self(None)
    }

    pub fn of(ns: &Rc<DeclaredNamespace>) -> Self {
        Self(Some(Rc::downgrade(ns)))
    }

    fn from_weak(this: &Weak<DeclaredNamespace>) -> Self {
        Self(Some(this.clone()))
    }

    /// Resolve a plain name through this scope and its parents.
    pub fn resolve(&self, env: &mut Env, pos: &Position, name: &str, slot: &ComptimeType) -> CompileResult<AnalysisResult> {
        let mut scope = self.clone();
        loop {
            let Some(weak) = &scope.0 else {
                return Err(env.error(pos, format!("unknown name {name}")));
            };
            let Some(ns) = weak.upgrade() else {
                return Err(env.unreachable(pos, "scope outlived its namespace"));
            };
            if let Some(found) = ns.resolve_local(env, pos, name, slot)? {
                return Ok(found);
            }
            scope = ns.parent.clone();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MemoKey {
    Definition(String),
    Field(FieldKey),
}

#[derive(Debug, Clone)]
struct Forced {
    value: ComptimeValue,
    ty: ComptimeType,
}

#[derive(Debug, Clone)]
enum ForceState {
    InProgress,
    Done(Forced),
}

pub struct DeclaredNamespace {
    this: Weak<DeclaredNamespace>,
    pos: Position,
    parent: Scope,
    definitions: RefCell<HashMap<String, Binding>>,
    /// Set once the body is lowered and the aggregate locked.
    fields: RefCell<Option<Rc<RefCell<NsFields>>>>,
    memo: RefCell<HashMap<MemoKey, ForceState>>,
}

impl fmt::Debug for DeclaredNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.borrow();
        f.debug_struct("DeclaredNamespace")
            .field("pos", &self.pos)
            .field("definitions", &self.definitions.borrow().len())
            .field("fields", &fields.as_ref().map(|agg| agg.borrow().len()))
            .field("forced", &self.memo.borrow().len())
            .finish()
    }
}

impl DeclaredNamespace {
    /// The locked field aggregate, once lowering finished.
    pub fn fields(&self) -> Option<Rc<RefCell<NsFields>>> {
        self.fields.borrow().clone()
    }

    fn scope(&self) -> Scope {
        Scope::from_weak(&self.this)
    }

    fn resolve_local(
        &self,
        env: &mut Env,
        pos: &Position,
        name: &str,
        slot: &ComptimeType,
    ) -> CompileResult<Option<AnalysisResult>> {
        let definition = self.definitions.borrow().get(name).cloned();
        if let Some(binding) = definition {
            if !binding.path.is_empty() {
                return Err(env.error(pos, format!("not implemented: destructured definition {name}")));
            }
            let thunk = AstThunk::new(&binding.value, binding.pos.clone(), self.scope());
            let forced = self.force(env, MemoKey::Definition(name.to_string()), name, &thunk, slot)?;
            return Ok(Some(AnalysisResult::concrete(forced.value, forced.ty)));
        }
        let key = FieldKey::Str(name.to_string());
        if self.lookup(&key).is_some() {
            return self.force_field(env, key, slot).map(Some);
        }
        Ok(None)
    }

    fn lookup(&self, key: &FieldKey) -> Option<AstThunk> {
        let fields = self.fields.borrow();
        let fields = fields.as_ref()?.borrow();
        fields.get(key).map(|entry| entry.thunk.clone())
    }

    fn force_field(&self, env: &mut Env, key: FieldKey, slot: &ComptimeType) -> CompileResult<AnalysisResult> {
        let Some(thunk) = self.lookup(&key) else {
            return Err(env.unreachable(&self.pos, format!("field {key} vanished from a locked namespace")));
        };
        let label = key.to_string();
        let forced = self.force(env, MemoKey::Field(key), &label, &thunk, slot)?;
        Ok(AnalysisResult::concrete(forced.value, forced.ty))
    }

    /// Analyze and evaluate `thunk` once; later calls return the memoized result.
    #[tracing::instrument(skip_all, fields(name = label))]
    fn force(
        &self,
        env: &mut Env,
        key: MemoKey,
        label: &str,
        thunk: &AstThunk,
        slot: &ComptimeType,
    ) -> CompileResult<Forced> {
        let state = self.memo.borrow().get(&key).cloned();
        match state {
            Some(ForceState::Done(forced)) => return Ok(forced),
            Some(ForceState::InProgress) => return Err(cycle_error(env, &thunk.pos, label)),
            None => {}
        }

        tracing::debug!(slot = %slot, "forcing");
        self.memo.borrow_mut().insert(key.clone(), ForceState::InProgress);
        let result = env.with_trace(&thunk.pos, format!("{RESOLVE_LABEL}{label}"), |env| {
            force_thunk(env, thunk, slot)
        });
        let mut memo = self.memo.borrow_mut();
        match &result {
            Ok(forced) => {
                memo.insert(key, ForceState::Done(forced.clone()));
            }
            Err(_) => {
                memo.remove(&key);
            }
        }
        result
    }
}

fn force_thunk(env: &mut Env, thunk: &AstThunk, slot: &ComptimeType) -> CompileResult<Forced> {
    let mut block = env.new_block();
    let result = analyze(env, &thunk.scope, slot, &thunk.pos, &thunk.nodes, &mut block)?;
    let results = evaluate(env, &block)?;
    let value = results.resolve(env, &thunk.pos, &result.value)?;
    Ok(Forced { value, ty: result.ty })
}

/// `dependency cycle: a -> b -> a`, read off the breadcrumbs pushed since `label` was entered.
fn cycle_error(env: &Env, pos: &Position, label: &str) -> CompileError {
    let entered = format!("{RESOLVE_LABEL}{label}");
    let trace = env.trace();
    let start = trace.iter().rposition(|t| t.label == entered).unwrap_or(0);
    let mut chain: Vec<&str> = trace[start..]
        .iter()
        .filter_map(|t| t.label.strip_prefix(RESOLVE_LABEL))
        .collect();
    chain.push(label);
    env.error(pos, format!("dependency cycle: {}", chain.join(" -> ")))
}

impl ComptimeNamespace for DeclaredNamespace {
    fn get_string(
        &self,
        env: &mut Env,
        pos: &Position,
        field: &str,
        _block: &mut Block,
    ) -> CompileResult<AnalysisResult> {
        if self.fields.borrow().is_none() {
            return Err(env.error(pos, format!("cannot read .{field} while its namespace is being declared")));
        }
        let key = FieldKey::Str(field.to_string());
        if self.lookup(&key).is_none() {
            let d = env
                .diagnostic(pos, format!("string field '{field}' is not defined on namespace"))
                .with_note(self.pos.clone(), "namespace declared here");
            return Err(d.into());
        }
        self.force_field(env, key, &ComptimeType::Unknown)
    }

    fn get_symbol(
        &self,
        env: &mut Env,
        _pos: &Position,
        child: &ComptimeType,
        symbol: Symbol,
        _block: &mut Block,
    ) -> CompileResult<Option<AnalysisResult>> {
        let key = FieldKey::Symbol(symbol);
        if self.lookup(&key).is_none() {
            return Ok(None);
        }
        self.force_field(env, key, child).map(Some)
    }
}

/// Lower a namespace body into a locked namespace.
#[tracing::instrument(skip_all, fields(nodes = nodes.len()))]
pub fn lower_namespace(
    env: &mut Env,
    parent: &Scope,
    pos: &Position,
    nodes: &[SyntaxNode],
) -> CompileResult<Rc<DeclaredNamespace>> {
    let ns = Rc::new_cyclic(|this| DeclaredNamespace {
        this: this.clone(),
        pos: pos.clone(),
        parent: parent.clone(),
        definitions: RefCell::new(HashMap::new()),
        fields: RefCell::new(None),
        memo: RefCell::new(HashMap::new()),
    });

    let container = read_container(env, pos, nodes)?;
    *ns.definitions.borrow_mut() = container.bindings;

    let scope = Scope::of(&ns);
    let mut block = env.new_block();
    let list = block.push(InstrKind::NsInit, pos.clone());
    for line in container.lines {
        let lowered = lower_line(env, &scope, list, line, &mut block);
        env.catch(lowered);
    }

    let results = evaluate(env, &block)?;
    let fields = results.aggregate(env, pos, list)?;
    fields.borrow_mut().lock();
    tracing::debug!(fields = fields.borrow().len(), "namespace locked");
    *ns.fields.borrow_mut() = Some(fields);
    Ok(ns)
}

fn lower_line(env: &mut Env, scope: &Scope, list: InstrIdx, line: Line<'_>, block: &mut Block) -> CompileResult<()> {
    let Some(bind) = read_binary2(env, line.pos, line.items, BinaryTag::is_field_binding)? else {
        analyze(env, scope, &ComptimeType::Void, line.pos, line.items, block)?;
        return Ok(());
    };

    let key = analyze(env, scope, &ComptimeType::Key(None), &bind.lhs.pos, bind.lhs_items(), block)?;
    match &key.ty {
        ComptimeType::Key(Some(_)) => {}
        ComptimeType::Key(None) => return Err(env.error(&bind.lhs.pos, "Expected narrowed key, got un-narrowed key")),
        other => return Err(env.error(&bind.lhs.pos, format!("Expected narrowed key, got {other}"))),
    }
    let key_idx = materialize(env, block, &key.value, &bind.op.pos)?;

    let value = analyze(env, scope, &ComptimeType::Ast, &bind.rhs.pos, bind.rhs_items(), block)?;
    let value_idx = materialize(env, block, &value.value, &bind.op.pos)?;

    block.push(
        InstrKind::NsAppend {
            list,
            key: key_idx,
            value: value_idx,
        },
        bind.op.pos.clone(),
    );
    Ok(())
}
