//! Compile-time values.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use cvl_syntax::ast::{Position, SyntaxNode};
use cvl_syntax::diagnostics::CompileResult;

use super::env::Env;
use super::ir::{Block, InstrIdx};
use super::types::{ComptimeType, FieldKey, NarrowKey, Symbol};
use crate::frontend::analyzer::Scope;

/// An unanalyzed subtree, captured together with the scope it was written in.
#[derive(Debug, Clone)]
pub struct AstThunk {
    pub nodes: Rc<[SyntaxNode]>,
    pub pos: Position,
    pub scope: Scope,
}

impl AstThunk {
    pub fn new(nodes: &[SyntaxNode], pos: Position, scope: Scope) -> Self {
        Self {
            nodes: nodes.into(),
            pos,
            scope,
        }
    }
}

/// A namespace as the analyzer sees it: something fields can be read from.
///
/// Getters may analyze (and evaluate) a field body on first access, so they take the environment and
/// re-enter the analyzer.
pub trait ComptimeNamespace: fmt::Debug {
    /// Read a string-keyed field. Missing fields are an error.
    fn get_string(&self, env: &mut Env, pos: &Position, field: &str, block: &mut Block)
    -> CompileResult<AnalysisResult>;

    /// Read a symbol-keyed field, analyzing its body under `child`. Missing fields yield `None`.
    fn get_symbol(
        &self,
        env: &mut Env,
        pos: &Position,
        child: &ComptimeType,
        symbol: Symbol,
        block: &mut Block,
    ) -> CompileResult<Option<AnalysisResult>>;
}

/// A registered namespace field.
#[derive(Debug, Clone)]
pub struct NsEntry {
    pub key: NarrowKey,
    pub thunk: AstThunk,
    /// Position of the binding operator.
    pub pos: Position,
}

/// Field registry of a namespace under construction.
#[derive(Debug, Default)]
pub struct NsFields {
    locked: bool,
    registered: Vec<NsEntry>,
}

impl NsFields {
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn get(&self, key: &FieldKey) -> Option<&NsEntry> {
        self.registered.iter().find(|e| &e.key.field_key() == key)
    }

    /// Insert `entry` unless its key is taken; returns the existing entry otherwise.
    ///
    /// Callers must check [`NsFields::is_locked`] first.
    pub fn insert(&mut self, entry: NsEntry) -> Result<(), &NsEntry> {
        let key = entry.key.field_key();
        match self.registered.iter().position(|e| e.key.field_key() == key) {
            Some(i) => Err(&self.registered[i]),
            None => {
                self.registered.push(entry);
                Ok(())
            }
        }
    }

    pub fn entries(&self) -> &[NsEntry] {
        &self.registered
    }

    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum ComptimeValue {
    Void,
    Key(NarrowKey),
    Ast(AstThunk),
    Namespace(Rc<dyn ComptimeNamespace>),
    Type(ComptimeType),
    Aggregate(Rc<RefCell<NsFields>>),
}

impl ComptimeValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ComptimeValue::Void => "void",
            ComptimeValue::Key(_) => "key",
            ComptimeValue::Ast(_) => "ast",
            ComptimeValue::Namespace(_) => "namespace",
            ComptimeValue::Type(_) => "type",
            ComptimeValue::Aggregate(_) => "namespace aggregate",
        }
    }
}

/// Either known now, or the result of an instruction that has not been evaluated yet.
#[derive(Debug, Clone)]
pub enum Value {
    Concrete(ComptimeValue),
    Deferred(InstrIdx),
}

#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub value: Value,
    pub ty: ComptimeType,
}

impl AnalysisResult {
    pub fn concrete(value: ComptimeValue, ty: ComptimeType) -> Self {
        Self {
            value: Value::Concrete(value),
            ty,
        }
    }

    pub fn deferred(idx: InstrIdx, ty: ComptimeType) -> Self {
        Self {
            value: Value::Deferred(idx),
            ty,
        }
    }
}
