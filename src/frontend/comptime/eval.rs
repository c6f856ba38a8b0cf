//! Block evaluator.
//!
//! One forward pass over the arena, each instruction writing its result at its own index. Only the
//! instructions namespace construction needs are interpreted; reaching anything else aborts with an
//! internal error.

use std::cell::RefCell;
use std::rc::Rc;

use cvl_syntax::ast::Position;
use cvl_syntax::diagnostics::CompileResult;

use super::env::Env;
use super::ir::{Block, BlockId, Instr, InstrIdx, InstrKind};
use super::value::{ComptimeValue, NsEntry, NsFields, Value};

/// Results of one evaluated block, addressable by the block's own indices.
#[derive(Debug)]
pub struct EvalResults {
    block: BlockId,
    values: Vec<ComptimeValue>,
}

impl EvalResults {
    pub fn get(&self, idx: InstrIdx) -> Option<&ComptimeValue> {
        if idx.block() != self.block {
            return None;
        }
        self.values.get(idx.index())
    }

    /// Resolve an analysis value against these results.
    pub fn resolve(&self, env: &Env, pos: &Position, value: &Value) -> CompileResult<ComptimeValue> {
        match value {
            Value::Concrete(v) => Ok(v.clone()),
            Value::Deferred(idx) => self
                .get(*idx)
                .cloned()
                .ok_or_else(|| env.unreachable(pos, format!("no result for {idx:?} in this block"))),
        }
    }

    /// The namespace aggregate produced at `idx`.
    pub fn aggregate(&self, env: &Env, pos: &Position, idx: InstrIdx) -> CompileResult<Rc<RefCell<NsFields>>> {
        match self.get(idx) {
            Some(ComptimeValue::Aggregate(fields)) => Ok(Rc::clone(fields)),
            other => Err(env.unreachable(
                pos,
                format!(
                    "expected a namespace aggregate at {idx:?}, found {}",
                    other.map_or("nothing", ComptimeValue::kind_name)
                ),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[tracing::instrument(skip_all, fields(block = block.id().raw(), instrs = block.len()))]
pub fn evaluate(env: &mut Env, block: &Block) -> CompileResult<EvalResults> {
    let mut values = Vec::with_capacity(block.len());
    for (at, instr) in block.iter() {
        tracing::trace!(index = at.index(), instr = instr.kind.name(), "evaluate");
        let value = match &instr.kind {
            InstrKind::Void | InstrKind::ComptimeOnly => ComptimeValue::Void,
            InstrKind::CaptureAst(thunk) => ComptimeValue::Ast(thunk.clone()),
            InstrKind::MakeKey(key) => ComptimeValue::Key(key.clone()),
            InstrKind::NsInit => ComptimeValue::Aggregate(Rc::new(RefCell::new(NsFields::default()))),
            InstrKind::NsAppend { list, key, value } => {
                ns_append(env, block, &values, at, instr, [*list, *key, *value])?;
                ComptimeValue::Void
            }
            InstrKind::Call { .. } | InstrKind::Break { .. } => {
                return Err(env.unreachable(
                    &instr.pos,
                    format!("not implemented: evaluating {} instructions", instr.kind.name()),
                ));
            }
        };
        values.push(value);
    }
    Ok(EvalResults {
        block: block.id(),
        values,
    })
}

/// Fetch the result of an earlier instruction of the same block.
fn operand<'v>(
    env: &Env,
    block: &Block,
    values: &'v [ComptimeValue],
    at: InstrIdx,
    instr: &Instr,
    idx: InstrIdx,
) -> CompileResult<&'v ComptimeValue> {
    if idx.block() != block.id() {
        return Err(env.unreachable(&instr.pos, format!("operand {idx:?} belongs to another block")));
    }
    if idx.index() >= at.index() {
        return Err(env.unreachable(&instr.pos, format!("operand {idx:?} is not before {at:?}")));
    }
    values
        .get(idx.index())
        .ok_or_else(|| env.unreachable(&instr.pos, format!("operand {idx:?} has no result")))
}

fn ns_append(
    env: &mut Env,
    block: &Block,
    values: &[ComptimeValue],
    at: InstrIdx,
    instr: &Instr,
    [list, key, value]: [InstrIdx; 3],
) -> CompileResult<()> {
    let ComptimeValue::Aggregate(fields) = operand(env, block, values, at, instr, list)? else {
        return Err(env.unreachable(&instr.pos, "ns-append target is not a namespace aggregate"));
    };
    let ComptimeValue::Key(key) = operand(env, block, values, at, instr, key)? else {
        return Err(env.unreachable(&instr.pos, "ns-append key is not a key"));
    };
    let ComptimeValue::Ast(thunk) = operand(env, block, values, at, instr, value)? else {
        return Err(env.unreachable(&instr.pos, "ns-append value is not a captured ast"));
    };

    let mut fields = fields.borrow_mut();
    if fields.is_locked() {
        return Err(env.unreachable(&instr.pos, "attempted to append to a locked namespace"));
    }
    let entry = NsEntry {
        key: key.clone(),
        thunk: thunk.clone(),
        pos: instr.pos.clone(),
    };
    if let Err(previous) = fields.insert(entry) {
        let d = env
            .diagnostic(&instr.pos, format!("{} is already declared", key.field_key()))
            .with_note(previous.pos.clone(), "previous definition here");
        env.push(d);
    }
    Ok(())
}
