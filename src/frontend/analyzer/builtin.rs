//! The `#builtin` namespace.

use cvl_core::lang::builtins::{self, BuiltinFieldId};
use cvl_syntax::ast::Position;
use cvl_syntax::diagnostics::CompileResult;

use crate::frontend::comptime::{
    AnalysisResult, Block, ComptimeNamespace, ComptimeType, Env, InstrKind, NarrowKey, Symbol,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinNamespace;

impl ComptimeNamespace for BuiltinNamespace {
    fn get_string(
        &self,
        env: &mut Env,
        pos: &Position,
        field: &str,
        block: &mut Block,
    ) -> CompileResult<AnalysisResult> {
        match builtins::field_from_str(field) {
            Some(BuiltinFieldId::Main) => {
                let key = NarrowKey::main();
                let idx = block.push(InstrKind::MakeKey(key.clone()), pos.clone());
                Ok(AnalysisResult::deferred(idx, ComptimeType::Key(Some(key))))
            }
            None => Err(env.error(pos, format!("builtin does not have field: {field}"))),
        }
    }

    fn get_symbol(
        &self,
        _env: &mut Env,
        _pos: &Position,
        _child: &ComptimeType,
        _symbol: Symbol,
        _block: &mut Block,
    ) -> CompileResult<Option<AnalysisResult>> {
        Ok(None)
    }
}
