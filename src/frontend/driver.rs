//! Compile driver: tokenize, lower the file as the root namespace, find and call `main`.

use cvl_syntax::ast::{Position, SyntaxNode};
use cvl_syntax::diagnostics::{CompileResult, Diagnostic};
use cvl_syntax::lexer::tokenize;

use super::analyzer::{Scope, analyze_call, lower_namespace};
use super::comptime::{AnalysisResult, Block, ComptimeNamespace, ComptimeType, Env, InstrKind, Symbol, evaluate};

/// Everything one compilation produced.
#[derive(Debug)]
pub struct CompileOutput {
    pub nodes: Vec<SyntaxNode>,
    /// All diagnostics, in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
    /// Shape of the resolved entry point, when `main` was found and forced.
    pub entry: Option<ComptimeType>,
}

impl CompileOutput {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Run the whole pipeline over `text`. Never fails; problems end up in `diagnostics`.
#[tracing::instrument(skip_all, fields(label = label, len = text.len()))]
pub fn compile_source(label: &str, text: &str) -> CompileOutput {
    let tokens = tokenize(label, text);
    let mut env = Env::with_diagnostics(tokens.diagnostics);
    let pos = Position::start_of(label);

    let mut entry = None;
    let run = run_entry(&mut env, &pos, &tokens.nodes, &mut entry);
    env.catch(run);

    CompileOutput {
        nodes: tokens.nodes,
        diagnostics: env.into_diagnostics(),
        entry,
    }
}

fn run_entry(
    env: &mut Env,
    pos: &Position,
    nodes: &[SyntaxNode],
    entry: &mut Option<ComptimeType>,
) -> CompileResult<()> {
    let root = lower_namespace(env, &Scope::root(), pos, nodes)?;
    let mut block = env.new_block();

    let main_shape = ComptimeType::main_entry();
    let main = env.with_trace(pos, "entry point", |env| {
        root.get_symbol(env, pos, &main_shape, Symbol::MAIN, &mut block)
    })?;
    let Some(main) = main else {
        return Err(env.error(pos, "expected main fn"));
    };
    *entry = Some(main.ty.clone());

    analyze_call(env, pos, main, void_argument(pos), &mut block)?;
    evaluate(env, &block)?;
    Ok(())
}

fn void_argument(
    pos: &Position,
) -> impl FnOnce(&mut Env, &ComptimeType, &mut Block) -> CompileResult<AnalysisResult> + '_ {
    move |_env, _slot, block| {
        let idx = block.push(InstrKind::Void, pos.clone());
        Ok(AnalysisResult::deferred(idx, ComptimeType::Void))
    }
}
