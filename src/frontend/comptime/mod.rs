//! Compile-time evaluation model: slot shapes, values, the IR arena and its evaluator.

pub mod env;
pub mod eval;
pub mod ir;
pub mod types;
pub mod value;

pub use env::Env;
pub use eval::{EvalResults, evaluate};
pub use ir::{Block, BlockId, Instr, InstrIdx, InstrKind};
pub use types::{ComptimeType, FieldKey, NarrowKey, Symbol};
pub use value::{AnalysisResult, AstThunk, ComptimeNamespace, ComptimeValue, NsEntry, NsFields, Value};
