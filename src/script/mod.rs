// Diff script model and wire format.
//
// # Modules
//
// - `op`:   `Op` and `DiffScript`, the decoded form executed by the applier
// - `wire`: JSON parsing and emission of the `[pool, op, ...]` array

pub mod op;
pub mod wire;

pub use op::{DiffScript, Op};
pub use wire::ScriptError;
