//! Side-effecting helpers used by the API: script execution and file reads.

pub mod files;
pub mod terminal;

pub use files::{read_text, ReadError};
pub use terminal::{ExecError, RunKind, RunOutcome, ScriptExecutor};
