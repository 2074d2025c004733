//! Agent module - turns a task into an executed script.
//!
//! Each task is a single linear pass:
//! 1. Build the completion request from the task and the system prompt
//! 2. Call the LLM and decode `{code, dependencies}` from its answer
//! 3. Write the script with its dependency header into a fresh directory
//! 4. Run it with the configured runner and report the outcome

mod prompt;
mod script;
mod task_runner;

pub use prompt::{build_request, response_format, SYSTEM_PROMPT};
pub use script::{dependency_header, Dependency, GeneratedScript, ScriptError, SCRIPT_FILE_NAME};
pub use task_runner::{TaskError, TaskRunner};
