//! Task submission flow: prompt, generate, materialize, execute.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::config::Config;
use crate::llm::{AiProxyClient, LlmClient, LlmError};
use crate::tools::{ExecError, RunOutcome, ScriptExecutor};

use super::prompt::build_request;
use super::script::{GeneratedScript, ScriptError};

#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("Failed to create run directory: {0}")]
    RunDir(#[source] std::io::Error),
}

/// Turns tasks into executed scripts.
pub struct TaskRunner {
    llm: Arc<dyn LlmClient>,
    executor: ScriptExecutor,
    model: String,
    requires_python: String,
    workspace_path: PathBuf,
}

impl TaskRunner {
    /// Create a runner talking to the configured completion endpoint.
    pub fn new(config: &Config) -> Self {
        let llm = Arc::new(AiProxyClient::new(
            config.completions_url.clone(),
            config.bearer_token(),
        ));
        Self::with_client(config, llm)
    }

    /// Create a runner with a custom LLM backend.
    pub fn with_client(config: &Config, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            executor: ScriptExecutor::new(&config.runner_command, config.script_timeout),
            model: config.default_model.clone(),
            requires_python: config.requires_python.clone(),
            workspace_path: config.workspace_path.clone(),
        }
    }

    /// Generate a script for `task` and run it in the workspace.
    ///
    /// Nothing is written to disk unless the model's answer parses. The script
    /// lives in its own temporary directory, removed when this returns.
    pub async fn run_task(&self, task: &str) -> Result<RunOutcome, TaskError> {
        let started = Instant::now();
        tracing::info!(task_len = task.len(), model = %self.model, "Running task");

        let request = build_request(&self.model, task);
        let content = self.llm.chat_completion(&request).await?;

        let script = GeneratedScript::parse(&content).map_err(|e| {
            tracing::warn!(error = %e, "Model returned an unusable payload");
            e
        })?;
        tracing::debug!(
            dependencies = script.dependencies.len(),
            code_len = script.code.len(),
            "Parsed generated script"
        );

        let run_dir = tempfile::Builder::new()
            .prefix("task-")
            .tempdir()
            .map_err(TaskError::RunDir)?;
        let path = script
            .materialize(run_dir.path(), &self.requires_python)
            .await?;

        let outcome = self.executor.execute(&path, &self.workspace_path).await?;

        tracing::info!(
            kind = ?outcome.kind,
            exit_code = ?outcome.exit_code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Task finished"
        );

        Ok(outcome)
    }
}
