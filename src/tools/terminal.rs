//! Script execution through an external runner (`uv run` by default).

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

/// Captured output beyond this many bytes is cut off.
const MAX_OUTPUT_LEN: usize = 10_000;

/// Runner stderr fragments that mean the environment could not be provisioned.
const DEPENDENCY_FAILURE_MARKERS: &[&str] = &[
    "No solution found",
    "Failed to resolve",
    "Failed to download",
    "Failed to install",
    "was not found in the package registry",
];

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// How a script run ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunKind {
    Success,
    ScriptError,
    DependencyError,
    TimedOut,
}

/// Result of executing one script.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub kind: RunKind,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs script files with a fixed command prefix.
#[derive(Debug, Clone)]
pub struct ScriptExecutor {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ScriptExecutor {
    /// `command` is the program followed by its leading arguments; an empty
    /// command is rejected at config load.
    pub fn new(command: &[String], timeout: Option<Duration>) -> Self {
        let program = command.first().cloned().unwrap_or_default();
        let args = command.iter().skip(1).cloned().collect();
        Self {
            program,
            args,
            timeout,
        }
    }

    /// Run `script` with `cwd` as the working directory.
    ///
    /// The runner gets its own process group. When it exits or the limit is
    /// reached, whatever is left in that group is killed, so processes the
    /// script started in the background never outlive the run.
    pub async fn execute(&self, script: &Path, cwd: &Path) -> Result<RunOutcome, ExecError> {
        tracing::info!(
            program = %self.program,
            script = %script.display(),
            cwd = %cwd.display(),
            "Executing script"
        );

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(script)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        let pid = child.id();

        let stdout_reader = tokio::spawn(read_pipe(child.stdout.take()));
        let stderr_reader = tokio::spawn(read_pipe(child.stderr.take()));

        let waited = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait()).await.ok(),
            None => Some(child.wait().await),
        };

        let status = match waited {
            Some(status) => {
                kill_process_group(pid);
                status.map_err(|source| ExecError::Wait {
                    program: self.program.clone(),
                    source,
                })?
            }
            None => {
                kill_process_group(pid);
                if let Err(e) = child.start_kill() {
                    tracing::debug!("Runner already gone after timeout: {}", e);
                }
                let _ = child.wait().await;

                let limit = self.timeout.unwrap_or_default();
                tracing::warn!(timeout_secs = limit.as_secs_f64(), "Script timed out");

                let stdout = collect_pipe(stdout_reader).await;
                let mut stderr = collect_pipe(stderr_reader).await;
                if !stderr.is_empty() && !stderr.ends_with('\n') {
                    stderr.push('\n');
                }
                stderr.push_str(&format!(
                    "Script timed out after {:.1} seconds",
                    limit.as_secs_f64()
                ));
                return Ok(RunOutcome {
                    kind: RunKind::TimedOut,
                    exit_code: None,
                    stdout,
                    stderr: truncate_output(stderr),
                });
            }
        };

        let stdout = collect_pipe(stdout_reader).await;
        let stderr = collect_pipe(stderr_reader).await;
        let exit_code = status.code();
        let kind = classify(status.success(), &stderr);

        tracing::info!(
            kind = ?kind,
            exit_code = ?exit_code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Script finished"
        );

        Ok(RunOutcome {
            kind,
            exit_code,
            stdout,
            stderr,
        })
    }
}

async fn read_pipe<R>(pipe: Option<R>) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buf).await {
            tracing::debug!("Failed to read script output: {}", e);
        }
    }
    buf
}

async fn collect_pipe(reader: JoinHandle<Vec<u8>>) -> String {
    let bytes = reader.await.unwrap_or_default();
    truncate_output(String::from_utf8_lossy(&bytes).into_owned())
}

/// SIGKILL every process left in the runner's group.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pid) = pid else {
        return;
    };
    // SAFETY: killpg only sends a signal; the group id is the runner's pid,
    // set via `process_group(0)` at spawn. ESRCH (group already empty) is fine.
    unsafe {
        libc::killpg(pid as libc::pid_t, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

fn classify(success: bool, stderr: &str) -> RunKind {
    if success {
        RunKind::Success
    } else if DEPENDENCY_FAILURE_MARKERS.iter().any(|m| stderr.contains(m)) {
        RunKind::DependencyError
    } else {
        RunKind::ScriptError
    }
}

fn truncate_output(mut text: String) -> String {
    if text.len() <= MAX_OUTPUT_LEN {
        return text;
    }
    let mut cut = MAX_OUTPUT_LEN;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text.truncate(cut);
    text.push_str("\n... [output truncated]");
    text
}
