//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::tools::{RunKind, RunOutcome};

/// Query for `POST /run`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunQuery {
    /// The task description / user prompt
    pub task: String,
}

/// Query for `GET /read`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadQuery {
    pub path: String,
}

/// Result of a completed task run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunResponse {
    /// How the script ended
    pub status: RunKind,

    /// Exit code of the runner (absent on timeout or signal)
    pub exit_code: Option<i32>,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,
}

impl From<RunOutcome> for RunResponse {
    fn from(outcome: RunOutcome) -> Self {
        Self {
            status: outcome.kind,
            exit_code: outcome.exit_code,
            stdout: outcome.stdout,
            stderr: outcome.stderr,
        }
    }
}

/// Error body, `{"detail": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
