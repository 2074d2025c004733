//! Mapping of internal errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::agent::{ScriptError, TaskError};
use crate::tools::ReadError;

use super::types::ErrorResponse;

/// Message returned for every failed read, whatever the cause.
pub const FILE_NOT_FOUND: &str = "File not found!";

#[derive(Debug)]
pub enum ApiError {
    Task(TaskError),
    Read(ReadError),
}

impl From<TaskError> for ApiError {
    fn from(e: TaskError) -> Self {
        ApiError::Task(e)
    }
}

impl From<ReadError> for ApiError {
    fn from(e: ReadError) -> Self {
        ApiError::Read(e)
    }
}

pub(crate) fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Task(e) => {
                let status = match &e {
                    // Upstream model failed or answered with something unusable
                    TaskError::Llm(_) | TaskError::Script(ScriptError::Payload(_)) => {
                        StatusCode::BAD_GATEWAY
                    }
                    TaskError::Script(ScriptError::Write { .. })
                    | TaskError::Exec(_)
                    | TaskError::RunDir(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                tracing::error!(status = %status, error = %e, "Task failed");
                error_response(status, e.to_string())
            }
            ApiError::Read(e) => {
                tracing::debug!(error = %e, "Read failed");
                error_response(StatusCode::NOT_FOUND, FILE_NOT_FOUND)
            }
        }
    }
}
