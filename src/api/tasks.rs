//! `POST /run` - generate and execute a script for a task.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use super::error::ApiError;
use super::routes::AppState;
use super::types::{RunQuery, RunResponse};

/// POST /run?task=... - Run a plain-English task.
///
/// Any finished execution is a 200; the body says whether the script itself
/// succeeded. Upstream and local failures map through [`ApiError`].
pub async fn run_task(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RunQuery>,
) -> Result<Json<RunResponse>, ApiError> {
    let outcome = state.runner.run_task(&query.task).await?;
    Ok(Json(outcome.into()))
}
