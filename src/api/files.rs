//! `GET /read` - return a file's text.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};

use crate::tools::read_text;

use super::error::ApiError;
use super::routes::AppState;
use super::types::ReadQuery;

/// GET /read?path=... - Read a file as plain text.
pub async fn read_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReadQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let contents = read_text(
        &state.config.workspace_path,
        &query.path,
        !state.config.read_anywhere,
    )
    .await?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        contents,
    ))
}
