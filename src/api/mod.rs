//! HTTP API.
//!
//! ## Endpoints
//!
//! - `POST /run?task=...` - Generate a script for the task and execute it
//! - `GET /read?path=...` - Read a file as plain text
//! - `GET /health` - Health check

mod error;
mod files;
mod routes;
mod tasks;
pub mod types;

pub use error::{ApiError, FILE_NOT_FOUND};
pub use routes::{routes, serve, AppState};
