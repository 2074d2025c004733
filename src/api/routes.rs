//! Router construction and server lifecycle.

use std::sync::Arc;

use axum::{
    http::Method,
    routing::{get, post},
    Json, Router,
};
use tokio::signal;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::agent::TaskRunner;
use crate::config::Config;

use super::types::HealthResponse;
use super::{files, tasks};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub runner: TaskRunner,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let runner = TaskRunner::new(&config);
        Self { config, runner }
    }
}

/// Build the application router.
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/run", post(tasks::run_task))
        .route("/read", get(files::read_file))
        .route("/health", get(health))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin and any header, with credentials.
///
/// `*` cannot be combined with credentials, so origin and headers are mirrored
/// from the request instead.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Start the HTTP server and run until Ctrl+C or SIGTERM.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(config));
    let app = routes(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("HTTP server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = wait_for_sigterm() => info!("Received SIGTERM signal"),
    }
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!("Failed to install SIGTERM handler: {}", e);
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
