//! Task Runner - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes the task API.

use task_runner::{api, config::Config};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "task_runner=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: model={}, workspace={}",
        config.default_model,
        config.workspace_path.display()
    );
    if config.api_token.is_none() {
        warn!("AIPROXY_TOKEN is not set; completion requests will be rejected");
    }

    info!("Starting server on {}:{}", config.host, config.port);
    api::serve(config).await?;

    Ok(())
}
