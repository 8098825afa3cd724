mod handlers;
mod routes;

use anyhow::Context;
use axum::Router;
use coderun_common::config::Config;
use coderun_engine::ExecutionService;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub struct AppState {
    pub service: ExecutionService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("coderun API booting...");

    let config = Config::from_env();
    let service = ExecutionService::from_config(&config)
        .context("Failed to create execution service client")?;

    info!(
        piston_url = %config.piston_url,
        cache_ttl_secs = config.runtime_cache_ttl.as_secs(),
        "Execution service configured"
    );

    let state = Arc::new(AppState { service });

    // Build router
    let app = Router::new()
        .merge(routes::routes())
        .with_state(state);

    // Start server
    let listener = TcpListener::bind(&config.api_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.api_addr))?;

    info!("HTTP server listening on {}", config.api_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("API shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}
