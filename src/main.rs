//! visitor-gateway server entry point.
//!
//! Starts the Axum HTTP server with the record and health endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use visitor_gateway::api;
use visitor_gateway::app_state::AppState;
use visitor_gateway::config::{LogFormat, ServiceConfig};
use visitor_gateway::persistence::PostgresStore;
use visitor_gateway::service::RecordService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServiceConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(
        addr = %config.listen_addr,
        environment = ?config.environment,
        "starting visitor-gateway"
    );
    if config.database.url.is_none() {
        tracing::warn!("DATABASE_URL is not set; record endpoints will fail until it is configured");
    }

    // Build storage and service layers
    let store = Arc::new(PostgresStore::from_config(&config.database));
    let record_service = Arc::new(RecordService::new(store));

    // Build router
    let app = api::build_app(AppState::new(record_service, config.environment));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
