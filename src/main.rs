// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::chart_service::ChartService;
use crate::infrastructure::config::load_settings;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{agent_status_chart, health_check, sample_chart};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let settings = load_settings()?;

    // Create services (application layer)
    let chart_service = ChartService::new(settings.sampling.clone())?;

    // Create application state
    let state = Arc::new(AppState { chart_service });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/charts/sample", post(sample_chart))
        .route("/charts/agent-status", post(agent_status_chart))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = settings.server.bind_address.parse()?;
    tracing::info!("Starting apm-chart-sampler on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
