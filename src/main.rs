//! Cracker Service - Main Entry Point
//!
//! A batch document cracking and chunking service for search indexing
//! pipelines.

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cracker::api::handlers::{self, AppState};
use cracker::engine;
use cracker::types::ServiceConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "cracker=info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = ServiceConfig::from_env();

    info!("Starting Cracker Service v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Backend: {}, chunking: {} (max {} chars, overlap {})",
        config.backend, config.chunk_enabled, config.chunk_max_length, config.chunk_overlap
    );

    // Initialize the extraction backend and verify it before serving; an
    // unusable backend is fatal here, never a per-record error.
    let extraction_engine = engine::from_config(&config);
    extraction_engine
        .probe()
        .await
        .context("extraction backend unavailable")?;
    info!(backend = extraction_engine.name(), "Extraction backend ready");

    let port = config.port;
    let state = Arc::new(AppState::new(extraction_engine, config));

    // Build HTTP routes
    let app = Router::new()
        // Health check
        .route("/api/skills/health", get(handlers::health_check))
        // Batch extraction
        .route(
            "/api/skills/document-extraction",
            post(handlers::extract_documents),
        )
        // State
        .with_state(state)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
