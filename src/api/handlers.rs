//! HTTP request handlers for the cracking service.

use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::batch::BatchProcessor;
use crate::engine::ExtractionEngine;
use crate::types::{BatchRequest, BatchResponse, ServiceConfig};

/// Application state shared across handlers.
pub struct AppState {
    pub engine: Arc<dyn ExtractionEngine>,
    pub processor: BatchProcessor,
    pub config: ServiceConfig,
}

impl AppState {
    /// Build the shared state for the given backend and configuration.
    pub fn new(engine: Arc<dyn ExtractionEngine>, config: ServiceConfig) -> Self {
        Self {
            processor: BatchProcessor::new(Arc::clone(&engine), config.clone()),
            engine,
            config,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
    backend: String,
    backend_ready: bool,
    chunking_enabled: bool,
    chunk_max_length: usize,
    chunk_overlap: usize,
    timestamp: DateTime<Utc>,
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.engine.name().to_string(),
        backend_ready: state.engine.ready(),
        chunking_enabled: state.config.chunk_enabled,
        chunk_max_length: state.config.chunk_max_length,
        chunk_overlap: state.config.chunk_overlap,
        timestamp: Utc::now(),
    })
}

/// Batch extraction endpoint: crack each record's base64 document into text,
/// structure and metadata, chunking when enabled.
///
/// The HTTP call succeeds even when individual records fail; each failed
/// record carries its own error list in the response.
pub async fn extract_documents(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> Json<BatchResponse> {
    info!(records = request.values.len(), "Received extraction request");
    Json(state.processor.process_batch(request).await)
}
