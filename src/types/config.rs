//! Configuration types for the cracking service.

use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_CHUNK_MAX_LENGTH, DEFAULT_CHUNK_OVERLAP, DEFAULT_MAX_CONCURRENT_EXTRACTIONS,
    DEFAULT_PORT,
};

/// Which extraction backend cracks document bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionBackend {
    /// In-process PDF extraction
    Pdf,
    /// External cracking tool driven over subprocess + JSON
    Cli,
}

impl std::fmt::Display for ExtractionBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionBackend::Pdf => write!(f, "pdf"),
            ExtractionBackend::Cli => write!(f, "cli"),
        }
    }
}

/// Global service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Whether extracted content is chunked
    pub chunk_enabled: bool,

    /// Maximum characters per chunk
    pub chunk_max_length: usize,

    /// Characters of overlap between consecutive chunks
    pub chunk_overlap: usize,

    /// Listening port
    pub port: u16,

    /// Extraction backend selection
    pub backend: ExtractionBackend,

    /// Command for the external cracking tool (cli backend)
    pub cracker_command: String,

    /// Maximum concurrent extraction calls into the backend
    pub max_concurrent_extractions: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            chunk_enabled: true,
            chunk_max_length: DEFAULT_CHUNK_MAX_LENGTH,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            port: DEFAULT_PORT,
            backend: ExtractionBackend::Pdf,
            cracker_command: "document-cracker".to_string(),
            max_concurrent_extractions: DEFAULT_MAX_CONCURRENT_EXTRACTIONS,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            chunk_enabled: std::env::var("CHUNK_ENABLED")
                .map(|s| parse_bool(&s))
                .unwrap_or(true),
            chunk_max_length: std::env::var("CHUNK_MAX_LENGTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CHUNK_MAX_LENGTH),
            chunk_overlap: std::env::var("CHUNK_OVERLAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CHUNK_OVERLAP),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            backend: match std::env::var("EXTRACTION_BACKEND").as_deref() {
                Ok("cli") => ExtractionBackend::Cli,
                _ => ExtractionBackend::Pdf,
            },
            cracker_command: std::env::var("CRACKER_COMMAND")
                .unwrap_or_else(|_| "document-cracker".to_string()),
            max_concurrent_extractions: std::env::var("MAX_CONCURRENT_EXTRACTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_CONCURRENT_EXTRACTIONS),
        }
    }
}

/// Parse a truthy environment value ("1", "true", "yes", case-insensitive).
fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes")
}
