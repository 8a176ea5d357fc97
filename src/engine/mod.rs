//! Extraction engine boundary.
//!
//! Backends are polymorphic over one capability: document bytes in,
//! structured page text and metadata out. The service selects one
//! implementation at startup and probes it before serving requests.

mod cli;
mod pdf;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::EngineError;
use crate::types::{ExtractionBackend, ServiceConfig};

pub use cli::CrackerToolEngine;
pub use pdf::PdfEngine;

/// Raw output of an extraction backend, before normalization into a
/// [`crate::types::CrackedDocument`].
#[derive(Debug, Clone, Default)]
pub struct RawExtraction {
    /// Per-page text, in page order
    pub pages: Vec<String>,

    /// Document title, as reported by the source
    pub title: Option<String>,

    /// Document author, as reported by the source
    pub author: Option<String>,

    /// Creation timestamp, already converted to UTC
    pub created: Option<DateTime<Utc>>,

    /// Modification timestamp, already converted to UTC
    pub modified: Option<DateTime<Utc>>,

    /// Free-form string metadata (subject, keywords, creator, producer,
    /// format version)
    pub metadata: BTreeMap<String, String>,
}

/// A backend able to crack raw document bytes into page text and metadata.
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Name of this backend, as reported by the health endpoint.
    fn name(&self) -> &'static str;

    /// Crack the given document bytes.
    async fn extract(&self, bytes: &[u8]) -> Result<RawExtraction, EngineError>;

    /// Verify the backend is usable. Run once at startup, before any request
    /// is served; a failure here is fatal to the process.
    async fn probe(&self) -> Result<(), EngineError> {
        Ok(())
    }

    /// Whether the backend is ready to serve requests.
    fn ready(&self) -> bool {
        true
    }
}

/// Build the extraction engine selected by the configuration.
pub fn from_config(config: &ServiceConfig) -> Arc<dyn ExtractionEngine> {
    match config.backend {
        ExtractionBackend::Pdf => Arc::new(PdfEngine::new()),
        ExtractionBackend::Cli => Arc::new(CrackerToolEngine::new(&config.cracker_command)),
    }
}
