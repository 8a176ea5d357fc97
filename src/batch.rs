//! Batch record processing.
//!
//! Maps an incoming batch of records to per-record extraction + chunking
//! calls. Each record independently yields a tagged success/failure outcome;
//! the assembler flattens those into the response, so no record's failure can
//! reach its siblings. Output order and record ids mirror the input.

use std::sync::Arc;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::engine::ExtractionEngine;
use crate::error::RecordError;
use crate::split::split_text;
use crate::types::{
    BatchRequest, BatchResponse, CrackedDocument, DocumentFields, InputRecord, OutputRecord,
    ServiceConfig,
};

/// Processes batches of extraction records against one backend.
pub struct BatchProcessor {
    engine: Arc<dyn ExtractionEngine>,
    /// The backend is the shared, limiting resource; this bounds concurrent
    /// extraction calls across requests.
    permits: Semaphore,
    config: ServiceConfig,
}

impl BatchProcessor {
    /// Create a processor for the given backend and configuration.
    pub fn new(engine: Arc<dyn ExtractionEngine>, config: ServiceConfig) -> Self {
        Self {
            engine,
            permits: Semaphore::new(config.max_concurrent_extractions.max(1)),
            config,
        }
    }

    /// Process every record of a batch, in order.
    pub async fn process_batch(&self, request: BatchRequest) -> BatchResponse {
        info!(records = request.values.len(), "Processing extraction batch");

        let mut values = Vec::with_capacity(request.values.len());

        for record in request.values {
            let record_id = record.record_id.clone();

            match self.process_record(record).await {
                Ok(fields) => {
                    info!(
                        record_id = %record_id,
                        pages = fields.page_count,
                        words = fields.word_count,
                        chars = fields.character_count,
                        chunks = fields.chunk_count.unwrap_or(0),
                        elapsed_ms = fields.extraction_time_ms,
                        "Record cracked"
                    );
                    values.push(OutputRecord::success(record_id, &fields));
                }
                Err(e) => {
                    warn!(record_id = %record_id, error = %e, "Record failed");
                    values.push(OutputRecord::failure(record_id, e.to_string()));
                }
            }
        }

        BatchResponse { values }
    }

    /// Validate, decode, extract and chunk one record.
    async fn process_record(&self, record: InputRecord) -> Result<DocumentFields, RecordError> {
        let file_data = record.data.file_data.ok_or(RecordError::MissingFileData)?;
        if file_data.data.is_empty() {
            return Err(RecordError::EmptyFileData);
        }

        let bytes = BASE64.decode(file_data.data.as_bytes())?;

        debug!(
            record_id = %record.record_id,
            document_id = record.data.document_id.as_deref().unwrap_or(""),
            bytes = bytes.len(),
            "Extracting document"
        );

        let (raw, elapsed) = {
            let _permit = self
                .permits
                .acquire()
                .await
                .expect("extraction semaphore closed");
            let started = Instant::now();
            let raw = self.engine.extract(&bytes).await?;
            (raw, started.elapsed())
        };

        let doc = CrackedDocument::from_raw(raw, elapsed);
        let mut fields = DocumentFields::from(doc);

        if self.config.chunk_enabled {
            let chunks = split_text(
                &fields.content,
                self.config.chunk_max_length,
                self.config.chunk_overlap,
            );
            fields.chunk_count = Some(chunks.len());
            fields.chunks = Some(chunks);
        }

        Ok(fields)
    }
}
