//! Batch record wire protocol.
//!
//! A batch request carries independent records under `values`; each record
//! carries one base64-encoded document. Responses mirror the shape with
//! per-record `data`, `errors` and `warnings`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::document::{CrackedDocument, PageText};

/// Inbound batch request.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub values: Vec<InputRecord>,
}

/// One unit of a batch request.
#[derive(Debug, Clone, Deserialize)]
pub struct InputRecord {
    #[serde(rename = "recordId", default)]
    pub record_id: String,

    #[serde(default)]
    pub data: RecordPayload,
}

/// Per-record input payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPayload {
    /// Optional identifier, used for logging only
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,

    /// The document payload; absent or empty payloads fail the record
    #[serde(default)]
    pub file_data: Option<FileData>,
}

/// Base64-encoded document bytes. Extra fields (such as a `$type` tag) are
/// accepted and ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct FileData {
    #[serde(default)]
    pub data: String,
}

/// Outbound batch response.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub values: Vec<OutputRecord>,
}

/// One unit of a batch response. A non-empty `errors` list marks the record
/// as failed; `data` is then the empty object.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRecord {
    #[serde(rename = "recordId")]
    pub record_id: String,

    pub data: serde_json::Value,

    pub errors: Vec<String>,

    pub warnings: Vec<String>,
}

impl OutputRecord {
    /// Build a successful record from assembled output fields.
    pub fn success(record_id: String, fields: &DocumentFields) -> Self {
        Self {
            record_id,
            data: serde_json::to_value(fields).unwrap_or_else(|_| serde_json::json!({})),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Build a failed record carrying one error message and empty data.
    pub fn failure(record_id: String, message: String) -> Self {
        Self {
            record_id,
            data: serde_json::json!({}),
            errors: vec![message],
            warnings: Vec::new(),
        }
    }
}

/// Output fields for a successfully cracked record, aligned with the index
/// field mappings of the surrounding pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFields {
    pub content: String,
    pub page_count: usize,
    pub word_count: usize,
    pub character_count: usize,
    pub metadata_title: Option<String>,
    pub metadata_author: Option<String>,
    pub metadata_created_date: Option<DateTime<Utc>>,
    pub metadata_modified_date: Option<DateTime<Utc>>,
    pub metadata: BTreeMap<String, String>,
    pub pages: Vec<PageText>,
    pub extraction_time_ms: f64,

    /// Present only when chunking is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks: Option<Vec<String>>,

    /// Present only when chunking is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_count: Option<usize>,
}

impl From<CrackedDocument> for DocumentFields {
    fn from(doc: CrackedDocument) -> Self {
        Self {
            content: doc.content,
            page_count: doc.page_count,
            word_count: doc.word_count,
            character_count: doc.character_count,
            metadata_title: doc.title,
            metadata_author: doc.author,
            metadata_created_date: doc.created_date,
            metadata_modified_date: doc.modified_date,
            metadata: doc.metadata,
            pages: doc.pages,
            extraction_time_ms: doc.extraction_time_ms,
            chunks: None,
            chunk_count: None,
        }
    }
}
