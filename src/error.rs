//! Error taxonomy for record processing and extraction backends.

use thiserror::Error;

/// Failure of the extraction backend to crack a document.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The backend could not parse or open the document.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// The external cracking tool could not be invoked.
    #[error("failed to run cracking tool: {0}")]
    Tool(#[from] std::io::Error),

    /// The external cracking tool exited with a failure status.
    #[error("cracking tool failed (exit {status}): {stderr}")]
    ToolFailed { status: i32, stderr: String },

    /// The external cracking tool produced output we could not understand.
    #[error("failed to parse cracking tool output: {0}")]
    ToolReport(String),
}

/// Per-record failure. Recorded in the record's error list; never fatal to
/// the batch.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("missing required input 'file_data' (expected {{\"data\": \"<base64>\"}})")]
    MissingFileData,

    #[error("file_data.data is empty, no base64 content provided")]
    EmptyFileData,

    #[error("invalid base64 in file_data.data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("document extraction failed: {0}")]
    Extraction(#[from] EngineError),
}
