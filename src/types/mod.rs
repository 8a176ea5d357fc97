//! Core types for the cracking service.

mod config;
mod document;
mod record;

pub use config::{ExtractionBackend, ServiceConfig};
pub use document::{CrackedDocument, PageText};
pub use record::{
    BatchRequest, BatchResponse, DocumentFields, FileData, InputRecord, OutputRecord,
    RecordPayload,
};
