//! Cracked document model.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::RawExtraction;

/// Text and counts for a single page of a cracked document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    /// Page number, 1-based
    pub page_num: usize,

    /// Extracted text for this page
    pub text: String,

    /// Characters in this page's text
    pub char_count: usize,

    /// Whitespace-delimited tokens in this page's text
    pub word_count: usize,
}

/// Canonical representation of a cracked document, independent of which
/// backend produced it.
///
/// Constructed fresh per record and never mutated afterwards. All aggregate
/// counts are recomputed from the assembled content; upstream counts are
/// never trusted.
#[derive(Debug, Clone, Serialize)]
pub struct CrackedDocument {
    /// Full document text: per-page texts joined with a blank line, in page
    /// order. Canonical input for chunking.
    pub content: String,

    /// Number of pages
    pub page_count: usize,

    /// Per-page text records; length equals `page_count`
    pub pages: Vec<PageText>,

    /// Whitespace-delimited tokens in `content`
    pub word_count: usize,

    /// Characters in `content`
    pub character_count: usize,

    /// Document title; blank source values normalize to `None`
    pub title: Option<String>,

    /// Document author; blank source values normalize to `None`
    pub author: Option<String>,

    /// Creation timestamp in UTC, when the source provided one
    pub created_date: Option<DateTime<Utc>>,

    /// Modification timestamp in UTC, when the source provided one
    pub modified_date: Option<DateTime<Utc>>,

    /// Content language. Detection is not performed; always `None`.
    pub language: Option<String>,

    /// Free-form string metadata (subject, keywords, creator, producer,
    /// format version). Keys present only for non-blank source values.
    pub metadata: BTreeMap<String, String>,

    /// Wall-clock duration of the extraction step, in milliseconds, rounded
    /// to one decimal
    pub extraction_time_ms: f64,
}

impl CrackedDocument {
    /// Normalize a backend's raw extraction into the canonical model.
    ///
    /// `elapsed` is the measured wall-clock duration of the extraction call.
    pub fn from_raw(raw: RawExtraction, elapsed: Duration) -> Self {
        let pages: Vec<PageText> = raw
            .pages
            .iter()
            .enumerate()
            .map(|(idx, text)| PageText {
                page_num: idx + 1,
                char_count: text.chars().count(),
                word_count: text.split_whitespace().count(),
                text: text.clone(),
            })
            .collect();

        let content = raw.pages.join("\n\n");
        let extraction_time_ms = (elapsed.as_secs_f64() * 1000.0 * 10.0).round() / 10.0;

        Self {
            page_count: pages.len(),
            word_count: content.split_whitespace().count(),
            character_count: content.chars().count(),
            title: normalize_optional(raw.title),
            author: normalize_optional(raw.author),
            created_date: raw.created,
            modified_date: raw.modified,
            language: None,
            metadata: normalize_metadata(raw.metadata),
            extraction_time_ms,
            pages,
            content,
        }
    }
}

/// Blank or whitespace-only optional strings count as absent.
fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Drop blank metadata values and store kept values trimmed.
fn normalize_metadata(metadata: BTreeMap<String, String>) -> BTreeMap<String, String> {
    metadata
        .into_iter()
        .filter_map(|(key, value)| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some((key, trimmed.to_string()))
            }
        })
        .collect()
}
