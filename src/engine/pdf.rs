//! In-process PDF extraction backend.
//!
//! Page text comes from `pdf-extract`; title, author, dates and the free-form
//! metadata fields come from the document information dictionary read with
//! `lopdf`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use lopdf::{Dictionary, Document, Object};

use super::{ExtractionEngine, RawExtraction};
use crate::error::EngineError;

/// Information dictionary fields carried into the metadata map, keyed by
/// their output name.
const META_FIELDS: &[(&str, &[u8])] = &[
    ("subject", b"Subject"),
    ("keywords", b"Keywords"),
    ("creator", b"Creator"),
    ("producer", b"Producer"),
];

/// Native PDF backend. Stateless; always ready.
pub struct PdfEngine;

impl PdfEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExtractionEngine for PdfEngine {
    fn name(&self) -> &'static str {
        "pdf"
    }

    async fn extract(&self, bytes: &[u8]) -> Result<RawExtraction, EngineError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| EngineError::Parse(e.to_string()))?;

        let mut raw = RawExtraction {
            pages,
            ..RawExtraction::default()
        };

        // A document readable by the text extractor but not by the metadata
        // parser still extracts, just without metadata.
        if let Ok(doc) = Document::load_mem(bytes) {
            apply_info(&doc, &mut raw);
            if !doc.version.is_empty() {
                raw.metadata
                    .insert("pdfVersion".to_string(), doc.version.clone());
            }
        }

        Ok(raw)
    }
}

/// Copy title, author, dates and the known metadata fields out of the
/// document information dictionary, when present.
fn apply_info(doc: &Document, raw: &mut RawExtraction) {
    let Some(dict) = info_dict(doc) else {
        return;
    };

    raw.title = info_string(doc, dict, b"Title");
    raw.author = info_string(doc, dict, b"Author");
    raw.created = info_string(doc, dict, b"CreationDate").and_then(|s| parse_pdf_date(&s));
    raw.modified = info_string(doc, dict, b"ModDate").and_then(|s| parse_pdf_date(&s));

    for (key, name) in META_FIELDS {
        if let Some(value) = info_string(doc, dict, name) {
            raw.metadata.insert((*key).to_string(), value);
        }
    }
}

fn info_dict(doc: &Document) -> Option<&Dictionary> {
    let obj = doc.trailer.get(b"Info").ok()?;
    resolve(doc, obj)?.as_dict().ok()
}

fn info_string(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match resolve(doc, dict.get(key).ok()?)? {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Decode a PDF text string: UTF-16BE when it carries the `FE FF` byte order
/// mark, PDFDocEncoding (treated as Latin-1) otherwise.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

/// Convert a PDF date string (`D:YYYYMMDDHHmmSS` with an optional
/// `+HH'mm'`/`-HH'mm'`/`Z` suffix) to UTC. Missing trailing components
/// default to their minimum; anything unparseable yields `None` rather than
/// an error.
fn parse_pdf_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);

    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() < 4 {
        return None;
    }

    let field = |range: std::ops::Range<usize>, default: u32| -> Option<u32> {
        match digits.get(range) {
            Some(part) => part.parse().ok(),
            None => Some(default),
        }
    };

    let year: i32 = digits.get(0..4)?.parse().ok()?;
    let month = field(4..6, 1)?;
    let day = field(6..8, 1)?;
    let hour = field(8..10, 0)?;
    let minute = field(10..12, 0)?;
    let second = field(12..14, 0)?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    let offset_minutes = parse_offset_minutes(&s[digits.len()..]);
    let utc = naive - chrono::Duration::minutes(offset_minutes as i64);

    Some(DateTime::<Utc>::from_naive_utc_and_offset(utc, Utc))
}

/// Minutes east of UTC encoded in a PDF date suffix. `Z`, an empty suffix and
/// malformed suffixes all mean UTC.
fn parse_offset_minutes(rest: &str) -> i32 {
    let sign = match rest.chars().next() {
        Some('+') => 1,
        Some('-') => -1,
        _ => return 0,
    };

    let digits: String = rest[1..].chars().filter(|c| c.is_ascii_digit()).collect();
    let hours: i32 = digits.get(0..2).and_then(|v| v.parse().ok()).unwrap_or(0);
    let minutes: i32 = digits.get(2..4).and_then(|v| v.parse().ok()).unwrap_or(0);

    sign * (hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_pdf_date_with_utc_offset() {
        let parsed = parse_pdf_date("D:20240115103000+00'00'").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_parse_pdf_date_with_positive_offset() {
        let parsed = parse_pdf_date("D:20240115103000+02'00'").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-15T08:30:00+00:00");
    }

    #[test]
    fn test_parse_pdf_date_with_negative_offset() {
        let parsed = parse_pdf_date("D:20240115103000-0130").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-15T12:00:00+00:00");
    }

    #[test]
    fn test_parse_pdf_date_truncated_forms() {
        let parsed = parse_pdf_date("D:2024").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-01-01T00:00:00+00:00");

        let parsed = parse_pdf_date("D:20240610").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-06-10T00:00:00+00:00");
    }

    #[test]
    fn test_parse_pdf_date_garbage_is_absent() {
        assert!(parse_pdf_date("").is_none());
        assert!(parse_pdf_date("D:").is_none());
        assert!(parse_pdf_date("not a date").is_none());
        assert!(parse_pdf_date("D:20241399").is_none());
    }

    #[test]
    fn test_decode_pdf_string_utf16be() {
        let bytes = [0xFE, 0xFF, 0x00, b'H', 0x00, b'i'];
        assert_eq!(decode_pdf_string(&bytes), "Hi");
    }

    #[test]
    fn test_decode_pdf_string_latin1() {
        let bytes = [b'T', b'i', b't', b'r', b'e', b' ', 0xE9];
        assert_eq!(decode_pdf_string(&bytes), "Titre é");
    }

    #[tokio::test]
    async fn test_invalid_bytes_fail_with_parse_error() {
        let engine = PdfEngine::new();
        let err = engine.extract(b"not a pdf").await.unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }
}
