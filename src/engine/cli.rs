//! Subprocess extraction backend.
//!
//! Drives an external document cracking tool: document bytes go to a temp
//! file, the tool is invoked on it and its JSON report (one entry per cracker
//! that inspected the file) is mapped back into a [`RawExtraction`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;
use uuid::Uuid;

use super::{ExtractionEngine, RawExtraction};
use crate::error::EngineError;

/// Report printed by the cracking tool on stdout.
#[derive(Debug, Deserialize)]
struct ToolReport {
    #[serde(default)]
    crackers: Vec<CrackerResult>,
}

/// One cracker's verdict on the file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CrackerResult {
    #[serde(default)]
    can_handle: bool,
    #[serde(default)]
    success: bool,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    pages: Option<Vec<ReportPage>>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    created_date: Option<String>,
    #[serde(default)]
    modified_date: Option<String>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportPage {
    #[serde(default)]
    text: String,
}

impl CrackerResult {
    fn into_raw(self) -> RawExtraction {
        let pages = match self.pages {
            Some(pages) if !pages.is_empty() => pages.into_iter().map(|p| p.text).collect(),
            _ => pages_from_content(self.content.unwrap_or_default()),
        };

        RawExtraction {
            pages,
            title: self.title,
            author: self.author,
            created: parse_report_date(self.created_date),
            modified: parse_report_date(self.modified_date),
            metadata: self.metadata,
        }
    }
}

/// Extraction backend backed by an external cracking command.
pub struct CrackerToolEngine {
    command: String,
    ready: AtomicBool,
}

impl CrackerToolEngine {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            ready: AtomicBool::new(false),
        }
    }

    fn temp_path(&self) -> PathBuf {
        std::env::temp_dir().join(format!("cracker_{}.bin", Uuid::new_v4()))
    }
}

#[async_trait]
impl ExtractionEngine for CrackerToolEngine {
    fn name(&self) -> &'static str {
        "cli"
    }

    async fn extract(&self, bytes: &[u8]) -> Result<RawExtraction, EngineError> {
        let path = self.temp_path();
        tokio::fs::write(&path, bytes).await?;

        debug!(command = %self.command, path = %path.display(), "Invoking cracking tool");
        let output = Command::new(&self.command).arg(&path).output().await;
        let _ = tokio::fs::remove_file(&path).await;
        let output = output?;

        if !output.status.success() {
            return Err(EngineError::ToolFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let report: ToolReport = serde_json::from_slice(&output.stdout)
            .map_err(|e| EngineError::ToolReport(e.to_string()))?;

        Ok(select_result(report)?.into_raw())
    }

    /// Ask the tool to enumerate its crackers; an unusable tool is a startup
    /// failure, not a per-record one.
    async fn probe(&self) -> Result<(), EngineError> {
        let output = Command::new(&self.command).arg("--list").output().await?;

        if !output.status.success() {
            return Err(EngineError::ToolFailed {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        self.ready.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }
}

/// Pick the first cracker that could handle the file and succeeded. When none
/// did, surface the first handling cracker's own error message.
fn select_result(mut report: ToolReport) -> Result<CrackerResult, EngineError> {
    if let Some(pos) = report
        .crackers
        .iter()
        .position(|c| c.can_handle && c.success)
    {
        return Ok(report.crackers.swap_remove(pos));
    }

    let reason = report
        .crackers
        .iter()
        .filter(|c| c.can_handle)
        .find_map(|c| c.error.clone())
        .unwrap_or_else(|| "no cracker could handle the document".to_string());

    Err(EngineError::Parse(reason))
}

/// Reports without a per-page array mark page boundaries with form feeds in
/// `content`; without those the content is one page.
fn pages_from_content(content: String) -> Vec<String> {
    if content.is_empty() {
        Vec::new()
    } else if content.contains('\x0C') {
        content.split('\x0C').map(String::from).collect()
    } else {
        vec![content]
    }
}

fn parse_report_date(raw: Option<String>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw?.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_report() -> ToolReport {
        serde_json::from_value(serde_json::json!({
            "file": "report.pdf",
            "crackers": [
                { "crackerName": "HtmlCracker", "canHandle": false, "success": false },
                {
                    "crackerName": "PdfCracker",
                    "canHandle": true,
                    "success": true,
                    "content": "Page one\u{000C}Page two",
                    "title": "Quarterly Report",
                    "author": "Jane",
                    "createdDate": "2024-01-15T10:30:00Z",
                    "metadata": { "producer": "LibreOffice" }
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_selects_first_successful_handling_cracker() {
        let result = select_result(sample_report()).unwrap();
        assert!(result.can_handle && result.success);
        assert_eq!(result.title.as_deref(), Some("Quarterly Report"));
    }

    #[test]
    fn test_report_maps_to_raw_extraction() {
        let raw = select_result(sample_report()).unwrap().into_raw();
        assert_eq!(raw.pages, vec!["Page one", "Page two"]);
        assert_eq!(raw.author.as_deref(), Some("Jane"));
        assert_eq!(
            raw.created.unwrap().to_rfc3339(),
            "2024-01-15T10:30:00+00:00"
        );
        assert_eq!(raw.metadata.get("producer").map(String::as_str), Some("LibreOffice"));
    }

    #[test]
    fn test_handling_cracker_error_is_surfaced() {
        let report: ToolReport = serde_json::from_value(serde_json::json!({
            "crackers": [
                { "crackerName": "PdfCracker", "canHandle": true, "success": false,
                  "error": "encrypted document" }
            ]
        }))
        .unwrap();

        let err = select_result(report).unwrap_err();
        assert!(err.to_string().contains("encrypted document"));
    }

    #[test]
    fn test_empty_report_is_an_error() {
        let err = select_result(ToolReport { crackers: vec![] }).unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
    }

    #[test]
    fn test_per_page_array_wins_over_content() {
        let result: CrackerResult = serde_json::from_value(serde_json::json!({
            "canHandle": true,
            "success": true,
            "content": "ignored",
            "pages": [ { "pageNum": 1, "text": "a" }, { "pageNum": 2, "text": "b" } ]
        }))
        .unwrap();
        assert_eq!(result.into_raw().pages, vec!["a", "b"]);
    }

    #[test]
    fn test_content_without_form_feed_is_single_page() {
        assert_eq!(pages_from_content("hello".to_string()), vec!["hello"]);
        assert_eq!(pages_from_content(String::new()), Vec::<String>::new());
    }

    #[test]
    fn test_bad_report_date_is_absent() {
        assert!(parse_report_date(Some("yesterday".to_string())).is_none());
        assert!(parse_report_date(None).is_none());
    }

    #[cfg(unix)]
    fn fake_tool(dir: &tempfile::TempDir, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.path().join("tool.sh");
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_extract_invokes_tool_and_parses_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = r#"{"crackers":[{"crackerName":"PdfCracker","canHandle":true,"success":true,"content":"hello from tool"}]}"#;
        let engine = CrackerToolEngine::new(&fake_tool(&dir, &format!("echo '{report}'")));

        let raw = engine.extract(b"document bytes").await.unwrap();
        assert_eq!(raw.pages, vec!["hello from tool"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_probe_marks_engine_ready() {
        let dir = tempfile::tempdir().unwrap();
        let engine = CrackerToolEngine::new(&fake_tool(&dir, "echo '{\"crackers\":[]}'"));

        assert!(!engine.ready());
        engine.probe().await.unwrap();
        assert!(engine.ready());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tool_failure_status_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let engine = CrackerToolEngine::new(&fake_tool(&dir, "echo 'boom' >&2; exit 3"));

        let err = engine.extract(b"bytes").await.unwrap_err();
        match err {
            EngineError::ToolFailed { status, stderr } => {
                assert_eq!(status, 3);
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_command_fails_probe() {
        let engine = CrackerToolEngine::new("definitely-not-a-real-command-xyz");
        assert!(engine.probe().await.is_err());
        assert!(!engine.ready());
    }
}
