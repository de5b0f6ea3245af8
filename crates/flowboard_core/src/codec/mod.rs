//! Board import/export documents.
//!
//! # Responsibility
//! - Encode a board into the structured (JSON) or human-readable (Markdown)
//!   backup document.
//! - Decode any supported document back into a normalized, consistent board.
//!
//! # Invariants
//! - Decoding never touches live state; it only yields a candidate document.
//! - Every decoded document passes through `structured::normalize` or is
//!   consistent by construction (legacy path).
//! - `decode(encode(doc)) == doc` for the structured format.
//!
//! # See also
//! - `store::BoardStore::stage_import` for the confirmation gate.

use chrono::DateTime;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::Path;
use thiserror::Error;

use crate::model::board::BoardSnapshot;

pub mod legacy;
pub mod markdown;
pub mod structured;

/// Format version written into every exported document.
pub const FORMAT_VERSION: &str = "1.1.0";

/// Complete exported board plus document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    #[serde(flatten)]
    pub board: BoardSnapshot,
    pub version: String,
    /// Unix epoch milliseconds.
    pub exported_at: i64,
}

impl ExportDocument {
    /// Wraps a board snapshot with current format metadata.
    pub fn new(board: BoardSnapshot, exported_at: i64) -> Self {
        Self {
            board,
            version: FORMAT_VERSION.to_string(),
            exported_at,
        }
    }
}

/// Supported document representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Field-for-field JSON, full fidelity.
    Structured,
    /// Readable listing with an embedded JSON block.
    Markdown,
}

impl DocumentFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Structured => "json",
            Self::Markdown => "md",
        }
    }

    /// Parses a CLI/FFI format name (`json`, `md`, `markdown`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Structured),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }

    /// Picks the format from a file extension, falling back to content
    /// sniffing when the name has no extension.
    pub fn detect(file_name: Option<&str>, content: &str) -> Result<Self, DecodeError> {
        let extension = file_name
            .and_then(|name| Path::new(name).extension())
            .map(|ext| ext.to_string_lossy().to_string());
        match extension {
            Some(ext) => Self::parse(&ext).ok_or(DecodeError::UnsupportedFormat(ext)),
            None => Ok(Self::sniff(content)),
        }
    }

    /// JSON documents start with `{`; anything else is treated as Markdown.
    pub fn sniff(content: &str) -> Self {
        if content.trim_start().starts_with('{') {
            Self::Structured
        } else {
            Self::Markdown
        }
    }
}

/// Non-fatal notice that the board structure was only partly recovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialRecoveryWarning {
    pub recovered_tasks: usize,
}

impl Display for PartialRecoveryWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no embedded JSON block found; imported {} task(s) from legacy Markdown, \
             board structure may not be fully recovered",
            self.recovered_tasks
        )
    }
}

/// Tagged decode result inspected by the confirmation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// Full-fidelity document.
    Decoded(ExportDocument),
    /// Best-effort legacy recovery.
    Recovered {
        document: ExportDocument,
        warning: PartialRecoveryWarning,
    },
}

impl DecodeOutcome {
    pub fn document(&self) -> &ExportDocument {
        match self {
            Self::Decoded(document) => document,
            Self::Recovered { document, .. } => document,
        }
    }

    pub fn warning(&self) -> Option<&PartialRecoveryWarning> {
        match self {
            Self::Decoded(_) => None,
            Self::Recovered { warning, .. } => Some(warning),
        }
    }

    pub fn into_parts(self) -> (ExportDocument, Option<PartialRecoveryWarning>) {
        match self {
            Self::Decoded(document) => (document, None),
            Self::Recovered { document, warning } => (document, Some(warning)),
        }
    }
}

/// Import payload could not be turned into a board.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("import document is empty")]
    EmptyInput,
    #[error("unsupported import file type `.{0}`; expected .json or .md")]
    UnsupportedFormat(String),
    #[error("invalid JSON document: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("invalid embedded JSON block: {0}")]
    InvalidEmbeddedJson(#[source] serde_json::Error),
    #[error("invalid task `{task_id}`: {reason}")]
    InvalidTask { task_id: String, reason: String },
    #[error("document contains neither an embedded JSON block nor legacy task entries")]
    UnrecognizedDocument,
}

/// Builds the export document for `board` stamped at `now_ms`.
pub fn export_document(board: &BoardSnapshot, now_ms: i64) -> ExportDocument {
    ExportDocument::new(board.clone(), now_ms)
}

/// Suggested download name, e.g. `flowboard-backup-2026-01-31.json`.
pub fn backup_file_name(exported_at: i64, format: DocumentFormat) -> String {
    let day = DateTime::from_timestamp_millis(exported_at)
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| exported_at.to_string());
    format!("flowboard-backup-{day}.{}", format.extension())
}

/// Serializes a document in the requested representation.
pub fn encode(document: &ExportDocument, format: DocumentFormat) -> serde_json::Result<String> {
    match format {
        DocumentFormat::Structured => structured::encode(document),
        DocumentFormat::Markdown => markdown::encode(document),
    }
}

/// Decodes a document in a known representation.
///
/// `now_ms` backfills missing timestamps and stamps legacy recoveries.
pub fn decode(
    content: &str,
    format: DocumentFormat,
    now_ms: i64,
) -> Result<DecodeOutcome, DecodeError> {
    if content.trim().is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let outcome = match format {
        DocumentFormat::Structured => {
            structured::decode(content, now_ms).map(DecodeOutcome::Decoded)?
        }
        DocumentFormat::Markdown => match markdown::extract_embedded_json(content) {
            Some(block) => structured::decode(block, now_ms)
                .map_err(|err| match err {
                    DecodeError::InvalidJson(inner) => DecodeError::InvalidEmbeddedJson(inner),
                    other => other,
                })
                .map(DecodeOutcome::Decoded)?,
            None => {
                let document = legacy::decode(content, now_ms)?;
                let warning = PartialRecoveryWarning {
                    recovered_tasks: document.board.tasks.len(),
                };
                warn!(
                    "event=import_decode module=codec status=partial recovered_tasks={}",
                    warning.recovered_tasks
                );
                DecodeOutcome::Recovered { document, warning }
            }
        },
    };

    info!(
        "event=import_decode module=codec status=ok format={} tasks={} columns={}",
        format.extension(),
        outcome.document().board.tasks.len(),
        outcome.document().board.columns.len()
    );
    Ok(outcome)
}

/// Decodes file content, choosing the format from `file_name`.
pub fn decode_file(
    file_name: Option<&str>,
    content: &str,
    now_ms: i64,
) -> Result<DecodeOutcome, DecodeError> {
    let format = DocumentFormat::detect(file_name, content)?;
    decode(content, format, now_ms)
}

#[cfg(test)]
mod tests {
    use super::{backup_file_name, DecodeError, DocumentFormat};

    #[test]
    fn backup_file_name_uses_utc_day_and_extension() {
        assert_eq!(
            backup_file_name(0, DocumentFormat::Markdown),
            "flowboard-backup-1970-01-01.md"
        );
    }

    #[test]
    fn detect_uses_extension_then_sniffs() {
        assert_eq!(
            DocumentFormat::detect(Some("backup.json"), "").unwrap(),
            DocumentFormat::Structured
        );
        assert_eq!(
            DocumentFormat::detect(Some("notes.MD"), "{").unwrap(),
            DocumentFormat::Markdown
        );
        assert_eq!(
            DocumentFormat::detect(None, "  {\"tasks\":{}}").unwrap(),
            DocumentFormat::Structured
        );
        assert_eq!(
            DocumentFormat::detect(Some("board"), "# heading").unwrap(),
            DocumentFormat::Markdown
        );
    }

    #[test]
    fn detect_rejects_unknown_extension() {
        let err = DocumentFormat::detect(Some("board.csv"), "a,b").unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat(ext) if ext == "csv"));
    }
}
