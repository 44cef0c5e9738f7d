//! Error types for aidata.
//!
//! Library crates use [`AiDataError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

use crate::types::{Category, IssueKind};

/// Top-level error type for all aidata operations.
#[derive(Debug, thiserror::Error)]
pub enum AiDataError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Input file or manifest could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (empty input, bad schema version, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A source row lacks an id or category, or is otherwise unusable.
    #[error("malformed record at row {row}: {reason}")]
    MalformedRecord { row: usize, reason: String },

    /// A record names a category with no registered field template.
    #[error("unknown category '{label}' for record '{record_id}'")]
    UnknownCategory { record_id: String, label: String },

    /// A required field of the category template is empty.
    #[error("record '{record_id}' ({category}) is missing required field '{field}'")]
    MissingField {
        record_id: String,
        category: Category,
        field: String,
    },

    /// The same record id appeared twice in the source.
    #[error("duplicate record id '{record_id}' at row {row}")]
    DuplicateId { record_id: String, row: usize },

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AiDataError>;

impl AiDataError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create a malformed-record error for a 1-based source row.
    pub fn malformed(row: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            row,
            reason: reason.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The per-record issue kind, or `None` for errors that abort a run.
    pub fn issue_kind(&self) -> Option<IssueKind> {
        match self {
            Self::MalformedRecord { .. } => Some(IssueKind::MalformedRecord),
            Self::UnknownCategory { .. } => Some(IssueKind::UnknownCategory),
            Self::MissingField { .. } => Some(IssueKind::MissingField),
            Self::DuplicateId { .. } => Some(IssueKind::DuplicateId),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = AiDataError::config("canonical_base_url is not set");
        assert_eq!(err.to_string(), "config error: canonical_base_url is not set");

        let err = AiDataError::malformed(4, "missing id");
        assert_eq!(err.to_string(), "malformed record at row 4: missing id");

        let err = AiDataError::MissingField {
            record_id: "faq-1".into(),
            category: Category::Faq,
            field: "answer".into(),
        };
        assert!(err.to_string().contains("(faq)"));
        assert!(err.to_string().contains("'answer'"));
    }

    #[test]
    fn record_errors_map_to_issue_kinds() {
        let err = AiDataError::UnknownCategory {
            record_id: "7".into(),
            label: "Unknown".into(),
        };
        assert_eq!(err.issue_kind(), Some(IssueKind::UnknownCategory));

        let err = AiDataError::validation("no records");
        assert_eq!(err.issue_kind(), None);
    }
}
