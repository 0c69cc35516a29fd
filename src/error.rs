//! Error types for sql-render

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, SqlRenderError>;

/// Errors that can occur while translating or tokenizing SQL
///
/// Rendering and splitting are infallible: malformed templates degrade to
/// literal text and unbalanced blocks end up in the final statement.
#[derive(Error, Debug)]
pub enum SqlRenderError {
    #[error("Invalid search pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid regular expression in search pattern '{pattern}'")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unterminated {quote} literal starting at offset {offset}")]
    UnterminatedLiteral { quote: char, offset: usize },

    #[error("Don't know how to translate to '{dialect}'. Valid target dialects are {valid}")]
    UnknownDialect { dialect: String, valid: String },

    #[error("Invalid session ID '{session_id}': {reason}")]
    InvalidSessionId { session_id: String, reason: String },

    #[error("Malformed replacement table at line {line}: {message}")]
    MalformedRuleTable { line: usize, message: String },

    #[error("Failed to read replacement table: {path}")]
    RuleTableReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SqlRenderError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        SqlRenderError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}
