//! Error type shared by every layer of the crate.
//!
//! Configuration problems are caught before any event is processed. Parse
//! and engine failures surface per invocation and are never retried; the
//! caller decides whether to record them and move on.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = SummaryError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum SummaryError {
    /// One or more required options are missing or the options document
    /// does not match the schema. Each entry is a human-readable message.
    #[error("invalid configuration: {}", .0.join("; "))]
    Configuration(Vec<String>),

    /// An option could not be parsed as the type its mode requires.
    #[error("invalid {field} '{value}': {reason}")]
    InvalidOption {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The source text is empty, so no compression ratio exists.
    #[error("cannot summarize empty text")]
    EmptyText,

    /// An incoming event is well-formed JSON but not a payload object.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// The summarization engine could not process the document.
    #[error("engine failure: {0}")]
    Engine(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A blocking worker panicked or was cancelled.
    #[error("worker failed: {0}")]
    Worker(String),
}

impl SummaryError {
    pub(crate) fn invalid(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidOption {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error was raised while validating configuration rather
    /// than while processing a particular input.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
