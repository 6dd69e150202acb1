//! Error Types
//!
//! Domain errors shared by the matrix editor, the analysis client and the
//! configuration layer. Application edges (CLI, terminal setup) wrap these
//! in `anyhow` with context.

use thiserror::Error;

/// Result alias for fallible domain operations
pub type Result<T> = std::result::Result<T, LrDetectError>;

/// Errors raised by lrdetect's domain layer
#[derive(Debug, Error)]
pub enum LrDetectError {
    /// Pasted text did not contain exactly rows×cols numeric values
    #[error(
        "Invalid values found. Please ensure the pasted data has exactly {expected} numeric values."
    )]
    PasteCount { expected: usize, found: usize },

    /// Transport-level failure talking to the analysis backend
    #[error("Backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {body}")]
    BackendStatus { status: u16, body: String },

    /// Backend body could not be decoded into the expected shape
    #[error("Malformed backend response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Stable error classification, used in logs and JSON output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    Network,
    Backend,
    Response,
    Config,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Backend => "backend",
            Self::Response => "response",
            Self::Config => "config",
        }
    }
}

impl LrDetectError {
    /// Classify this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PasteCount { .. } => ErrorCode::Validation,
            Self::Http(_) => ErrorCode::Network,
            Self::BackendStatus { .. } => ErrorCode::Backend,
            Self::MalformedResponse(_) => ErrorCode::Response,
            Self::Config(_) => ErrorCode::Config,
        }
    }
}
