//! Error types for Lectern.

use crate::transcript::FailureCause;
use thiserror::Error;

/// Library-level error type for Lectern operations.
#[derive(Error, Debug)]
pub enum LecternError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    TranscriptUnavailable(FailureCause),

    #[error("Caption source error: {0}")]
    CaptionSource(String),

    #[error("Upstream returned HTTP {status}: {context}")]
    UpstreamStatus { status: u16, context: String },

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Note generation failed: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

/// Result type alias for Lectern operations.
pub type Result<T> = std::result::Result<T, LecternError>;
