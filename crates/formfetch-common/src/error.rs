//! Error types shared across formfetch crates

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, FormfetchError>;

/// Shared error type for formfetch
#[derive(Error, Debug)]
pub enum FormfetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
