//! Error types for the ingestion pipeline
//!
//! The taxonomy distinguishes failures that abort a run (the row source being
//! unreachable, the progress ledger refusing writes) from failures that are
//! local to one candidate (fetch exhaustion, conversion problems) and only
//! recorded.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Error type for the ingestion pipeline
#[derive(Error, Debug)]
pub enum IngestError {
    /// The row source could not be reached or refused the request.
    /// Fatal to the run: no candidates could be retrieved at all.
    #[error("Row source unavailable: {0}. Check the sheet identifier, credentials, and connectivity.")]
    SourceUnavailable(String),

    /// Credentials could not be loaded
    #[error("Credentials unavailable: {0}. Set FORMFETCH_ACCESS_TOKEN or point credentials_source at a token file.")]
    Credentials(String),

    /// Display-name lookup for the metadata-first fetch strategy failed.
    /// Local to one candidate: recorded, never fatal to the run.
    #[error("Metadata lookup failed for file '{file_id}': {message}")]
    MetadataLookup { file_id: String, message: String },

    /// The progress ledger could not be persisted, even after a retry
    #[error("Ledger write failed for {path:?}: {source}. No further progress can be checkpointed.")]
    LedgerWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Failed to parse configuration file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Audit log write failed
    #[error("Audit log error: {0}")]
    Audit(#[from] csv::Error),

    /// HTTP client construction or request failure outside the retry loop
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// File system operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Create a source-unavailable error
    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    /// Create a credentials error
    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
