//! Error types for the formfetch CLI
//!
//! User-facing errors with actionable messages; pipeline errors pass
//! through transparently.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// Project directory already has a formfetch.yml
    #[error("Project already initialized: {0}. Use --force to overwrite.")]
    AlreadyInitialized(String),

    /// No configuration could be found
    #[error("No configuration at '{0}'. Run 'formfetch init' first, or set FORMFETCH_* environment variables.")]
    NotInitialized(String),

    /// Pipeline error
    #[error(transparent)]
    Ingest(#[from] formfetch_ingest::IngestError),

    /// Shared utility error
    #[error(transparent)]
    Common(#[from] formfetch_common::FormfetchError),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
