//! Formfetch Common Library
//!
//! Shared error handling, checksums, and the logging stack used by every
//! formfetch workspace member.
//!
//! # Example
//!
//! ```no_run
//! use formfetch_common::{Result, checksum};
//!
//! fn digest_artifact(path: &str) -> Result<()> {
//!     let digest = checksum::compute_file_checksum(path)?;
//!     tracing::info!(%digest, "artifact digested");
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{FormfetchError, Result};
