//! Formfetch Ingest Library
//!
//! Incremental ingestion pipeline for a spreadsheet-backed photo collection
//! form: poll the sheet for new rows, download the referenced images from
//! the cloud drive, convert proprietary formats to canonical JPEG, and
//! checkpoint progress so repeated runs stay incremental and resume
//! correctly after a crash.
//!
//! # Pipeline
//!
//! - [`extract`]: raw rows to ordered [`Candidate`]s
//! - [`filename`]: stable, filesystem-safe artifact names
//! - [`fetch`]: download-with-retry to a local [`artifact::Artifact`]
//! - [`convert`]: canonical-format normalization
//! - [`ledger`]: durable resume markers and the failure log
//! - [`driver`]: orchestration of one run
//!
//! # Example
//!
//! ```no_run
//! use formfetch_ingest::{IngestConfig, IngestionDriver};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::from_env()?;
//!     let mut driver = IngestionDriver::new(config)?;
//!     let summary = driver.run().await?;
//!     println!("downloaded {} new photos", summary.succeeded);
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod audit;
pub mod auth;
pub mod candidate;
pub mod codec;
pub mod config;
pub mod convert;
pub mod drive;
pub mod driver;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod filename;
pub mod ledger;
pub mod links;
pub mod retry;
pub mod sheets;

// Re-export commonly used types
pub use candidate::Candidate;
pub use config::{FetchStrategy, IngestConfig};
pub use driver::{IngestionDriver, RunSummary};
pub use error::{IngestError, Result};
pub use ledger::{ProgressLedger, ResumeStrategy};
pub use retry::RetryPolicy;
