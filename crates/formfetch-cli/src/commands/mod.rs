//! CLI command implementations

pub mod failures;
pub mod init;
pub mod run;
pub mod status;

use crate::error::{CliError, Result};
use formfetch_ingest::IngestConfig;
use std::path::Path;

/// Load the project configuration
///
/// Prefers the configuration file; falls back to `FORMFETCH_*` environment
/// variables when the file does not exist.
pub fn load_config(config_path: &Path) -> Result<IngestConfig> {
    if config_path.exists() {
        return Ok(IngestConfig::load(config_path)?);
    }

    IngestConfig::from_env().map_err(|_| {
        CliError::NotInitialized(config_path.display().to_string())
    })
}
