//! Ingestion configuration
//!
//! All process-wide knobs live in one explicit [`IngestConfig`] passed into
//! the driver at construction. Configuration can come from a YAML project
//! file (`formfetch.yml`), from `FORMFETCH_*` environment variables, or
//! both (environment wins over defaults only where set).

use crate::error::{IngestError, Result};
use crate::extract::ColumnMap;
use crate::ledger::ResumeStrategy;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default project configuration file name
pub const CONFIG_FILE: &str = "formfetch.yml";

/// How the save path for a candidate's artifact is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Name the artifact from the sanitized timestamp and stream the
    /// normalized URL directly
    #[default]
    Direct,
    /// Resolve the provider display name first, derive the path from it,
    /// then stream
    MetadataFirst,
}

impl std::str::FromStr for FetchStrategy {
    type Err = IngestError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(FetchStrategy::Direct),
            "metadata" | "metadata_first" => Ok(FetchStrategy::MetadataFirst),
            other => Err(IngestError::config(format!(
                "invalid fetch strategy '{}', expected 'direct' or 'metadata_first'",
                other
            ))),
        }
    }
}

/// Main ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Root directory for downloaded artifacts
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// Directory holding the progress ledger files
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Bearer-token file used for sheet and metadata calls
    #[serde(default = "default_credentials_source")]
    pub credentials_source: PathBuf,

    /// Spreadsheet identifier
    #[serde(default)]
    pub sheet_identifier: String,

    /// Range of the sheet to read (header row first)
    #[serde(default = "default_sheet_range")]
    pub sheet_range: String,

    /// Base URL of the spreadsheet API
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,

    /// Base URL of the drive metadata API
    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,

    /// Sheet column names for the candidate fields
    #[serde(default)]
    pub columns: ColumnMap,

    /// Maximum download attempts per candidate
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between download attempts in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// HTTP timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// JPEG quality used when converting to the canonical format
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// How artifact save paths are derived
    #[serde(default)]
    pub fetch_strategy: FetchStrategy,

    /// How already-processed candidates are detected
    #[serde(default)]
    pub resume_strategy: ResumeStrategy,

    /// Partition artifacts into per-format subdirectories
    #[serde(default)]
    pub split_by_format: bool,

    /// Append a CSV audit record per success
    #[serde(default = "default_true")]
    pub audit_log: bool,
}

fn default_data_root() -> PathBuf {
    PathBuf::from("./data")
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("./state")
}

fn default_credentials_source() -> PathBuf {
    PathBuf::from("./credentials/token")
}

fn default_sheet_range() -> String {
    "Form Responses 1".to_string()
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_drive_base_url() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_secs() -> u64 {
    5
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_jpeg_quality() -> u8 {
    95
}

fn default_true() -> bool {
    true
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            state_dir: default_state_dir(),
            credentials_source: default_credentials_source(),
            sheet_identifier: String::new(),
            sheet_range: default_sheet_range(),
            sheets_base_url: default_sheets_base_url(),
            drive_base_url: default_drive_base_url(),
            columns: ColumnMap::default(),
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            jpeg_quality: default_jpeg_quality(),
            fetch_strategy: FetchStrategy::default(),
            resume_strategy: ResumeStrategy::default(),
            split_by_format: false,
            audit_log: true,
        }
    }
}

impl IngestConfig {
    /// Load configuration from a YAML file and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: IngestConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from `FORMFETCH_*` environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("FORMFETCH_DATA_ROOT") {
            config.data_root = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("FORMFETCH_STATE_DIR") {
            config.state_dir = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("FORMFETCH_CREDENTIALS") {
            config.credentials_source = PathBuf::from(value);
        }
        if let Ok(value) = std::env::var("FORMFETCH_SHEET_ID") {
            config.sheet_identifier = value;
        }
        if let Ok(value) = std::env::var("FORMFETCH_SHEET_RANGE") {
            config.sheet_range = value;
        }
        if let Ok(value) = std::env::var("FORMFETCH_SHEETS_BASE_URL") {
            config.sheets_base_url = value;
        }
        if let Ok(value) = std::env::var("FORMFETCH_DRIVE_BASE_URL") {
            config.drive_base_url = value;
        }
        if let Ok(value) = std::env::var("FORMFETCH_TIMESTAMP_COLUMN") {
            config.columns.timestamp = value;
        }
        if let Ok(value) = std::env::var("FORMFETCH_PHOTO_COLUMN") {
            config.columns.photo = value;
        }
        if let Ok(value) = std::env::var("FORMFETCH_LABEL_COLUMN") {
            config.columns.label = value;
        }
        if let Ok(value) = std::env::var("FORMFETCH_MAX_RETRIES") {
            config.max_retries = value
                .parse()
                .map_err(|_| IngestError::config("FORMFETCH_MAX_RETRIES must be an integer"))?;
        }
        if let Ok(value) = std::env::var("FORMFETCH_RETRY_DELAY_SECS") {
            config.retry_delay_secs = value.parse().map_err(|_| {
                IngestError::config("FORMFETCH_RETRY_DELAY_SECS must be an integer")
            })?;
        }
        if let Ok(value) = std::env::var("FORMFETCH_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = value.parse().map_err(|_| {
                IngestError::config("FORMFETCH_HTTP_TIMEOUT_SECS must be an integer")
            })?;
        }
        if let Ok(value) = std::env::var("FORMFETCH_JPEG_QUALITY") {
            config.jpeg_quality = value
                .parse()
                .map_err(|_| IngestError::config("FORMFETCH_JPEG_QUALITY must be 1-100"))?;
        }
        if let Ok(value) = std::env::var("FORMFETCH_FETCH_STRATEGY") {
            config.fetch_strategy = value.parse()?;
        }
        if let Ok(value) = std::env::var("FORMFETCH_RESUME_STRATEGY") {
            config.resume_strategy = value.parse()?;
        }
        if let Ok(value) = std::env::var("FORMFETCH_SPLIT_BY_FORMAT") {
            config.split_by_format = value.parse().unwrap_or(false);
        }
        if let Ok(value) = std::env::var("FORMFETCH_AUDIT_LOG") {
            config.audit_log = value.parse().unwrap_or(true);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.sheet_identifier.is_empty() {
            return Err(IngestError::config(
                "sheet_identifier must not be empty (set FORMFETCH_SHEET_ID or edit formfetch.yml)",
            ));
        }
        if self.sheet_range.is_empty() {
            return Err(IngestError::config("sheet_range must not be empty"));
        }
        if self.max_retries == 0 {
            return Err(IngestError::config("max_retries must be at least 1"));
        }
        if self.http_timeout_secs == 0 {
            return Err(IngestError::config("http_timeout_secs must be greater than 0"));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(IngestError::config("jpeg_quality must be between 1 and 100"));
        }
        Ok(())
    }

    /// Retry delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// HTTP timeout as a Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Retry policy derived from the retry settings
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_delay())
    }
}
