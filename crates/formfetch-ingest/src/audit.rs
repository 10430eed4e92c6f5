//! CSV audit sink
//!
//! Optional tabular append log written after each successful candidate:
//! `timestamp, filename, label, sha256`. Not required for correctness; the
//! progress ledger is the authoritative state.

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Default audit log filename inside the data root
pub const AUDIT_LOG_FILE: &str = "ingest_log.csv";

/// Append-only CSV audit log
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one success record, writing the header first when the file is
    /// new or empty
    pub fn append(&self, timestamp: &str, filename: &str, label: &str, digest: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let needs_header = std::fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true);

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer.write_record(["timestamp", "filename", "label", "sha256"])?;
        }
        writer.write_record([timestamp, filename, label, digest])?;
        writer.flush()?;

        Ok(())
    }
}
