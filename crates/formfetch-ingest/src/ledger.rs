//! Progress ledger
//!
//! Durable, process-wide ingestion state surviving across runs: the
//! last-completed marker and the append-only failure log. Marker writes use
//! the write-temp-then-rename pattern so a crash mid-write can never corrupt
//! the previously committed value; a missing or unreadable ledger is treated
//! as "nothing processed yet", never as an error.

use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File holding the last-completed marker (single line)
pub const MARKER_FILE: &str = "last_completed.txt";

/// Append-only failure log, one URL per line
pub const FAILURE_LOG_FILE: &str = "failed_urls.txt";

/// How a run decides which candidates were already processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResumeStrategy {
    /// Canonical: compare candidate timestamps against the stored marker
    #[default]
    Marker,
    /// Compatibility shim: skip candidates up to and including the
    /// remembered last-successful filename
    Filename,
}

impl std::str::FromStr for ResumeStrategy {
    type Err = IngestError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "marker" | "timestamp" => Ok(ResumeStrategy::Marker),
            "filename" => Ok(ResumeStrategy::Filename),
            other => Err(IngestError::config(format!(
                "invalid resume strategy '{}', expected 'marker' or 'filename'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ResumeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResumeStrategy::Marker => write!(f, "marker"),
            ResumeStrategy::Filename => write!(f, "filename"),
        }
    }
}

/// Durable record of ingestion progress and failures
#[derive(Debug)]
pub struct ProgressLedger {
    marker_path: PathBuf,
    failures_path: PathBuf,
    marker: Option<String>,
    failures: BTreeSet<String>,
}

impl ProgressLedger {
    /// Open (and if necessary create) the ledger in a state directory
    pub fn open(state_dir: impl AsRef<Path>) -> Result<Self> {
        let state_dir = state_dir.as_ref();
        std::fs::create_dir_all(state_dir)?;

        let marker_path = state_dir.join(MARKER_FILE);
        let failures_path = state_dir.join(FAILURE_LOG_FILE);

        let marker = std::fs::read(&marker_path)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let failures: BTreeSet<String> = std::fs::read_to_string(&failures_path)
            .map(|content| {
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        debug!(
            marker = marker.as_deref().unwrap_or("<none>"),
            failures = failures.len(),
            "ledger loaded"
        );

        Ok(Self {
            marker_path,
            failures_path,
            marker,
            failures,
        })
    }

    /// The highest-order marker known to be fully processed
    pub fn last_completed_marker(&self) -> Option<&str> {
        self.marker.as_deref()
    }

    /// URLs that exhausted their retries
    pub fn failed_urls(&self) -> &BTreeSet<String> {
        &self.failures
    }

    /// Advance the marker, flushing it durably before returning
    ///
    /// Re-advancing to the current marker is a no-op; otherwise the latest
    /// value wins. The write is retried once before escalating to
    /// [`IngestError::LedgerWrite`].
    pub fn advance(&mut self, marker: &str) -> Result<()> {
        if self.marker.as_deref() == Some(marker) {
            return Ok(());
        }

        self.write_durable(&self.marker_path, marker)?;
        self.marker = Some(marker.to_string());
        debug!(%marker, "ledger advanced");
        Ok(())
    }

    /// Record a terminally failed URL, exactly once
    pub fn record_failure(&mut self, url: &str) -> Result<()> {
        if self.failures.contains(url) {
            return Ok(());
        }

        self.append_failure(url)?;
        self.failures.insert(url.to_string());
        Ok(())
    }

    fn append_failure(&self, url: &str) -> Result<()> {
        let append = |path: &Path| -> std::io::Result<()> {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            writeln!(file, "{}", url)
        };

        if let Err(first) = append(&self.failures_path) {
            warn!(error = %first, "failure log append failed, retrying once");
            append(&self.failures_path).map_err(|source| IngestError::LedgerWrite {
                path: self.failures_path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn write_durable(&self, path: &Path, content: &str) -> Result<()> {
        if let Err(first) = write_atomic(path, content) {
            warn!(error = %first, "marker write failed, retrying once");
            write_atomic(path, content).map_err(|source| IngestError::LedgerWrite {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Write a small file atomically: temp file in the same directory, then
/// rename over the destination
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_ledger_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ProgressLedger::open(dir.path()).unwrap();
        assert_eq!(ledger.last_completed_marker(), None);
        assert!(ledger.failed_urls().is_empty());
    }

    #[test]
    fn test_advance_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let mut ledger = ProgressLedger::open(dir.path()).unwrap();
        ledger.advance("2024-01-01 10:00:00").unwrap();
        ledger.advance("2024-01-02 09:30:00").unwrap();

        let reopened = ProgressLedger::open(dir.path()).unwrap();
        assert_eq!(
            reopened.last_completed_marker(),
            Some("2024-01-02 09:30:00")
        );
    }

    #[test]
    fn test_advance_same_marker_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ProgressLedger::open(dir.path()).unwrap();
        ledger.advance("m1").unwrap();
        ledger.advance("m1").unwrap();
        assert_eq!(ledger.last_completed_marker(), Some("m1"));
    }

    #[test]
    fn test_record_failure_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ProgressLedger::open(dir.path()).unwrap();

        ledger.record_failure("https://x.example/a").unwrap();
        ledger.record_failure("https://x.example/a").unwrap();
        ledger.record_failure("https://x.example/b").unwrap();

        let log = std::fs::read_to_string(dir.path().join(FAILURE_LOG_FILE)).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines, vec!["https://x.example/a", "https://x.example/b"]);

        // Dedup also holds across restarts
        let mut reopened = ProgressLedger::open(dir.path()).unwrap();
        reopened.record_failure("https://x.example/a").unwrap();
        let log = std::fs::read_to_string(dir.path().join(FAILURE_LOG_FILE)).unwrap();
        assert_eq!(log.lines().count(), 2);
    }

    #[test]
    fn test_corrupt_marker_is_nothing_processed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MARKER_FILE), [0xFF, 0xFE, 0x00]).unwrap();

        let ledger = ProgressLedger::open(dir.path()).unwrap();
        assert_eq!(ledger.last_completed_marker(), None);
    }

    #[test]
    fn test_no_tmp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = ProgressLedger::open(dir.path()).unwrap();
        ledger.advance("m1").unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_resume_strategy_parsing() {
        assert_eq!(
            "marker".parse::<ResumeStrategy>().unwrap(),
            ResumeStrategy::Marker
        );
        assert_eq!(
            "filename".parse::<ResumeStrategy>().unwrap(),
            ResumeStrategy::Filename
        );
        assert!("both".parse::<ResumeStrategy>().is_err());
    }
}
