//! Row extraction
//!
//! Turns raw sheet rows into a clean, ordered sequence of ingestion
//! candidates: trims fields, normalizes share links, drops malformed rows,
//! applies the marker cut-off, and sorts by timestamp (stable, so duplicate
//! timestamps keep their source row order).

use crate::candidate::Candidate;
use crate::filename;
use crate::links;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Sheet column names for the three candidate fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    /// Submission timestamp column
    #[serde(default = "default_timestamp_column")]
    pub timestamp: String,

    /// Uploaded photo link column
    #[serde(default = "default_photo_column")]
    pub photo: String,

    /// Label column (embedded into the output filename)
    #[serde(default = "default_label_column")]
    pub label: String,
}

fn default_timestamp_column() -> String {
    "Timestamp".to_string()
}

fn default_photo_column() -> String {
    "Photo".to_string()
}

fn default_label_column() -> String {
    "Count".to_string()
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            timestamp: default_timestamp_column(),
            photo: default_photo_column(),
            label: default_label_column(),
        }
    }
}

/// Extract ordered candidates from raw rows
///
/// Excludes rows missing any required field after link normalization, and
/// (when a marker is provided) rows whose timestamp is lexicographically at
/// or below it. The result is sorted by timestamp ascending with a stable
/// sort.
pub fn extract_candidates(
    rows: &[HashMap<String, String>],
    columns: &ColumnMap,
    last_completed_marker: Option<&str>,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for row in rows {
        let timestamp = field(row, &columns.timestamp);
        let photo = field(row, &columns.photo);
        let label = field(row, &columns.label);

        let source_url = links::normalize_share_link(&photo);

        if timestamp.is_empty() || source_url.is_empty() || label.is_empty() {
            debug!(?row, "excluding malformed row");
            continue;
        }

        if let Some(marker) = last_completed_marker {
            if timestamp.as_str() <= marker {
                continue;
            }
        }

        candidates.push(Candidate::new(timestamp, source_url, label));
    }

    candidates.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    candidates
}

/// Filename-based resume shim: drop every candidate up to and including the
/// one whose recomputed filename matches the remembered last-successful
/// filename
///
/// When the remembered name matches no candidate (the naming function may
/// have changed between runs), the full candidate list is returned and
/// processing starts from the beginning.
pub fn skip_through_filename(mut candidates: Vec<Candidate>, last_filename: &str) -> Vec<Candidate> {
    match candidates
        .iter()
        .position(|c| filename::for_candidate(c) == last_filename)
    {
        Some(pos) => candidates.split_off(pos + 1),
        None => candidates,
    }
}

fn field(row: &HashMap<String, String>, column: &str) -> String {
    row.get(column)
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}
