//! Ingestion candidates
//!
//! A [`Candidate`] is one spreadsheet row's worth of work: the submission
//! timestamp, the normalized download URL, and the label that ends up in the
//! output filename.

use serde::{Deserialize, Serialize};

/// One row's worth of extracted, validated work
///
/// Produced by the extractor only when all three fields are non-empty after
/// link normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Submission timestamp, opaque but lexicographically orderable
    pub timestamp: String,

    /// Normalized direct-download URL of the uploaded resource
    pub source_url: String,

    /// Annotation embedded into the output filename (e.g., a count)
    pub label: String,
}

impl Candidate {
    pub fn new(
        timestamp: impl Into<String>,
        source_url: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            source_url: source_url.into(),
            label: label.into(),
        }
    }
}
