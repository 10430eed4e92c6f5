//! Artifacts and their formats
//!
//! An [`Artifact`] is a file materialized on local storage from one
//! candidate. Its format is derived from the filename extension and drives
//! both the optional per-format subdirectory layout and the
//! requires-conversion set.

use crate::candidate::Candidate;
use std::path::{Path, PathBuf};

/// Image format of an artifact, derived from its extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactFormat {
    Jpeg,
    Png,
    /// Proprietary photographic container format; the one member of the
    /// requires-conversion set
    Heif,
    Tiff,
    /// Anything else, carrying the original lowercased extension
    Other(String),
}

impl ArtifactFormat {
    /// Derive the format from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => ArtifactFormat::Jpeg,
            "png" => ArtifactFormat::Png,
            "heic" | "heif" => ArtifactFormat::Heif,
            "tif" | "tiff" => ArtifactFormat::Tiff,
            other => ArtifactFormat::Other(other.to_string()),
        }
    }

    /// Derive the format from a path's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(ArtifactFormat::from_extension)
            .unwrap_or_else(|| ArtifactFormat::Other(String::new()))
    }

    /// Subdirectory used when `split_by_format` is enabled
    pub fn subdir(&self) -> &'static str {
        match self {
            ArtifactFormat::Jpeg => "JPEG",
            ArtifactFormat::Png => "PNG",
            ArtifactFormat::Heif => "HEIC",
            ArtifactFormat::Tiff => "TIFF",
            ArtifactFormat::Other(_) => "OTHERS",
        }
    }

    /// Whether this format must be re-encoded to the canonical format
    pub fn requires_conversion(&self) -> bool {
        matches!(self, ArtifactFormat::Heif)
    }

    pub fn as_str(&self) -> &str {
        match self {
            ArtifactFormat::Jpeg => "jpeg",
            ArtifactFormat::Png => "png",
            ArtifactFormat::Heif => "heif",
            ArtifactFormat::Tiff => "tiff",
            ArtifactFormat::Other(ext) => ext,
        }
    }
}

impl std::fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file materialized on local storage from one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Location of the completed file
    pub path: PathBuf,

    /// Format derived from the extension
    pub format: ArtifactFormat,

    /// The candidate this artifact originated from
    pub candidate: Candidate,
}

impl Artifact {
    /// File name component of the artifact path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
