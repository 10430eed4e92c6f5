//! Format normalizer
//!
//! Converts artifacts whose format is in the requires-conversion set (HEIF)
//! to the canonical JPEG encoding, replacing the original in place. The
//! original file is removed only after the replacement has been fully
//! written and renamed into position; a failed conversion keeps the original
//! as the final, degraded-but-usable result.

use crate::artifact::{Artifact, ArtifactFormat};
use crate::codec::{ImageCodec, StdCodec};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Result of a normalization pass over one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The artifact was re-encoded and the original replaced
    Converted,
    /// The artifact's format is already acceptable
    NotRequired,
    /// Conversion failed; the original artifact was kept
    Kept { reason: String },
}

/// Converts requires-conversion artifacts to canonical JPEG
pub struct FormatNormalizer<C = StdCodec> {
    codec: C,
    quality: u8,
}

impl FormatNormalizer<StdCodec> {
    pub fn new(quality: u8) -> Self {
        Self {
            codec: StdCodec,
            quality,
        }
    }
}

impl<C: ImageCodec> FormatNormalizer<C> {
    /// Create a normalizer with a specific codec
    pub fn with_codec(codec: C, quality: u8) -> Self {
        Self { codec, quality }
    }

    /// Normalize one artifact, returning the (possibly replaced) artifact
    /// and what happened to it
    ///
    /// Never fails the pipeline: a conversion problem is reported through
    /// [`ConversionOutcome::Kept`] while the original artifact survives.
    pub fn normalize(&self, artifact: Artifact) -> (Artifact, ConversionOutcome) {
        if !artifact.format.requires_conversion() {
            debug!(path = %artifact.path.display(), "no conversion required");
            return (artifact, ConversionOutcome::NotRequired);
        }

        match self.convert(&artifact) {
            Ok(converted_path) => {
                info!(
                    from = %artifact.path.display(),
                    to = %converted_path.display(),
                    "converted to canonical format"
                );
                let converted = Artifact {
                    path: converted_path,
                    format: ArtifactFormat::Jpeg,
                    candidate: artifact.candidate,
                };
                (converted, ConversionOutcome::Converted)
            },
            Err(reason) => {
                warn!(
                    path = %artifact.path.display(),
                    %reason,
                    "conversion failed, keeping original artifact"
                );
                (artifact, ConversionOutcome::Kept { reason })
            },
        }
    }

    fn convert(&self, artifact: &Artifact) -> Result<PathBuf, String> {
        let bytes =
            std::fs::read(&artifact.path).map_err(|e| format!("read original: {}", e))?;

        let raw = self
            .codec
            .decode(&bytes, &artifact.format)
            .map_err(|e| e.to_string())?;
        let encoded = self
            .codec
            .encode_jpeg(&raw, self.quality)
            .map_err(|e| e.to_string())?;

        let target = artifact.path.with_extension("jpg");
        let staging = artifact.path.with_extension("jpg.part");

        if let Err(e) = std::fs::write(&staging, &encoded) {
            let _ = std::fs::remove_file(&staging);
            return Err(format!("write replacement: {}", e));
        }
        if let Err(e) = std::fs::rename(&staging, &target) {
            let _ = std::fs::remove_file(&staging);
            return Err(format!("rename replacement: {}", e));
        }

        // The replacement exists; the original may go now.
        if target != artifact.path {
            if let Err(e) = std::fs::remove_file(&artifact.path) {
                warn!(
                    path = %artifact.path.display(),
                    error = %e,
                    "could not remove original after conversion"
                );
            }
        }

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;
    use crate::codec::{CodecError, RawImage};
    use std::path::Path;

    /// Codec double that either converts everything or refuses everything
    struct FakeCodec {
        fail: bool,
    }

    impl ImageCodec for FakeCodec {
        fn decode(&self, _bytes: &[u8], _format: &ArtifactFormat) -> Result<RawImage, CodecError> {
            if self.fail {
                Err(CodecError::Decode("corrupt container".to_string()))
            } else {
                Ok(RawImage {
                    width: 1,
                    height: 1,
                    pixels: vec![1, 2, 3],
                })
            }
        }

        fn encode_jpeg(&self, _image: &RawImage, _quality: u8) -> Result<Vec<u8>, CodecError> {
            Ok(b"jpeg-bytes".to_vec())
        }
    }

    fn heif_artifact(dir: &Path) -> Artifact {
        let path = dir.join("2024-01-01 10-00-00_42.heic");
        std::fs::write(&path, b"heif-bytes").unwrap();
        Artifact {
            path,
            format: ArtifactFormat::Heif,
            candidate: Candidate::new("2024-01-01 10:00:00", "https://x.example/a", "42"),
        }
    }

    #[test]
    fn test_conversion_replaces_original() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = heif_artifact(dir.path());
        let original_path = artifact.path.clone();

        let normalizer = FormatNormalizer::with_codec(FakeCodec { fail: false }, 95);
        let (converted, outcome) = normalizer.normalize(artifact);

        assert_eq!(outcome, ConversionOutcome::Converted);
        assert_eq!(converted.format, ArtifactFormat::Jpeg);
        assert_eq!(
            converted.path,
            dir.path().join("2024-01-01 10-00-00_42.jpg")
        );
        assert_eq!(std::fs::read(&converted.path).unwrap(), b"jpeg-bytes");
        assert!(!original_path.exists(), "original must be removed");
    }

    #[test]
    fn test_failed_conversion_keeps_original() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = heif_artifact(dir.path());
        let original_path = artifact.path.clone();

        let normalizer = FormatNormalizer::with_codec(FakeCodec { fail: true }, 95);
        let (kept, outcome) = normalizer.normalize(artifact);

        assert!(matches!(outcome, ConversionOutcome::Kept { .. }));
        assert_eq!(kept.path, original_path);
        assert_eq!(kept.format, ArtifactFormat::Heif);
        assert!(original_path.exists(), "original must survive a failed conversion");
        assert_eq!(std::fs::read(&original_path).unwrap(), b"heif-bytes");
    }

    #[test]
    fn test_non_heif_is_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, b"png-bytes").unwrap();
        let artifact = Artifact {
            path: path.clone(),
            format: ArtifactFormat::Png,
            candidate: Candidate::new("t", "u", "l"),
        };

        let normalizer = FormatNormalizer::with_codec(FakeCodec { fail: false }, 95);
        let (same, outcome) = normalizer.normalize(artifact);

        assert_eq!(outcome, ConversionOutcome::NotRequired);
        assert_eq!(same.path, path);
        assert_eq!(std::fs::read(&path).unwrap(), b"png-bytes");
    }
}
