//! Filename resolution
//!
//! Output artifacts are named `<base>_<label>.<ext>`, where `base` is the
//! sanitized submission timestamp (direct fetch strategy) or the sanitized
//! provider display name (metadata-first strategy). Every function here is
//! pure and deterministic: resume logic depends on recomputing the same name
//! for the same candidate across runs.

use crate::candidate::Candidate;
use std::path::Path;
use url::Url;

/// Fallback extension when none can be derived
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Characters that are replaced with `-` in filename components
const INVALID_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Replace filesystem-hostile characters with `-`
pub fn sanitize_component(component: &str) -> String {
    component
        .chars()
        .map(|c| if INVALID_CHARS.contains(&c) { '-' } else { c })
        .collect()
}

/// Derive the lowercased file extension from a URL or plain file name
///
/// Only the path component of a URL is considered; query strings never
/// contribute an extension. Defaults to [`DEFAULT_EXTENSION`] when the path
/// has no suffix.
pub fn file_extension(path_or_url: &str) -> String {
    let path_part = match Url::parse(path_or_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => path_or_url.to_string(),
    };

    Path::new(&path_part)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Resolve the output filename for a candidate (direct strategy)
pub fn for_candidate(candidate: &Candidate) -> String {
    format!(
        "{}_{}.{}",
        sanitize_component(&candidate.timestamp),
        sanitize_component(&candidate.label),
        file_extension(&candidate.source_url)
    )
}

/// Resolve the output filename from a provider display name (metadata-first
/// strategy)
///
/// The display name's own extension becomes the file extension; the stem
/// becomes the base.
pub fn for_display_name(display_name: &str, label: &str) -> String {
    let ext = file_extension(display_name);
    let base = Path::new(display_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(display_name);

    format!(
        "{}_{}.{}",
        sanitize_component(base),
        sanitize_component(label),
        ext
    )
}
