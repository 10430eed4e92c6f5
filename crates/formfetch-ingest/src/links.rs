//! Share-link normalization
//!
//! Uploaded resources arrive as drive share links in one of two shapes, both
//! carrying an embedded file id:
//!
//! - `scheme://host/...?id=<ID>`
//! - `scheme://host/file/d/<ID>/...`
//!
//! Both are rewritten to the canonical direct-download form
//! `scheme://host/uc?export=download&id=<ID>`; any other URL passes through
//! unchanged. Normalization is idempotent: the canonical form itself matches
//! the first shape and rewrites to itself.

use url::Url;

/// Rewrite a share link to its canonical direct-download form
///
/// Returns the input unchanged when it is not a recognized share-link shape
/// (including anything that does not parse as an absolute URL).
pub fn normalize_share_link(raw: &str) -> String {
    let Ok(parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    if parsed.host_str().is_none() {
        return raw.to_string();
    }

    match embedded_file_id(&parsed) {
        Some(id) => direct_download_url(&parsed, &id),
        None => raw.to_string(),
    }
}

/// Extract the embedded file id from a share link, if present
pub fn extract_file_id(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    embedded_file_id(&parsed)
}

fn embedded_file_id(url: &Url) -> Option<String> {
    if let Some((_, id)) = url.query_pairs().find(|(key, _)| key == "id") {
        if !id.is_empty() {
            return Some(id.into_owned());
        }
    }

    let segments: Vec<&str> = url.path_segments()?.collect();
    segments
        .windows(3)
        .find(|w| w[0] == "file" && w[1] == "d" && !w[2].is_empty())
        .map(|w| w[2].to_string())
}

fn direct_download_url(url: &Url, id: &str) -> String {
    let mut direct = url.clone();
    direct.set_path("/uc");
    direct.set_query(Some(&format!("export=download&id={}", id)));
    direct.set_fragment(None);
    direct.to_string()
}
