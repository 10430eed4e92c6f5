//! Drive metadata service
//!
//! Resolves a file id to its provider-side display name, which the
//! metadata-first fetch strategy uses as the artifact base name. Failures
//! here are local to one candidate.

use crate::auth::TokenProvider;
use crate::error::{IngestError, Result};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Deserialize)]
struct FileMetadata {
    name: String,
}

/// Client for the drive files metadata endpoint
pub struct DriveMetadata {
    client: reqwest::Client,
    base_url: Url,
    token: Arc<dyn TokenProvider>,
}

impl DriveMetadata {
    pub fn new(base_url: &str, token: Arc<dyn TokenProvider>, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| IngestError::config(format!("invalid drive base URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("formfetch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Resolve the display name of a file
    pub async fn resolve_name(&self, file_id: &str) -> Result<String> {
        let token = self.token.token()?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IngestError::config("drive base URL cannot be a base"))?
            .extend(["drive", "v3", "files", file_id]);
        url.set_query(Some("fields=name"));

        debug!(url = %url, "resolving display name");

        let lookup_error = |message: String| IngestError::MetadataLookup {
            file_id: file_id.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| lookup_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(lookup_error(format!("HTTP {}", status)));
        }

        let metadata: FileMetadata = response
            .json()
            .await
            .map_err(|e| lookup_error(format!("invalid metadata response: {}", e)))?;

        if metadata.name.is_empty() {
            return Err(lookup_error("empty display name".to_string()));
        }

        Ok(metadata.name)
    }
}
