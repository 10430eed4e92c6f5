//! Access-token provisioning
//!
//! The row source and the metadata service authenticate with a short-lived
//! bearer token. Acquiring and refreshing that token is outside this crate;
//! [`TokenProvider`] is the seam, and [`StaticTokenProvider`] covers the
//! common deployment where a sidecar keeps a token file fresh.

use crate::error::{IngestError, Result};
use std::path::{Path, PathBuf};

/// Environment variable consulted before the token file
pub const TOKEN_ENV_VAR: &str = "FORMFETCH_ACCESS_TOKEN";

/// Supplies the bearer token used for authenticated provider calls
pub trait TokenProvider: Send + Sync {
    /// Return a currently valid bearer token
    fn token(&self) -> Result<String>;
}

/// Token provider backed by an environment variable or a token file
///
/// The file is re-read on every call, so an externally refreshed token is
/// picked up without restarting the process.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token_file: PathBuf,
}

impl StaticTokenProvider {
    pub fn new(token_file: impl AsRef<Path>) -> Self {
        Self {
            token_file: token_file.as_ref().to_path_buf(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn token(&self) -> Result<String> {
        if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
            let token = token.trim().to_string();
            if !token.is_empty() {
                return Ok(token);
            }
        }

        let raw = std::fs::read_to_string(&self.token_file).map_err(|e| {
            IngestError::credentials(format!(
                "cannot read token file '{}': {}",
                self.token_file.display(),
                e
            ))
        })?;

        let token = raw.trim().to_string();
        if token.is_empty() {
            return Err(IngestError::credentials(format!(
                "token file '{}' is empty",
                self.token_file.display()
            )));
        }

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "abc123\n").unwrap();

        let provider = StaticTokenProvider::new(&path);
        assert_eq!(provider.token().unwrap(), "abc123");
    }

    #[test]
    fn test_missing_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let provider = StaticTokenProvider::new(dir.path().join("missing"));
        assert!(matches!(
            provider.token(),
            Err(IngestError::Credentials(_))
        ));
    }

    #[test]
    fn test_empty_token_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "   \n").unwrap();

        let provider = StaticTokenProvider::new(&path);
        assert!(matches!(
            provider.token(),
            Err(IngestError::Credentials(_))
        ));
    }
}
