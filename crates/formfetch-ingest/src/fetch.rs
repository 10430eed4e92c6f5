//! Fetch executor
//!
//! Materializes one candidate's remote resource as a local artifact.
//! Downloads stream in bounded chunks to a `.part` staging file and are
//! renamed into place only after the whole response body has been read, so
//! no partial file can ever claim to be complete. The attempt loop is
//! driven by an explicit [`RetryPolicy`]; exhausting it produces a terminal
//! failure, never a panic or a dangling partial artifact.

use crate::artifact::{Artifact, ArtifactFormat};
use crate::candidate::Candidate;
use crate::error::Result;
use crate::retry::RetryPolicy;
use futures::StreamExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Terminal outcome of fetching one candidate
#[derive(Debug)]
pub enum FetchOutcome {
    /// The artifact was fully downloaded and renamed into place
    Success(Artifact),
    /// Every attempt failed; the candidate is terminally failed
    Failed(TerminalFailure),
    /// The destination already exists from an earlier run
    Skipped { path: PathBuf },
}

/// Details of an exhausted retry loop
#[derive(Debug, Clone)]
pub struct TerminalFailure {
    pub url: String,
    pub attempts: u32,
    pub last_error: String,
}

/// One attempt's failure, classified for logging
#[derive(Error, Debug)]
enum AttemptError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads candidate resources with bounded retries
pub struct FetchExecutor {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl FetchExecutor {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("formfetch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, retry })
    }

    /// Fetch a candidate's resource to the precomputed destination path
    pub async fn fetch(&self, candidate: &Candidate, dest: &Path) -> FetchOutcome {
        if dest.exists() {
            debug!(path = %dest.display(), "destination already exists, skipping download");
            return FetchOutcome::Skipped {
                path: dest.to_path_buf(),
            };
        }

        let url = &candidate.source_url;
        let mut last_error = String::new();

        for attempt in 1..=self.retry.max_attempts {
            match self.attempt(url, dest).await {
                Ok(()) => {
                    info!(%url, path = %dest.display(), attempt, "downloaded");
                    return FetchOutcome::Success(Artifact {
                        path: dest.to_path_buf(),
                        format: ArtifactFormat::from_path(dest),
                        candidate: candidate.clone(),
                    });
                },
                Err(error) => {
                    warn!(
                        %url,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        %error,
                        "download attempt failed"
                    );
                    last_error = error.to_string();

                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.delay_for(attempt)).await;
                    }
                },
            }
        }

        FetchOutcome::Failed(TerminalFailure {
            url: url.clone(),
            attempts: self.retry.max_attempts,
            last_error,
        })
    }

    /// One download attempt: stream to the staging file, rename on success,
    /// delete the staging file on any failure
    async fn attempt(&self, url: &str, dest: &Path) -> std::result::Result<(), AttemptError> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let staging = part_path(dest);
        match self.stream_to(url, &staging).await {
            Ok(()) => {
                std::fs::rename(&staging, dest)?;
                Ok(())
            },
            Err(error) => {
                let _ = std::fs::remove_file(&staging);
                Err(error)
            },
        }
    }

    async fn stream_to(&self, url: &str, staging: &Path) -> std::result::Result<(), AttemptError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status.as_u16()));
        }

        let mut file = std::fs::File::create(staging)?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
        }

        Ok(())
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}
