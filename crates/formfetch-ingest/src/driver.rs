//! Ingestion driver
//!
//! Orchestrates one run: pull rows from the sheet, filter them against the
//! progress ledger, and drive each remaining candidate through
//! fetch, normalize, checkpoint. Candidates are processed strictly in
//! ascending timestamp order, one at a time; the ledger marker only moves
//! after a candidate's terminal outcome (success or recorded failure) is
//! durable.
//!
//! Per-candidate failures never abort the run. The only fatal conditions
//! are the row source being unreachable (nothing could be retrieved at all)
//! and the ledger refusing writes after a retry.

use crate::artifact::ArtifactFormat;
use crate::audit::{AuditLog, AUDIT_LOG_FILE};
use crate::auth::{StaticTokenProvider, TokenProvider};
use crate::candidate::Candidate;
use crate::codec::StdCodec;
use crate::config::{FetchStrategy, IngestConfig};
use crate::convert::{ConversionOutcome, FormatNormalizer};
use crate::drive::DriveMetadata;
use crate::error::Result;
use crate::extract;
use crate::fetch::{FetchExecutor, FetchOutcome};
use crate::filename;
use crate::ledger::{ProgressLedger, ResumeStrategy};
use crate::links;
use crate::sheets::SheetsClient;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Counters for one completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Candidates remaining after ledger filtering
    pub candidates: usize,
    /// Fully downloaded (and, where needed, converted) candidates
    pub succeeded: usize,
    /// Candidates recorded in the failure log this run
    pub failed: usize,
    /// Candidates whose artifact already existed
    pub skipped: usize,
    /// Artifacts converted to the canonical format
    pub converted: usize,
    /// Conversions that failed (original kept)
    pub conversion_failures: usize,
    /// Ledger marker after the run
    pub last_marker: Option<String>,
}

impl RunSummary {
    /// True when nothing went wrong for any candidate
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.conversion_failures == 0
    }
}

/// Terminal outcome of processing one candidate
enum Processed {
    Succeeded { conversion: ConversionOutcome },
    Failed,
    Skipped,
}

/// Drives the incremental ingestion pipeline
pub struct IngestionDriver {
    config: IngestConfig,
    sheets: SheetsClient,
    drive: DriveMetadata,
    executor: FetchExecutor,
    normalizer: FormatNormalizer<StdCodec>,
    ledger: ProgressLedger,
    audit: Option<AuditLog>,
}

impl IngestionDriver {
    /// Build a driver and its collaborators from configuration
    pub fn new(config: IngestConfig) -> Result<Self> {
        config.validate()?;

        let token: Arc<dyn TokenProvider> =
            Arc::new(StaticTokenProvider::new(&config.credentials_source));
        let timeout = config.http_timeout();

        let sheets = SheetsClient::new(
            &config.sheets_base_url,
            &config.sheet_identifier,
            &config.sheet_range,
            Arc::clone(&token),
            timeout,
        )?;
        let drive = DriveMetadata::new(&config.drive_base_url, token, timeout)?;
        let executor = FetchExecutor::new(timeout, config.retry_policy())?;
        let normalizer = FormatNormalizer::new(config.jpeg_quality);
        let ledger = ProgressLedger::open(&config.state_dir)?;
        let audit = config
            .audit_log
            .then(|| AuditLog::new(config.data_root.join(AUDIT_LOG_FILE)));

        Ok(Self {
            config,
            sheets,
            drive,
            executor,
            normalizer,
            ledger,
            audit,
        })
    }

    /// The ledger as loaded/updated by this driver
    pub fn ledger(&self) -> &ProgressLedger {
        &self.ledger
    }

    /// Execute one ingestion run
    ///
    /// Returns an error only for the fatal conditions: the row source being
    /// unreachable or the ledger refusing writes.
    pub async fn run(&mut self) -> Result<RunSummary> {
        info!(
            sheet = %self.config.sheet_identifier,
            resume = %self.config.resume_strategy,
            "loading candidates"
        );

        let rows = self.sheets.all_rows().await?;

        let marker_cutoff = match self.config.resume_strategy {
            ResumeStrategy::Marker => self.ledger.last_completed_marker().map(str::to_string),
            ResumeStrategy::Filename => None,
        };

        let mut candidates =
            extract::extract_candidates(&rows, &self.config.columns, marker_cutoff.as_deref());

        if self.config.resume_strategy == ResumeStrategy::Filename {
            if let Some(last_filename) = self.ledger.last_completed_marker() {
                candidates = extract::skip_through_filename(candidates, last_filename);
            }
        }

        let mut summary = RunSummary {
            candidates: candidates.len(),
            ..Default::default()
        };

        if candidates.is_empty() {
            info!(rows = rows.len(), "no new candidates");
            summary.last_marker = self.ledger.last_completed_marker().map(str::to_string);
            return Ok(summary);
        }

        info!(rows = rows.len(), new = candidates.len(), "processing candidates");
        std::fs::create_dir_all(&self.config.data_root)?;

        for candidate in &candidates {
            match self.process_candidate(candidate).await? {
                Processed::Succeeded { conversion } => {
                    summary.succeeded += 1;
                    match conversion {
                        ConversionOutcome::Converted => summary.converted += 1,
                        ConversionOutcome::Kept { .. } => summary.conversion_failures += 1,
                        ConversionOutcome::NotRequired => {},
                    }
                },
                Processed::Failed => summary.failed += 1,
                Processed::Skipped => summary.skipped += 1,
            }
        }

        summary.last_marker = self.ledger.last_completed_marker().map(str::to_string);
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            converted = summary.converted,
            "run finished"
        );

        Ok(summary)
    }

    /// Drive one candidate to a durable terminal outcome
    ///
    /// The returned error is reserved for ledger write failures; everything
    /// local to the candidate resolves to a [`Processed`] value.
    async fn process_candidate(&mut self, candidate: &Candidate) -> Result<Processed> {
        let resolved = self.resolve_dest(candidate).await;
        let dest = match resolved {
            Ok(dest) => dest,
            Err(e) => {
                warn!(url = %candidate.source_url, error = %e, "could not resolve save path");
                self.ledger.record_failure(&candidate.source_url)?;
                self.checkpoint_failure(candidate)?;
                return Ok(Processed::Failed);
            },
        };

        let outcome = self.executor.fetch(candidate, &dest).await;
        match outcome {
            FetchOutcome::Success(artifact) => {
                let (artifact, conversion) = self.normalizer.normalize(artifact);

                if let Some(audit) = &self.audit {
                    match formfetch_common::checksum::compute_file_checksum(&artifact.path) {
                        Ok(digest) => {
                            if let Err(e) = audit.append(
                                &candidate.timestamp,
                                &artifact.file_name(),
                                &candidate.label,
                                &digest,
                            ) {
                                warn!(error = %e, "audit log append failed");
                            }
                        },
                        Err(e) => warn!(error = %e, "artifact digest failed"),
                    }
                }

                let marker = match self.config.resume_strategy {
                    ResumeStrategy::Marker => candidate.timestamp.clone(),
                    ResumeStrategy::Filename => artifact.file_name(),
                };
                self.ledger.advance(&marker)?;

                Ok(Processed::Succeeded { conversion })
            },

            FetchOutcome::Skipped { path } => {
                // Completed by an earlier run; make sure the ledger agrees.
                let marker = match self.config.resume_strategy {
                    ResumeStrategy::Marker => candidate.timestamp.clone(),
                    ResumeStrategy::Filename => path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                };
                self.ledger.advance(&marker)?;
                Ok(Processed::Skipped)
            },

            FetchOutcome::Failed(failure) => {
                error!(
                    url = %failure.url,
                    attempts = failure.attempts,
                    last_error = %failure.last_error,
                    "candidate terminally failed"
                );
                self.ledger.record_failure(&failure.url)?;
                self.checkpoint_failure(candidate)?;
                Ok(Processed::Failed)
            },
        }
    }

    /// Advance the marker past a durably recorded failure
    ///
    /// Only meaningful for marker-based resumption: the failure log is the
    /// retry surface, so the failed row must not be re-extracted every run.
    /// Filename-based resumption has no filename to remember for a failure.
    fn checkpoint_failure(&mut self, candidate: &Candidate) -> Result<()> {
        if self.config.resume_strategy == ResumeStrategy::Marker {
            self.ledger.advance(&candidate.timestamp)?;
        }
        Ok(())
    }

    /// Compute the destination path for a candidate per the fetch strategy
    async fn resolve_dest(&self, candidate: &Candidate) -> Result<PathBuf> {
        let name = match self.config.fetch_strategy {
            FetchStrategy::Direct => filename::for_candidate(candidate),
            FetchStrategy::MetadataFirst => {
                let file_id =
                    links::extract_file_id(&candidate.source_url).ok_or_else(|| {
                        crate::error::IngestError::MetadataLookup {
                            file_id: String::new(),
                            message: format!(
                                "no embedded file id in URL '{}'",
                                candidate.source_url
                            ),
                        }
                    })?;
                let display_name = self.drive.resolve_name(&file_id).await?;
                filename::for_display_name(&display_name, &candidate.label)
            },
        };

        let dir = if self.config.split_by_format {
            let format = ArtifactFormat::from_path(std::path::Path::new(&name));
            self.config.data_root.join(format.subdir())
        } else {
            self.config.data_root.clone()
        };

        Ok(dir.join(name))
    }
}
