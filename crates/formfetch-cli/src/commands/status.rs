//! `formfetch status` command implementation
//!
//! Shows the resume marker, failure count, and downloaded artifact totals.

use crate::commands::load_config;
use crate::error::Result;
use crate::progress::format_bytes;
use colored::Colorize;
use formfetch_ingest::audit::AUDIT_LOG_FILE;
use formfetch_ingest::ProgressLedger;
use std::path::Path;

/// Show ingestion progress
pub async fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let ledger = ProgressLedger::open(&config.state_dir)?;

    println!("{}", "Ingestion Status:".cyan().bold());
    println!(
        "  Resume marker:  {}",
        ledger.last_completed_marker().unwrap_or("<none>")
    );
    println!("  Strategy:       {}", config.resume_strategy);
    println!("  Failed URLs:    {}", ledger.failed_urls().len());

    let (count, bytes) = artifact_totals(&config.data_root)?;
    println!("  Artifacts:      {}", count);
    println!("  Total size:     {}", format_bytes(bytes));
    println!("  Data root:      {}", config.data_root.display());

    Ok(())
}

/// Count artifacts under the data root (one subdirectory level deep, to
/// cover the split-by-format layout), excluding the audit log
fn artifact_totals(data_root: &Path) -> Result<(u64, u64)> {
    let mut count = 0;
    let mut bytes = 0;

    if !data_root.exists() {
        return Ok((0, 0));
    }

    for entry in std::fs::read_dir(data_root)? {
        let entry = entry?;
        let meta = entry.metadata()?;

        if meta.is_dir() {
            for nested in std::fs::read_dir(entry.path())? {
                let nested = nested?;
                let nested_meta = nested.metadata()?;
                if nested_meta.is_file() {
                    count += 1;
                    bytes += nested_meta.len();
                }
            }
        } else if entry.file_name().to_string_lossy() != AUDIT_LOG_FILE {
            count += 1;
            bytes += meta.len();
        }
    }

    Ok((count, bytes))
}
