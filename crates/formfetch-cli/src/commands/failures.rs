//! `formfetch failures` command implementation
//!
//! Prints the URLs that exhausted their retries.

use crate::commands::load_config;
use crate::error::Result;
use colored::Colorize;
use formfetch_ingest::ProgressLedger;
use std::path::Path;

/// List terminally failed URLs
pub async fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let ledger = ProgressLedger::open(&config.state_dir)?;

    let failed = ledger.failed_urls();
    if failed.is_empty() {
        println!("{} No failures recorded.", "✓".green());
        return Ok(());
    }

    println!("{}", "Failed URLs:".yellow().bold());
    for url in failed {
        println!("  {}", url);
    }
    println!();
    println!("{} failed URL(s) total", failed.len());

    Ok(())
}
