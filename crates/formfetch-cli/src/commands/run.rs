//! `formfetch run` command implementation
//!
//! Polls the sheet and drives every new candidate through the pipeline.

use crate::commands::load_config;
use crate::error::Result;
use crate::progress;
use colored::Colorize;
use formfetch_ingest::IngestionDriver;
use std::path::Path;

/// Execute one ingestion run
pub async fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    println!(
        "{} Polling sheet '{}'...",
        "→".cyan(),
        config.sheet_identifier
    );

    let mut driver = IngestionDriver::new(config)?;

    let spinner = progress::create_spinner("Processing candidates...");
    let outcome = driver.run().await;
    spinner.finish_and_clear();

    let summary = outcome?;

    if summary.candidates == 0 {
        println!("{} No new photos to download.", "✓".green());
        return Ok(());
    }

    println!(
        "{} {} new candidate(s): {} downloaded, {} skipped, {} failed",
        if summary.is_clean() { "✓".green() } else { "!".yellow() },
        summary.candidates,
        summary.succeeded,
        summary.skipped,
        summary.failed
    );

    if summary.converted > 0 {
        println!("{} {} photo(s) converted to JPEG", "✓".green(), summary.converted);
    }
    if summary.conversion_failures > 0 {
        println!(
            "{} {} photo(s) kept in their original format (conversion failed)",
            "!".yellow(),
            summary.conversion_failures
        );
    }
    if summary.failed > 0 {
        println!(
            "{} {} download(s) failed; inspect them with 'formfetch failures'",
            "!".yellow(),
            summary.failed
        );
    }
    if let Some(marker) = &summary.last_marker {
        println!("Resume marker: {}", marker);
    }

    Ok(())
}
