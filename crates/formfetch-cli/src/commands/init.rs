//! `formfetch init` command implementation
//!
//! Writes a starter configuration file and the directory layout.

use crate::error::{CliError, Result};
use colored::Colorize;
use formfetch_ingest::config::CONFIG_FILE;
use formfetch_ingest::IngestConfig;
use std::path::PathBuf;

/// Initialize a formfetch project directory
pub async fn run(path: String, sheet: Option<String>, force: bool) -> Result<()> {
    let project_dir = PathBuf::from(&path);

    if !project_dir.exists() {
        std::fs::create_dir_all(&project_dir)?;
    }

    let config_path = project_dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        return Err(CliError::AlreadyInitialized(
            config_path.display().to_string(),
        ));
    }

    let config = IngestConfig {
        sheet_identifier: sheet.unwrap_or_else(|| "your-sheet-id".to_string()),
        data_root: project_dir.join("data"),
        state_dir: project_dir.join("state"),
        credentials_source: project_dir.join("credentials").join("token"),
        ..Default::default()
    };
    config.save(&config_path)?;

    std::fs::create_dir_all(&config.data_root)?;
    std::fs::create_dir_all(&config.state_dir)?;
    std::fs::create_dir_all(project_dir.join("credentials"))?;

    println!("{} Initialized formfetch project", "✓".green());
    println!("  Created: {}", config_path.display());
    println!("  Created: {}", config.data_root.display());
    println!("  Created: {}", config.state_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} and set sheet_identifier", CONFIG_FILE);
    println!("  2. Place a bearer token at credentials/token");
    println!("  3. Run 'formfetch run'");

    Ok(())
}
