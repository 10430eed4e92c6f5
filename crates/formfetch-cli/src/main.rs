//! Formfetch CLI - Main entry point

use clap::Parser;
use formfetch_cli::{Cli, Commands};
use formfetch_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Pick up a local .env before anything reads the environment
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging based on verbose flag and environment
    let log_config = if cli.verbose {
        LogConfig::builder()
            .level(LogLevel::Debug)
            .output(LogOutput::Console)
            .log_file_prefix("formfetch".to_string())
            .build()
    } else {
        // Normal mode: keep the console for user-facing output
        LogConfig::builder()
            .level(LogLevel::Warn)
            .output(LogOutput::Console)
            .log_file_prefix("formfetch".to_string())
            .build()
    };

    // Environment variables take precedence
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    // The CLI should keep working even if logging cannot initialize
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> formfetch_cli::Result<()> {
    match &cli.command {
        Commands::Init { path, sheet, force } => {
            formfetch_cli::commands::init::run(path.clone(), sheet.clone(), *force).await
        },

        Commands::Run => formfetch_cli::commands::run::run(&cli.config).await,

        Commands::Status => formfetch_cli::commands::status::run(&cli.config).await,

        Commands::Failures => formfetch_cli::commands::failures::run(&cli.config).await,
    }
}
