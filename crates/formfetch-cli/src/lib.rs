//! Formfetch CLI Library
//!
//! Command-line interface over the formfetch ingestion pipeline:
//!
//! - **Project Setup**: write a starter configuration (`formfetch init`)
//! - **Ingestion**: poll the sheet and download new photos (`formfetch run`)
//! - **Progress**: show the resume marker and artifact counts (`formfetch status`)
//! - **Failures**: list URLs that exhausted their retries (`formfetch failures`)

pub mod commands;
pub mod error;
pub mod progress;

// Re-export commonly used types
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Formfetch - incremental form-response photo fetcher
#[derive(Parser, Debug)]
#[command(name = "formfetch")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the project configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "FORMFETCH_CONFIG",
        default_value = "formfetch.yml"
    )]
    pub config: PathBuf,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter configuration file
    Init {
        /// Project directory (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Spreadsheet identifier to pre-fill
        #[arg(short, long)]
        sheet: Option<String>,

        /// Force overwrite if formfetch.yml exists
        #[arg(short, long)]
        force: bool,
    },

    /// Poll the sheet and download new photos
    Run,

    /// Show ingestion progress and artifact counts
    Status,

    /// List URLs that exhausted their retries
    Failures,
}
