//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific
//! modules.

mod backfill;
mod helpers;
mod scrape;
mod watch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "petwatch")]
#[command(about = "Petition tracker: scrape listings, enrich records, notify subscribers")]
#[command(version)]
pub struct Cli {
    /// Config file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl one listing and reconcile it into the database
    Scrape {
        /// Listing to crawl: active, in_process or processed
        #[arg(short, long, default_value = "active")]
        status: String,
    },

    /// Re-attempt detail enrichment for records still missing details
    Backfill,

    /// Run the recurring crawl schedule in the foreground
    Watch,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scrape { status } => scrape::cmd_scrape(&settings, &status).await,
        Commands::Backfill => backfill::cmd_backfill(&settings).await,
        Commands::Watch => watch::cmd_watch(&settings).await,
    }
}
