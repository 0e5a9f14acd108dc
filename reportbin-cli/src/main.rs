// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! reportbin CLI
//!
//! Command-line interface for the reportbin report store.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod gateway;
mod metrics;
mod upstash;

/// reportbin - Ephemeral shareable JSON reports
#[derive(Parser)]
#[command(name = "reportbin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults plus environment when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the configured listen port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Serve { port } => commands::serve::execute(cli.config.as_deref(), port).await,
        Commands::Validate { file } => commands::validate::execute(&file).await,
    }
}
