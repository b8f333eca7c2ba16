mod cli;
mod config;
mod db;
mod dispatch;
mod error;
mod fingerprint;
mod index;
mod memory;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mnemo", version, about = "Local persistent memory and semantic retrieval engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the request server (stdio or tcp transport, per config)
    Serve,
    /// Show store statistics
    Stats,
    /// Search memories from the terminal
    Search {
        /// Query text to match against content, tags, and categories
        query: String,
        /// Maximum number of results
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Delete old, unimportant, rarely accessed memories
    Cleanup {
        /// Only memories older than this many days are considered
        #[arg(long, default_value_t = 30)]
        days: i64,
        /// Only memories below this importance are considered
        #[arg(long, default_value_t = 3)]
        min_importance: i64,
    },
    /// Drop and rebuild the lexical index and fingerprints
    Reindex,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::MnemoConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for the line protocol.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            server::serve(config).await?;
        }
        Command::Stats => {
            cli::stats::stats(&config)?;
        }
        Command::Search { query, limit } => {
            cli::search::search(&config, &query, limit)?;
        }
        Command::Cleanup {
            days,
            min_importance,
        } => {
            cli::cleanup::cleanup(&config, days, min_importance)?;
        }
        Command::Reindex => {
            cli::reindex::reindex(&config)?;
        }
    }

    Ok(())
}
