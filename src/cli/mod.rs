//! CLI module for the Repository Summarizer Gateway
//!
//! - `serve`: run the HTTP API (default mode)
//! - `migrate`: apply database migrations and exit
//! - `session`: issue a session token for a user

pub mod migrate;
pub mod serve;
pub mod session;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Repository Summarizer Gateway - metered API keys for AI repository summaries
#[derive(Parser)]
#[command(name = "repo-summarizer-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Apply pending database migrations
    Migrate,

    /// Issue a session token for the given user, creating the user if needed
    Session(session::SessionArgs),
}

/// Load `.env`, layered configuration and the global subscriber
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    Ok(config)
}
