//! CLI Commands
//!
//! Argument definitions for the oracle binary. Handlers live in `main.rs`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// FlipFlop Oracle - price snapshot fetcher for the token-card game
#[derive(Parser, Debug)]
#[command(
    name = "flipflop-oracle",
    version = env!("CARGO_PKG_VERSION"),
    about = "Fetches USD prices for the tracked token universe and publishes a snapshot",
    long_about = "Walks the token universe against DexScreener with a GeckoTerminal \
                  fallback, backfills outages from the previous snapshot, and publishes \
                  the result for the leaderboard and card-economy consumers."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one full price refresh and publish the snapshot
    Refresh(RefreshCmd),

    /// Print the currently published snapshot
    Show(ShowCmd),

    /// Resolve a bare token address to its best trading pair
    Resolve(ResolveCmd),
}

/// Run one refresh
#[derive(Parser, Debug)]
pub struct RefreshCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Fetch and print the snapshot without publishing it
    #[arg(long)]
    pub dry_run: bool,
}

/// Show published snapshot
#[derive(Parser, Debug)]
pub struct ShowCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,
}

/// Resolve token to best pair
#[derive(Parser, Debug)]
pub struct ResolveCmd {
    /// Token contract address (0x...)
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Network to resolve on
    #[arg(short, long, value_name = "NETWORK", default_value = "base")]
    pub network: String,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,
}
