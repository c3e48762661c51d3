//! CLI interface for synth-feed
//!
//! Provides subcommands for:
//! - `run`: Stream synthetic ticks as JSON lines
//! - `config`: Show the effective configuration

mod run;

pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "synth-feed")]
#[command(about = "Synthetic market tick generator")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream synthetic ticks to stdout
    Run(RunArgs),
    /// Show the effective configuration
    Config,
}
