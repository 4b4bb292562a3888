//! CLI entry points

pub mod serve;

use clap::{Parser, Subcommand};

/// MLTrack - project, dataset and model lineage tracking for ML teams
#[derive(Parser)]
#[command(name = "mltrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,
}
