//! CLI argument parsing.

use clap::{Parser, Subcommand};

/// Escalation service for overdue audit findings.
#[derive(Parser, Debug)]
#[command(name = "sitewatch-server", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server (and the cron scheduler when configured).
    Serve,
    /// Run a single escalation pass and print the JSON summary.
    RunOnce,
}
