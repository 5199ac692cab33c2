//! Command-line arguments.

use clap::{Parser, Subcommand};

use cs_log_tools::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "coresight", version, about = "Ingest and search security logs")]
pub struct Cli {
    /// Path to a TOML config file (default: ./coresight.toml if present).
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest a log file into the store.
    Ingest {
        path: String,
        /// Only try these formats (repeatable); the generic fallback stays on.
        #[arg(long = "format")]
        formats: Vec<LogFormat>,
    },
    /// Run a query and print results as JSON lines.
    Search { query: String },
    /// Evaluate the canned dashboard panels.
    Dashboard,
}
