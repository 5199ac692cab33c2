//! CoreSight command-line front end.
//!
//! Thin wiring around the library crates: load config, open a store, then
//! ingest a file, run a search, or evaluate the canned dashboard.

pub mod cli;
pub mod commands;
pub mod config;
pub mod output;

pub use cli::{Cli, Command};
pub use config::CoreSightConfig;
