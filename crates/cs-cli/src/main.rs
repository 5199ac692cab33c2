//! `coresight`: ingest log files and search them from the command line.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cs_cli::commands;
use cs_cli::{Cli, CoreSightConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CoreSightConfig::load(cli.config.as_deref())?;
    init_tracing(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "coresight starting");

    let store = commands::open_store(&config).await?;
    let mut stdout = std::io::stdout().lock();
    commands::run(cli.command, &config, store, &mut stdout).await
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(config: &CoreSightConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}
