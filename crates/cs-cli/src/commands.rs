//! Subcommand execution.

use std::io::Write;
use std::sync::Arc;

use cs_log_tools::{FileLogSource, FormatChain, Ingestor};
use cs_search::{QueryEngine, QueryOutput, default_panels};
use cs_store::{MemoryStore, SqliteStore, Store};

use crate::cli::Command;
use crate::config::CoreSightConfig;
use crate::output::write_json_lines;

/// Open the store named by `config.database`.
pub async fn open_store(config: &CoreSightConfig) -> anyhow::Result<Arc<dyn Store>> {
    if config.is_in_memory() {
        tracing::info!("using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = SqliteStore::open(&config.database).await?;
    tracing::info!(database = %config.database, "sqlite store opened");
    Ok(Arc::new(store))
}

/// Run one subcommand against `store`, writing results to `out`.
pub async fn run<W: Write>(
    command: Command,
    config: &CoreSightConfig,
    store: Arc<dyn Store>,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Ingest { path, formats } => {
            let mut ingestor = Ingestor::new(config.ingest_config());
            if !formats.is_empty() {
                ingestor = ingestor.with_chain(FormatChain::only(&formats));
            }
            let summary = ingestor
                .ingest_file_summary(&path, &FileLogSource, store.as_ref())
                .await;
            writeln!(out, "{summary}")?;
        }
        Command::Search { query } => {
            let engine = QueryEngine::new(store, config.engine_config());
            match engine.search(&query).await {
                QueryOutput::Records(records) => write_json_lines(out, &records)?,
                QueryOutput::Rows(rows) => write_json_lines(out, &rows)?,
            }
        }
        Command::Dashboard => {
            let engine = QueryEngine::new(store, config.engine_config());
            let results = engine.run_dashboard(&default_panels()).await;
            write_json_lines(out, &results)?;
        }
    }
    Ok(())
}
