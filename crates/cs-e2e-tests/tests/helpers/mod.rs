//! Shared harness for the end-to-end tests.
//!
//! Wires an `Ingestor` and a `QueryEngine` around one store so a test can
//! ingest sample files and query them back.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use cs_log_tools::{IngestConfig, IngestReport, Ingestor, MockLogSource};
use cs_protocol::Record;
use cs_search::{EngineConfig, QueryEngine, QueryOutput, StatsRow};
use cs_store::{MemoryStore, Store};

/// Year given to classic syslog samples.
pub const SAMPLE_YEAR: i32 = 2025;

pub struct Pipeline {
    pub store: Arc<dyn Store>,
    pub ingestor: Ingestor,
    pub engine: QueryEngine,
}

impl Pipeline {
    /// In-memory store, default batch size and result limit.
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn Store>) -> Self {
        Self::with_configs(store, ingest_config(), EngineConfig::default())
    }

    pub fn with_configs(store: Arc<dyn Store>, ingest: IngestConfig, engine: EngineConfig) -> Self {
        Self {
            ingestor: Ingestor::new(ingest),
            engine: QueryEngine::new(store.clone(), engine),
            store,
        }
    }

    /// A pipeline with every sample file already ingested.
    pub async fn with_all_samples() -> Self {
        let p = Self::new();
        let source = MockLogSource::with_all_samples();
        for path in [
            cs_log_tools::mock::SYSLOG_PATH,
            cs_log_tools::mock::AUTH_PATH,
            cs_log_tools::mock::ACCESS_PATH,
            cs_log_tools::mock::JSON_PATH,
            cs_log_tools::mock::WINDOWS_PATH,
        ] {
            p.ingest(&source, path).await;
        }
        p
    }

    pub async fn ingest(&self, source: &MockLogSource, path: &str) -> IngestReport {
        self.ingestor
            .ingest_file(path, source, self.store.as_ref())
            .await
            .unwrap()
    }

    pub async fn ingest_lines(&self, lines: &[&str]) -> IngestReport {
        let owned: Vec<String> = lines.iter().map(|l| (*l).to_string()).collect();
        self.ingestor
            .ingest_lines("inline", &owned, self.store.as_ref())
            .await
    }

    pub async fn records(&self, query: &str) -> Vec<Record> {
        records(self.engine.search(query).await)
    }

    pub async fn rows(&self, query: &str) -> Vec<StatsRow> {
        rows(self.engine.search(query).await)
    }
}

pub fn ingest_config() -> IngestConfig {
    IngestConfig {
        assumed_year: Some(SAMPLE_YEAR),
        ..IngestConfig::default()
    }
}

pub fn records(output: QueryOutput) -> Vec<Record> {
    match output {
        QueryOutput::Records(records) => records,
        QueryOutput::Rows(rows) => panic!("expected records, got rows: {rows:?}"),
    }
}

pub fn rows(output: QueryOutput) -> Vec<StatsRow> {
    match output {
        QueryOutput::Rows(rows) => rows,
        QueryOutput::Records(records) => panic!("expected rows, got {} records", records.len()),
    }
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

/// `(value, count)` pairs of group rows.
pub fn groups(rows: &[StatsRow]) -> Vec<(String, usize)> {
    rows.iter()
        .map(|row| match row {
            StatsRow::Group { value, count } => (value.clone(), *count),
            other => panic!("expected group row, got {other:?}"),
        })
        .collect()
}
