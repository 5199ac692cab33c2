//! Batching ingestion: source lines → format chain → store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use cs_protocol::{LogType, Record};
use cs_store::Store;

use crate::error::{LogError, LogResult};
use crate::parsers::FormatChain;
use crate::source::LogSource;
use crate::types::ParseContext;

pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Ingestion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Records staged before each store commit.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Year for classic syslog timestamps; current UTC year when unset.
    #[serde(default)]
    pub assumed_year: Option<i32>,
    /// When false, lines no specific format recognizes count as errors
    /// instead of becoming `generic` records.
    #[serde(default = "default_generic_fallback")]
    pub generic_fallback: bool,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_generic_fallback() -> bool {
    true
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            assumed_year: None,
            generic_fallback: default_generic_fallback(),
        }
    }
}

// ── Ingest Report ─────────────────────────────────────────────

/// Outcome of ingesting one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub path: String,
    /// Non-blank lines considered.
    pub lines_read: usize,
    /// Records committed to the store.
    pub ingested: usize,
    /// Lines that matched no format, were rejected by the store, or were
    /// lost with a failed commit.
    pub errors: usize,
    /// Committed records per log type.
    pub by_type: BTreeMap<LogType, usize>,
}

impl IngestReport {
    fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Self::default()
        }
    }
}

impl fmt::Display for IngestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ingested {} events from {} ", self.ingested, self.path)?;
        match self.by_type.len() {
            0 => f.write_str("(no recognizable format)")?,
            1 => {
                let (log_type, _) = self.by_type.iter().next().ok_or(fmt::Error)?;
                write!(f, "({log_type} format)")?;
            }
            _ => {
                let parts: Vec<String> = self
                    .by_type
                    .iter()
                    .map(|(t, n)| format!("{t}={n}"))
                    .collect();
                write!(f, "(mixed format: {})", parts.join(", "))?;
            }
        }
        if self.errors > 0 {
            write!(f, " ({} errors)", self.errors)?;
        }
        Ok(())
    }
}

// ── Ingestor ──────────────────────────────────────────────────

/// Drives lines through the format chain and hands records to a store in
/// fixed-size batches. A bad line never aborts the file.
pub struct Ingestor {
    chain: FormatChain,
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(config: IngestConfig) -> Self {
        let chain = Self::apply_fallback(FormatChain::standard(), &config);
        Self { chain, config }
    }

    /// Replace the format chain, e.g. with [`FormatChain::only`] for a
    /// forced format.
    pub fn with_chain(mut self, chain: FormatChain) -> Self {
        self.chain = Self::apply_fallback(chain, &self.config);
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    fn apply_fallback(chain: FormatChain, config: &IngestConfig) -> FormatChain {
        if config.generic_fallback {
            chain
        } else {
            chain.without_fallback()
        }
    }

    fn context(&self) -> ParseContext {
        self.config
            .assumed_year
            .map(ParseContext::with_year)
            .unwrap_or_default()
    }

    /// Read `path` from `source` and ingest every line into `store`.
    ///
    /// Errors only when the file cannot be read; per-line problems are
    /// counted in the report.
    pub async fn ingest_file(
        &self,
        path: &str,
        source: &dyn LogSource,
        store: &dyn Store,
    ) -> LogResult<IngestReport> {
        let lines = source.read_lines(path).await?;
        Ok(self.ingest_lines(path, &lines, store).await)
    }

    /// Like [`Ingestor::ingest_file`], but always yields a human-readable
    /// status line.
    pub async fn ingest_file_summary(
        &self,
        path: &str,
        source: &dyn LogSource,
        store: &dyn Store,
    ) -> String {
        if !source.exists(path).await {
            return format!("Error: File '{path}' not found.");
        }
        match self.ingest_file(path, source, store).await {
            Ok(report) => report.to_string(),
            Err(LogError::NotFound(_)) => format!("Error: File '{path}' not found."),
            Err(e) => format!("Error reading file: {e}"),
        }
    }

    /// Ingest already-read lines; `label` names them in the report.
    pub async fn ingest_lines(
        &self,
        label: &str,
        lines: &[String],
        store: &dyn Store,
    ) -> IngestReport {
        let ctx = self.context();
        let batch_size = self.config.batch_size.max(1);
        let mut report = IngestReport::new(label);
        let mut batch: Vec<Record> = Vec::with_capacity(batch_size);

        for (idx, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            report.lines_read += 1;

            match self.chain.parse(line, &ctx) {
                Some((_, record)) => {
                    batch.push(record);
                    if batch.len() >= batch_size {
                        flush(&mut batch, store, &mut report).await;
                    }
                }
                None => {
                    tracing::debug!(path = label, line = idx + 1, "no format matched");
                    report.errors += 1;
                }
            }
        }
        flush(&mut batch, store, &mut report).await;

        tracing::info!(
            path = label,
            lines = report.lines_read,
            ingested = report.ingested,
            errors = report.errors,
            "ingest complete"
        );
        report
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(IngestConfig::default())
    }
}

/// Insert and commit one batch. Records only count as ingested once the
/// commit succeeds; a failed commit loses the whole batch.
async fn flush(batch: &mut Vec<Record>, store: &dyn Store, report: &mut IngestReport) {
    if batch.is_empty() {
        return;
    }

    let mut staged = Vec::with_capacity(batch.len());
    for record in batch.drain(..) {
        let log_type = record.log_type;
        if store.insert(record).await {
            staged.push(log_type);
        } else {
            report.errors += 1;
        }
    }

    match store.commit().await {
        Ok(()) => {
            tracing::debug!(records = staged.len(), "batch committed");
            report.ingested += staged.len();
            for log_type in staged {
                *report.by_type.entry(log_type).or_default() += 1;
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, lost = staged.len(), "batch commit failed");
            report.errors += staged.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{self, MockLogSource};
    use async_trait::async_trait;
    use cs_protocol::Predicate;
    use cs_store::{MemoryStore, StoreError, StoreResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config() -> IngestConfig {
        IngestConfig {
            assumed_year: Some(2025),
            ..IngestConfig::default()
        }
    }

    /// Counts commits and optionally fails every one of them.
    struct RecordingStore {
        inner: MemoryStore,
        commits: AtomicUsize,
        fail_commits: bool,
    }

    impl RecordingStore {
        fn new(fail_commits: bool) -> Self {
            Self {
                inner: MemoryStore::new(),
                commits: AtomicUsize::new(0),
                fail_commits,
            }
        }
    }

    #[async_trait]
    impl Store for RecordingStore {
        async fn insert(&self, record: Record) -> bool {
            self.inner.insert(record).await
        }

        async fn commit(&self) -> StoreResult<()> {
            self.commits.fetch_add(1, Ordering::SeqCst);
            if self.fail_commits {
                return Err(StoreError::Other("disk full".into()));
            }
            self.inner.commit().await
        }

        async fn query(&self, predicate: &Predicate, limit: usize) -> StoreResult<Vec<Record>> {
            self.inner.query(predicate, limit).await
        }

        async fn count(&self, predicate: &Predicate) -> StoreResult<usize> {
            self.inner.count(predicate).await
        }
    }

    #[tokio::test]
    async fn single_format_file() {
        let source = MockLogSource::with_access_sample();
        let store = MemoryStore::new();
        let report = Ingestor::new(config())
            .ingest_file(mock::ACCESS_PATH, &source, &store)
            .await
            .unwrap();

        assert_eq!(report.ingested, 5);
        assert_eq!(report.errors, 0);
        assert_eq!(store.len().await, 5);
        assert_eq!(
            report.to_string(),
            "Ingested 5 events from /var/log/nginx/access.log (access format)"
        );
    }

    #[tokio::test]
    async fn mixed_file_reports_every_type_and_skips_blanks() {
        let source = MockLogSource::with_mixed_sample();
        let store = MemoryStore::new();
        let report = Ingestor::new(config())
            .ingest_file(mock::MIXED_PATH, &source, &store)
            .await
            .unwrap();

        assert_eq!(report.lines_read, 7);
        assert_eq!(report.ingested, 7);
        assert_eq!(report.by_type[&LogType::Syslog], 2);
        assert_eq!(report.by_type[&LogType::Generic], 1);
        assert_eq!(
            report.to_string(),
            "Ingested 7 events from /var/log/mixed.log \
             (mixed format: syslog=2, access=1, auth=1, json=1, windows=1, generic=1)"
        );
    }

    #[tokio::test]
    async fn batches_commit_at_batch_size() {
        let source = MockLogSource::with_access_sample();
        let store = RecordingStore::new(false);
        let ingestor = Ingestor::new(IngestConfig {
            batch_size: 2,
            ..config()
        });
        let report = ingestor
            .ingest_file(mock::ACCESS_PATH, &source, &store)
            .await
            .unwrap();

        assert_eq!(report.ingested, 5);
        // 2 + 2 + trailing 1
        assert_eq!(store.commits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failed_commit_counts_batch_as_errors() {
        let source = MockLogSource::with_auth_sample();
        let store = RecordingStore::new(true);
        let report = Ingestor::new(config())
            .ingest_file(mock::AUTH_PATH, &source, &store)
            .await
            .unwrap();

        assert_eq!(report.ingested, 0);
        assert_eq!(report.errors, 5);
        assert_eq!(
            report.to_string(),
            "Ingested 0 events from /var/log/auth.log (no recognizable format) (5 errors)"
        );
    }

    #[tokio::test]
    async fn without_generic_fallback_unmatched_lines_are_errors() {
        let source = MockLogSource::with_mixed_sample();
        let store = MemoryStore::new();
        let ingestor = Ingestor::new(IngestConfig {
            generic_fallback: false,
            ..config()
        });
        let report = ingestor
            .ingest_file(mock::MIXED_PATH, &source, &store)
            .await
            .unwrap();

        assert_eq!(report.ingested, 6);
        assert_eq!(report.errors, 1);
        assert!(report.to_string().ends_with("(1 errors)"));
    }

    #[tokio::test]
    async fn forced_format_chain() {
        let source = MockLogSource::with_mixed_sample();
        let store = MemoryStore::new();
        let ingestor = Ingestor::new(config()).with_chain(FormatChain::only(&[
            crate::types::LogFormat::WebAccess,
        ]));
        let report = ingestor
            .ingest_file(mock::MIXED_PATH, &source, &store)
            .await
            .unwrap();

        assert_eq!(report.by_type[&LogType::Access], 1);
        assert_eq!(report.by_type[&LogType::Generic], 6);
    }

    #[tokio::test]
    async fn summary_reports_missing_file() {
        let source = MockLogSource::new();
        let store = MemoryStore::new();
        let msg = Ingestor::default()
            .ingest_file_summary("/tmp/missing.log", &source, &store)
            .await;
        assert_eq!(msg, "Error: File '/tmp/missing.log' not found.");
    }

    #[tokio::test]
    async fn records_carry_assumed_year() {
        let source = MockLogSource::with_syslog_sample();
        let store = MemoryStore::new();
        Ingestor::new(IngestConfig {
            assumed_year: Some(2023),
            ..IngestConfig::default()
        })
        .ingest_file(mock::SYSLOG_PATH, &source, &store)
        .await
        .unwrap();

        let rows = store.query(&Predicate::always(), 10).await.unwrap();
        assert!(rows.iter().all(|r| r.timestamp.starts_with("2023-01-12T")));
    }
}
