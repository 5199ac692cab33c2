//! Query orchestration: parse → compile → store → stats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use cs_protocol::Record;
use cs_store::{DEFAULT_RESULT_LIMIT, Store};

use crate::error::QueryResult;
use crate::query::parse_at;
use crate::stats::{StatsCommand, StatsRow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Most records fetched from the store per query. Stats run over this
    /// capped set.
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
}

fn default_result_limit() -> usize {
    DEFAULT_RESULT_LIMIT
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            result_limit: default_result_limit(),
        }
    }
}

/// Result of a search: matching records, or rows when a stats command ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput {
    Records(Vec<Record>),
    Rows(Vec<StatsRow>),
}

impl QueryOutput {
    pub fn len(&self) -> usize {
        match self {
            Self::Records(records) => records.len(),
            Self::Rows(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The error message, when the output is a single error row.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Rows(rows) => match rows.as_slice() {
                [StatsRow::Error { error }] => Some(error.as_str()),
                _ => None,
            },
            Self::Records(_) => None,
        }
    }
}

pub struct QueryEngine {
    store: Arc<dyn Store>,
    config: EngineConfig,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn Store>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run `query` with relative times measured from the current instant.
    pub async fn search(&self, query: &str) -> QueryOutput {
        self.search_at(query, Utc::now()).await
    }

    /// Run `query` with relative times measured from `now`.
    ///
    /// Never fails: an unknown stats command or a store failure comes back as
    /// a single error row.
    pub async fn search_at(&self, query: &str, now: DateTime<Utc>) -> QueryOutput {
        match self.execute(query, now).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(query, error = %e, "search failed");
                QueryOutput::Rows(vec![StatsRow::error(e.to_string())])
            }
        }
    }

    async fn execute(&self, query: &str, now: DateTime<Utc>) -> QueryResult<QueryOutput> {
        let parsed = parse_at(query, now);
        let command = parsed
            .stats
            .as_deref()
            .map(str::parse::<StatsCommand>)
            .transpose()?;

        let predicate = parsed.predicate();
        let records = self.store.query(&predicate, self.config.result_limit).await?;
        tracing::info!(
            query,
            terms = parsed.terms.len(),
            matched = records.len(),
            limit = self.config.result_limit,
            "search executed"
        );

        Ok(match command {
            Some(command) => QueryOutput::Rows(command.run(&records)),
            None => QueryOutput::Records(records),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeDelta, TimeZone};
    use cs_protocol::{LogType, Predicate};
    use cs_store::{MemoryStore, StoreError, StoreResult};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 13, 12, 0, 0).unwrap()
    }

    fn access(ip: &str, status: &str, minutes_ago: i64) -> Record {
        let mut r = Record::new(LogType::Access, format!("{ip} GET / {status}"));
        r.ip = Some(ip.into());
        r.status = Some(status.into());
        r.timestamp = (now() - TimeDelta::minutes(minutes_ago))
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        r
    }

    fn engine(records: Vec<Record>) -> QueryEngine {
        QueryEngine::new(
            Arc::new(MemoryStore::with_records(records)),
            EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn plain_search_returns_records_newest_first() {
        let e = engine(vec![
            access("10.0.0.1", "200", 90),
            access("10.0.0.2", "404", 30),
        ]);
        let QueryOutput::Records(records) = e.search_at("*", now()).await else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ip.as_deref(), Some("10.0.0.2"));
    }

    #[tokio::test]
    async fn last_hour_excludes_older_records() {
        let e = engine(vec![
            access("10.0.0.1", "200", 120),
            access("10.0.0.2", "200", 30),
        ]);
        let QueryOutput::Records(records) = e.search_at("last=1h", now()).await else {
            panic!("expected records");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ip.as_deref(), Some("10.0.0.2"));
    }

    #[tokio::test]
    async fn stats_pipeline() {
        let e = engine(vec![
            access("10.0.0.1", "200", 5),
            access("10.0.0.1", "404", 4),
            access("10.0.0.2", "200", 3),
        ]);
        let out = e.search_at("status=200 | count", now()).await;
        assert_eq!(out, QueryOutput::Rows(vec![StatsRow::Count { count: 2 }]));

        let out = e.search_at("* | top(1, ip)", now()).await;
        assert_eq!(
            out,
            QueryOutput::Rows(vec![StatsRow::Group {
                value: "10.0.0.1".into(),
                count: 2
            }])
        );
    }

    #[tokio::test]
    async fn unknown_stats_command_is_an_error_row() {
        let e = engine(vec![access("10.0.0.1", "200", 5)]);
        let out = e.search_at("* | sparkline(ip)", now()).await;
        assert_eq!(out.error(), Some("Unknown stats command: sparkline(ip)"));
    }

    #[tokio::test]
    async fn stats_see_only_the_capped_result_set() {
        let records = (0..5).map(|i| access("10.0.0.1", "200", i)).collect();
        let e = QueryEngine::new(
            Arc::new(MemoryStore::with_records(records)),
            EngineConfig { result_limit: 3 },
        );
        let out = e.search_at("* | count", now()).await;
        assert_eq!(out, QueryOutput::Rows(vec![StatsRow::Count { count: 3 }]));
    }

    struct BrokenStore;

    #[async_trait]
    impl Store for BrokenStore {
        async fn insert(&self, _record: Record) -> bool {
            false
        }
        async fn commit(&self) -> StoreResult<()> {
            Ok(())
        }
        async fn query(&self, _p: &Predicate, _limit: usize) -> StoreResult<Vec<Record>> {
            Err(StoreError::Other("database is locked".into()))
        }
        async fn count(&self, _p: &Predicate) -> StoreResult<usize> {
            Err(StoreError::Other("database is locked".into()))
        }
    }

    #[tokio::test]
    async fn store_failure_is_an_error_row() {
        let e = QueryEngine::new(Arc::new(BrokenStore), EngineConfig::default());
        let out = e.search_at("error", now()).await;
        assert!(out.error().is_some_and(|m| m.contains("database is locked")));
    }

    #[test]
    fn output_serializes_untagged() {
        let out = QueryOutput::Rows(vec![StatsRow::Count { count: 1 }]);
        assert_eq!(serde_json::to_string(&out).unwrap(), r#"[{"count":1}]"#);
    }
}
