//! SQLite-backed store.
//!
//! Predicates are translated into a parameter-bound `WHERE` clause; the only
//! text spliced into the SQL is column names taken from [`Field::as_str`].

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use tokio::sync::Mutex;

use cs_protocol::{Comparison, Field, LogType, Predicate, Record};

use crate::error::{StoreError, StoreResult};
use crate::{Store, is_storable};

const SELECT_COLUMNS: &str = "SELECT id, log_type, timestamp, host, service, message, ip, \
     method, endpoint, status, size, user, action, raw FROM logs WHERE ";

const INSERT_SQL: &str = "INSERT INTO logs (
        log_type, timestamp, ts_epoch, host, service, message, ip,
        method, endpoint, status, size, user, action, raw
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// A [`Store`] persisted in a SQLite database file (or `:memory:`).
pub struct SqliteStore {
    pool: SqlitePool,
    pending: Mutex<Vec<Record>>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and apply the schema.
    pub async fn open(path: &str) -> StoreResult<Self> {
        let options = if path == ":memory:" {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
        };

        // One connection: an in-memory database lives and dies with it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        tracing::debug!(path, "applying store schema");
        sqlx::raw_sql(include_str!("../migrations/001_logs.sql"))
            .execute(&pool)
            .await?;

        Ok(Self {
            pool,
            pending: Mutex::new(Vec::new()),
        })
    }

    pub async fn in_memory() -> StoreResult<Self> {
        Self::open(":memory:").await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert(&self, record: Record) -> bool {
        if !is_storable(&record) {
            return false;
        }
        self.pending.lock().await.push(record);
        true
    }

    async fn commit(&self) -> StoreResult<()> {
        let staged = std::mem::take(&mut *self.pending.lock().await);
        if staged.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for r in &staged {
            sqlx::query(INSERT_SQL)
                .bind(r.log_type.as_str())
                .bind(&r.timestamp)
                .bind(r.instant().map(|t| t.timestamp_millis()))
                .bind(&r.host)
                .bind(&r.service)
                .bind(&r.message)
                .bind(&r.ip)
                .bind(&r.method)
                .bind(&r.endpoint)
                .bind(&r.status)
                .bind(r.size)
                .bind(&r.user)
                .bind(&r.action)
                .bind(&r.raw)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::debug!(records = staged.len(), "sqlite store commit");
        Ok(())
    }

    async fn query(&self, predicate: &Predicate, limit: usize) -> StoreResult<Vec<Record>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
        push_predicate(&mut qb, predicate);
        qb.push(" ORDER BY id DESC LIMIT ");
        qb.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn count(&self, predicate: &Predicate) -> StoreResult<usize> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM logs WHERE ");
        push_predicate(&mut qb, predicate);

        let row = qb.build().fetch_one(&self.pool).await?;
        let count: i64 = row.try_get(0)?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

fn push_predicate(qb: &mut QueryBuilder<'_, Sqlite>, predicate: &Predicate) {
    match predicate {
        Predicate::All(children) => push_group(qb, children, " AND ", "1 = 1"),
        Predicate::Any(children) => push_group(qb, children, " OR ", "1 = 0"),
        Predicate::Compare(c) => push_comparison(qb, c),
    }
}

fn push_group(qb: &mut QueryBuilder<'_, Sqlite>, children: &[Predicate], joiner: &str, empty: &str) {
    if children.is_empty() {
        qb.push(empty);
        return;
    }
    qb.push("(");
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            qb.push(joiner);
        }
        push_predicate(qb, child);
    }
    qb.push(")");
}

fn push_comparison(qb: &mut QueryBuilder<'_, Sqlite>, comparison: &Comparison) {
    match comparison {
        Comparison::Equals { field, value } => {
            qb.push(text_column(*field));
            qb.push(" = ");
            qb.push_bind(value.clone());
        }
        Comparison::Contains { field, needle } => {
            qb.push("instr(lower(");
            qb.push(text_column(*field));
            qb.push("), ");
            qb.push_bind(needle.clone());
            qb.push(") > 0");
        }
        Comparison::NotNull { field } => {
            qb.push(field.as_str());
            qb.push(" IS NOT NULL");
        }
        Comparison::TimestampAtLeast { bound } => {
            qb.push("ts_epoch >= ");
            qb.push_bind(bound.timestamp_millis());
        }
        Comparison::TimestampAtMost { bound } => {
            qb.push("ts_epoch <= ");
            qb.push_bind(bound.timestamp_millis());
        }
    }
}

/// Column expression compared as text.
fn text_column(field: Field) -> &'static str {
    match field {
        Field::Size => "CAST(size AS TEXT)",
        other => other.as_str(),
    }
}

fn record_from_row(row: &SqliteRow) -> StoreResult<Record> {
    let id: i64 = row.try_get("id")?;
    let log_type: String = row.try_get("log_type")?;
    let log_type = LogType::from_str(&log_type).map_err(|e| StoreError::Corrupt {
        id,
        message: e.to_string(),
    })?;

    Ok(Record {
        log_type,
        timestamp: row.try_get("timestamp")?,
        host: row.try_get("host")?,
        service: row.try_get("service")?,
        message: row.try_get("message")?,
        ip: row.try_get("ip")?,
        method: row.try_get("method")?,
        endpoint: row.try_get("endpoint")?,
        status: row.try_get("status")?,
        size: row.try_get("size")?,
        user: row.try_get("user")?,
        action: row.try_get("action")?,
        raw: row.try_get("raw")?,
    })
}
