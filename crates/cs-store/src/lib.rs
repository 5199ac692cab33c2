//! Record storage for CoreSight.
//!
//! The search and ingestion layers only need "append records in batches" and
//! "return records matching a predicate, newest first". [`Store`] captures
//! that contract; [`MemoryStore`] serves tests and scratch sessions and
//! [`SqliteStore`] persists to disk.

pub mod error;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use cs_protocol::{Predicate, Record};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Default cap on the number of records returned by a query.
pub const DEFAULT_RESULT_LIMIT: usize = 1000;

/// Append-and-query record storage.
///
/// Inserted records become visible to [`Store::query`] once [`Store::commit`]
/// succeeds. Callers drive one ingest or one query at a time.
#[async_trait]
pub trait Store: Send + Sync {
    /// Stage a record for the next commit. Returns `false` if it was rejected.
    async fn insert(&self, record: Record) -> bool;

    /// Persist every staged record.
    async fn commit(&self) -> StoreResult<()>;

    /// Committed records matching `predicate`, most recently inserted first,
    /// at most `limit` of them.
    async fn query(&self, predicate: &Predicate, limit: usize) -> StoreResult<Vec<Record>>;

    /// Number of committed records matching `predicate`.
    async fn count(&self, predicate: &Predicate) -> StoreResult<usize>;
}

/// Records with an empty `raw` line are never stored.
pub(crate) fn is_storable(record: &Record) -> bool {
    !record.raw.is_empty()
}
