//! In-memory store for tests and throwaway sessions.

use async_trait::async_trait;
use tokio::sync::RwLock;

use cs_protocol::{Predicate, Record};

use crate::error::StoreResult;
use crate::{Store, is_storable};

#[derive(Default)]
struct Inner {
    committed: Vec<Record>,
    pending: Vec<Record>,
}

/// A [`Store`] that keeps every record in a `Vec`, in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose committed contents are `records` (oldest first).
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                committed: records,
                pending: Vec::new(),
            }),
        }
    }

    /// Number of committed records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.committed.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of records staged but not yet committed.
    pub async fn pending(&self) -> usize {
        self.inner.read().await.pending.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, record: Record) -> bool {
        if !is_storable(&record) {
            return false;
        }
        self.inner.write().await.pending.push(record);
        true
    }

    async fn commit(&self) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let staged = std::mem::take(&mut inner.pending);
        tracing::debug!(records = staged.len(), "memory store commit");
        inner.committed.extend(staged);
        Ok(())
    }

    async fn query(&self, predicate: &Predicate, limit: usize) -> StoreResult<Vec<Record>> {
        let inner = self.inner.read().await;
        Ok(inner
            .committed
            .iter()
            .rev()
            .filter(|r| predicate.matches(r))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, predicate: &Predicate) -> StoreResult<usize> {
        let inner = self.inner.read().await;
        Ok(inner
            .committed
            .iter()
            .filter(|r| predicate.matches(r))
            .count())
    }
}
