//! Ingestion error types.

use thiserror::Error;

/// Errors that can occur while reading or ingesting log data.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("source not found: {0}")]
    NotFound(String),

    #[error("invalid log format: {0}")]
    Format(String),

    #[error("store error: {0}")]
    Store(#[from] cs_store::StoreError),
}

/// Convenience alias for ingestion results.
pub type LogResult<T> = Result<T, LogError>;
