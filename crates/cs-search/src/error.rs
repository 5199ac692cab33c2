//! Query execution errors.
//!
//! These never escape [`crate::QueryEngine::search`]; they are rendered into
//! an error row instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Unknown stats command: {0}")]
    UnknownStatsCommand(String),

    #[error("store error: {0}")]
    Store(#[from] cs_store::StoreError),
}

pub type QueryResult<T> = Result<T, QueryError>;
