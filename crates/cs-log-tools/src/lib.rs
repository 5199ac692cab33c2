//! Log normalization for CoreSight.
//!
//! Provides the priority-ordered format chain (JSON, Windows XML events, web
//! access, ISO and classic syslog with auth sub-detection, generic fallback),
//! timestamp normalization, a `LogSource` abstraction for testability, and the
//! batching `Ingestor` that feeds a [`cs_store::Store`].

pub mod error;
pub mod ingest;
pub mod mock;
pub mod parsers;
pub mod source;
pub mod timestamp;
pub mod types;

// Re-export key types for convenience
pub use error::{LogError, LogResult};
pub use ingest::{IngestConfig, IngestReport, Ingestor};
pub use mock::MockLogSource;
pub use parsers::{FormatChain, parse_line};
pub use source::{FileLogSource, LogSource};
pub use timestamp::{TimestampDialect, normalize};
pub use types::{LineParser, LogFormat, ParseContext};
