//! Search layer for CoreSight.
//!
//! Parses the query language (`field=value`, keywords, quoted phrases,
//! `last=`/`earliest=`/`latest=` time ranges, `| stats` pipelines), compiles
//! terms into a [`cs_protocol::Predicate`], runs it against a
//! [`cs_store::Store`] and aggregates the results.

pub mod compile;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod query;
pub mod stats;

pub use compile::compile;
pub use dashboard::{Panel, PanelResult, default_panels};
pub use engine::{EngineConfig, QueryEngine, QueryOutput};
pub use error::{QueryError, QueryResult};
pub use query::{ParsedQuery, Term, parse, parse_at};
pub use stats::{BucketInterval, StatsCommand, StatsRow};
