//! Shared types for CoreSight.
//!
//! The normalized [`Record`] produced by ingestion and the structured
//! [`Predicate`] tree produced by the query layer. Storage backends depend on
//! this crate only, so they can evaluate or translate predicates without
//! knowing anything about the query language.

pub mod predicate;
pub mod record;

pub use predicate::*;
pub use record::*;
