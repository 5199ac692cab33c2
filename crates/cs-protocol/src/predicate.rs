//! Structured query predicates.
//!
//! A predicate is a tree of AND / OR nodes over typed leaf comparisons.
//! Backends either evaluate it directly ([`Predicate::matches`]) or translate
//! it into their own query language with bound parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{Field, Record};

/// A single leaf comparison against one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Comparison {
    /// Field is non-null and equal to `value` (case-sensitive).
    Equals { field: Field, value: String },
    /// Field is non-null and contains `needle`, ignoring ASCII case.
    /// `needle` is stored ASCII-lower-cased; non-ASCII letters compare as-is,
    /// the same folding SQLite's `lower()` applies.
    Contains { field: Field, needle: String },
    /// Field is non-null.
    NotNull { field: Field },
    /// Timestamp parses and is at or after `bound`.
    TimestampAtLeast { bound: DateTime<Utc> },
    /// Timestamp parses and is at or before `bound`.
    TimestampAtMost { bound: DateTime<Utc> },
}

impl Comparison {
    pub fn equals(field: Field, value: impl Into<String>) -> Self {
        Self::Equals {
            field,
            value: value.into(),
        }
    }

    pub fn contains(field: Field, needle: &str) -> Self {
        Self::Contains {
            field,
            needle: needle.to_ascii_lowercase(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Equals { field, value } => {
                record.field(*field).is_some_and(|v| v == value.as_str())
            }
            Self::Contains { field, needle } => record
                .field(*field)
                .is_some_and(|v| v.to_ascii_lowercase().contains(needle.as_str())),
            Self::NotNull { field } => record.field(*field).is_some(),
            Self::TimestampAtLeast { bound } => record.instant().is_some_and(|t| t >= *bound),
            Self::TimestampAtMost { bound } => record.instant().is_some_and(|t| t <= *bound),
        }
    }
}

/// Boolean filter over records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Every child matches. An empty list matches everything.
    All(Vec<Predicate>),
    /// At least one child matches. An empty list matches nothing.
    Any(Vec<Predicate>),
    Compare(Comparison),
}

impl Predicate {
    /// The predicate that accepts every record.
    pub fn always() -> Self {
        Self::All(Vec::new())
    }

    pub fn leaf(comparison: Comparison) -> Self {
        Self::Compare(comparison)
    }

    /// Case-insensitive substring match on `field`, guarded by a null check.
    pub fn field_contains(field: Field, needle: &str) -> Self {
        Self::All(vec![
            Self::Compare(Comparison::NotNull { field }),
            Self::Compare(Comparison::contains(field, needle)),
        ])
    }

    /// True when this predicate places no restriction on records.
    pub fn is_always(&self) -> bool {
        match self {
            Self::All(children) => children.iter().all(Predicate::is_always),
            _ => false,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::All(children) => children.iter().all(|p| p.matches(record)),
            Self::Any(children) => children.iter().any(|p| p.matches(record)),
            Self::Compare(c) => c.matches(record),
        }
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self::always()
    }
}

impl From<Comparison> for Predicate {
    fn from(c: Comparison) -> Self {
        Self::Compare(c)
    }
}
