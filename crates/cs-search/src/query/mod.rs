//! Query language parsing.
//!
//! ```text
//! query        := search_terms ['|' stats_cmd]
//! search_terms := term (whitespace term)*
//! term         := field '=' value | 'last=' N unit | 'earliest=' spec
//!               | 'latest=' spec | '*' | quoted_phrase | keyword
//! ```
//!
//! Parsing never fails: terms that cannot be understood (unknown field,
//! malformed time, empty value) are dropped and the rest of the query still
//! runs.

pub mod timespec;
pub mod tokenizer;

use chrono::{DateTime, Utc};

use cs_protocol::{Field, Predicate};

use crate::compile::compile;
use tokenizer::{Token, split_pipeline, tokenize};

/// One filter contributed by a query token. Terms combine with AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Exact match on a categorical field (`ip`, `status`, `log_type`, `method`).
    FieldEquals { field: Field, value: String },
    /// Case-insensitive substring match on a free-text field.
    FieldContains { field: Field, value: String },
    /// Free text searched across the text-bearing fields.
    Keyword(String),
    /// Lower time bound (inclusive).
    Since(DateTime<Utc>),
    /// Upper time bound (inclusive).
    Until(DateTime<Utc>),
}

/// A query split into filter terms and an optional stats command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub terms: Vec<Term>,
    /// Text after the first top-level `|`, trimmed; `None` if absent or blank.
    pub stats: Option<String>,
}

impl ParsedQuery {
    pub fn predicate(&self) -> Predicate {
        compile(&self.terms)
    }
}

/// Parse `query` with relative times measured from the current instant.
pub fn parse(query: &str) -> ParsedQuery {
    parse_at(query, Utc::now())
}

/// Parse `query` with relative times measured from `now`.
pub fn parse_at(query: &str, now: DateTime<Utc>) -> ParsedQuery {
    let (search, stats) = split_pipeline(query);
    let terms = tokenize(search)
        .into_iter()
        .filter_map(|token| {
            let term = classify(&token, now);
            if term.is_none() && token.text != "*" {
                tracing::debug!(token = %token.text, "query term dropped");
            }
            term
        })
        .collect();

    ParsedQuery {
        terms,
        stats: stats.map(String::from),
    }
}

fn classify(token: &Token, now: DateTime<Utc>) -> Option<Term> {
    if token.quoted {
        return keyword(&token.text);
    }
    if token.text == "*" {
        return None;
    }
    let Some((key, value)) = token.text.split_once('=') else {
        return keyword(&token.text);
    };

    let key = key.trim().to_ascii_lowercase();
    let value = value.trim();
    match key.as_str() {
        "last" => timespec::parse_last(value, now).map(Term::Since),
        "earliest" => timespec::parse_time_spec(value, now).map(Term::Since),
        "latest" => timespec::parse_time_spec(value, now).map(Term::Until),
        _ => field_term(&key, value),
    }
}

fn keyword(text: &str) -> Option<Term> {
    (!text.is_empty()).then(|| Term::Keyword(text.to_string()))
}

fn field_term(key: &str, value: &str) -> Option<Term> {
    if value.is_empty() {
        return None;
    }
    let field: Field = key.parse().ok()?;
    match field {
        Field::LogType => Some(Term::FieldEquals {
            field,
            value: value.to_lowercase(),
        }),
        Field::Ip | Field::Status | Field::Method => Some(Term::FieldEquals {
            field,
            value: value.to_string(),
        }),
        Field::Host
        | Field::Service
        | Field::Message
        | Field::User
        | Field::Endpoint
        | Field::Action => Some(Term::FieldContains {
            field,
            value: value.to_string(),
        }),
        Field::Timestamp | Field::Size | Field::Raw => None,
    }
}
