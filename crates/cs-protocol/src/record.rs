use std::borrow::Cow;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel stored in [`Record::timestamp`] when a line carries no usable time.
pub const UNKNOWN_TIMESTAMP: &str = "unknown";

// ── Log Type ──────────────────────────────────────────────────

/// Family a record was classified into at ingestion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Syslog,
    Access,
    Auth,
    Json,
    Windows,
    Generic,
}

impl LogType {
    pub const ALL: [LogType; 6] = [
        Self::Syslog,
        Self::Access,
        Self::Auth,
        Self::Json,
        Self::Windows,
        Self::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syslog => "syslog",
            Self::Access => "access",
            Self::Auth => "auth",
            Self::Json => "json",
            Self::Windows => "windows",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log type: {0}")]
pub struct UnknownLogType(pub String);

impl FromStr for LogType {
    type Err = UnknownLogType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or(UnknownLogType(s.to_string()))
    }
}

// ── Field ─────────────────────────────────────────────────────

/// Addressable record columns, shared by predicates, stats and storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    LogType,
    Timestamp,
    Host,
    Service,
    Message,
    Ip,
    Method,
    Endpoint,
    Status,
    Size,
    User,
    Action,
    Raw,
}

impl Field {
    pub const ALL: [Field; 13] = [
        Self::LogType,
        Self::Timestamp,
        Self::Host,
        Self::Service,
        Self::Message,
        Self::Ip,
        Self::Method,
        Self::Endpoint,
        Self::Status,
        Self::Size,
        Self::User,
        Self::Action,
        Self::Raw,
    ];

    /// Column name; also the name used in query text and stats rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LogType => "log_type",
            Self::Timestamp => "timestamp",
            Self::Host => "host",
            Self::Service => "service",
            Self::Message => "message",
            Self::Ip => "ip",
            Self::Method => "method",
            Self::Endpoint => "endpoint",
            Self::Status => "status",
            Self::Size => "size",
            Self::User => "user",
            Self::Action => "action",
            Self::Raw => "raw",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field: {0}")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    /// Case-insensitive; `type` is accepted as an alias of `log_type`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "type" {
            return Ok(Self::LogType);
        }
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == lower)
            .ok_or(UnknownField(s.to_string()))
    }
}

// ── Record ────────────────────────────────────────────────────

/// A normalized log entry.
///
/// `log_type` and `raw` are always present; everything else is whatever the
/// matching extractor could recover. Once handed to a store a record is never
/// modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub log_type: LogType,
    /// ISO-8601 text, [`UNKNOWN_TIMESTAMP`], or the original text when
    /// normalization failed.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// The line exactly as it was read.
    pub raw: String,
}

impl Record {
    /// An otherwise empty record with an unknown timestamp.
    pub fn new(log_type: LogType, raw: impl Into<String>) -> Self {
        Self {
            log_type,
            timestamp: UNKNOWN_TIMESTAMP.to_string(),
            host: None,
            service: None,
            message: None,
            ip: None,
            method: None,
            endpoint: None,
            status: None,
            size: 0,
            user: None,
            action: None,
            raw: raw.into(),
        }
    }

    /// Textual value of a field, `None` when the field is null.
    pub fn field(&self, field: Field) -> Option<Cow<'_, str>> {
        fn borrowed(v: &Option<String>) -> Option<Cow<'_, str>> {
            v.as_deref().map(Cow::Borrowed)
        }
        match field {
            Field::LogType => Some(Cow::Borrowed(self.log_type.as_str())),
            Field::Timestamp => Some(Cow::Borrowed(self.timestamp.as_str())),
            Field::Host => borrowed(&self.host),
            Field::Service => borrowed(&self.service),
            Field::Message => borrowed(&self.message),
            Field::Ip => borrowed(&self.ip),
            Field::Method => borrowed(&self.method),
            Field::Endpoint => borrowed(&self.endpoint),
            Field::Status => borrowed(&self.status),
            Field::Size => Some(Cow::Owned(self.size.to_string())),
            Field::User => borrowed(&self.user),
            Field::Action => borrowed(&self.action),
            Field::Raw => Some(Cow::Borrowed(self.raw.as_str())),
        }
    }

    /// The record's timestamp as a UTC instant, if it is a parseable ISO value.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        timestamp_instant(&self.timestamp)
    }
}

/// Interpret a stored timestamp as a UTC instant.
///
/// Offset-aware values are converted to UTC; naive values are taken as UTC.
/// Returns `None` for the unknown sentinel and for anything not in ISO form.
pub fn timestamp_instant(ts: &str) -> Option<DateTime<Utc>> {
    if ts == UNKNOWN_TIMESTAMP {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(ts, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(ts, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|ndt| ndt.and_utc())
}
