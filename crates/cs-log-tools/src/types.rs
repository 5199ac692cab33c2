//! Core ingestion types and the `LineParser` trait.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use cs_protocol::Record;

use crate::error::LogError;

// ── Log Format ────────────────────────────────────────────────

/// Line formats the chain can recognize, in probe priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// A single JSON object per line.
    Json,
    /// A Windows `<Event>` XML document on one line.
    WindowsXml,
    /// Apache/nginx common or combined access log.
    WebAccess,
    /// Syslog-style line with an ISO-8601 timestamp prefix.
    IsoSyslog,
    /// BSD syslog line (`Mon DD HH:MM:SS`), no year.
    ClassicSyslog,
    /// Anything else.
    Generic,
}

impl LogFormat {
    /// Probe order of the standard chain.
    pub const PRIORITY: [LogFormat; 6] = [
        Self::Json,
        Self::WindowsXml,
        Self::WebAccess,
        Self::IsoSyslog,
        Self::ClassicSyslog,
        Self::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::WindowsXml => "windows_xml",
            Self::WebAccess => "web_access",
            Self::IsoSyslog => "iso_syslog",
            Self::ClassicSyslog => "classic_syslog",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = LogError;

    /// Accepts the canonical names plus the everyday aliases users type
    /// (`access`, `syslog`, `windows`, `xml`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "windows_xml" | "windows" | "xml" => Ok(Self::WindowsXml),
            "web_access" | "access" => Ok(Self::WebAccess),
            "iso_syslog" => Ok(Self::IsoSyslog),
            "classic_syslog" => Ok(Self::ClassicSyslog),
            "generic" => Ok(Self::Generic),
            other => Err(LogError::Format(other.to_string())),
        }
    }
}

// ── Parse Context ─────────────────────────────────────────────

/// Inputs a parser needs beyond the line itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseContext {
    /// Year given to classic syslog timestamps, which carry none.
    pub assumed_year: i32,
}

impl ParseContext {
    pub fn with_year(assumed_year: i32) -> Self {
        Self { assumed_year }
    }
}

impl Default for ParseContext {
    fn default() -> Self {
        Self {
            assumed_year: Utc::now().year(),
        }
    }
}

// ── LineParser Trait ──────────────────────────────────────────

/// One link in the format chain: a cheap shape probe plus a full extractor.
///
/// `extract` may still return `None` after `matches` said yes (malformed JSON,
/// broken XML); the chain then falls through to the next parser.
pub trait LineParser: Send + Sync {
    fn format(&self) -> LogFormat;

    /// Inexpensive shape test on a trimmed, non-empty line.
    fn matches(&self, line: &str) -> bool;

    /// Build a record from a line that passed [`LineParser::matches`].
    fn extract(&self, line: &str, ctx: &ParseContext) -> Option<Record>;
}
