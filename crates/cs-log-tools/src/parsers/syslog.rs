//! Syslog-style lines with an ISO-8601 or classic BSD timestamp prefix.
//!
//! After the timestamp the line is split as `HOST SERVICE[PID]: MESSAGE`.
//! Authentication events (sshd, sudo, PAM) become `auth` records; everything
//! else stays `syslog`.

use regex::Regex;
use std::sync::LazyLock;

use cs_protocol::{LogType, Record};

use super::{auth, first_ipv4};
use crate::timestamp::{TimestampDialect, normalize};
use crate::types::{LineParser, LogFormat, ParseContext};

// 2025-02-13T11:22:33[.123][Z|+01:00]
static RE_ISO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?)(?:\s+(.*))?$",
    )
    .unwrap()
});

// Feb 13 11:22:33
static RE_CLASSIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][a-z]{2}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2})(?:\s+(.*))?$").unwrap()
});

// HOST SERVICE[PID]: MESSAGE
static RE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s+([^\s:\[]+)(?:\[(\d+)\])?:\s*(.*)$").unwrap());

/// Syslog line starting with an ISO/RFC 3339 timestamp.
pub struct IsoSyslogParser;

impl LineParser for IsoSyslogParser {
    fn format(&self) -> LogFormat {
        LogFormat::IsoSyslog
    }

    fn matches(&self, line: &str) -> bool {
        RE_ISO.is_match(line)
    }

    fn extract(&self, line: &str, ctx: &ParseContext) -> Option<Record> {
        let caps = RE_ISO.captures(line)?;
        let timestamp = normalize(&caps[1], TimestampDialect::Iso, ctx);
        let rest = caps.get(2).map_or("", |m| m.as_str());
        Some(build(line, timestamp, rest))
    }
}

/// BSD syslog line (`Mon DD HH:MM:SS`); the year comes from the context.
pub struct ClassicSyslogParser;

impl LineParser for ClassicSyslogParser {
    fn format(&self) -> LogFormat {
        LogFormat::ClassicSyslog
    }

    fn matches(&self, line: &str) -> bool {
        RE_CLASSIC.is_match(line)
    }

    fn extract(&self, line: &str, ctx: &ParseContext) -> Option<Record> {
        let caps = RE_CLASSIC.captures(line)?;
        let timestamp = normalize(&caps[1], TimestampDialect::Classic, ctx);
        let rest = caps.get(2).map_or("", |m| m.as_str());
        Some(build(line, timestamp, rest))
    }
}

fn build(line: &str, timestamp: String, rest: &str) -> Record {
    let auth = auth::classify(rest);
    let log_type = if auth.is_some() {
        LogType::Auth
    } else {
        LogType::Syslog
    };

    let mut r = Record::new(log_type, line);
    r.timestamp = timestamp;
    split_header(&mut r, rest);

    match auth {
        Some(info) => {
            r.action = Some(info.action.as_str().to_string());
            r.user = info.user;
            r.ip = info.ip;
        }
        None => r.ip = first_ipv4(rest),
    }
    r
}

/// Fill host, service (pid stripped) and message from the text after the
/// timestamp. Without a `service:` tag the first token is the host and the
/// remainder the message.
fn split_header(r: &mut Record, rest: &str) {
    if let Some(caps) = RE_HEADER.captures(rest) {
        r.host = Some(caps[1].to_string());
        r.service = Some(caps[2].to_string());
        r.message = Some(caps[4].to_string());
        return;
    }

    let mut parts = rest.splitn(2, char::is_whitespace);
    r.host = parts.next().filter(|h| !h.is_empty()).map(String::from);
    r.message = parts
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from);
}
