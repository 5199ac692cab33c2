//! Apache / nginx access log parser (common and combined formats).

use regex::Regex;
use std::sync::LazyLock;

use cs_protocol::{LogType, Record};

use crate::timestamp::{TimestampDialect, normalize};
use crate::types::{LineParser, LogFormat, ParseContext};

// IPv4 prefix, bracketed time, quoted "METHOD ..." request, 3-digit status.
static RE_PROBE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\d{1,3}(?:\.\d{1,3}){3}.*?\[.*?\].*?"\w+ .*?"\s+\d{3}"#).unwrap()
});

// IP IDENT USER [TIME] "METHOD PATH PROTO" STATUS SIZE [REFERER AGENT]
static RE_FULL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(\S+)\s+(\S+)\s+(\S+)\s+\[([^\]]+)\]\s+"((\w+)\s+([^\s"]+)(?:\s+[^"]+)?)"\s+(\d{3})\s+(\d+|-)(?:\s+.*)?$"#,
    )
    .unwrap()
});

// IP [TIME] "METHOD PATH PROTO" STATUS SIZE [REFERER AGENT]
static RE_SHORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(\S+)\s+\[([^\]]+)\]\s+"((\w+)\s+([^\s"]+)(?:\s+[^"]+)?)"\s+(\d{3})\s+(\d+|-)(?:\s+.*)?$"#,
    )
    .unwrap()
});

static RE_LENIENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(\S+).*?\[([^\]]+)\].*?"(\w+)\s+([^\s"]+).*?"\s+(\d{3})"#).unwrap()
});

pub struct AccessParser;

impl LineParser for AccessParser {
    fn format(&self) -> LogFormat {
        LogFormat::WebAccess
    }

    fn matches(&self, line: &str) -> bool {
        RE_PROBE.is_match(line)
    }

    fn extract(&self, line: &str, ctx: &ParseContext) -> Option<Record> {
        if let Some(caps) = RE_FULL.captures(line) {
            let mut r = build(line, &caps[1], &caps[4], &caps[6], &caps[7], &caps[8], ctx);
            r.message = Some(caps[5].to_string());
            r.size = parse_size(&caps[9]);
            let user = &caps[3];
            if user != "-" {
                r.user = Some(user.to_string());
            }
            return Some(r);
        }

        if let Some(caps) = RE_SHORT.captures(line) {
            let mut r = build(line, &caps[1], &caps[2], &caps[4], &caps[5], &caps[6], ctx);
            r.message = Some(caps[3].to_string());
            r.size = parse_size(&caps[7]);
            return Some(r);
        }

        let caps = RE_LENIENT.captures(line)?;
        Some(build(line, &caps[1], &caps[2], &caps[3], &caps[4], &caps[5], ctx))
    }
}

fn build(
    line: &str,
    ip: &str,
    time: &str,
    method: &str,
    endpoint: &str,
    status: &str,
    ctx: &ParseContext,
) -> Record {
    let mut r = Record::new(LogType::Access, line);
    r.timestamp = normalize(time, TimestampDialect::WebAccess, ctx);
    r.ip = Some(ip.to_string());
    r.method = Some(method.to_string());
    r.endpoint = Some(endpoint.to_string());
    r.status = Some(status.to_string());
    r
}

/// `-` (no body) and anything unparseable count as zero bytes.
fn parse_size(s: &str) -> i64 {
    s.parse().unwrap_or(0)
}
