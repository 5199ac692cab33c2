//! One-JSON-object-per-line events (app logs, Suricata EVE, cloud exports).

use serde_json::{Map, Value};

use cs_protocol::{LogType, Record};

use crate::timestamp::{TimestampDialect, normalize};
use crate::types::{LineParser, LogFormat, ParseContext};

/// Message used when an event carries none of the known label keys.
pub const DEFAULT_LABEL: &str = "json_event";

pub struct JsonEventParser;

impl LineParser for JsonEventParser {
    fn format(&self) -> LogFormat {
        LogFormat::Json
    }

    fn matches(&self, line: &str) -> bool {
        line.starts_with('{') && line.ends_with('}')
    }

    fn extract(&self, line: &str, ctx: &ParseContext) -> Option<Record> {
        let value: Value = serde_json::from_str(line).ok()?;
        let map = value.as_object()?;

        let mut r = Record::new(LogType::Json, line);
        if let Some(ts) = extract_string(map, &["timestamp", "time", "@timestamp"]) {
            r.timestamp = normalize(&ts, TimestampDialect::Any, ctx);
        }

        let label = extract_string(map, &["event"])
            .or_else(|| nested_string(map, "alert", "signature"))
            .or_else(|| extract_string(map, &["message", "msg"]));
        r.message = Some(label.unwrap_or_else(|| DEFAULT_LABEL.to_string()));

        r.ip = extract_string(map, &["ip", "src_ip", "source_ip"]);
        r.user = extract_string(map, &["user", "username"]);
        r.status = extract_string(map, &["status", "status_code"]);
        r.host = extract_string(map, &["host", "hostname"]);
        r.service = extract_string(map, &["service", "app", "program"]);
        r.method = extract_string(map, &["method"]);
        r.endpoint = extract_string(map, &["endpoint", "path", "url", "uri"]);
        r.action = extract_string(map, &["action"]);
        r.size = extract_string(map, &["size", "bytes"])
            .and_then(|s| s.parse::<f64>().ok())
            .map(|n| n as i64)
            .unwrap_or(0);

        Some(r)
    }
}

/// First non-empty scalar among `keys`, rendered as text.
fn extract_string(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn nested_string(map: &Map<String, Value>, outer: &str, inner: &str) -> Option<String> {
    map.get(outer)?.as_object().and_then(|m| extract_string(m, &[inner]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_protocol::UNKNOWN_TIMESTAMP;

    fn parse(line: &str) -> Option<Record> {
        JsonEventParser.extract(line, &ParseContext::with_year(2025))
    }

    #[test]
    fn extracts_common_fields() {
        let r = parse(
            r#"{"timestamp":"2024-01-15T12:00:01Z","event":"port_scan","src_ip":"10.0.0.9","user":"bob","status":403,"bytes":512}"#,
        )
        .unwrap();
        assert_eq!(r.log_type, LogType::Json);
        assert_eq!(r.timestamp, "2024-01-15T12:00:01+00:00");
        assert_eq!(r.message.as_deref(), Some("port_scan"));
        assert_eq!(r.ip.as_deref(), Some("10.0.0.9"));
        assert_eq!(r.user.as_deref(), Some("bob"));
        assert_eq!(r.status.as_deref(), Some("403"));
        assert_eq!(r.size, 512);
    }

    #[test]
    fn suricata_alert_signature_is_the_label() {
        let r = parse(
            r#"{"@timestamp":"2024-01-15T12:00:01.000Z","alert":{"signature":"ET SCAN Nmap"},"source_ip":"1.2.3.4"}"#,
        )
        .unwrap();
        assert_eq!(r.message.as_deref(), Some("ET SCAN Nmap"));
        assert_eq!(r.ip.as_deref(), Some("1.2.3.4"));
        assert_eq!(r.timestamp, "2024-01-15T12:00:01+00:00");
    }

    #[test]
    fn missing_fields_fall_back() {
        let r = parse(r#"{"level":"info"}"#).unwrap();
        assert_eq!(r.timestamp, UNKNOWN_TIMESTAMP);
        assert_eq!(r.message.as_deref(), Some(DEFAULT_LABEL));
        assert!(r.ip.is_none());
        assert_eq!(r.size, 0);
    }

    #[test]
    fn epoch_time_is_normalized() {
        let r = parse(r#"{"time":1705320001,"msg":"tick"}"#).unwrap();
        assert_eq!(r.timestamp, "2024-01-15T12:00:01+00:00");
        assert_eq!(r.message.as_deref(), Some("tick"));
    }

    #[test]
    fn null_and_empty_values_are_skipped() {
        let r = parse(r#"{"timestamp":null,"time":"","ip":"","src_ip":"192.168.0.1"}"#).unwrap();
        assert_eq!(r.timestamp, UNKNOWN_TIMESTAMP);
        assert_eq!(r.ip.as_deref(), Some("192.168.0.1"));
    }

    #[test]
    fn malformed_or_non_object_json_fails() {
        assert!(parse(r#"{"a": }"#).is_none());
        assert!(parse("{}").is_some());
        assert!(!JsonEventParser.matches(r#"["a"]"#));
    }
}
