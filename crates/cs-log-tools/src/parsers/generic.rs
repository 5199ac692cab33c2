//! Catch-all parser: keeps the line and scans it for an IPv4 address.

use cs_protocol::{LogType, Record};

use super::first_ipv4;
use crate::types::{LineParser, LogFormat, ParseContext};

pub struct GenericParser;

impl LineParser for GenericParser {
    fn format(&self) -> LogFormat {
        LogFormat::Generic
    }

    fn matches(&self, _line: &str) -> bool {
        true
    }

    fn extract(&self, line: &str, _ctx: &ParseContext) -> Option<Record> {
        let mut r = Record::new(LogType::Generic, line);
        r.ip = first_ipv4(line);
        Some(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_protocol::UNKNOWN_TIMESTAMP;

    #[test]
    fn keeps_first_ip_and_unknown_time() {
        let r = GenericParser
            .extract("blocked 198.51.100.4 then 10.0.0.1", &ParseContext::default())
            .unwrap();
        assert_eq!(r.log_type, LogType::Generic);
        assert_eq!(r.timestamp, UNKNOWN_TIMESTAMP);
        assert_eq!(r.ip.as_deref(), Some("198.51.100.4"));
        assert!(r.message.is_none());
    }

    #[test]
    fn no_ip_is_null() {
        let r = GenericParser.extract("hello world", &ParseContext::default()).unwrap();
        assert!(r.ip.is_none());
    }
}
