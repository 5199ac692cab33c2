//! Priority-ordered format chain.
//!
//! Parsers run in a fixed order, most specific first. A parser whose probe
//! matches but whose extraction fails (malformed JSON, broken XML) hands the
//! line on to the next one; the generic fallback accepts everything.

pub mod access;
pub mod auth;
pub mod generic;
pub mod json_event;
pub mod syslog;
pub mod windows_xml;

use regex::Regex;
use std::sync::LazyLock;

use cs_protocol::Record;

use crate::types::{LineParser, LogFormat, ParseContext};

// Loose dotted quad; octet ranges are not checked.
pub(crate) static RE_IPV4: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,3}(?:\.\d{1,3}){3}").unwrap());

/// First IPv4-looking substring of `s`.
pub(crate) fn first_ipv4(s: &str) -> Option<String> {
    RE_IPV4.find(s).map(|m| m.as_str().to_string())
}

static STANDARD: LazyLock<FormatChain> = LazyLock::new(FormatChain::standard);

/// Parse one line with the standard chain.
pub fn parse_line(line: &str, ctx: &ParseContext) -> Option<(LogFormat, Record)> {
    STANDARD.parse(line, ctx)
}

/// An ordered list of line parsers; first successful extraction wins.
pub struct FormatChain {
    parsers: Vec<Box<dyn LineParser>>,
}

impl FormatChain {
    /// Every format, in [`LogFormat::PRIORITY`] order.
    pub fn standard() -> Self {
        Self::from_formats(&LogFormat::PRIORITY)
    }

    /// Restrict the chain to `formats` (kept in priority order). The generic
    /// fallback is always appended; drop it with [`FormatChain::without_fallback`].
    pub fn only(formats: &[LogFormat]) -> Self {
        let selected: Vec<LogFormat> = LogFormat::PRIORITY
            .into_iter()
            .filter(|f| *f == LogFormat::Generic || formats.contains(f))
            .collect();
        Self::from_formats(&selected)
    }

    pub fn without_fallback(mut self) -> Self {
        self.parsers.retain(|p| p.format() != LogFormat::Generic);
        self
    }

    pub fn formats(&self) -> Vec<LogFormat> {
        self.parsers.iter().map(|p| p.format()).collect()
    }

    /// Classify and extract a single line.
    ///
    /// Returns `None` for blank lines and for lines no parser accepts (only
    /// possible without the generic fallback). The record's `raw` is the line
    /// as given, minus any trailing line terminator.
    pub fn parse(&self, line: &str, ctx: &ParseContext) -> Option<(LogFormat, Record)> {
        let raw = line.trim_end_matches(['\r', '\n']);
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        for parser in &self.parsers {
            if !parser.matches(trimmed) {
                continue;
            }
            match parser.extract(trimmed, ctx) {
                Some(mut record) => {
                    record.raw = raw.to_string();
                    return Some((parser.format(), record));
                }
                None => {
                    tracing::debug!(format = %parser.format(), "extraction failed, falling through");
                }
            }
        }
        None
    }

    fn from_formats(formats: &[LogFormat]) -> Self {
        Self {
            parsers: formats.iter().map(|f| parser_for(*f)).collect(),
        }
    }
}

impl Default for FormatChain {
    fn default() -> Self {
        Self::standard()
    }
}

fn parser_for(format: LogFormat) -> Box<dyn LineParser> {
    match format {
        LogFormat::Json => Box::new(json_event::JsonEventParser),
        LogFormat::WindowsXml => Box::new(windows_xml::WindowsXmlParser),
        LogFormat::WebAccess => Box::new(access::AccessParser),
        LogFormat::IsoSyslog => Box::new(syslog::IsoSyslogParser),
        LogFormat::ClassicSyslog => Box::new(syslog::ClassicSyslogParser),
        LogFormat::Generic => Box::new(generic::GenericParser),
    }
}
