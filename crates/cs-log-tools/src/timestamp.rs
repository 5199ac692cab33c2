//! Timestamp normalization to ISO-8601.
//!
//! Each dialect tries an ordered list of templates; the first that parses
//! wins. When none does, the input is handed back unchanged so the stored
//! value stays inspectable.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat};

use crate::types::ParseContext;

/// Hint about which family of templates a raw timestamp belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampDialect {
    /// `YYYY-MM-DD[T ]HH:MM:SS[.frac][Z|±HH:MM]`
    Iso,
    /// `Mon DD HH:MM:SS`, year taken from the parse context.
    Classic,
    /// `DD/Mon/YYYY:HH:MM:SS ±HHMM`
    WebAccess,
    /// Unknown provenance (JSON, XML attributes): epoch numbers, then every
    /// other dialect.
    Any,
}

enum Parsed {
    Aware(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl Parsed {
    fn render(&self) -> String {
        match self {
            Self::Aware(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            Self::Naive(ndt) => ndt.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

/// Normalize `raw` to ISO-8601, or return it unchanged if no template fits.
pub fn normalize(raw: &str, dialect: TimestampDialect, ctx: &ParseContext) -> String {
    let s = raw.trim();
    let parsed = match dialect {
        TimestampDialect::Iso => parse_iso(s),
        TimestampDialect::Classic => parse_classic(s, ctx.assumed_year),
        TimestampDialect::WebAccess => parse_web(s),
        TimestampDialect::Any => parse_epoch(s)
            .or_else(|| parse_iso(s))
            .or_else(|| parse_web(s))
            .or_else(|| parse_classic(s, ctx.assumed_year)),
    };
    match parsed {
        Some(p) => p.render(),
        None => {
            tracing::debug!(raw, ?dialect, "timestamp left unnormalized");
            raw.to_string()
        }
    }
}

fn parse_iso(s: &str) -> Option<Parsed> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(Parsed::Aware(dt));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(Parsed::Aware(dt));
        }
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(Parsed::Naive)
}

fn parse_classic(s: &str, year: i32) -> Option<Parsed> {
    // Format: "Jan 15 12:34:56" or "Jan  5 12:34:56"
    let with_year = format!("{year} {s}");
    NaiveDateTime::parse_from_str(&with_year, "%Y %b %e %H:%M:%S")
        .ok()
        .map(Parsed::Naive)
}

fn parse_web(s: &str) -> Option<Parsed> {
    if let Ok(dt) = DateTime::parse_from_str(s, "%d/%b/%Y:%H:%M:%S %z") {
        return Some(Parsed::Aware(dt));
    }
    ["%d/%b/%Y:%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(Parsed::Naive)
}

/// Unix epoch seconds, or milliseconds when the value exceeds 1e10.
fn parse_epoch(s: &str) -> Option<Parsed> {
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value: f64 = s.parse().ok()?;
    let millis = if value > 1e10 { value } else { value * 1000.0 };
    DateTime::from_timestamp_millis(millis.round() as i64).map(|dt| Parsed::Aware(dt.fixed_offset()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ParseContext {
        ParseContext::with_year(2024)
    }

    #[test]
    fn iso_with_zone_renders_numeric_offset() {
        assert_eq!(
            normalize("2025-02-13T11:22:33Z", TimestampDialect::Iso, &ctx()),
            "2025-02-13T11:22:33+00:00"
        );
        assert_eq!(
            normalize("2025-02-13T11:22:33.500+02:00", TimestampDialect::Iso, &ctx()),
            "2025-02-13T11:22:33.500+02:00"
        );
    }

    #[test]
    fn naive_iso_stays_naive() {
        assert_eq!(
            normalize("2025-02-13 11:22:33", TimestampDialect::Iso, &ctx()),
            "2025-02-13T11:22:33"
        );
        assert_eq!(
            normalize("2025-02-13T11:22:33.123", TimestampDialect::Iso, &ctx()),
            "2025-02-13T11:22:33.123"
        );
    }

    #[test]
    fn classic_uses_context_year() {
        assert_eq!(
            normalize("Jan  5 09:08:07", TimestampDialect::Classic, &ctx()),
            "2024-01-05T09:08:07"
        );
        assert_eq!(
            normalize("Dec 31 23:59:59", TimestampDialect::Classic, &ParseContext::with_year(2019)),
            "2019-12-31T23:59:59"
        );
    }

    #[test]
    fn web_access_keeps_offset() {
        assert_eq!(
            normalize("13/Feb/2025:11:22:33 +0000", TimestampDialect::WebAccess, &ctx()),
            "2025-02-13T11:22:33+00:00"
        );
        assert_eq!(
            normalize("13/Feb/2025:11:22:33 -0500", TimestampDialect::WebAccess, &ctx()),
            "2025-02-13T11:22:33-05:00"
        );
        assert_eq!(
            normalize("13/Feb/2025:11:22:33", TimestampDialect::WebAccess, &ctx()),
            "2025-02-13T11:22:33"
        );
    }

    #[test]
    fn epoch_seconds_and_millis() {
        assert_eq!(
            normalize("1705320001", TimestampDialect::Any, &ctx()),
            "2024-01-15T12:00:01+00:00"
        );
        assert_eq!(
            normalize("1705320001000", TimestampDialect::Any, &ctx()),
            "2024-01-15T12:00:01+00:00"
        );
    }

    #[test]
    fn any_dialect_tries_every_family() {
        assert_eq!(
            normalize("2024-01-15T12:00:01Z", TimestampDialect::Any, &ctx()),
            "2024-01-15T12:00:01+00:00"
        );
        assert_eq!(
            normalize("Mar 10 01:02:03", TimestampDialect::Any, &ctx()),
            "2024-03-10T01:02:03"
        );
    }

    #[test]
    fn failure_returns_input_unchanged() {
        assert_eq!(normalize("yesterday", TimestampDialect::Any, &ctx()), "yesterday");
        assert_eq!(
            normalize("Feb 30 10:00:00", TimestampDialect::Classic, &ctx()),
            "Feb 30 10:00:00"
        );
        assert_eq!(
            normalize("13/Feb/2025", TimestampDialect::WebAccess, &ctx()),
            "13/Feb/2025"
        );
    }
}
