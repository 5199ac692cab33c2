//! Time expressions accepted by `last=`, `earliest=` and `latest=`.
//!
//! Every relative form is computed against an explicit `now`. Naive absolute
//! times are read as UTC, matching how stored timestamps are compared.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};
use regex::Regex;
use std::sync::LazyLock;

static RE_LAST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)([mhdwM])$").unwrap());

static RE_RELATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-(\d+)([mhdwM])$").unwrap());

/// `N` units as a duration: `m` minutes, `h` hours, `d` days, `w` weeks,
/// `M` 30-day months. `None` on overflow or an unknown unit.
pub fn span(n: i64, unit: char) -> Option<TimeDelta> {
    match unit {
        'm' => TimeDelta::try_minutes(n),
        'h' => TimeDelta::try_hours(n),
        'd' => TimeDelta::try_days(n),
        'w' => TimeDelta::try_weeks(n),
        'M' => TimeDelta::try_days(n.checked_mul(30)?),
        _ => None,
    }
}

fn back_from(now: DateTime<Utc>, caps: &regex::Captures<'_>) -> Option<DateTime<Utc>> {
    let n: i64 = caps[1].parse().ok()?;
    let unit = caps[2].chars().next()?;
    now.checked_sub_signed(span(n, unit)?)
}

/// `last=<N><unit>`: the lower bound `now - N·unit`.
pub fn parse_last(value: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = RE_LAST.captures(unquote(value))?;
    back_from(now, &caps)
}

/// `earliest=`/`latest=` values: `-<N><unit>`, `now`, `@<epoch>`, or an
/// absolute date/time.
pub fn parse_time_spec(value: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let v = unquote(value);
    if v.eq_ignore_ascii_case("now") {
        return Some(now);
    }
    if let Some(caps) = RE_RELATIVE.captures(v) {
        return back_from(now, &caps);
    }
    if let Some(epoch) = v.strip_prefix('@') {
        return parse_epoch(epoch);
    }
    parse_absolute(v)
}

/// `@` epochs: seconds, or milliseconds when the value exceeds 1e10.
fn parse_epoch(s: &str) -> Option<DateTime<Utc>> {
    let value: f64 = s.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let millis = if value > 1e10 { value } else { value * 1000.0 };
    DateTime::from_timestamp_millis(millis.round() as i64)
}

fn parse_absolute(v: &str) -> Option<DateTime<Utc>> {
    if v.contains('T') {
        if let Ok(dt) = DateTime::parse_from_rfc3339(v) {
            return Some(dt.with_timezone(&Utc));
        }
        return NaiveDateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|ndt| ndt.and_utc());
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%b %d %Y %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(v, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|ndt| ndt.and_utc())
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches(|c| c == '"' || c == '\'')
}
