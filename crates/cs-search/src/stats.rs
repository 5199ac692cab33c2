//! Aggregation commands applied after filtering.

use chrono::DateTime;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::LazyLock;

use cs_protocol::{Field, Record};

use crate::error::QueryError;

/// Group key for records whose field is null or empty.
pub const NULL_KEY: &str = "null";

static RE_COUNT_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^count_by\(\s*(\w+)\s*\)$").unwrap());
static RE_TOP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^top\(\s*(\d+)\s*,\s*(\w+)\s*\)$").unwrap());
static RE_TIME_BUCKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^time_bucket\(\s*(\w+)\s*\)$").unwrap());
static RE_TABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^table\(([^)]*)\)$").unwrap());
static RE_STATS_COUNT_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^stats\s+count\s+by\s+(\w+)$").unwrap());
static RE_STATS_TOP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^stats\s+top\s+(\d+)\s+(\w+)$").unwrap());
static RE_COUNT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:stats\s+)?count$").unwrap());

// ── Bucket Interval ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketInterval {
    Minute,
    FiveMinutes,
    Hour,
    Day,
}

impl BucketInterval {
    /// Unrecognized names fall back to hourly buckets.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "1m" | "minute" => Self::Minute,
            "5m" => Self::FiveMinutes,
            "1d" | "day" => Self::Day,
            _ => Self::Hour,
        }
    }

    pub fn seconds(&self) -> i64 {
        match self {
            Self::Minute => 60,
            Self::FiveMinutes => 300,
            Self::Hour => 3_600,
            Self::Day => 86_400,
        }
    }
}

// ── Stats Command ─────────────────────────────────────────────

/// A parsed stats command. Field names are kept as written (lower-cased);
/// names that are not record fields behave as always-null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsCommand {
    Count,
    CountBy(String),
    Top { n: usize, field: String },
    TimeBucket(BucketInterval),
    Table(Vec<String>),
}

impl FromStr for StatsCommand {
    type Err = QueryError;

    /// Case-insensitive. Also accepts `stats count`, `stats count by <f>` and
    /// `stats top <n> <f>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cmd = s.trim().to_lowercase();
        let unknown = || QueryError::UnknownStatsCommand(cmd.clone());

        if RE_COUNT.is_match(&cmd) {
            return Ok(Self::Count);
        }
        if let Some(caps) = RE_COUNT_BY
            .captures(&cmd)
            .or_else(|| RE_STATS_COUNT_BY.captures(&cmd))
        {
            return Ok(Self::CountBy(caps[1].to_string()));
        }
        if let Some(caps) = RE_TOP.captures(&cmd).or_else(|| RE_STATS_TOP.captures(&cmd)) {
            let n = caps[1].parse().map_err(|_| unknown())?;
            return Ok(Self::Top {
                n,
                field: caps[2].to_string(),
            });
        }
        if let Some(caps) = RE_TIME_BUCKET.captures(&cmd) {
            return Ok(Self::TimeBucket(BucketInterval::from_name(&caps[1])));
        }
        if let Some(caps) = RE_TABLE.captures(&cmd) {
            let fields: Vec<String> = caps[1]
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(String::from)
                .collect();
            if !fields.is_empty() {
                return Ok(Self::Table(fields));
            }
        }
        Err(unknown())
    }
}

impl StatsCommand {
    pub fn run(&self, records: &[Record]) -> Vec<StatsRow> {
        match self {
            Self::Count => vec![StatsRow::Count {
                count: records.len(),
            }],
            Self::CountBy(field) => group_rows(records, field, usize::MAX),
            Self::Top { n, field } => group_rows(records, field, *n),
            Self::TimeBucket(interval) => bucket_rows(records, *interval),
            Self::Table(fields) => table_rows(records, fields),
        }
    }
}

fn resolve(name: &str) -> Option<Field> {
    name.parse().ok()
}

fn field_text(record: &Record, field: Option<Field>) -> Option<String> {
    field
        .and_then(|f| record.field(f))
        .map(|v| v.into_owned())
}

/// Count per distinct value, most frequent first; ties keep first-seen order.
fn group_rows(records: &[Record], name: &str, limit: usize) -> Vec<StatsRow> {
    let field = resolve(name);
    let mut groups: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for r in records {
        let key = field_text(r, field)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| NULL_KEY.to_string());
        match index.get(&key) {
            Some(&i) => groups[i].1 += 1,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, 1));
            }
        }
    }

    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
        .into_iter()
        .take(limit)
        .map(|(value, count)| StatsRow::Group { value, count })
        .collect()
}

/// Records without a usable timestamp are skipped.
fn bucket_rows(records: &[Record], interval: BucketInterval) -> Vec<StatsRow> {
    let width = interval.seconds();
    let mut buckets: BTreeMap<i64, usize> = BTreeMap::new();
    for r in records {
        let Some(t) = r.instant() else { continue };
        let secs = t.timestamp();
        *buckets.entry(secs - secs.rem_euclid(width)).or_default() += 1;
    }

    buckets
        .into_iter()
        .filter_map(|(start, count)| {
            DateTime::from_timestamp(start, 0).map(|t| StatsRow::Bucket {
                time: t.format("%Y-%m-%dT%H:%M:%S").to_string(),
                count,
            })
        })
        .collect()
}

fn table_rows(records: &[Record], names: &[String]) -> Vec<StatsRow> {
    let fields: Vec<Option<Field>> = names.iter().map(|n| resolve(n)).collect();
    records
        .iter()
        .map(|r| {
            StatsRow::Table(
                names
                    .iter()
                    .zip(&fields)
                    .map(|(name, field)| (name.clone(), field_text(r, *field).unwrap_or_default()))
                    .collect(),
            )
        })
        .collect()
}

// ── Stats Row ─────────────────────────────────────────────────

/// One output row. Serializes to the flat shapes `{count}`,
/// `{value, count}`, `{time, count}`, `{<field>: …}` and `{error}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsRow {
    Count { count: usize },
    Group { value: String, count: usize },
    Bucket { time: String, count: usize },
    /// Projected `(field, value)` pairs in command order.
    Table(Vec<(String, String)>),
    Error { error: String },
}

impl StatsRow {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl Serialize for StatsRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count { count } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("count", count)?;
                map.end()
            }
            Self::Group { value, count } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("value", value)?;
                map.serialize_entry("count", count)?;
                map.end()
            }
            Self::Bucket { time, count } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("time", time)?;
                map.serialize_entry("count", count)?;
                map.end()
            }
            Self::Table(cells) => {
                let mut map = serializer.serialize_map(Some(cells.len()))?;
                for (field, value) in cells {
                    map.serialize_entry(field, value)?;
                }
                map.end()
            }
            Self::Error { error } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}
