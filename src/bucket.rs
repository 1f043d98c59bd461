//! Calendar bucketing of record timestamps.
//!
//! Timestamps are parsed leniently (RFC 3339, ISO date-times with or without
//! an offset, plain dates, MongoDB `{"$date": ...}` wrappers) and normalized
//! to UTC before a bucket key is derived. Anything that does not parse maps to
//! `None`, which every pipeline drops from its output.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

/// Bucket size selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    Daily,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Granularity {
    /// Resolve a raw `timeFrame` value. Unknown or missing values fall back
    /// to [`Granularity::Monthly`].
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("daily") => Granularity::Daily,
            Some("monthly") => Granularity::Monthly,
            Some("quarterly") => Granularity::Quarterly,
            Some("yearly") => Granularity::Yearly,
            _ => Granularity::Monthly,
        }
    }

    /// Quarterly bucketing is opt-in per pipeline; pipelines that do not
    /// support it treat it like any other unrecognized value.
    pub fn without_quarterly(self) -> Self {
        match self {
            Granularity::Quarterly => Granularity::Monthly,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Monthly => "monthly",
            Granularity::Quarterly => "quarterly",
            Granularity::Yearly => "yearly",
        }
    }

    /// Format a UTC instant as this granularity's bucket key.
    pub fn key_for(&self, instant: &DateTime<Utc>) -> String {
        match self {
            Granularity::Daily => instant.format("%Y-%m-%d").to_string(),
            Granularity::Monthly => instant.format("%Y-%m").to_string(),
            Granularity::Quarterly => {
                format!("{:04}-Q{}", instant.year(), (instant.month() - 1) / 3 + 1)
            }
            Granularity::Yearly => format!("{:04}", instant.year()),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a timestamp string to its bucket key, or `None` if it does not parse.
pub fn bucket_key(timestamp: &str, granularity: Granularity) -> Option<String> {
    parse_timestamp(timestamp).map(|t| granularity.key_for(&t))
}

/// Parse a timestamp string into a UTC instant.
///
/// Offsets are honoured; values without one are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f %z"] {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a raw document field into a UTC instant.
///
/// Accepts plain strings, epoch milliseconds, and the extended-JSON
/// `{"$date": "..."}` / `{"$date": {"$numberLong": "..."}}` forms.
pub fn timestamp_from_value(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().and_then(from_millis),
        Value::Object(map) => match map.get("$date")? {
            Value::String(s) => parse_timestamp(s),
            Value::Number(n) => n.as_i64().and_then(from_millis),
            Value::Object(inner) => inner
                .get("$numberLong")
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<i64>().ok())
                .and_then(from_millis),
            _ => None,
        },
        _ => None,
    }
}

fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}
