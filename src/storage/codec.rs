//! Timestamp codec
//!
//! Entries keep `created_at` as a fixed-pattern string (`YYYY-MM-DD HH:MM:SS`,
//! second precision, implicitly UTC). Callers on the wire speak ISO-8601 with
//! an offset. Every conversion between the two goes through this module.
//!
//! ```text
//! wire "2021-03-04T07:06:07+02:00" ──parse_external──▶ DateTime<Utc>
//! DateTime<Utc> ──encode──▶ "2021-03-04 05:06:07" ──decode──▶ DateTime<Utc>
//! DateTime<Utc> ──to_wire──▶ "2021-03-04T05:06:07Z"
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use thiserror::Error;

/// Pattern of `created_at` as stored in SQLite
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Offset-less layouts accepted from callers, interpreted as UTC
const NAIVE_EXTERNAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Timestamp parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A stored value does not match [`STORAGE_FORMAT`]
    #[error("invalid stored timestamp '{0}': expected YYYY-MM-DD HH:MM:SS")]
    Storage(String),

    /// A caller-supplied bound is not a recognizable ISO-8601 timestamp
    #[error("invalid timestamp '{0}': expected ISO-8601, e.g. 2021-03-04T05:06:07Z")]
    External(String),
}

/// Format an instant in the storage pattern, dropping sub-second precision
pub fn encode(instant: DateTime<Utc>) -> String {
    instant.format(STORAGE_FORMAT).to_string()
}

/// Parse a stored `created_at` value as UTC
pub fn decode(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    NaiveDateTime::parse_from_str(raw, STORAGE_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| ParseError::Storage(raw.to_string()))
}

/// Parse an optional caller-supplied bound.
///
/// Absent, empty and whitespace-only input all mean "no bound" and yield
/// `Ok(None)`. Non-empty input that cannot be parsed is an error, never a
/// silently dropped bound.
pub fn parse_external(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ParseError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(with_offset.with_timezone(&Utc)));
    }

    for format in NAIVE_EXTERNAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(Utc.from_utc_datetime(&naive)));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Some(Utc.from_utc_datetime(&naive)))
        .ok_or_else(|| ParseError::External(raw.to_string()))
}

/// Format an instant for the wire: ISO-8601, UTC, second precision
pub fn to_wire(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
