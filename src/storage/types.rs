//! Core data types for the moodlog storage layer
//!
//! - `Entry`: one stored mood measurement
//! - `NewEntry`: the caller-supplied part of an entry
//! - `TimeFilter`: the `created_at` bound applied to a range query

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::storage::codec;
use crate::storage::error::{StorageError, StorageResult};

/// Lowest accepted value for `happy`, `social` and `energy`
pub const METRIC_MIN: i64 = 0;
/// Highest accepted value for `happy`, `social` and `energy`
pub const METRIC_MAX: i64 = 100;

/// A single mood measurement
///
/// `created_at` is held decoded; serializing an entry always emits the
/// ISO-8601 UTC wire form, never the storage pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Assigned by SQLite, strictly increasing with insertion order
    pub id: i64,
    pub happy: i64,
    pub social: i64,
    pub energy: i64,
    pub notes: Option<String>,
    /// Server clock at insert time, second precision
    #[serde(serialize_with = "serialize_wire_timestamp")]
    pub created_at: DateTime<Utc>,
}

fn serialize_wire_timestamp<S: Serializer>(
    instant: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&codec::to_wire(*instant))
}

/// Values supplied by the caller when logging a mood
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub happy: i64,
    pub social: i64,
    pub energy: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewEntry {
    pub fn new(happy: i64, social: i64, energy: i64) -> Self {
        Self {
            happy,
            social,
            energy,
            notes: None,
        }
    }

    /// Builder method: attach notes
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Check every metric lies in `METRIC_MIN..=METRIC_MAX`
    pub fn validate(&self) -> StorageResult<()> {
        for (name, value) in [
            ("happy", self.happy),
            ("social", self.social),
            ("energy", self.energy),
        ] {
            if !(METRIC_MIN..=METRIC_MAX).contains(&value) {
                return Err(StorageError::InvalidEntry(format!(
                    "{} must be between {} and {}, got {}",
                    name, METRIC_MIN, METRIC_MAX, value
                )));
            }
        }
        Ok(())
    }
}

/// Bound on `created_at` for a range query
///
/// Comparisons happen on unix seconds, matching the storage precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeFilter {
    /// Every entry
    #[default]
    All,
    /// `from <= created_at <= to`
    Between(DateTime<Utc>, DateTime<Utc>),
    /// `created_at > from`
    After(DateTime<Utc>),
    /// `created_at < to`
    Before(DateTime<Utc>),
}

impl TimeFilter {
    /// Build a filter from two optional bounds
    pub fn from_bounds(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        match (from, to) {
            (Some(from), Some(to)) => TimeFilter::Between(from, to),
            (Some(from), None) => TimeFilter::After(from),
            (None, Some(to)) => TimeFilter::Before(to),
            (None, None) => TimeFilter::All,
        }
    }

    /// SQL predicate over unix seconds plus its parameters
    pub(crate) fn predicate(&self) -> (&'static str, Vec<i64>) {
        match self {
            TimeFilter::All => ("1 = 1", Vec::new()),
            TimeFilter::Between(from, to) => (
                "CAST(strftime('%s', created_at) AS INTEGER) BETWEEN ?1 AND ?2",
                vec![from.timestamp(), to.timestamp()],
            ),
            TimeFilter::After(from) => (
                "CAST(strftime('%s', created_at) AS INTEGER) > ?1",
                vec![from.timestamp()],
            ),
            TimeFilter::Before(to) => (
                "CAST(strftime('%s', created_at) AS INTEGER) < ?1",
                vec![to.timestamp()],
            ),
        }
    }
}
