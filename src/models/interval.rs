//! Time interval model.
//!
//! All engine times are wall-clock `NaiveDateTime` values on the event
//! calendar. Intervals are half-open: `[start, end)`.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};

/// A non-empty time interval [start, end).
///
/// The `start < end` invariant is checked on construction and on
/// deserialization, so every `Interval` in the engine is non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Deserialize)]
struct RawInterval {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<RawInterval> for Interval {
    type Error = SchedulingError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        Interval::new(raw.start, raw.end)
    }
}

impl Interval {
    /// Creates an interval, rejecting empty or reversed bounds.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(SchedulingError::InvalidInterval { start, end })
        }
    }

    /// Creates the interval `[start, start + minutes)`.
    pub fn starting_at(start: NaiveDateTime, minutes: i64) -> Result<Self> {
        Self::new(start, start + Duration::minutes(minutes))
    }

    /// Interval start (inclusive).
    #[inline]
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Interval end (exclusive).
    #[inline]
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Length of the interval.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Length of the interval in whole minutes.
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Whether two intervals share any instant.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `inner` lies entirely within this interval.
    #[inline]
    pub fn contains(&self, inner: &Self) -> bool {
        self.start <= inner.start && inner.end <= self.end
    }

    /// Whether this interval ends exactly where `other` starts, or overlaps it.
    pub(crate) fn touches(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%m/%d %H:%M"),
            self.end.format("%H:%M")
        )
    }
}
