//! Availability model.
//!
//! An entity (applicant, recruiter, room) owns an ordered set of disjoint
//! windows describing when it can take part in an interview.
//!
//! # Containment Rule
//! An entity is available for a candidate interval iff a single owned window
//! contains the whole interval. Partial overlap does not count.
//!
//! Touching windows (one ends where the next starts) are merged on
//! construction, so back-to-back availability blocks behave as one block.

use serde::{Deserialize, Serialize};

use super::Interval;

/// Ordered, disjoint availability windows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Interval>", into = "Vec<Interval>")]
pub struct Availability {
    windows: Vec<Interval>,
}

impl Availability {
    /// Creates availability from arbitrary windows.
    ///
    /// Windows are sorted and overlapping or touching windows are merged.
    pub fn new(windows: impl IntoIterator<Item = Interval>) -> Self {
        let mut sorted: Vec<Interval> = windows.into_iter().collect();
        sorted.sort();

        let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
        for w in sorted {
            match merged.last_mut() {
                Some(last) if last.touches(&w) => {
                    if w.end() > last.end() {
                        // `last.start() <= w.start() < w.end()`, so the merge is non-empty.
                        if let Ok(joined) = Interval::new(last.start(), w.end()) {
                            *last = joined;
                        }
                    }
                }
                _ => merged.push(w),
            }
        }

        Self { windows: merged }
    }

    /// Availability with no windows (never available).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds a window, keeping the set ordered and disjoint.
    pub fn with_window(self, window: Interval) -> Self {
        let mut windows = self.windows;
        windows.push(window);
        Self::new(windows)
    }

    /// The owned windows, ordered by start.
    pub fn windows(&self) -> &[Interval] {
        &self.windows
    }

    /// Whether no window is owned.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Whether some window fully contains `interval`.
    pub fn contains(&self, interval: &Interval) -> bool {
        // Windows are disjoint and sorted: only the last window starting at or
        // before `interval.start()` can contain it.
        let idx = self
            .windows
            .partition_point(|w| w.start() <= interval.start());
        idx > 0 && self.windows[idx - 1].contains(interval)
    }

    /// Total available time in minutes.
    pub fn total_minutes(&self) -> i64 {
        self.windows.iter().map(Interval::duration_minutes).sum()
    }
}

impl From<Vec<Interval>> for Availability {
    fn from(windows: Vec<Interval>) -> Self {
        Self::new(windows)
    }
}

impl From<Availability> for Vec<Interval> {
    fn from(availability: Availability) -> Self {
        availability.windows
    }
}

impl FromIterator<Interval> for Availability {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        Self::new(iter)
    }
}
