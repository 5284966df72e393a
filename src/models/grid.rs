//! Event days and the scheduling grid.
//!
//! The grid is a globally ordered sequence of fixed-width slots tiling the
//! open hours of every event day. Every interview starts on a slot start;
//! its length is a fixed duration that may span several slots, but it must
//! finish before its day closes.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::Interval;
use crate::error::{Result, SchedulingError};

/// One named event day with its own open and close hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDay {
    /// Calendar date.
    pub date: NaiveDate,
    /// First bookable instant.
    pub open: NaiveTime,
    /// Closing instant; no interview may run past it.
    pub close: NaiveTime,
}

impl EventDay {
    /// Creates an event day.
    pub fn new(date: NaiveDate, open: NaiveTime, close: NaiveTime) -> Self {
        Self { date, open, close }
    }

    /// Creates an event day open between two full hours.
    ///
    /// Returns `None` for an invalid date or hour.
    pub fn from_hours(year: i32, month: u32, day: u32, open_hour: u32, close_hour: u32) -> Option<Self> {
        Some(Self {
            date: NaiveDate::from_ymd_opt(year, month, day)?,
            open: NaiveTime::from_hms_opt(open_hour, 0, 0)?,
            close: NaiveTime::from_hms_opt(close_hour, 0, 0)?,
        })
    }

    /// The open period as an interval.
    pub fn interval(&self) -> Result<Interval> {
        Interval::new(self.date.and_time(self.open), self.date.and_time(self.close))
    }
}

/// A cell of the scheduling grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeSlot {
    /// Position in the global grid.
    pub index: usize,
    /// Index of the event day this slot belongs to.
    pub day: usize,
    /// The slot's own `[start, start + width)` interval.
    pub interval: Interval,
}

impl TimeSlot {
    /// Slot start.
    #[inline]
    pub fn start(&self) -> NaiveDateTime {
        self.interval.start()
    }
}

/// The precomputed ordered slot grid.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    slot_minutes: i64,
    days: Vec<Interval>,
    slots: Vec<TimeSlot>,
}

impl SlotGrid {
    /// Tiles every event day with `slot_minutes`-wide slots.
    ///
    /// A trailing remainder shorter than one slot is left unused.
    /// Days may be given in any order; overlapping days are rejected.
    pub fn new(days: &[EventDay], slot_minutes: i64) -> Result<Self> {
        if slot_minutes <= 0 {
            return Err(SchedulingError::InvalidConfig(format!(
                "slot width must be positive, got {slot_minutes} minutes"
            )));
        }

        let mut periods = days
            .iter()
            .map(EventDay::interval)
            .collect::<Result<Vec<_>>>()?;
        periods.sort();

        if let Some(pair) = periods.windows(2).find(|p| p[0].overlaps(&p[1])) {
            return Err(SchedulingError::InvalidConfig(format!(
                "event days overlap: {} and {}",
                pair[0], pair[1]
            )));
        }

        let width = Duration::minutes(slot_minutes);
        let mut slots = Vec::new();
        for (day, period) in periods.iter().enumerate() {
            let mut current = period.start();
            while current + width <= period.end() {
                let interval = Interval::new(current, current + width)?;
                slots.push(TimeSlot {
                    index: slots.len(),
                    day,
                    interval,
                });
                current += width;
            }
        }

        Ok(Self {
            slot_minutes,
            days: periods,
            slots,
        })
    }

    /// Slot width in minutes.
    #[inline]
    pub fn slot_minutes(&self) -> i64 {
        self.slot_minutes
    }

    /// All slots in chronological order.
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the grid has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot by grid index.
    pub fn slot(&self, index: usize) -> Option<&TimeSlot> {
        self.slots.get(index)
    }

    /// Slot starting exactly at `start`.
    pub fn slot_at(&self, start: NaiveDateTime) -> Option<&TimeSlot> {
        self.slots
            .binary_search_by(|s| s.start().cmp(&start))
            .ok()
            .map(|i| &self.slots[i])
    }

    /// Open periods of the event days, ordered.
    pub fn days(&self) -> &[Interval] {
        &self.days
    }

    /// The interview interval starting at `slot` and lasting `minutes`.
    ///
    /// Returns `None` if the slot does not exist or the interview would run
    /// past its day's close.
    pub fn interview_interval(&self, slot: usize, minutes: i64) -> Option<Interval> {
        let slot = self.slots.get(slot)?;
        let interval = Interval::starting_at(slot.start(), minutes).ok()?;
        self.days[slot.day].contains(&interval).then_some(interval)
    }

    /// Whether `interval` starts on a slot and stays within its day.
    pub fn admits(&self, interval: &Interval) -> bool {
        match self.slot_at(interval.start()) {
            Some(slot) => self.days[slot.day].contains(interval),
            None => false,
        }
    }

    /// Starts of the grid cells covered by `interval`.
    pub fn cells(&self, interval: &Interval) -> impl Iterator<Item = NaiveDateTime> + '_ {
        let width = Duration::minutes(self.slot_minutes);
        let end = interval.end();
        std::iter::successors(Some(interval.start()), move |&t| Some(t + width))
            .take_while(move |&t| t < end)
    }

    /// Distance between two instants measured in whole slots (rounded up).
    pub fn slot_distance(&self, a: NaiveDateTime, b: NaiveDateTime) -> i64 {
        let minutes = (a - b).num_minutes().abs();
        (minutes + self.slot_minutes - 1) / self.slot_minutes
    }
}
