//! Schedule scoring.
//!
//! `score = 100 * fully_scheduled + 10 * interviews - 50 * proximity_violations`
//!
//! Proximity violations are recomputed from the interviews themselves, so
//! scoring does not depend on the annotations a strategy attached and
//! scoring the same schedule twice gives the same value.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::constraints::proximity_ok;
use crate::models::{InterviewKind, Schedule};
use crate::pool::ResourcePools;

/// Score of one candidate schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleScore {
    pub fully_scheduled: usize,
    pub interviews: usize,
    pub proximity_violations: usize,
    pub value: i64,
}

impl ScheduleScore {
    pub const FULL_COVERAGE_WEIGHT: i64 = 100;
    pub const INTERVIEW_WEIGHT: i64 = 10;
    pub const PROXIMITY_PENALTY: i64 = 50;

    fn new(fully_scheduled: usize, interviews: usize, proximity_violations: usize) -> Self {
        let value = Self::FULL_COVERAGE_WEIGHT * fully_scheduled as i64
            + Self::INTERVIEW_WEIGHT * interviews as i64
            - Self::PROXIMITY_PENALTY * proximity_violations as i64;
        Self {
            fully_scheduled,
            interviews,
            proximity_violations,
            value,
        }
    }
}

/// Scores a schedule against the pools it was built from.
pub fn score_schedule(schedule: &Schedule, pools: &ResourcePools) -> ScheduleScore {
    ScheduleScore::new(
        schedule.fully_scheduled_count(),
        schedule.interview_count(),
        count_proximity_violations(schedule, pools),
    )
}

/// Applicants whose group and individual starts lie outside the proximity window.
pub fn count_proximity_violations(schedule: &Schedule, pools: &ResourcePools) -> usize {
    let mut starts: HashMap<&str, (Option<NaiveDateTime>, Option<NaiveDateTime>)> = HashMap::new();
    for interview in &schedule.interviews {
        for applicant in interview.applicants() {
            let entry = starts.entry(applicant.as_str()).or_default();
            match interview.kind() {
                InterviewKind::Group => entry.0 = Some(interview.interval().start()),
                InterviewKind::Individual => entry.1 = Some(interview.interval().start()),
            }
        }
    }

    let max_gap_slots = pools.config().max_gap_slots();
    starts
        .values()
        .filter(|(group, individual)| match (group, individual) {
            (Some(g), Some(i)) => !proximity_ok(pools.grid(), *g, *i, max_gap_slots),
            _ => false,
        })
        .count()
}
