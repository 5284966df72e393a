//! Constraint evaluator.
//!
//! Pure predicates shared by every strategy. None of them touches
//! occupancy state; callers combine them with an attempt's free/busy view.
//!
//! | Predicate | Kind |
//! |-----------|------|
//! | [`is_available`] | hard |
//! | [`has_direct_conflict`] | hard, also in relaxed passes |
//! | [`group_size_valid`] / [`group_recruiter_count_valid`] | hard |
//! | [`team_diversity_satisfied`] | soft (strict pass only) |
//! | [`team_affinity_satisfied`] | soft (strict pass only) |
//! | [`proximity_ok`] | soft (strict pass only) |

use chrono::NaiveDateTime;
use std::collections::BTreeSet;

use crate::config::SchedulerConfig;
use crate::models::{Availability, Interval, SlotGrid, Team};

/// Whether `availability` contains `[start, start + minutes)`.
pub fn is_available(availability: &Availability, start: NaiveDateTime, minutes: i64) -> bool {
    match Interval::starting_at(start, minutes) {
        Ok(candidate) => availability.contains(&candidate),
        Err(_) => false,
    }
}

/// Whether `candidate` overlaps any of the applicant's existing interviews.
pub fn has_direct_conflict<'a>(
    candidate: &Interval,
    existing: impl IntoIterator<Item = &'a Interval>,
) -> bool {
    existing.into_iter().any(|i| i.overlaps(candidate))
}

/// Whether a group of `n` applicants is within the configured bounds.
#[inline]
pub fn group_size_valid(n: usize, config: &SchedulerConfig) -> bool {
    (config.min_group_size..=config.max_group_size).contains(&n)
}

/// Whether a group panel of `n` recruiters is large enough.
#[inline]
pub fn group_recruiter_count_valid(n: usize, config: &SchedulerConfig) -> bool {
    n >= config.min_group_recruiters
}

/// Whether every required team is covered by a recruiter of that team or
/// by a wildcard recruiter.
pub fn team_diversity_satisfied<'a>(
    recruiter_teams: impl IntoIterator<Item = &'a Team> + Clone,
    required: &[Team],
) -> bool {
    missing_teams(recruiter_teams, required).is_empty()
}

/// Required teams no recruiter on the panel covers.
pub fn missing_teams<'a>(
    recruiter_teams: impl IntoIterator<Item = &'a Team> + Clone,
    required: &[Team],
) -> Vec<Team> {
    required
        .iter()
        .filter(|req| !recruiter_teams.clone().into_iter().any(|t| t.covers(req)))
        .cloned()
        .collect()
}

/// Whether an individual interviewer suits the applicant.
///
/// A wildcard recruiter always suits. An applicant without any declared
/// interest accepts any recruiter.
pub fn team_affinity_satisfied(applicant_teams: &BTreeSet<Team>, recruiter_team: &Team) -> bool {
    recruiter_team.is_wildcard()
        || applicant_teams.is_empty()
        || applicant_teams.contains(recruiter_team)
}

/// Whether the two interview starts are at most `max_gap_slots` grid slots apart.
pub fn proximity_ok(
    grid: &SlotGrid,
    group_start: NaiveDateTime,
    individual_start: NaiveDateTime,
    max_gap_slots: i64,
) -> bool {
    grid.slot_distance(group_start, individual_start) <= max_gap_slots
}

/// Absolute distance between two starts, in minutes.
#[inline]
pub fn gap_minutes(a: NaiveDateTime, b: NaiveDateTime) -> i64 {
    (a - b).num_minutes().abs()
}

/// Heuristic timing score of a candidate start against a partner interview:
/// `100 - gap` inside the proximity window, `0` outside it.
#[inline]
pub fn proximity_score(gap_minutes: i64, max_proximity_minutes: i64) -> i64 {
    if gap_minutes <= max_proximity_minutes {
        100 - gap_minutes
    } else {
        0
    }
}
