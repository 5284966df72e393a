//! Spacing repair.
//!
//! Bounded local search over proximity violations left by construction.
//! Each iteration takes the worst remaining gap and tries, in order:
//!
//! 1. moving the individual interview to the slot with the smallest
//!    admissible gap to the group;
//! 2. moving the whole group to a slot where strictly fewer members are in
//!    violation.
//!
//! A failed move restores the original placement. Violations that cannot be
//! improved are skipped so the remaining ones still get a turn.

use std::collections::HashSet;
use tracing::debug;

use super::{select_interviewer, select_panel};
use crate::attempt::{Placement, SchedulingAttempt};
use crate::constraints::{gap_minutes, group_recruiter_count_valid, proximity_ok};
use crate::models::InterviewKind;

/// Outcome of a repair run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    /// Iterations spent.
    pub iterations: usize,
    /// Successful moves.
    pub repaired: usize,
    /// Violations left afterwards.
    pub unrepaired: usize,
}

/// Repairs proximity violations for at most `max_iterations` iterations.
pub fn repair_spacing(attempt: &mut SchedulingAttempt<'_>, max_iterations: usize) -> RepairStats {
    let mut stats = RepairStats::default();
    let mut skipped: HashSet<usize> = HashSet::new();

    while stats.iterations < max_iterations {
        let Some(worst) = attempt
            .proximity_gaps()
            .into_iter()
            .find(|g| !skipped.contains(&g.applicant))
        else {
            break;
        };
        stats.iterations += 1;

        if relocate_individual(attempt, worst.applicant) || relocate_group(attempt, worst.applicant) {
            stats.repaired += 1;
            debug!(
                applicant = %attempt.pools().applicant(worst.applicant).id,
                gap_minutes = worst.gap_minutes,
                "spacing repaired"
            );
        } else {
            skipped.insert(worst.applicant);
            debug!(
                applicant = %attempt.pools().applicant(worst.applicant).id,
                gap_minutes = worst.gap_minutes,
                "spacing left as is"
            );
        }
    }

    stats.unrepaired = attempt.proximity_gaps().len();
    stats
}

/// Moves the applicant's individual interview next to their group.
fn relocate_individual(attempt: &mut SchedulingAttempt<'_>, a: usize) -> bool {
    let pools = attempt.pools();
    let max_gap_slots = pools.config().max_gap_slots();
    let Some(group_start) = attempt
        .placement_of(a, InterviewKind::Group)
        .map(|g| g.interval.start())
    else {
        return false;
    };
    let Some(original) = attempt
        .placement_id(a, InterviewKind::Individual)
        .and_then(|id| attempt.retract(id))
    else {
        return false;
    };

    let mut best: Option<(i64, usize, usize, usize)> = None;
    for &slot in pools.applicant_slots(InterviewKind::Individual, a) {
        let Some(interval) = pools.interval(InterviewKind::Individual, slot) else {
            continue;
        };
        if !attempt.applicant_can_take(a, InterviewKind::Individual, slot)
            || !proximity_ok(pools.grid(), group_start, interval.start(), max_gap_slots)
        {
            continue;
        }
        let Some(&room) = attempt.free_rooms(InterviewKind::Individual, slot).first() else {
            continue;
        };
        let free = attempt.free_recruiters(InterviewKind::Individual, slot);
        let Some(recruiter) = select_interviewer(pools, a, &free) else {
            continue;
        };
        let gap = gap_minutes(group_start, interval.start());
        if best.map_or(true, |(g, ..)| gap < g) {
            best = Some((gap, slot, room, recruiter));
        }
    }

    match best.and_then(|(_, slot, room, recruiter)| {
        pools
            .interval(InterviewKind::Individual, slot)
            .map(|interval| (slot, interval, room, recruiter))
    }) {
        Some((slot, interval, room, recruiter)) => {
            attempt.commit(Placement {
                kind: InterviewKind::Individual,
                slot,
                interval,
                room,
                applicants: vec![a],
                recruiters: vec![recruiter],
            });
            true
        }
        None => {
            attempt.commit(original);
            false
        }
    }
}

/// Moves the applicant's whole group when that strictly reduces the number
/// of members in violation.
fn relocate_group(attempt: &mut SchedulingAttempt<'_>, a: usize) -> bool {
    let pools = attempt.pools();
    let config = pools.config();
    let Some(original) = attempt
        .placement_id(a, InterviewKind::Group)
        .and_then(|id| attempt.retract(id))
    else {
        return false;
    };
    let members = original.applicants.clone();
    let before = violating_members(attempt, &members, original.interval.start());

    let mut best: Option<(usize, usize, usize)> = None;
    for slot in 0..pools.grid().len() {
        if slot == original.slot {
            continue;
        }
        let Some(interval) = pools.interval(InterviewKind::Group, slot) else {
            continue;
        };
        if !members
            .iter()
            .all(|&m| attempt.applicant_can_take(m, InterviewKind::Group, slot))
        {
            continue;
        }
        let Some(&room) = attempt.free_rooms(InterviewKind::Group, slot).first() else {
            continue;
        };
        let free = attempt.free_recruiters(InterviewKind::Group, slot);
        if !group_recruiter_count_valid(free.len(), config) {
            continue;
        }
        let after = violating_members(attempt, &members, interval.start());
        if after < before && best.map_or(true, |(b, ..)| after < b) {
            best = Some((after, slot, room));
        }
    }

    let Some((_, slot, room)) = best else {
        attempt.commit(original);
        return false;
    };
    let Some(interval) = pools.interval(InterviewKind::Group, slot) else {
        attempt.commit(original);
        return false;
    };
    let free = attempt.free_recruiters(InterviewKind::Group, slot);
    attempt.commit(Placement {
        kind: InterviewKind::Group,
        slot,
        interval,
        room,
        applicants: members,
        recruiters: select_panel(pools, &free),
    });
    true
}

fn violating_members(attempt: &SchedulingAttempt<'_>, members: &[usize], group_start: chrono::NaiveDateTime) -> usize {
    let pools = attempt.pools();
    let max_gap_slots = pools.config().max_gap_slots();
    members
        .iter()
        .filter_map(|&m| attempt.placement_of(m, InterviewKind::Individual))
        .filter(|ind| !proximity_ok(pools.grid(), group_start, ind.interval.start(), max_gap_slots))
        .count()
}
