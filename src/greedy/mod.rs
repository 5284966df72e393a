//! Heuristic construction strategy.
//!
//! # Algorithm
//!
//! **Phase 1 (maximum coverage)**: applicants are visited once, in scarcity
//! order (fewest admissible slots first). Each applicant gets a group
//! interview, then an individual one. Candidate slots are scanned
//! chronologically and scored; the best-scoring candidate wins and ties keep
//! the earliest slot.
//!
//! - Group: `10 * size + 5 * recruiters + timing`, plus a bonus of 50 when
//!   the group reaches the preferred size. A new group takes the applicant
//!   plus the next still-ungrouped applicants that can attend the slot.
//! - Individual: `100 + 2 * free recruiters + timing`.
//!
//! `timing` is `100 - gap` for every partner interview inside the proximity
//! window. An applicant no slot admits stays unscheduled for that kind.
//!
//! **Phase 2 (spacing repair)**: see [`repair`].
//!
//! There is no backtracking across applicants, so a run is fast and always
//! terminates.

pub mod repair;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::attempt::{Placement, SchedulingAttempt};
use crate::constraints::{
    gap_minutes, group_recruiter_count_valid, group_size_valid, proximity_score, team_affinity_satisfied,
};
use crate::models::{InterviewKind, Schedule};
use crate::pool::ResourcePools;
use crate::scheduler::Strategy;

pub use repair::{repair_spacing, RepairStats};

/// Order in which phase 1 visits applicants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicantOrder {
    /// Fewest admissible slots first; ties keep input order.
    Scarcity,
    /// Seeded random permutation.
    Shuffled(u64),
}

/// Greedy construction with spacing repair.
#[derive(Debug, Clone)]
pub struct GreedyConstruction {
    order: ApplicantOrder,
}

impl Default for GreedyConstruction {
    fn default() -> Self {
        Self::new()
    }
}

impl GreedyConstruction {
    pub const NAME: &'static str = "greedy_construction";
    pub const SHUFFLED_NAME: &'static str = "shuffled_greedy";

    /// Scarcity-ordered construction.
    pub fn new() -> Self {
        Self {
            order: ApplicantOrder::Scarcity,
        }
    }

    /// Construction over a seeded shuffle of the applicants.
    pub fn shuffled(seed: u64) -> Self {
        Self {
            order: ApplicantOrder::Shuffled(seed),
        }
    }

    pub fn applicant_order(&self) -> ApplicantOrder {
        self.order
    }

    /// Applicant indices in visiting order.
    pub fn visiting_order(&self, pools: &ResourcePools) -> Vec<usize> {
        match self.order {
            ApplicantOrder::Scarcity => pools.scarcity_order(),
            ApplicantOrder::Shuffled(seed) => {
                let mut order: Vec<usize> = (0..pools.applicants().len()).collect();
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                order.shuffle(&mut rng);
                order
            }
        }
    }

    /// Runs phase 1 only.
    pub fn construct<'a>(&self, pools: &'a ResourcePools) -> SchedulingAttempt<'a> {
        let order = self.visiting_order(pools);
        let mut attempt = SchedulingAttempt::new(pools);

        for &a in &order {
            if !attempt.has_group(a) {
                place_group(&mut attempt, a, &order);
            }
            if !attempt.has_individual(a) {
                place_individual(&mut attempt, a);
            }
        }

        debug!(
            strategy = self.name(),
            groups = attempt.group_ids().len(),
            complete = attempt.complete_count(),
            proximity_violations = attempt.proximity_gaps().len(),
            "phase 1 finished"
        );
        attempt
    }
}

impl Strategy for GreedyConstruction {
    fn name(&self) -> &str {
        match self.order {
            ApplicantOrder::Scarcity => Self::NAME,
            ApplicantOrder::Shuffled(_) => Self::SHUFFLED_NAME,
        }
    }

    fn attempt(&self, pools: &ResourcePools) -> Schedule {
        let mut attempt = self.construct(pools);
        let stats = repair_spacing(&mut attempt, pools.config().repair_iteration_cap);
        info!(
            strategy = self.name(),
            complete = attempt.complete_count(),
            repaired = stats.repaired,
            unrepaired = stats.unrepaired,
            "greedy construction finished"
        );
        attempt.into_schedule(self.name())
    }
}

enum GroupChoice {
    Join(usize),
    Open {
        slot: usize,
        room: usize,
        members: Vec<usize>,
        free_recruiters: Vec<usize>,
    },
}

/// Scores and commits the best group interview for `a`.
fn place_group(attempt: &mut SchedulingAttempt<'_>, a: usize, order: &[usize]) -> bool {
    let pools = attempt.pools();
    let config = pools.config();
    let mut best: Option<(i64, GroupChoice)> = None;

    for &slot in pools.applicant_slots(InterviewKind::Group, a) {
        if !attempt.applicant_can_take(a, InterviewKind::Group, slot) {
            continue;
        }

        for id in attempt.group_ids() {
            let Some(group) = attempt.placement(id) else {
                continue;
            };
            if group.slot != slot || group.applicants.len() >= config.max_group_size {
                continue;
            }
            let mut members = group.applicants.clone();
            members.push(a);
            let score = group_score(attempt, slot, &members, group.recruiters.len());
            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((score, GroupChoice::Join(id)));
            }
        }

        let rooms = attempt.free_rooms(InterviewKind::Group, slot);
        let Some(&room) = rooms.first() else {
            continue;
        };
        let free_recruiters = attempt.free_recruiters(InterviewKind::Group, slot);
        if !group_recruiter_count_valid(free_recruiters.len(), config) {
            continue;
        }

        let mut members = vec![a];
        members.extend(
            order
                .iter()
                .copied()
                .filter(|&b| b != a && attempt.applicant_can_take(b, InterviewKind::Group, slot))
                .take(config.max_group_size.saturating_sub(1)),
        );
        if !group_size_valid(members.len(), config) {
            continue;
        }

        let score = group_score(attempt, slot, &members, free_recruiters.len());
        if best.as_ref().map_or(true, |(s, _)| score > *s) {
            best = Some((
                score,
                GroupChoice::Open {
                    slot,
                    room,
                    members,
                    free_recruiters,
                },
            ));
        }
    }

    match best {
        Some((_, GroupChoice::Join(id))) => attempt.add_member(id, a),
        Some((
            _,
            GroupChoice::Open {
                slot,
                room,
                members,
                free_recruiters,
            },
        )) => {
            let Some(interval) = pools.interval(InterviewKind::Group, slot) else {
                return false;
            };
            attempt.commit(Placement {
                kind: InterviewKind::Group,
                slot,
                interval,
                room,
                applicants: members,
                recruiters: select_panel(pools, &free_recruiters),
            });
            true
        }
        None => false,
    }
}

/// Scores and commits the best individual interview for `a`.
fn place_individual(attempt: &mut SchedulingAttempt<'_>, a: usize) -> bool {
    let pools = attempt.pools();
    let mut best: Option<(i64, usize, usize, usize)> = None;

    for &slot in pools.applicant_slots(InterviewKind::Individual, a) {
        if !attempt.applicant_can_take(a, InterviewKind::Individual, slot) {
            continue;
        }
        let rooms = attempt.free_rooms(InterviewKind::Individual, slot);
        let Some(&room) = rooms.first() else {
            continue;
        };
        let free = attempt.free_recruiters(InterviewKind::Individual, slot);
        let Some(recruiter) = select_interviewer(pools, a, &free) else {
            continue;
        };

        let score = 100 + 2 * free.len() as i64 + individual_timing(attempt, a, slot);
        if best.map_or(true, |(s, ..)| score > s) {
            best = Some((score, slot, room, recruiter));
        }
    }

    let Some((_, slot, room, recruiter)) = best else {
        return false;
    };
    let Some(interval) = pools.interval(InterviewKind::Individual, slot) else {
        return false;
    };
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

fn group_score(attempt: &SchedulingAttempt<'_>, slot: usize, members: &[usize], recruiters: usize) -> i64 {
    let pools = attempt.pools();
    let config = pools.config();
    let Some(start) = pools.interval(InterviewKind::Group, slot).map(|i| i.start()) else {
        return i64::MIN;
    };

    let timing: i64 = members
        .iter()
        .filter_map(|&m| attempt.placement_of(m, InterviewKind::Individual))
        .map(|ind| proximity_score(gap_minutes(start, ind.interval.start()), config.max_proximity_minutes))
        .sum();
    let bonus = if members.len() >= config.preferred_group_size { 50 } else { 0 };

    10 * members.len() as i64 + 5 * recruiters as i64 + timing + bonus
}

fn individual_timing(attempt: &SchedulingAttempt<'_>, a: usize, slot: usize) -> i64 {
    let pools = attempt.pools();
    match (
        attempt.placement_of(a, InterviewKind::Group),
        pools.interval(InterviewKind::Individual, slot),
    ) {
        (Some(group), Some(own)) => proximity_score(
            gap_minutes(group.interval.start(), own.start()),
            pools.config().max_proximity_minutes,
        ),
        _ => 0,
    }
}

/// Picks exactly `min_group_recruiters` panel members, covering required
/// teams first (by team member, then by wildcard).
pub(crate) fn select_panel(pools: &ResourcePools, free: &[usize]) -> Vec<usize> {
    let size = pools.config().min_group_recruiters;
    let mut panel: Vec<usize> = Vec::with_capacity(size);

    for team in pools.required_teams() {
        if panel.len() >= size {
            break;
        }
        if panel.iter().any(|&r| pools.recruiter(r).team.covers(team)) {
            continue;
        }
        let pick = free
            .iter()
            .copied()
            .filter(|r| !panel.contains(r))
            .find(|&r| &pools.recruiter(r).team == team)
            .or_else(|| {
                free.iter()
                    .copied()
                    .filter(|r| !panel.contains(r))
                    .find(|&r| pools.recruiter(r).team.is_wildcard())
            });
        if let Some(r) = pick {
            panel.push(r);
        }
    }

    for &r in free {
        if panel.len() >= size {
            break;
        }
        if !panel.contains(&r) {
            panel.push(r);
        }
    }
    panel
}

/// First free recruiter matching the applicant's teams, else the first free recruiter.
pub(crate) fn select_interviewer(pools: &ResourcePools, a: usize, free: &[usize]) -> Option<usize> {
    let interests = &pools.applicant(a).interested_teams;
    free.iter()
        .copied()
        .find(|&r| team_affinity_satisfied(interests, &pools.recruiter(r).team))
        .or_else(|| free.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::models::{Applicant, EventDay, Interval, Recruiter, Room, Team};
    use chrono::NaiveDate;

    fn window(from: (u32, u32), to: (u32, u32)) -> Interval {
        let date = NaiveDate::from_ymd_opt(2025, 9, 13).unwrap();
        Interval::new(
            date.and_hms_opt(from.0, from.1, 0).unwrap(),
            date.and_hms_opt(to.0, to.1, 0).unwrap(),
        )
        .unwrap()
    }

    fn config() -> SchedulerConfig {
        SchedulerConfig::new(vec![EventDay::from_hours(2025, 9, 13, 9, 13).unwrap()])
            .with_teams(["Astra", "Juvo", "Terra"])
    }

    fn recruiters() -> Vec<Recruiter> {
        vec![
            Recruiter::new("r0", "Astra").with_window(window((9, 0), (13, 0))),
            Recruiter::new("r1", "Astra").with_window(window((9, 0), (13, 0))),
            Recruiter::new("r2", "Astra").with_window(window((9, 0), (13, 0))),
            Recruiter::new("r3", "Juvo").with_window(window((9, 0), (13, 0))),
            Recruiter::new("r4", "Terra").with_window(window((9, 0), (13, 0))),
            Recruiter::new("r5", "All").with_window(window((9, 0), (13, 0))),
        ]
    }

    fn pools(applicants: Vec<Applicant>) -> ResourcePools {
        let rooms = vec![
            Room::new("101").with_window(window((9, 0), (13, 0))),
            Room::new("102").with_window(window((9, 0), (13, 0))),
        ];
        ResourcePools::new(applicants, recruiters(), rooms, config()).unwrap()
    }

    fn applicants(n: usize) -> Vec<Applicant> {
        (0..n)
            .map(|i| Applicant::new(format!("a{i}")).with_team("Juvo").with_window(window((9, 0), (13, 0))))
            .collect()
    }

    #[test]
    fn test_phase1_covers_everyone() {
        let p = pools(applicants(6));
        let attempt = GreedyConstruction::new().construct(&p);
        assert_eq!(attempt.complete_count(), 6);
        assert_eq!(attempt.group_ids().len(), 1);
    }

    #[test]
    fn test_group_is_formed_at_earliest_best_slot() {
        let p = pools(applicants(5));
        let attempt = GreedyConstruction::new().construct(&p);
        let group = attempt.placement_of(0, InterviewKind::Group).unwrap();
        assert_eq!(group.slot, 0);
        assert_eq!(group.applicants.len(), 5);
        assert_eq!(group.recruiters.len(), 4);
    }

    #[test]
    fn test_individuals_land_near_group() {
        let p = pools(applicants(5));
        let attempt = GreedyConstruction::new().construct(&p);
        assert!((0..5).all(|a| attempt.proximity_holds(a)));
        assert!(attempt.proximity_gaps().is_empty());
    }

    #[test]
    fn test_select_panel_covers_required_teams() {
        let p = pools(applicants(4));
        let panel = select_panel(&p, &[0, 1, 2, 3, 4, 5]);
        assert_eq!(panel.len(), 4);
        let teams: Vec<&Team> = panel.iter().map(|&r| &p.recruiter(r).team).collect();
        assert!(teams.contains(&&Team::named("Juvo")));
        assert!(teams.contains(&&Team::named("Terra")));
        assert!(teams.contains(&&Team::named("Astra")));
    }

    #[test]
    fn test_select_panel_falls_back_to_wildcard() {
        let p = pools(applicants(4));
        // Terra's only recruiter is busy; the wildcard covers it.
        let panel = select_panel(&p, &[0, 1, 2, 3, 5]);
        assert!(panel.contains(&5));
        assert!(panel.contains(&3));
    }

    #[test]
    fn test_select_interviewer_prefers_affinity() {
        let p = pools(applicants(4));
        assert_eq!(select_interviewer(&p, 0, &[0, 1, 3]), Some(3));
        assert_eq!(select_interviewer(&p, 0, &[0, 1]), Some(0));
        assert_eq!(select_interviewer(&p, 0, &[]), None);
    }

    #[test]
    fn test_too_few_applicants_leaves_groups_empty() {
        let p = pools(applicants(3));
        let schedule = GreedyConstruction::new().attempt(&p);
        assert_eq!(schedule.count_of_kind(InterviewKind::Group), 0);
        assert_eq!(schedule.count_of_kind(InterviewKind::Individual), 3);
        assert!(schedule.unscheduled.iter().all(|u| u.missing_group && !u.missing_individual));
    }

    #[test]
    fn test_shuffled_order_is_deterministic() {
        let p = pools(applicants(8));
        let a = GreedyConstruction::shuffled(7).visiting_order(&p);
        let b = GreedyConstruction::shuffled(7).visiting_order(&p);
        assert_eq!(a, b);
        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..8).collect::<Vec<_>>());
        assert_eq!(GreedyConstruction::shuffled(7).name(), GreedyConstruction::SHUFFLED_NAME);
    }
}
