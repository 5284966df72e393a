//! Depth-first branch-and-bound over one solver pass.
//!
//! # Algorithm
//! Phase A gives every pass applicant a group session: it either joins a
//! session with spare capacity or opens a new one at `(slot, room)` with a
//! recruiter panel. Phase B then gives every applicant an individual
//! `(slot, room, recruiter)`, exploring candidates in order of increasing
//! start-to-start gap.
//!
//! The objective is the total gap (minutes) between each applicant's two
//! interview starts. Phase B prunes with a per-applicant lower bound taken
//! when the phase is entered; the search stops early once the incumbent
//! meets the static bound of the whole pass.
//!
//! # Symmetry
//! Resources that share their availability (and team, for recruiters) and
//! hold exactly the same bookings are interchangeable, so only one
//! representative of each such class is branched on.

use std::ops::RangeInclusive;

use super::budget::TimeBudget;
use super::{PassMode, PassSolution, SolverResult, TerminationReason};
use crate::attempt::{Placement, SchedulingAttempt};
use crate::constraints::{
    gap_minutes, group_recruiter_count_valid, group_size_valid, proximity_ok, team_affinity_satisfied,
    team_diversity_satisfied,
};
use crate::models::{Interval, InterviewKind};
use crate::pool::ResourcePools;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Halt {
    TimeLimit,
    BoundReached,
}

/// Search state of one pass. All bookings it makes on the attempt are
/// undone before [`PassSearch::run`] returns.
pub(crate) struct PassSearch<'s, 'a> {
    attempt: &'s mut SchedulingAttempt<'a>,
    pools: &'a ResourcePools,
    mode: PassMode,
    group_order: Vec<usize>,
    individual_order: Vec<usize>,
    /// Joinable group placements (pre-existing plus opened by this pass).
    sessions: Vec<usize>,
    /// Group placements opened by this pass.
    opened: Vec<usize>,
    budget: TimeBudget,
    best: Option<PassSolution>,
    lower_bound: i64,
    halted: Option<Halt>,
}

impl<'s, 'a> PassSearch<'s, 'a> {
    pub(crate) fn new(
        attempt: &'s mut SchedulingAttempt<'a>,
        applicants: &[usize],
        mode: PassMode,
        budget: TimeBudget,
    ) -> Self {
        let pools = attempt.pools();

        let mut group_order: Vec<usize> = applicants
            .iter()
            .copied()
            .filter(|&a| !attempt.has_group(a))
            .collect();
        group_order.sort_by_key(|&a| pools.applicant_slots(InterviewKind::Group, a).len());

        let mut individual_order: Vec<usize> = applicants
            .iter()
            .copied()
            .filter(|&a| !attempt.has_individual(a))
            .collect();
        individual_order.sort_by_key(|&a| pools.applicant_slots(InterviewKind::Individual, a).len());

        let sessions = attempt.group_ids();

        Self {
            attempt,
            pools,
            mode,
            group_order,
            individual_order,
            sessions,
            opened: Vec::new(),
            budget,
            best: None,
            lower_bound: 0,
            halted: None,
        }
    }

    /// Runs the search to completion, budget exhaustion or a proven bound.
    pub(crate) fn run(mut self) -> (SolverResult, TerminationReason, u64) {
        let bounds: Option<Vec<i64>> = self
            .individual_order
            .iter()
            .map(|&a| self.static_bound(a))
            .collect();

        match bounds {
            Some(bounds) => {
                self.lower_bound = bounds.iter().sum();
                self.assign_groups(0);
            }
            None => {
                return (SolverResult::Infeasible, TerminationReason::InfeasibilityProven, 0);
            }
        }

        let steps = self.budget.steps();
        let (result, reason) = match (self.halted, self.best) {
            (Some(Halt::TimeLimit), Some(best)) => (
                SolverResult::Feasible(best),
                TerminationReason::Aborted("time limit reached".to_string()),
            ),
            (Some(Halt::TimeLimit), None) => (
                SolverResult::Unknown,
                TerminationReason::Aborted("time limit reached".to_string()),
            ),
            (_, Some(best)) => (SolverResult::Optimal(best), TerminationReason::OptimalityProven),
            (_, None) => (SolverResult::Infeasible, TerminationReason::InfeasibilityProven),
        };
        (result, reason, steps)
    }

    fn should_stop(&mut self) -> bool {
        if self.halted.is_some() {
            return true;
        }
        self.budget.step();
        if self.budget.exhausted() {
            self.halted = Some(Halt::TimeLimit);
            return true;
        }
        false
    }

    // ---- phase A: group sessions ----

    fn assign_groups(&mut self, depth: usize) {
        if self.should_stop() {
            return;
        }
        if depth == self.group_order.len() {
            if self.opened_sessions_valid() {
                self.enter_individuals();
            }
            return;
        }
        if !self.sessions_fillable(depth) {
            return;
        }

        let pools = self.pools;
        let config = pools.config();
        let a = self.group_order[depth];

        for s in 0..self.sessions.len() {
            let id = self.sessions[s];
            let Some(session) = self.attempt.placement(id) else {
                continue;
            };
            if session.applicants.len() >= config.max_group_size {
                continue;
            }
            let slot = session.slot;
            if !self.attempt.applicant_can_take(a, InterviewKind::Group, slot) {
                continue;
            }
            self.attempt.add_member(id, a);
            self.assign_groups(depth + 1);
            self.attempt.remove_member(id, a);
            if self.halted.is_some() {
                return;
            }
        }

        for &slot in pools.applicant_slots(InterviewKind::Group, a) {
            if !self.attempt.applicant_can_take(a, InterviewKind::Group, slot) {
                continue;
            }
            let Some(interval) = pools.interval(InterviewKind::Group, slot) else {
                continue;
            };
            let free = self.attempt.free_recruiters(InterviewKind::Group, slot);
            if !group_recruiter_count_valid(free.len(), config) {
                continue;
            }
            let classes = self.recruiter_classes(&free);
            let rooms = self.room_representatives(self.attempt.free_rooms(InterviewKind::Group, slot));

            for room in rooms {
                for size in self.panel_sizes() {
                    let mut panel = Vec::with_capacity(size);
                    let opening = Opening {
                        depth,
                        applicant: a,
                        slot,
                        interval,
                        room,
                    };
                    self.open_with_panels(&opening, &classes, 0, size, &mut panel);
                    if self.halted.is_some() {
                        return;
                    }
                }
            }
        }
    }

    fn panel_sizes(&self) -> RangeInclusive<usize> {
        let min = self.pools.config().min_group_recruiters;
        let max = match self.mode {
            PassMode::Strict => min.max(self.pools.required_teams().len()),
            PassMode::Relaxed => min,
        };
        min..=max
    }

    /// Enumerates panels as per-class counts, taking a prefix of each class.
    fn open_with_panels(
        &mut self,
        opening: &Opening,
        classes: &[Vec<usize>],
        class: usize,
        remaining: usize,
        panel: &mut Vec<usize>,
    ) {
        if self.halted.is_some() {
            return;
        }
        if remaining == 0 {
            self.open_session(opening, panel);
            return;
        }
        if class == classes.len() {
            return;
        }
        let available: usize = classes[class..].iter().map(Vec::len).sum();
        if available < remaining {
            return;
        }

        let members = &classes[class];
        for take in (0..=remaining.min(members.len())).rev() {
            panel.extend_from_slice(&members[..take]);
            self.open_with_panels(opening, classes, class + 1, remaining - take, panel);
            panel.truncate(panel.len() - take);
            if self.halted.is_some() {
                return;
            }
        }
    }

    fn open_session(&mut self, opening: &Opening, panel: &[usize]) {
        let pools = self.pools;
        if self.mode == PassMode::Strict
            && !team_diversity_satisfied(
                panel.iter().map(move |&r| &pools.recruiter(r).team),
                pools.required_teams(),
            )
        {
            return;
        }

        let id = self.attempt.commit(Placement {
            kind: InterviewKind::Group,
            slot: opening.slot,
            interval: opening.interval,
            room: opening.room,
            applicants: vec![opening.applicant],
            recruiters: panel.to_vec(),
        });
        self.sessions.push(id);
        self.opened.push(id);

        self.assign_groups(opening.depth + 1);

        self.opened.pop();
        self.sessions.pop();
        self.attempt.retract(id);
    }

    fn opened_sessions_valid(&self) -> bool {
        let config = self.pools.config();
        self.opened.iter().all(|&id| {
            self.attempt
                .placement(id)
                .is_some_and(|p| group_size_valid(p.applicants.len(), config))
        })
    }

    /// Whether the applicants still to place can bring every opened
    /// session up to the minimum group size.
    fn sessions_fillable(&self, depth: usize) -> bool {
        let pools = self.pools;
        let min = pools.config().min_group_size;
        let remaining = &self.group_order[depth..];

        let mut total_deficit = 0;
        for &id in &self.opened {
            let Some(session) = self.attempt.placement(id) else {
                continue;
            };
            let deficit = min.saturating_sub(session.applicants.len());
            if deficit == 0 {
                continue;
            }
            total_deficit += deficit;
            let candidates = remaining
                .iter()
                .filter(|&&b| pools.applicant_available(InterviewKind::Group, b, session.slot))
                .count();
            if candidates < deficit {
                return false;
            }
        }
        total_deficit <= remaining.len()
    }

    // ---- phase B: individual interviews ----

    fn enter_individuals(&mut self) {
        let bounds: Option<Vec<i64>> = self
            .individual_order
            .iter()
            .map(|&a| self.individual_candidates(a).first().map(|&(gap, _)| gap))
            .collect();
        let Some(bounds) = bounds else {
            return;
        };

        let mut suffix = vec![0; bounds.len() + 1];
        for i in (0..bounds.len()).rev() {
            suffix[i] = suffix[i + 1] + bounds[i];
        }
        self.assign_individuals(0, 0, &suffix);
    }

    fn assign_individuals(&mut self, depth: usize, cost: i64, suffix: &[i64]) {
        if self.should_stop() {
            return;
        }
        if self.cannot_improve(cost + suffix[depth]) {
            return;
        }
        if depth == self.individual_order.len() {
            self.record(cost);
            return;
        }

        let pools = self.pools;
        let a = self.individual_order[depth];

        for (gap, slot) in self.individual_candidates(a) {
            if self.cannot_improve(cost + gap + suffix[depth + 1]) {
                break;
            }
            let Some(interval) = pools.interval(InterviewKind::Individual, slot) else {
                continue;
            };
            let rooms = self.room_representatives(self.attempt.free_rooms(InterviewKind::Individual, slot));
            let recruiters: Vec<usize> = self
                .recruiter_classes(&self.eligible_recruiters(a, slot))
                .into_iter()
                .filter_map(|class| class.first().copied())
                .collect();

            for &room in &rooms {
                for &recruiter in &recruiters {
                    let id = self.attempt.commit(Placement {
                        kind: InterviewKind::Individual,
                        slot,
                        interval,
                        room,
                        applicants: vec![a],
                        recruiters: vec![recruiter],
                    });
                    self.assign_individuals(depth + 1, cost + gap, suffix);
                    self.attempt.retract(id);
                    if self.halted.is_some() {
                        return;
                    }
                }
            }
        }
    }

    fn cannot_improve(&self, bound: i64) -> bool {
        self.best.as_ref().is_some_and(|best| bound >= best.objective)
    }

    fn record(&mut self, cost: i64) {
        self.best = Some(PassSolution {
            objective: cost,
            placements: self.attempt.placements().cloned().collect(),
        });
        if cost <= self.lower_bound {
            self.halted = Some(Halt::BoundReached);
        }
    }

    /// Individual slots open to the applicant now, with their gap to the
    /// applicant's group start, smallest gap first.
    fn individual_candidates(&self, a: usize) -> Vec<(i64, usize)> {
        let pools = self.pools;
        let Some(group) = self.attempt.placement_of(a, InterviewKind::Group) else {
            return Vec::new();
        };
        let group_start = group.interval.start();
        let max_gap_slots = pools.config().max_gap_slots();

        let mut candidates: Vec<(i64, usize)> = pools
            .applicant_slots(InterviewKind::Individual, a)
            .iter()
            .copied()
            .filter(|&slot| self.attempt.applicant_can_take(a, InterviewKind::Individual, slot))
            .filter_map(|slot| {
                let start = pools.interval(InterviewKind::Individual, slot)?.start();
                if self.mode == PassMode::Strict
                    && !proximity_ok(pools.grid(), group_start, start, max_gap_slots)
                {
                    return None;
                }
                if self.attempt.free_rooms(InterviewKind::Individual, slot).is_empty()
                    || self.eligible_recruiters(a, slot).is_empty()
                {
                    return None;
                }
                Some((gap_minutes(group_start, start), slot))
            })
            .collect();
        candidates.sort_unstable();
        candidates
    }

    fn eligible_recruiters(&self, a: usize, slot: usize) -> Vec<usize> {
        let pools = self.pools;
        let interests = &pools.applicant(a).interested_teams;
        self.attempt
            .free_recruiters(InterviewKind::Individual, slot)
            .into_iter()
            .filter(|&r| {
                self.mode == PassMode::Relaxed || team_affinity_satisfied(interests, &pools.recruiter(r).team)
            })
            .collect()
    }

    /// Occupancy-free lower bound on the applicant's gap, or `None` when the
    /// applicant has no admissible group/individual pair at all.
    fn static_bound(&self, a: usize) -> Option<i64> {
        let fixed_group = self
            .attempt
            .placement_of(a, InterviewKind::Group)
            .map(|existing| existing.interval);
        pair_bound(self.pools, a, self.mode, fixed_group)
    }

    // ---- symmetry ----

    /// Groups free recruiters into interchangeable classes.
    fn recruiter_classes(&self, free: &[usize]) -> Vec<Vec<usize>> {
        let pools = self.pools;
        let mut classes: Vec<Vec<usize>> = Vec::new();
        for &r in free {
            let recruiter = pools.recruiter(r);
            let class = classes.iter_mut().find(|class| {
                let rep = class[0];
                let other = pools.recruiter(rep);
                other.team == recruiter.team
                    && other.availability == recruiter.availability
                    && self.attempt.recruiter_bookings(rep) == self.attempt.recruiter_bookings(r)
            });
            match class {
                Some(class) => class.push(r),
                None => classes.push(vec![r]),
            }
        }
        classes
    }

    /// One room per class of interchangeable free rooms.
    fn room_representatives(&self, free: Vec<usize>) -> Vec<usize> {
        let pools = self.pools;
        let mut reps: Vec<usize> = Vec::with_capacity(free.len());
        for room in free {
            let duplicate = reps.iter().any(|&rep| {
                pools.room(rep).availability == pools.room(room).availability
                    && self.attempt.room_bookings(rep) == self.attempt.room_bookings(room)
            });
            if !duplicate {
                reps.push(room);
            }
        }
        reps
    }
}

/// A candidate new group session.
struct Opening {
    depth: usize,
    applicant: usize,
    slot: usize,
    interval: Interval,
    room: usize,
}

/// Smallest start-to-start gap over the applicant's admissible
/// group/individual pairs, ignoring occupancy.
///
/// `fixed_group` pins the group interview to an existing placement. Strict
/// mode also requires proximity and an affine interviewer. Returns `None`
/// when no non-overlapping pair exists.
pub(crate) fn pair_bound(
    pools: &ResourcePools,
    a: usize,
    mode: PassMode,
    fixed_group: Option<Interval>,
) -> Option<i64> {
    let config = pools.config();
    let strict = mode == PassMode::Strict;
    let interests = &pools.applicant(a).interested_teams;

    let groups: Vec<Interval> = match fixed_group {
        Some(interval) => vec![interval],
        None => pools
            .applicant_slots(InterviewKind::Group, a)
            .iter()
            .filter(|&&slot| {
                !pools.rooms_at(InterviewKind::Group, slot).is_empty()
                    && group_recruiter_count_valid(pools.recruiters_at(InterviewKind::Group, slot).len(), config)
            })
            .filter_map(|&slot| pools.interval(InterviewKind::Group, slot))
            .collect(),
    };

    let individuals: Vec<Interval> = pools
        .applicant_slots(InterviewKind::Individual, a)
        .iter()
        .filter(|&&slot| {
            !pools.rooms_at(InterviewKind::Individual, slot).is_empty()
                && pools
                    .recruiters_at(InterviewKind::Individual, slot)
                    .iter()
                    .any(|&r| !strict || team_affinity_satisfied(interests, &pools.recruiter(r).team))
        })
        .filter_map(|&slot| pools.interval(InterviewKind::Individual, slot))
        .collect();

    groups
        .iter()
        .flat_map(|g| individuals.iter().map(move |i| (g, i)))
        .filter(|(g, i)| !g.overlaps(i))
        .filter(|(g, i)| !strict || proximity_ok(pools.grid(), g.start(), i.start(), config.max_gap_slots()))
        .map(|(g, i)| gap_minutes(g.start(), i.start()))
        .min()
}
