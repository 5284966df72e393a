//! Per-attempt scheduling state.
//!
//! A [`SchedulingAttempt`] owns everything a strategy mutates: committed
//! placements, which applicants already hold a group or individual
//! interview, and the room/recruiter occupancy index. It is built fresh for
//! every strategy run and never shared, so strategies cannot observe each
//! other's bookings.
//!
//! # Occupancy
//! Occupancy is keyed by `(grid cell start, resource)`. An interview marks
//! every cell it covers, so a 40-minute group blocks two 20-minute cells.

use chrono::NaiveDateTime;
use std::collections::HashSet;

use crate::constraints::{
    gap_minutes, has_direct_conflict, missing_teams, proximity_ok, team_affinity_satisfied,
};
use crate::models::{Interval, Interview, InterviewKind, Schedule, UnscheduledApplicant, Violation};
use crate::pool::ResourcePools;

/// One committed interview, in pool indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub kind: InterviewKind,
    pub slot: usize,
    pub interval: Interval,
    pub room: usize,
    pub applicants: Vec<usize>,
    pub recruiters: Vec<usize>,
}

/// A proximity shortfall between an applicant's two interviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityGap {
    pub applicant: usize,
    pub gap_minutes: i64,
}

/// Mutable state of one strategy run.
#[derive(Debug, Clone)]
pub struct SchedulingAttempt<'a> {
    pools: &'a ResourcePools,
    placements: Vec<Option<Placement>>,
    group_of: Vec<Option<usize>>,
    individual_of: Vec<Option<usize>>,
    room_cells: HashSet<(NaiveDateTime, usize)>,
    recruiter_cells: HashSet<(NaiveDateTime, usize)>,
    room_bookings: Vec<Vec<usize>>,
    recruiter_bookings: Vec<Vec<usize>>,
}

impl<'a> SchedulingAttempt<'a> {
    /// Creates an attempt with no bookings.
    pub fn new(pools: &'a ResourcePools) -> Self {
        let n = pools.applicants().len();
        Self {
            pools,
            placements: Vec::new(),
            group_of: vec![None; n],
            individual_of: vec![None; n],
            room_cells: HashSet::new(),
            recruiter_cells: HashSet::new(),
            room_bookings: vec![Vec::new(); pools.rooms().len()],
            recruiter_bookings: vec![Vec::new(); pools.recruiters().len()],
        }
    }

    /// Rebuilds an attempt from a set of placements.
    pub fn from_placements(pools: &'a ResourcePools, placements: impl IntoIterator<Item = Placement>) -> Self {
        let mut attempt = Self::new(pools);
        for placement in placements {
            attempt.commit(placement);
        }
        attempt
    }

    pub fn pools(&self) -> &'a ResourcePools {
        self.pools
    }

    /// Whether the applicant holds a group interview.
    pub fn has_group(&self, applicant: usize) -> bool {
        self.group_of[applicant].is_some()
    }

    /// Whether the applicant holds an individual interview.
    pub fn has_individual(&self, applicant: usize) -> bool {
        self.individual_of[applicant].is_some()
    }

    /// Whether the applicant holds an interview of `kind`.
    pub fn has_kind(&self, applicant: usize, kind: InterviewKind) -> bool {
        match kind {
            InterviewKind::Group => self.has_group(applicant),
            InterviewKind::Individual => self.has_individual(applicant),
        }
    }

    /// Whether the applicant holds both interviews.
    pub fn is_complete(&self, applicant: usize) -> bool {
        self.has_group(applicant) && self.has_individual(applicant)
    }

    /// Number of applicants holding both interviews.
    pub fn complete_count(&self) -> usize {
        (0..self.group_of.len()).filter(|&a| self.is_complete(a)).count()
    }

    /// Id of the applicant's placement of `kind`.
    pub fn placement_id(&self, applicant: usize, kind: InterviewKind) -> Option<usize> {
        match kind {
            InterviewKind::Group => self.group_of[applicant],
            InterviewKind::Individual => self.individual_of[applicant],
        }
    }

    /// The applicant's placement of `kind`.
    pub fn placement_of(&self, applicant: usize, kind: InterviewKind) -> Option<&Placement> {
        self.placement_id(applicant, kind)
            .and_then(|id| self.placements[id].as_ref())
    }

    /// Placement by id, if still live.
    pub fn placement(&self, id: usize) -> Option<&Placement> {
        self.placements.get(id).and_then(Option::as_ref)
    }

    /// Ids of the live group placements, in commit order.
    pub fn group_ids(&self) -> Vec<usize> {
        self.placements
            .iter()
            .enumerate()
            .filter(|(_, p)| matches!(p, Some(p) if p.kind == InterviewKind::Group))
            .map(|(id, _)| id)
            .collect()
    }

    /// Adds an applicant to a committed group.
    ///
    /// Returns `false` if `id` is not a live group or already lists the applicant.
    pub fn add_member(&mut self, id: usize, applicant: usize) -> bool {
        match self.placements.get_mut(id) {
            Some(Some(p)) if p.kind == InterviewKind::Group && !p.applicants.contains(&applicant) => {
                p.applicants.push(applicant);
                self.group_of[applicant] = Some(id);
                true
            }
            _ => false,
        }
    }

    /// Removes an applicant from a committed group.
    pub fn remove_member(&mut self, id: usize, applicant: usize) -> bool {
        match self.placements.get_mut(id) {
            Some(Some(p)) if p.kind == InterviewKind::Group => {
                let before = p.applicants.len();
                p.applicants.retain(|&a| a != applicant);
                if self.group_of[applicant] == Some(id) {
                    self.group_of[applicant] = None;
                }
                p.applicants.len() < before
            }
            _ => false,
        }
    }

    /// Live placements.
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().flatten()
    }

    /// Whether the room has no booking overlapping `interval`.
    pub fn room_free(&self, room: usize, interval: &Interval) -> bool {
        self.pools
            .grid()
            .cells(interval)
            .all(|cell| !self.room_cells.contains(&(cell, room)))
    }

    /// Whether the recruiter has no booking overlapping `interval`.
    pub fn recruiter_free(&self, recruiter: usize, interval: &Interval) -> bool {
        self.pools
            .grid()
            .cells(interval)
            .all(|cell| !self.recruiter_cells.contains(&(cell, recruiter)))
    }

    /// Placement ids booked in the room, in commit order.
    pub fn room_bookings(&self, room: usize) -> &[usize] {
        &self.room_bookings[room]
    }

    /// Placement ids the recruiter sits on, in commit order.
    pub fn recruiter_bookings(&self, recruiter: usize) -> &[usize] {
        &self.recruiter_bookings[recruiter]
    }

    /// Whether `interval` overlaps one of the applicant's interviews.
    pub fn applicant_conflict(&self, applicant: usize, interval: &Interval) -> bool {
        let existing = [InterviewKind::Group, InterviewKind::Individual]
            .into_iter()
            .filter_map(|kind| self.placement_of(applicant, kind))
            .map(|p| &p.interval);
        has_direct_conflict(interval, existing)
    }

    /// Whether the applicant can take an interview of `kind` at `slot`:
    /// not yet holding one, available, and free of a direct conflict.
    pub fn applicant_can_take(&self, applicant: usize, kind: InterviewKind, slot: usize) -> bool {
        if self.has_kind(applicant, kind) || !self.pools.applicant_available(kind, applicant, slot) {
            return false;
        }
        match self.pools.interval(kind, slot) {
            Some(interval) => !self.applicant_conflict(applicant, &interval),
            None => false,
        }
    }

    /// Available rooms not booked for `kind` at `slot`.
    pub fn free_rooms(&self, kind: InterviewKind, slot: usize) -> Vec<usize> {
        let Some(interval) = self.pools.interval(kind, slot) else {
            return Vec::new();
        };
        self.pools
            .rooms_at(kind, slot)
            .iter()
            .copied()
            .filter(|&room| self.room_free(room, &interval))
            .collect()
    }

    /// Available recruiters not booked for `kind` at `slot`.
    pub fn free_recruiters(&self, kind: InterviewKind, slot: usize) -> Vec<usize> {
        let Some(interval) = self.pools.interval(kind, slot) else {
            return Vec::new();
        };
        self.pools
            .recruiters_at(kind, slot)
            .iter()
            .copied()
            .filter(|&r| self.recruiter_free(r, &interval))
            .collect()
    }

    /// Commits a placement whose constraints the caller has checked.
    ///
    /// Returns the placement id.
    pub fn commit(&mut self, placement: Placement) -> usize {
        let id = self.placements.len();
        self.room_bookings[placement.room].push(id);
        for &r in &placement.recruiters {
            self.recruiter_bookings[r].push(id);
        }
        for cell in self.pools.grid().cells(&placement.interval) {
            self.room_cells.insert((cell, placement.room));
            for &r in &placement.recruiters {
                self.recruiter_cells.insert((cell, r));
            }
        }
        for &a in &placement.applicants {
            match placement.kind {
                InterviewKind::Group => self.group_of[a] = Some(id),
                InterviewKind::Individual => self.individual_of[a] = Some(id),
            }
        }
        self.placements.push(Some(placement));
        id
    }

    /// Retracts a placement, freeing its resources and applicants.
    pub fn retract(&mut self, id: usize) -> Option<Placement> {
        let placement = self.placements.get_mut(id)?.take()?;
        while matches!(self.placements.last(), Some(None)) {
            self.placements.pop();
        }
        self.room_bookings[placement.room].retain(|&b| b != id);
        for &r in &placement.recruiters {
            self.recruiter_bookings[r].retain(|&b| b != id);
        }
        for cell in self.pools.grid().cells(&placement.interval) {
            self.room_cells.remove(&(cell, placement.room));
            for &r in &placement.recruiters {
                self.recruiter_cells.remove(&(cell, r));
            }
        }
        for &a in &placement.applicants {
            let slot = match placement.kind {
                InterviewKind::Group => &mut self.group_of[a],
                InterviewKind::Individual => &mut self.individual_of[a],
            };
            if *slot == Some(id) {
                *slot = None;
            }
        }
        Some(placement)
    }

    /// Start-to-start gap between the applicant's two interviews.
    pub fn gap_minutes(&self, applicant: usize) -> Option<i64> {
        let group = self.placement_of(applicant, InterviewKind::Group)?;
        let individual = self.placement_of(applicant, InterviewKind::Individual)?;
        Some(gap_minutes(group.interval.start(), individual.interval.start()))
    }

    /// Whether the applicant's two interviews respect the proximity window.
    ///
    /// `true` while either interview is missing.
    pub fn proximity_holds(&self, applicant: usize) -> bool {
        match (
            self.placement_of(applicant, InterviewKind::Group),
            self.placement_of(applicant, InterviewKind::Individual),
        ) {
            (Some(g), Some(i)) => proximity_ok(
                self.pools.grid(),
                g.interval.start(),
                i.interval.start(),
                self.pools.config().max_gap_slots(),
            ),
            _ => true,
        }
    }

    /// Applicants whose interviews violate the proximity window, worst first.
    pub fn proximity_gaps(&self) -> Vec<ProximityGap> {
        let mut gaps: Vec<ProximityGap> = (0..self.group_of.len())
            .filter(|&a| !self.proximity_holds(a))
            .filter_map(|a| {
                self.gap_minutes(a).map(|gap_minutes| ProximityGap {
                    applicant: a,
                    gap_minutes,
                })
            })
            .collect();
        gaps.sort_by(|x, y| y.gap_minutes.cmp(&x.gap_minutes).then(x.applicant.cmp(&y.applicant)));
        gaps
    }

    /// Converts the attempt into a chronological [`Schedule`].
    ///
    /// Lists every applicant missing an interview and annotates the soft
    /// shortfalls that survived construction.
    pub fn into_schedule(self, strategy: &str) -> Schedule {
        let pools = self.pools;
        let mut schedule = Schedule::new(strategy);

        for placement in self.placements() {
            let room = &pools.room(placement.room).id;
            let recruiter_ids: Vec<String> = placement
                .recruiters
                .iter()
                .map(|&r| pools.recruiter(r).id.clone())
                .collect();

            match placement.kind {
                InterviewKind::Group => {
                    let missing = missing_teams(
                        placement.recruiters.iter().map(move |&r| &pools.recruiter(r).team),
                        pools.required_teams(),
                    );
                    if !missing.is_empty() {
                        let names: Vec<&str> = missing.iter().map(|t| t.as_str()).collect();
                        schedule.add_violation(Violation::diversity_shortfall(
                            room.clone(),
                            format!("group at {} lacks {}", placement.interval, names.join(", ")),
                        ));
                    }
                    schedule.add_interview(Interview::group(
                        placement.interval,
                        room.clone(),
                        placement
                            .applicants
                            .iter()
                            .map(|&a| pools.applicant(a).id.clone())
                            .collect(),
                        recruiter_ids,
                    ));
                }
                InterviewKind::Individual => {
                    let (Some(&a), Some(&r)) = (placement.applicants.first(), placement.recruiters.first())
                    else {
                        continue;
                    };
                    let applicant = pools.applicant(a);
                    let recruiter = pools.recruiter(r);
                    if !team_affinity_satisfied(&applicant.interested_teams, &recruiter.team) {
                        schedule.add_violation(Violation::affinity_shortfall(
                            applicant.id.clone(),
                            format!("interviewer '{}' is on team {}", recruiter.id, recruiter.team),
                        ));
                    }
                    schedule.add_interview(Interview::individual(
                        placement.interval,
                        room.clone(),
                        applicant.id.clone(),
                        recruiter.id.clone(),
                    ));
                }
            }
        }

        for gap in self.proximity_gaps() {
            schedule.add_violation(Violation::proximity_exceeded(
                pools.applicant(gap.applicant).id.clone(),
                gap.gap_minutes,
            ));
        }

        for (a, applicant) in pools.applicants().iter().enumerate() {
            if !self.is_complete(a) {
                schedule.unscheduled.push(UnscheduledApplicant {
                    applicant_id: applicant.id.clone(),
                    missing_group: !self.has_group(a),
                    missing_individual: !self.has_individual(a),
                });
            }
        }

        schedule.sort_chronologically();
        schedule
    }
}
