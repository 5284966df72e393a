//! Resource pools.
//!
//! Read-only indices built once per run from validated input: the slot grid,
//! id lookups, and for each interview kind the slots every applicant can
//! attend plus the rooms and recruiters available at every slot. Strategies
//! share the pools and keep their mutable state in a
//! [`SchedulingAttempt`](crate::attempt::SchedulingAttempt).

use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulingError};
use crate::models::{Applicant, Interval, InterviewKind, Recruiter, Room, SlotGrid, Team};
use crate::validation::{check_input, ValidationError};

/// Per-kind availability index.
#[derive(Debug, Clone, Default)]
struct KindIndex {
    /// Interview interval per slot (`None` when it would run past the day).
    intervals: Vec<Option<Interval>>,
    /// Slots each applicant can attend, ascending.
    applicant_slots: Vec<Vec<usize>>,
    /// Rooms available at each slot.
    slot_rooms: Vec<Vec<usize>>,
    /// Recruiters available at each slot.
    slot_recruiters: Vec<Vec<usize>>,
}

/// Immutable resource pools for one scheduling run.
#[derive(Debug, Clone)]
pub struct ResourcePools {
    config: SchedulerConfig,
    grid: SlotGrid,
    applicants: Vec<Applicant>,
    recruiters: Vec<Recruiter>,
    rooms: Vec<Room>,
    applicant_ids: HashMap<String, usize>,
    recruiter_ids: HashMap<String, usize>,
    room_ids: HashMap<String, usize>,
    required_teams: Vec<Team>,
    group: KindIndex,
    individual: KindIndex,
}

impl ResourcePools {
    /// Validates the input and builds every index.
    ///
    /// # Errors
    /// - [`SchedulingError::InvalidConfig`] for an invalid configuration
    /// - [`SchedulingError::InvalidInput`] with every malformed record found
    ///
    /// Records that are well formed but can never be booked (no availability,
    /// no event day, unknown team) are logged and kept.
    pub fn new(
        applicants: Vec<Applicant>,
        recruiters: Vec<Recruiter>,
        rooms: Vec<Room>,
        config: SchedulerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let (fatal, notices): (Vec<ValidationError>, Vec<ValidationError>) =
            check_input(&applicants, &recruiters, &rooms, &config)
                .into_iter()
                .partition(ValidationError::is_fatal);
        if !fatal.is_empty() {
            return Err(SchedulingError::InvalidInput(fatal));
        }
        for notice in &notices {
            warn!(kind = ?notice.kind, "{}", notice.message);
        }

        let grid = SlotGrid::new(&config.event_days, config.slot_width_minutes)?;

        let required_teams = effective_teams(&applicants, &recruiters, &config);
        let group = build_index(
            &grid,
            config.group_duration_minutes,
            &applicants,
            &recruiters,
            &rooms,
        );
        let individual = build_index(
            &grid,
            config.individual_duration_minutes,
            &applicants,
            &recruiters,
            &rooms,
        );

        debug!(
            applicants = applicants.len(),
            recruiters = recruiters.len(),
            rooms = rooms.len(),
            slots = grid.len(),
            required_teams = required_teams.len(),
            "resource pools built"
        );

        Ok(Self {
            applicant_ids: id_map(applicants.iter().map(|a| a.id.as_str())),
            recruiter_ids: id_map(recruiters.iter().map(|r| r.id.as_str())),
            room_ids: id_map(rooms.iter().map(|r| r.id.as_str())),
            config,
            grid,
            applicants,
            recruiters,
            rooms,
            required_teams,
            group,
            individual,
        })
    }

    /// Run configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Slot grid.
    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    /// All applicants, in input order.
    pub fn applicants(&self) -> &[Applicant] {
        &self.applicants
    }

    /// All recruiters, in input order.
    pub fn recruiters(&self) -> &[Recruiter] {
        &self.recruiters
    }

    /// All rooms, in input order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Applicant by index.
    pub fn applicant(&self, index: usize) -> &Applicant {
        &self.applicants[index]
    }

    /// Recruiter by index.
    pub fn recruiter(&self, index: usize) -> &Recruiter {
        &self.recruiters[index]
    }

    /// Room by index.
    pub fn room(&self, index: usize) -> &Room {
        &self.rooms[index]
    }

    /// Applicant by id.
    pub fn applicant_by_id(&self, id: &str) -> Result<&Applicant> {
        self.applicant_index(id)
            .map(|i| &self.applicants[i])
            .ok_or_else(|| SchedulingError::UnknownEntity {
                kind: "applicant",
                id: id.to_string(),
            })
    }

    /// Recruiter by id.
    pub fn recruiter_by_id(&self, id: &str) -> Result<&Recruiter> {
        self.recruiter_index(id)
            .map(|i| &self.recruiters[i])
            .ok_or_else(|| SchedulingError::UnknownEntity {
                kind: "recruiter",
                id: id.to_string(),
            })
    }

    /// Room by id.
    pub fn room_by_id(&self, id: &str) -> Result<&Room> {
        self.room_index(id)
            .map(|i| &self.rooms[i])
            .ok_or_else(|| SchedulingError::UnknownEntity {
                kind: "room",
                id: id.to_string(),
            })
    }

    pub fn applicant_index(&self, id: &str) -> Option<usize> {
        self.applicant_ids.get(id).copied()
    }

    pub fn recruiter_index(&self, id: &str) -> Option<usize> {
        self.recruiter_ids.get(id).copied()
    }

    pub fn room_index(&self, id: &str) -> Option<usize> {
        self.room_ids.get(id).copied()
    }

    /// Teams every group panel should cover.
    ///
    /// The configured universe (or the union of applicant interests when
    /// none is configured), minus teams no recruiter belongs to.
    pub fn required_teams(&self) -> &[Team] {
        &self.required_teams
    }

    /// Length of an interview of `kind`, in minutes.
    pub fn duration_minutes(&self, kind: InterviewKind) -> i64 {
        match kind {
            InterviewKind::Group => self.config.group_duration_minutes,
            InterviewKind::Individual => self.config.individual_duration_minutes,
        }
    }

    fn index(&self, kind: InterviewKind) -> &KindIndex {
        match kind {
            InterviewKind::Group => &self.group,
            InterviewKind::Individual => &self.individual,
        }
    }

    /// Interval of an interview of `kind` starting at `slot`, if it fits its day.
    pub fn interval(&self, kind: InterviewKind, slot: usize) -> Option<Interval> {
        self.index(kind).intervals.get(slot).copied().flatten()
    }

    /// Slots where the applicant is available for an interview of `kind`.
    pub fn applicant_slots(&self, kind: InterviewKind, applicant: usize) -> &[usize] {
        &self.index(kind).applicant_slots[applicant]
    }

    /// Whether the applicant is available for `kind` at `slot`.
    pub fn applicant_available(&self, kind: InterviewKind, applicant: usize, slot: usize) -> bool {
        self.applicant_slots(kind, applicant).binary_search(&slot).is_ok()
    }

    /// Rooms available for `kind` at `slot`.
    pub fn rooms_at(&self, kind: InterviewKind, slot: usize) -> &[usize] {
        self.index(kind)
            .slot_rooms
            .get(slot)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Recruiters available for `kind` at `slot`.
    pub fn recruiters_at(&self, kind: InterviewKind, slot: usize) -> &[usize] {
        self.index(kind)
            .slot_recruiters
            .get(slot)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of slots the applicant can attend across both kinds.
    pub fn scarcity(&self, applicant: usize) -> usize {
        self.group.applicant_slots[applicant].len() + self.individual.applicant_slots[applicant].len()
    }

    /// Applicant indices ordered by scarcity (fewest slots first).
    ///
    /// Ties keep input order.
    pub fn scarcity_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.applicants.len()).collect();
        order.sort_by_key(|&a| self.scarcity(a));
        order
    }
}

fn id_map<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    ids.enumerate().map(|(i, id)| (id.to_string(), i)).collect()
}

fn effective_teams(applicants: &[Applicant], recruiters: &[Recruiter], config: &SchedulerConfig) -> Vec<Team> {
    let universe: BTreeSet<Team> = if config.teams.is_empty() {
        applicants
            .iter()
            .flat_map(|a| a.interested_teams.iter().cloned())
            .collect()
    } else {
        config.teams.iter().map(|t| Team::named(t.as_str())).collect()
    };

    universe
        .into_iter()
        .filter(|team| !team.is_wildcard())
        .filter(|team| recruiters.iter().any(|r| &r.team == team))
        .collect()
}

fn build_index(
    grid: &SlotGrid,
    minutes: i64,
    applicants: &[Applicant],
    recruiters: &[Recruiter],
    rooms: &[Room],
) -> KindIndex {
    let intervals: Vec<Option<Interval>> = (0..grid.len())
        .map(|slot| grid.interview_interval(slot, minutes))
        .collect();

    let mut index = KindIndex {
        applicant_slots: vec![Vec::new(); applicants.len()],
        slot_rooms: vec![Vec::new(); grid.len()],
        slot_recruiters: vec![Vec::new(); grid.len()],
        intervals: Vec::new(),
    };

    for (slot, interval) in intervals.iter().enumerate() {
        let Some(interval) = interval else { continue };
        for (a, applicant) in applicants.iter().enumerate() {
            if applicant.availability.contains(interval) {
                index.applicant_slots[a].push(slot);
            }
        }
        index.slot_rooms[slot] = rooms
            .iter()
            .enumerate()
            .filter(|(_, room)| room.availability.contains(interval))
            .map(|(i, _)| i)
            .collect();
        index.slot_recruiters[slot] = recruiters
            .iter()
            .enumerate()
            .filter(|(_, r)| r.availability.contains(interval))
            .map(|(i, _)| i)
            .collect();
    }

    index.intervals = intervals;
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventDay;
    use crate::validation::ValidationErrorKind;
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
        SchedulerConfig::new(vec![EventDay::from_hours(2025, 9, 13, 9, 12).unwrap()])
    }

    fn pools() -> ResourcePools {
        let applicants = vec![
            Applicant::new("wide").with_team("Astra").with_window(window((9, 0), (12, 0))),
            Applicant::new("narrow").with_team("Juvo").with_window(window((9, 0), (9, 40))),
        ];
        let recruiters = vec![
            Recruiter::new("r1", "Astra").with_window(window((9, 0), (12, 0))),
            Recruiter::new("r2", "All").with_window(window((10, 0), (11, 0))),
        ];
        let rooms = vec![Room::new("101").with_window(window((9, 0), (10, 0)))];
        ResourcePools::new(applicants, recruiters, rooms, config()).unwrap()
    }

    #[test]
    fn test_pool_indices() {
        let p = pools();
        assert_eq!(p.grid().len(), 9);
        // group: slots 0..=7 fit the day; "wide" can attend any of them
        assert_eq!(p.applicant_slots(InterviewKind::Group, 0).len(), 8);
        assert_eq!(p.applicant_slots(InterviewKind::Group, 1), &[0]);
        assert_eq!(p.applicant_slots(InterviewKind::Individual, 1), &[0, 1]);
        assert!(p.interval(InterviewKind::Group, 8).is_none());
        assert!(p.interval(InterviewKind::Individual, 8).is_some());

        assert_eq!(p.rooms_at(InterviewKind::Group, 1), &[0]); // 9:20-10:00
        assert!(p.rooms_at(InterviewKind::Group, 2).is_empty());
        assert_eq!(p.recruiters_at(InterviewKind::Individual, 3), &[0, 1]);
        assert_eq!(p.recruiters_at(InterviewKind::Group, 0), &[0]);
    }

    #[test]
    fn test_scarcity_order() {
        let p = pools();
        assert_eq!(p.scarcity(1), 3);
        assert_eq!(p.scarcity_order(), vec![1, 0]);
    }

    #[test]
    fn test_required_teams_skip_uncovered() {
        // Juvo has no recruiter, so only Astra is required.
        let p = pools();
        assert_eq!(p.required_teams(), &[Team::named("Astra")]);
    }

    #[test]
    fn test_lookup_by_id() {
        let p = pools();
        assert_eq!(p.applicant_by_id("narrow").unwrap().id, "narrow");
        assert!(p.recruiter_by_id("r2").unwrap().team.is_wildcard());
        assert!(p.room_by_id("101").is_ok());
        assert!(matches!(
            p.applicant_by_id("ghost"),
            Err(SchedulingError::UnknownEntity { kind: "applicant", .. })
        ));
    }

    #[test]
    fn test_invalid_input_is_an_error() {
        let applicants = vec![Applicant::new("a"), Applicant::new("a")];
        let err = ResourcePools::new(applicants, vec![], vec![], config()).unwrap_err();
        match err {
            SchedulingError::InvalidInput(errors) => {
                assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_never_available_records_are_kept() {
        let applicants = vec![
            Applicant::new("wide").with_window(window((9, 0), (12, 0))),
            Applicant::new("ghost"),
        ];
        let recruiters = vec![
            Recruiter::new("r1", "Astra").with_window(window((9, 0), (12, 0))),
            Recruiter::new("idle", "Astra"),
        ];
        let rooms = vec![Room::new("101").with_window(window((9, 0), (12, 0)))];
        let config = config().with_teams(["Juvo"]);

        let p = ResourcePools::new(applicants, recruiters, rooms, config).unwrap();
        assert_eq!(p.applicants().len(), 2);
        assert_eq!(p.scarcity(1), 0);
        assert_eq!(p.scarcity_order()[0], 1);
        assert_eq!(p.recruiters_at(InterviewKind::Individual, 0), &[0]);
    }
}
