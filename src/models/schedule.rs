//! Schedule (solution) model.
//!
//! A schedule is the output of one strategy attempt: the committed
//! interviews, the applicants still missing an interview, and the
//! soft-constraint shortfalls that survived construction.
//!
//! Every report over a run (main schedule, per-applicant and per-recruiter
//! views, unscheduled list, block breakdown) is a projection of this type.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::{Interview, InterviewKind};

/// A complete schedule produced by one strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Name of the strategy that built this schedule.
    pub strategy: String,
    /// Committed interviews, chronological.
    pub interviews: Vec<Interview>,
    /// Applicants missing a group and/or individual interview.
    pub unscheduled: Vec<UnscheduledApplicant>,
    /// Soft-constraint shortfalls (metrics, not errors).
    pub violations: Vec<Violation>,
}

/// An applicant left without one or both interviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnscheduledApplicant {
    /// Applicant id.
    pub applicant_id: String,
    /// No group interview was placed.
    pub missing_group: bool,
    /// No individual interview was placed.
    pub missing_individual: bool,
}

impl UnscheduledApplicant {
    /// Whether neither interview was placed.
    pub fn missing_both(&self) -> bool {
        self.missing_group && self.missing_individual
    }
}

/// A soft-constraint shortfall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity id (applicant, or room for group panels).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of soft-constraint shortfalls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Group and individual interview starts are too far apart.
    ProximityExceeded,
    /// A group panel misses a required team.
    DiversityShortfall,
    /// An individual interviewer matches none of the applicant's teams.
    AffinityShortfall,
}

impl Violation {
    /// Creates a proximity violation.
    pub fn proximity_exceeded(applicant_id: impl Into<String>, gap_minutes: i64) -> Self {
        Self {
            violation_type: ViolationType::ProximityExceeded,
            entity_id: applicant_id.into(),
            message: format!("interview starts are {gap_minutes} minutes apart"),
            severity: 60,
        }
    }

    /// Creates a diversity shortfall for a group panel.
    pub fn diversity_shortfall(room_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::DiversityShortfall,
            entity_id: room_id.into(),
            message: message.into(),
            severity: 30,
        }
    }

    /// Creates an affinity shortfall for an individual interview.
    pub fn affinity_shortfall(applicant_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violation_type: ViolationType::AffinityShortfall,
            entity_id: applicant_id.into(),
            message: message.into(),
            severity: 20,
        }
    }
}

impl Schedule {
    /// Creates an empty schedule for a strategy.
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            ..Self::default()
        }
    }

    /// Adds an interview.
    pub fn add_interview(&mut self, interview: Interview) {
        self.interviews.push(interview);
    }

    /// Adds a violation.
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Number of interviews.
    pub fn interview_count(&self) -> usize {
        self.interviews.len()
    }

    /// Whether no interview was scheduled.
    pub fn is_empty(&self) -> bool {
        self.interviews.is_empty()
    }

    /// Number of interviews of one kind.
    pub fn count_of_kind(&self, kind: InterviewKind) -> usize {
        self.interviews.iter().filter(|i| i.kind() == kind).count()
    }

    /// All interviews an applicant takes part in.
    pub fn interviews_for_applicant(&self, applicant_id: &str) -> Vec<&Interview> {
        self.interviews
            .iter()
            .filter(|i| i.has_applicant(applicant_id))
            .collect()
    }

    /// All interviews a recruiter sits on.
    pub fn interviews_for_recruiter(&self, recruiter_id: &str) -> Vec<&Interview> {
        self.interviews
            .iter()
            .filter(|i| i.has_recruiter(recruiter_id))
            .collect()
    }

    /// All interviews held in a room.
    pub fn interviews_for_room(&self, room_id: &str) -> Vec<&Interview> {
        self.interviews
            .iter()
            .filter(|i| i.room() == room_id)
            .collect()
    }

    /// The applicant's interview of the given kind, if any.
    pub fn interview_of_kind(&self, applicant_id: &str, kind: InterviewKind) -> Option<&Interview> {
        self.interviews
            .iter()
            .find(|i| i.kind() == kind && i.has_applicant(applicant_id))
    }

    /// Number of distinct applicants holding both interviews.
    pub fn fully_scheduled_count(&self) -> usize {
        let mut group = HashSet::new();
        let mut individual = HashSet::new();
        for interview in &self.interviews {
            let target = match interview.kind() {
                InterviewKind::Group => &mut group,
                InterviewKind::Individual => &mut individual,
            };
            target.extend(interview.applicants().iter().map(String::as_str));
        }
        group.intersection(&individual).count()
    }

    /// Whether the applicant is listed as missing an interview.
    pub fn is_unscheduled(&self, applicant_id: &str) -> bool {
        self.unscheduled.iter().any(|u| u.applicant_id == applicant_id)
    }

    /// Interviews grouped by start time (time-block view).
    pub fn interviews_by_start(&self) -> BTreeMap<NaiveDateTime, Vec<&Interview>> {
        let mut blocks: BTreeMap<NaiveDateTime, Vec<&Interview>> = BTreeMap::new();
        for interview in &self.interviews {
            blocks
                .entry(interview.interval().start())
                .or_default()
                .push(interview);
        }
        blocks
    }

    /// Number of violations of one type.
    pub fn violation_count(&self, violation_type: &ViolationType) -> usize {
        self.violations
            .iter()
            .filter(|v| &v.violation_type == violation_type)
            .count()
    }

    /// Sorts interviews by start, then kind, then room.
    pub fn sort_chronologically(&mut self) {
        self.interviews.sort_by(|a, b| {
            (a.interval().start(), a.kind(), a.room()).cmp(&(b.interval().start(), b.kind(), b.room()))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Interval;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 13)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn sample_schedule() -> Schedule {
        let mut s = Schedule::new("test");
        s.add_interview(Interview::individual(
            Interval::starting_at(at(10, 0), 20).unwrap(),
            "R2",
            "a",
            "r5",
        ));
        s.add_interview(Interview::group(
            Interval::starting_at(at(9, 0), 40).unwrap(),
            "R1",
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec!["r1".into(), "r2".into(), "r3".into(), "r4".into()],
        ));
        s.add_interview(Interview::individual(
            Interval::starting_at(at(9, 0), 20).unwrap(),
            "R2",
            "e",
            "r5",
        ));
        s
    }

    #[test]
    fn test_counts() {
        let s = sample_schedule();
        assert_eq!(s.interview_count(), 3);
        assert_eq!(s.count_of_kind(InterviewKind::Group), 1);
        assert_eq!(s.count_of_kind(InterviewKind::Individual), 2);
        assert_eq!(s.fully_scheduled_count(), 1); // only "a" has both
    }

    #[test]
    fn test_projections() {
        let s = sample_schedule();
        assert_eq!(s.interviews_for_applicant("a").len(), 2);
        assert_eq!(s.interviews_for_recruiter("r5").len(), 2);
        assert_eq!(s.interviews_for_room("R1").len(), 1);
        assert!(s.interview_of_kind("e", InterviewKind::Group).is_none());
        assert!(s.interview_of_kind("e", InterviewKind::Individual).is_some());
    }

    #[test]
    fn test_time_blocks() {
        let s = sample_schedule();
        let blocks = s.interviews_by_start();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[&at(9, 0)].len(), 2);
    }

    #[test]
    fn test_sort_chronologically() {
        let mut s = sample_schedule();
        s.sort_chronologically();
        let starts: Vec<_> = s.interviews.iter().map(|i| i.interval().start()).collect();
        assert_eq!(starts, vec![at(9, 0), at(9, 0), at(10, 0)]);
        assert!(s.interviews[0].is_group()); // Group sorts before Individual
    }

    #[test]
    fn test_empty_schedule() {
        let s = Schedule::new("none");
        assert!(s.is_empty());
        assert_eq!(s.fully_scheduled_count(), 0);
        assert!(s.interviews_by_start().is_empty());
    }

    #[test]
    fn test_violation_factories() {
        let v = Violation::proximity_exceeded("a", 120);
        assert_eq!(v.violation_type, ViolationType::ProximityExceeded);
        assert_eq!(v.entity_id, "a");
        let v = Violation::diversity_shortfall("R1", "missing Terra");
        assert_eq!(v.violation_type, ViolationType::DiversityShortfall);
        let v = Violation::affinity_shortfall("a", "r5 is on Juvo");
        assert_eq!(v.violation_type, ViolationType::AffinityShortfall);
    }
}
