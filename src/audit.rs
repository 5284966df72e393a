//! Schedule audit.
//!
//! Re-checks a finished [`Schedule`] against the pools it claims to be built
//! from, without trusting anything the producing strategy recorded.
//!
//! # Checks
//! - Every referenced applicant, recruiter and room exists
//! - Interview shape (group: `[min, max]` applicants and enough recruiters;
//!   individual: one applicant, one recruiter) and configured length
//! - Every interview starts on a grid slot and ends within its day
//! - Every participant and the room are available for the whole interview
//! - Nobody and no room is booked twice in overlapping time
//! - No applicant holds two interviews of the same kind

use std::collections::HashMap;

use crate::models::{Availability, Interval, InterviewKind, Schedule};
use crate::pool::ResourcePools;

/// One audit finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFinding {
    pub kind: AuditFindingKind,
    pub message: String,
}

/// Classification of audit findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditFindingKind {
    /// Two overlapping interviews share an applicant, recruiter or room.
    DoubleBooking,
    /// Participant counts or length do not match the interview kind.
    InvalidShape,
    /// A participant or room is unavailable for part of the interview.
    OutsideAvailability,
    /// An id that names no loaded entity.
    UnknownEntity,
    /// Start off the slot grid, or an interview running past its day.
    OffGrid,
    /// An applicant holds two interviews of one kind.
    DuplicateInterview,
}

impl AuditFinding {
    fn new(kind: AuditFindingKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Audits a schedule. An empty result means the schedule is sound.
pub fn audit_schedule(schedule: &Schedule, pools: &ResourcePools) -> Vec<AuditFinding> {
    let config = pools.config();
    let mut findings = Vec::new();
    let mut bookings: HashMap<(&'static str, &str), Vec<Interval>> = HashMap::new();
    let mut held: HashMap<(&str, InterviewKind), usize> = HashMap::new();

    for interview in &schedule.interviews {
        let interval = *interview.interval();
        let (applicants, recruiters) = (interview.applicants().len(), interview.recruiters().len());

        let shape_ok = match interview.kind() {
            InterviewKind::Group => {
                (config.min_group_size..=config.max_group_size).contains(&applicants)
                    && recruiters >= config.min_group_recruiters
            }
            InterviewKind::Individual => applicants == 1 && recruiters == 1,
        };
        if !shape_ok {
            findings.push(AuditFinding::new(
                AuditFindingKind::InvalidShape,
                format!(
                    "{:?} interview at {interval} has {applicants} applicant(s) and {recruiters} recruiter(s)",
                    interview.kind()
                ),
            ));
        }
        if interval.duration_minutes() != pools.duration_minutes(interview.kind()) {
            findings.push(AuditFinding::new(
                AuditFindingKind::InvalidShape,
                format!(
                    "{:?} interview at {interval} lasts {} minutes",
                    interview.kind(),
                    interval.duration_minutes()
                ),
            ));
        }

        if !pools.grid().admits(&interval) {
            findings.push(AuditFinding::new(
                AuditFindingKind::OffGrid,
                format!("interview at {interval} is not on the event grid"),
            ));
        }

        match pools.room_by_id(interview.room()) {
            Ok(room) => check_available("room", &room.id, &room.availability, &interval, &mut findings),
            Err(e) => findings.push(AuditFinding::new(AuditFindingKind::UnknownEntity, e.to_string())),
        }
        bookings
            .entry(("room", interview.room()))
            .or_default()
            .push(interval);

        for id in interview.applicants() {
            match pools.applicant_by_id(id) {
                Ok(a) => check_available("applicant", &a.id, &a.availability, &interval, &mut findings),
                Err(e) => findings.push(AuditFinding::new(AuditFindingKind::UnknownEntity, e.to_string())),
            }
            bookings.entry(("applicant", id)).or_default().push(interval);
            *held.entry((id, interview.kind())).or_default() += 1;
        }

        for id in interview.recruiters() {
            match pools.recruiter_by_id(id) {
                Ok(r) => check_available("recruiter", &r.id, &r.availability, &interval, &mut findings),
                Err(e) => findings.push(AuditFinding::new(AuditFindingKind::UnknownEntity, e.to_string())),
            }
            bookings.entry(("recruiter", id)).or_default().push(interval);
        }
    }

    let mut booked: Vec<_> = bookings.into_iter().collect();
    booked.sort_by(|a, b| a.0.cmp(&b.0));
    for ((role, id), mut intervals) in booked {
        intervals.sort();
        for pair in intervals.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                findings.push(AuditFinding::new(
                    AuditFindingKind::DoubleBooking,
                    format!("{role} '{id}' is booked at {} and {}", pair[0], pair[1]),
                ));
            }
        }
    }

    let mut repeated: Vec<_> = held.into_iter().filter(|(_, n)| *n > 1).collect();
    repeated.sort();
    for ((id, kind), n) in repeated {
        findings.push(AuditFinding::new(
            AuditFindingKind::DuplicateInterview,
            format!("applicant '{id}' holds {n} {kind:?} interviews"),
        ));
    }

    findings
}

fn check_available(
    role: &str,
    id: &str,
    availability: &Availability,
    interval: &Interval,
    findings: &mut Vec<AuditFinding>,
) {
    if !availability.contains(interval) {
        findings.push(AuditFinding::new(
            AuditFindingKind::OutsideAvailability,
            format!("{role} '{id}' is not available for {interval}"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::models::{Applicant, EventDay, Interview, Recruiter, Room};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 13).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn pools() -> ResourcePools {
        let day = Interval::new(at(9, 0), at(11, 0)).unwrap();
        let applicants = (0..5)
            .map(|i| Applicant::new(format!("a{i}")).with_window(day))
            .chain([Applicant::new("early").with_window(Interval::new(at(9, 0), at(9, 20)).unwrap())])
            .collect();
        let recruiters = (0..4)
            .map(|i| Recruiter::new(format!("r{i}"), "Astra").with_window(day))
            .collect();
        let rooms = vec![Room::new("101").with_window(day), Room::new("102").with_window(day)];
        let config = SchedulerConfig::new(vec![EventDay::from_hours(2025, 9, 13, 9, 11).unwrap()]);
        ResourcePools::new(applicants, recruiters, rooms, config).unwrap()
    }

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    fn kinds(findings: &[AuditFinding]) -> Vec<AuditFindingKind> {
        findings.iter().map(|f| f.kind).collect()
    }

    #[test]
    fn test_double_booking_then_clean() {
        let mut schedule = Schedule::new("test");
        schedule.add_interview(Interview::group(
            Interval::starting_at(at(9, 0), 40).unwrap(),
            "101",
            ids("a", 4),
            ids("r", 4),
        ));
        schedule.add_interview(Interview::individual(
            Interval::starting_at(at(9, 0), 20).unwrap(),
            "102",
            "a4",
            "r0",
        ));
        // r0 sits on both: that is a double booking.
        let findings = audit_schedule(&schedule, &pools());
        assert_eq!(kinds(&findings), vec![AuditFindingKind::DoubleBooking]);
        assert!(findings[0].message.contains("recruiter 'r0'"));

        schedule.interviews.pop();
        schedule.add_interview(Interview::individual(
            Interval::starting_at(at(9, 40), 20).unwrap(),
            "102",
            "a4",
            "r0",
        ));
        assert!(audit_schedule(&schedule, &pools()).is_empty());
    }

    #[test]
    fn test_shape_and_unknown_ids() {
        let mut schedule = Schedule::new("test");
        schedule.add_interview(Interview::group(
            Interval::starting_at(at(9, 0), 40).unwrap(),
            "101",
            ids("a", 3),
            vec!["r0".into(), "ghost".into()],
        ));
        let findings = audit_schedule(&schedule, &pools());
        assert!(kinds(&findings).contains(&AuditFindingKind::InvalidShape));
        assert!(kinds(&findings).contains(&AuditFindingKind::UnknownEntity));
    }

    #[test]
    fn test_availability_and_grid() {
        let mut schedule = Schedule::new("test");
        schedule.add_interview(Interview::individual(
            Interval::starting_at(at(9, 20), 20).unwrap(),
            "101",
            "early",
            "r0",
        ));
        schedule.add_interview(Interview::individual(
            Interval::starting_at(at(9, 50), 20).unwrap(),
            "102",
            "a0",
            "r1",
        ));
        let findings = audit_schedule(&schedule, &pools());
        assert_eq!(
            kinds(&findings),
            vec![AuditFindingKind::OutsideAvailability, AuditFindingKind::OffGrid]
        );
    }

    #[test]
    fn test_duplicate_interview_kind() {
        let mut schedule = Schedule::new("test");
        for (start, room) in [(at(9, 0), "101"), (at(10, 0), "102")] {
            schedule.add_interview(Interview::individual(
                Interval::starting_at(start, 20).unwrap(),
                room,
                "a0",
                "r0",
            ));
        }
        let findings = audit_schedule(&schedule, &pools());
        assert_eq!(kinds(&findings), vec![AuditFindingKind::DuplicateInterview]);
    }
}
