//! Input validation for interview scheduling.
//!
//! Checks the input records of one run before the resource pools are built.
//! Only malformed records are fatal:
//! - Duplicate IDs (per entity kind)
//! - Empty IDs
//!
//! The remaining checks describe legitimate but unusual input and are
//! reported as notices. Such an applicant ends up unscheduled, and such a
//! recruiter or room is never picked:
//! - Entities with no availability at all
//! - Entities whose availability never meets an event day
//! - Teams outside the configured diversity universe

use std::collections::HashSet;
use thiserror::Error;

use crate::config::SchedulerConfig;
use crate::models::{Applicant, Availability, EventDay, Interval, Recruiter, Room, Team};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind:?}: {message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same kind share an ID.
    DuplicateId,
    /// An entity has an empty ID.
    EmptyId,
    /// An entity owns no availability window.
    EmptyAvailability,
    /// A team that is not part of the configured universe.
    UnknownTeam,
    /// No availability window overlaps any event day.
    AvailabilityOutsideEvent,
}

impl ValidationErrorKind {
    /// Whether a problem of this kind rejects the whole input.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::DuplicateId | Self::EmptyId)
    }
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Whether this problem rejects the whole input.
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

/// Validates the input records of one scheduling run.
///
/// Fails only on fatal problems (see [`ValidationErrorKind::is_fatal`]).
/// Notices are available from [`check_input`].
///
/// # Returns
/// `Ok(())` if no fatal problem exists, `Err(errors)` with every fatal one.
pub fn validate_input(
    applicants: &[Applicant],
    recruiters: &[Recruiter],
    rooms: &[Room],
    config: &SchedulerConfig,
) -> ValidationResult {
    let errors: Vec<ValidationError> = check_input(applicants, recruiters, rooms, config)
        .into_iter()
        .filter(ValidationError::is_fatal)
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Runs every check and returns all problems, fatal or not.
///
/// Checks:
/// 1. No empty IDs
/// 2. No duplicate applicant, recruiter or room IDs
/// 3. Every entity owns at least one availability window
/// 4. Every entity can attend some event day (when days are configured)
/// 5. Every team belongs to `config.teams` (when the universe is configured)
pub fn check_input(
    applicants: &[Applicant],
    recruiters: &[Recruiter],
    rooms: &[Room],
    config: &SchedulerConfig,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let event_periods: Vec<Interval> = config
        .event_days
        .iter()
        .filter_map(|d| EventDay::interval(d).ok())
        .collect();
    let universe: HashSet<Team> = config.teams.iter().map(|t| Team::named(t.as_str())).collect();

    let mut check_entity = |kind: &str, id: &str, availability: &Availability, seen: &mut HashSet<String>| {
        if id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                format!("{kind} with empty ID"),
            ));
        } else if !seen.insert(id.to_string()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {kind} ID: {id}"),
            ));
        }

        if availability.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyAvailability,
                format!("{kind} '{id}' has no availability"),
            ));
        } else if !event_periods.is_empty()
            && !availability
                .windows()
                .iter()
                .any(|w| event_periods.iter().any(|p| p.overlaps(w)))
        {
            errors.push(ValidationError::new(
                ValidationErrorKind::AvailabilityOutsideEvent,
                format!("{kind} '{id}' is never available during the event"),
            ));
        }
    };

    let mut seen = HashSet::new();
    for a in applicants {
        check_entity("applicant", &a.id, &a.availability, &mut seen);
    }
    let mut seen = HashSet::new();
    for r in recruiters {
        check_entity("recruiter", &r.id, &r.availability, &mut seen);
    }
    let mut seen = HashSet::new();
    for room in rooms {
        check_entity("room", &room.id, &room.availability, &mut seen);
    }

    if !universe.is_empty() {
        for r in recruiters {
            if !r.team.is_wildcard() && !universe.contains(&r.team) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownTeam,
                    format!("Recruiter '{}' is on unknown team '{}'", r.id, r.team),
                ));
            }
        }
        for a in applicants {
            for team in a.interested_teams.iter().filter(|t| !t.is_wildcard()) {
                if !universe.contains(team) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::UnknownTeam,
                        format!("Applicant '{}' is interested in unknown team '{team}'", a.id),
                    ));
                }
            }
        }
    }

    errors
}
