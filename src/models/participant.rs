//! Participant models: applicants, recruiters and rooms.
//!
//! Participants are loaded once and stay immutable for the whole run.
//! Whether an applicant already holds a group or individual interview is
//! engine state, tracked per scheduling attempt rather than on the record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Availability, Interval};

/// Name of the wildcard team.
pub const WILDCARD_TEAM: &str = "All";

/// A recruiting team.
///
/// [`Team::All`] is the wildcard: a recruiter on it satisfies any
/// affinity or diversity requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Team {
    /// Wildcard team.
    All,
    /// A concrete team.
    Named(String),
}

impl Team {
    /// Creates a team from its name. `"All"` maps to the wildcard.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        if name == WILDCARD_TEAM {
            Self::All
        } else {
            Self::Named(name)
        }
    }

    /// Whether this is the wildcard team.
    #[inline]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Whether a recruiter on this team covers `required`.
    #[inline]
    pub fn covers(&self, required: &Team) -> bool {
        self.is_wildcard() || self == required
    }

    /// Team name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => WILDCARD_TEAM,
            Self::Named(name) => name,
        }
    }
}

impl From<String> for Team {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

impl From<&str> for Team {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<Team> for String {
    fn from(team: Team) -> Self {
        match team {
            Team::All => WILDCARD_TEAM.to_string(),
            Team::Named(name) => name,
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An applicant requiring one group and one individual interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Applicant {
    /// Unique applicant identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Teams the applicant wants to join.
    #[serde(default)]
    pub interested_teams: BTreeSet<Team>,
    /// When the applicant can interview.
    #[serde(default)]
    pub availability: Availability,
}

impl Applicant {
    /// Creates an applicant with no availability.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            email: String::new(),
            interested_teams: BTreeSet::new(),
            availability: Availability::empty(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Adds an interested team.
    pub fn with_team(mut self, team: impl Into<Team>) -> Self {
        self.interested_teams.insert(team.into());
        self
    }

    /// Sets the availability.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Adds an availability window.
    pub fn with_window(mut self, window: Interval) -> Self {
        self.availability = self.availability.with_window(window);
        self
    }
}

/// A recruiter who can sit on interviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recruiter {
    /// Unique recruiter identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Team membership (may be the wildcard).
    pub team: Team,
    /// When the recruiter can interview.
    #[serde(default)]
    pub availability: Availability,
}

impl Recruiter {
    /// Creates a recruiter on the given team with no availability.
    pub fn new(id: impl Into<String>, team: impl Into<Team>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            team: team.into(),
            availability: Availability::empty(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the availability.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Adds an availability window.
    pub fn with_window(mut self, window: Interval) -> Self {
        self.availability = self.availability.with_window(window);
        self
    }
}

/// A room that can host one interview at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// When the room can be used.
    #[serde(default)]
    pub availability: Availability,
}

impl Room {
    /// Creates a room with no availability.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            availability: Availability::empty(),
        }
    }

    /// Sets the availability.
    pub fn with_availability(mut self, availability: Availability) -> Self {
        self.availability = availability;
        self
    }

    /// Adds an availability window.
    pub fn with_window(mut self, window: Interval) -> Self {
        self.availability = self.availability.with_window(window);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_wildcard() {
        assert!(Team::named("All").is_wildcard());
        assert!(!Team::named("Astra").is_wildcard());
        assert!(Team::All.covers(&Team::named("Terra")));
        assert!(Team::named("Terra").covers(&Team::named("Terra")));
        assert!(!Team::named("Juvo").covers(&Team::named("Terra")));
    }

    #[test]
    fn test_team_serde() {
        let t: Team = serde_json::from_str(r#""All""#).unwrap();
        assert_eq!(t, Team::All);
        let t: Team = serde_json::from_str(r#""Juvo""#).unwrap();
        assert_eq!(t, Team::named("Juvo"));
        assert_eq!(serde_json::to_string(&Team::All).unwrap(), r#""All""#);
    }

    #[test]
    fn test_applicant_builder() {
        let a = Applicant::new("jdoe")
            .with_name("Jane Doe")
            .with_email("jdoe@example.com")
            .with_team("Astra")
            .with_team("Astra")
            .with_team("Juvo");
        assert_eq!(a.id, "jdoe");
        assert_eq!(a.interested_teams.len(), 2);
        assert!(a.availability.is_empty());
    }

    #[test]
    fn test_recruiter_deserialize() {
        let json = r#"{
            "id": "R1",
            "team": "All",
            "availability": [{"start":"2025-09-11T17:00:00","end":"2025-09-11T21:00:00"}]
        }"#;
        let r: Recruiter = serde_json::from_str(json).unwrap();
        assert!(r.team.is_wildcard());
        assert_eq!(r.availability.total_minutes(), 240);
        assert!(r.name.is_empty());
    }
}
