//! Interview model.
//!
//! An interview is created by a strategy only after every constraint it is
//! subject to has been checked, and it is never edited afterwards. Repair
//! retracts an interview and creates a replacement.

use serde::{Deserialize, Serialize};

use super::Interval;

/// Interview kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewKind {
    /// Several applicants with a recruiter panel.
    Group,
    /// One applicant with one recruiter.
    Individual,
}

impl std::fmt::Display for InterviewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group => f.write_str("group"),
            Self::Individual => f.write_str("individual"),
        }
    }
}

/// A scheduled interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    kind: InterviewKind,
    interval: Interval,
    room: String,
    applicants: Vec<String>,
    recruiters: Vec<String>,
}

impl Interview {
    /// Creates a group interview.
    pub fn group(
        interval: Interval,
        room: impl Into<String>,
        applicants: Vec<String>,
        recruiters: Vec<String>,
    ) -> Self {
        Self {
            kind: InterviewKind::Group,
            interval,
            room: room.into(),
            applicants: dedup(applicants),
            recruiters: dedup(recruiters),
        }
    }

    /// Creates an individual interview.
    pub fn individual(
        interval: Interval,
        room: impl Into<String>,
        applicant: impl Into<String>,
        recruiter: impl Into<String>,
    ) -> Self {
        Self {
            kind: InterviewKind::Individual,
            interval,
            room: room.into(),
            applicants: vec![applicant.into()],
            recruiters: vec![recruiter.into()],
        }
    }

    /// Interview kind.
    #[inline]
    pub fn kind(&self) -> InterviewKind {
        self.kind
    }

    /// Time interval.
    #[inline]
    pub fn interval(&self) -> &Interval {
        &self.interval
    }

    /// Room id.
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Applicant ids, in assignment order.
    pub fn applicants(&self) -> &[String] {
        &self.applicants
    }

    /// Recruiter ids, in assignment order.
    pub fn recruiters(&self) -> &[String] {
        &self.recruiters
    }

    /// Whether the applicant takes part.
    pub fn has_applicant(&self, applicant_id: &str) -> bool {
        self.applicants.iter().any(|a| a == applicant_id)
    }

    /// Whether the recruiter takes part.
    pub fn has_recruiter(&self, recruiter_id: &str) -> bool {
        self.recruiters.iter().any(|r| r == recruiter_id)
    }

    #[inline]
    pub fn is_group(&self) -> bool {
        self.kind == InterviewKind::Group
    }
}

/// Removes repeated ids, keeping first occurrences.
fn dedup(ids: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn slot() -> Interval {
        let start = NaiveDate::from_ymd_opt(2025, 9, 13)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Interval::starting_at(start, 40).unwrap()
    }

    #[test]
    fn test_group_interview_dedups_members() {
        let i = Interview::group(
            slot(),
            "R101",
            vec!["a".into(), "b".into(), "a".into()],
            vec!["r1".into(), "r1".into()],
        );
        assert_eq!(i.kind(), InterviewKind::Group);
        assert_eq!(i.applicants(), &["a".to_string(), "b".to_string()]);
        assert_eq!(i.recruiters().len(), 1);
        assert!(i.has_applicant("b"));
        assert!(!i.has_recruiter("r2"));
    }

    #[test]
    fn test_individual_interview() {
        let i = Interview::individual(slot(), "R1", "a", "r1");
        assert!(!i.is_group());
        assert_eq!(i.applicants().len(), 1);
        assert_eq!(i.recruiters().len(), 1);
        assert_eq!(i.room(), "R1");
    }

    #[test]
    fn test_kind_serde() {
        assert_eq!(serde_json::to_string(&InterviewKind::Group).unwrap(), r#""group""#);
    }
}
