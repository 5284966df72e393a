//! Schedule quality metrics (KPIs).
//!
//! Summary indicators of a finalized schedule, computed from the schedule
//! and the pools it was built from.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fully scheduled | Applicants holding both interviews |
//! | Group only / Individual only | Applicants holding exactly one kind |
//! | Unscheduled | Applicants holding neither |
//! | Success rate | Fully scheduled / total applicants |
//! | Proximity violations | Applicants whose starts exceed the proximity window |
//! | Room utilization | Booked minutes / available minutes per room |

use std::collections::HashMap;

use crate::constraints::gap_minutes;
use crate::models::{InterviewKind, Schedule, ViolationType};
use crate::pool::ResourcePools;

use super::score::count_proximity_violations;

/// Schedule performance indicators.
#[derive(Debug, Clone)]
pub struct ScheduleKpi {
    /// Applicants in the pools.
    pub total_applicants: usize,
    /// Applicants with both interviews.
    pub fully_scheduled: usize,
    /// Applicants with a group interview only.
    pub group_only: usize,
    /// Applicants with an individual interview only.
    pub individual_only: usize,
    /// Applicants with no interview.
    pub unscheduled: usize,
    /// Fraction of applicants fully scheduled (0.0..1.0).
    pub success_rate: f64,
    pub group_interviews: usize,
    pub individual_interviews: usize,
    /// Mean applicants per group interview.
    pub avg_group_size: f64,
    /// Applicants outside the proximity window.
    pub proximity_violations: usize,
    /// Start-to-start gap per fully scheduled applicant (minutes).
    pub gaps_by_applicant: HashMap<String, i64>,
    /// Group panels missing a required team.
    pub diversity_shortfalls: usize,
    /// Individual interviews whose interviewer matches none of the applicant's teams.
    pub affinity_shortfalls: usize,
    /// Per-room utilization (0.0..1.0).
    pub utilization_by_room: HashMap<String, f64>,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule and its pools.
    pub fn calculate(schedule: &Schedule, pools: &ResourcePools) -> Self {
        let mut group_only = 0;
        let mut individual_only = 0;
        let mut fully_scheduled = 0;
        let mut unscheduled = 0;
        let mut gaps_by_applicant = HashMap::new();

        for applicant in pools.applicants() {
            let group = schedule.interview_of_kind(&applicant.id, InterviewKind::Group);
            let individual = schedule.interview_of_kind(&applicant.id, InterviewKind::Individual);
            match (group, individual) {
                (Some(g), Some(i)) => {
                    fully_scheduled += 1;
                    gaps_by_applicant.insert(
                        applicant.id.clone(),
                        gap_minutes(g.interval().start(), i.interval().start()),
                    );
                }
                (Some(_), None) => group_only += 1,
                (None, Some(_)) => individual_only += 1,
                (None, None) => unscheduled += 1,
            }
        }

        let total_applicants = pools.applicants().len();
        let success_rate = if total_applicants == 0 {
            0.0
        } else {
            fully_scheduled as f64 / total_applicants as f64
        };

        let group_interviews = schedule.count_of_kind(InterviewKind::Group);
        let avg_group_size = if group_interviews == 0 {
            0.0
        } else {
            let members: usize = schedule
                .interviews
                .iter()
                .filter(|i| i.is_group())
                .map(|i| i.applicants().len())
                .sum();
            members as f64 / group_interviews as f64
        };

        let utilization_by_room = pools
            .rooms()
            .iter()
            .map(|room| {
                let available = room.availability.total_minutes();
                let booked: i64 = schedule
                    .interviews_for_room(&room.id)
                    .iter()
                    .map(|i| i.interval().duration_minutes())
                    .sum();
                let utilization = if available > 0 {
                    booked as f64 / available as f64
                } else {
                    0.0
                };
                (room.id.clone(), utilization)
            })
            .collect();

        Self {
            total_applicants,
            fully_scheduled,
            group_only,
            individual_only,
            unscheduled,
            success_rate,
            group_interviews,
            individual_interviews: schedule.count_of_kind(InterviewKind::Individual),
            avg_group_size,
            proximity_violations: count_proximity_violations(schedule, pools),
            gaps_by_applicant,
            diversity_shortfalls: schedule.violation_count(&ViolationType::DiversityShortfall),
            affinity_shortfalls: schedule.violation_count(&ViolationType::AffinityShortfall),
            utilization_by_room,
        }
    }

    /// Mean room utilization.
    pub fn avg_room_utilization(&self) -> f64 {
        if self.utilization_by_room.is_empty() {
            0.0
        } else {
            self.utilization_by_room.values().sum::<f64>() / self.utilization_by_room.len() as f64
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_success_rate: f64, max_proximity_violations: usize) -> bool {
        self.success_rate >= min_success_rate && self.proximity_violations <= max_proximity_violations
    }
}
