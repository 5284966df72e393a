//! Scheduler configuration.
//!
//! Every field has a policy default, so an empty JSON object yields the
//! standard recruiting-event rules: 20-minute slots, 40-minute group
//! interviews of 4-8 applicants with at least 4 recruiters, 20-minute
//! individual interviews, a 90-minute proximity window and a 300-second
//! exact-solver budget per pass.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, SchedulingError};
use crate::models::EventDay;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Event days whose open hours the grid tiles.
    pub event_days: Vec<EventDay>,
    /// Grid cell width (minutes).
    pub slot_width_minutes: i64,
    /// Group interview length (minutes).
    pub group_duration_minutes: i64,
    /// Individual interview length (minutes).
    pub individual_duration_minutes: i64,
    /// Fewest applicants in a group interview.
    pub min_group_size: usize,
    /// Most applicants in a group interview.
    pub max_group_size: usize,
    /// Group size earning the heuristic's size bonus.
    pub preferred_group_size: usize,
    /// Fewest recruiters on a group panel.
    pub min_group_recruiters: usize,
    /// Proximity window between an applicant's two interview starts (minutes).
    pub max_proximity_minutes: i64,
    /// Wall-clock budget for each exact-solver pass (seconds).
    pub solver_time_budget_seconds: u64,
    /// Diversity universe. Empty = union of applicants' interests.
    pub teams: Vec<String>,
    /// Whether the selector runs the exact solver.
    pub exact_solver_enabled: bool,
    /// Above this many applicants the exact solver declines to run.
    pub exact_solver_max_applicants: usize,
    /// Iteration cap of the heuristic's spacing repair.
    pub repair_iteration_cap: usize,
    /// Seed for an additional shuffled-order heuristic run.
    pub shuffle_seed: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            event_days: Vec::new(),
            slot_width_minutes: 20,
            group_duration_minutes: 40,
            individual_duration_minutes: 20,
            min_group_size: 4,
            max_group_size: 8,
            preferred_group_size: 5,
            min_group_recruiters: 4,
            max_proximity_minutes: 90,
            solver_time_budget_seconds: 300,
            teams: Vec::new(),
            exact_solver_enabled: true,
            exact_solver_max_applicants: 120,
            repair_iteration_cap: 50,
            shuffle_seed: None,
        }
    }
}

impl SchedulerConfig {
    /// Creates the default configuration for the given event days.
    pub fn new(event_days: Vec<EventDay>) -> Self {
        Self {
            event_days,
            ..Self::default()
        }
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the diversity universe.
    pub fn with_teams<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.teams = teams.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the per-pass exact-solver budget.
    pub fn with_solver_budget(mut self, seconds: u64) -> Self {
        self.solver_time_budget_seconds = seconds;
        self
    }

    /// Enables or disables the exact solver.
    pub fn with_exact_solver(mut self, enabled: bool) -> Self {
        self.exact_solver_enabled = enabled;
        self
    }

    /// Adds a shuffled-order heuristic run with the given seed.
    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Proximity window expressed in grid slots.
    pub fn max_gap_slots(&self) -> i64 {
        self.max_proximity_minutes / self.slot_width_minutes.max(1)
    }

    /// Exact-solver budget per pass.
    pub fn solver_time_budget(&self) -> Duration {
        Duration::from_secs(self.solver_time_budget_seconds)
    }

    /// Checks value ranges and internal consistency.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SchedulingError::InvalidConfig(msg));

        if self.slot_width_minutes <= 0 {
            return invalid(format!(
                "slot_width_minutes must be positive, got {}",
                self.slot_width_minutes
            ));
        }
        for (name, minutes) in [
            ("group_duration_minutes", self.group_duration_minutes),
            ("individual_duration_minutes", self.individual_duration_minutes),
        ] {
            if minutes <= 0 || minutes % self.slot_width_minutes != 0 {
                return invalid(format!(
                    "{name} must be a positive multiple of {} minutes, got {minutes}",
                    self.slot_width_minutes
                ));
            }
        }
        if self.min_group_size == 0 || self.min_group_size > self.max_group_size {
            return invalid(format!(
                "group size bounds must satisfy 1 <= min <= max, got {}..={}",
                self.min_group_size, self.max_group_size
            ));
        }
        if self.min_group_recruiters == 0 {
            return invalid("min_group_recruiters must be at least 1".to_string());
        }
        if self.max_proximity_minutes < 0 {
            return invalid(format!(
                "max_proximity_minutes must not be negative, got {}",
                self.max_proximity_minutes
            ));
        }
        if let Some(day) = self.event_days.iter().find(|d| d.open >= d.close) {
            return invalid(format!("event day {} opens at or after it closes", day.date));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = SchedulerConfig::default();
        assert_eq!(c.slot_width_minutes, 20);
        assert_eq!(c.group_duration_minutes, 40);
        assert_eq!(c.max_gap_slots(), 4);
        assert_eq!(c.solver_time_budget(), Duration::from_secs(300));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        let c = SchedulerConfig::from_json_str("{}").unwrap();
        assert_eq!(c, SchedulerConfig::default());
    }

    #[test]
    fn test_json_overrides() {
        let json = r#"{
            "event_days": [{"date": "2025-09-13", "open": "09:00:00", "close": "21:00:00"}],
            "max_group_size": 6,
            "teams": ["Astra", "Juvo"],
            "shuffle_seed": 7
        }"#;
        let c = SchedulerConfig::from_json_str(json).unwrap();
        assert_eq!(c.event_days.len(), 1);
        assert_eq!(c.max_group_size, 6);
        assert_eq!(c.min_group_size, 4);
        assert_eq!(c.teams, vec!["Astra", "Juvo"]);
        assert_eq!(c.shuffle_seed, Some(7));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let c = SchedulerConfig {
            group_duration_minutes: 30,
            ..SchedulerConfig::default()
        };
        assert!(c.validate().is_err());

        let c = SchedulerConfig {
            min_group_size: 9,
            ..SchedulerConfig::default()
        };
        assert!(c.validate().is_err());

        let c = SchedulerConfig {
            slot_width_minutes: 0,
            ..SchedulerConfig::default()
        };
        assert!(c.validate().is_err());

        assert!(matches!(
            SchedulerConfig::from_json_str(r#"{"min_group_recruiters": 0}"#),
            Err(SchedulingError::InvalidConfig(_))
        ));
        assert!(matches!(
            SchedulerConfig::from_json_str("not json"),
            Err(SchedulingError::Config(_))
        ));
    }

    #[test]
    fn test_builders() {
        let c = SchedulerConfig::default()
            .with_teams(["Astra", "Terra"])
            .with_solver_budget(5)
            .with_exact_solver(false)
            .with_shuffle_seed(42);
        assert_eq!(c.teams.len(), 2);
        assert_eq!(c.solver_time_budget_seconds, 5);
        assert!(!c.exact_solver_enabled);
        assert_eq!(c.shuffle_seed, Some(42));
    }
}
