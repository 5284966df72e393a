//! Recruiting-event instance generator.
//!
//! Generates random, valid event instances for tests and benchmarks: event
//! days, applicants with scattered availability and team interests,
//! recruiters on teams (some on the wildcard), and rooms open all day.
//! The same seed always produces the same instance.

use chrono::{Days, NaiveDate, NaiveTime};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulingError};
use crate::models::{Applicant, EventDay, Interval, Recruiter, Room, WILDCARD_TEAM};
use crate::pool::ResourcePools;

/// Configuration for generating event instances.
#[derive(Debug, Clone)]
pub struct InstanceGeneratorConfig {
    /// First event day.
    pub first_day: NaiveDate,
    /// Number of consecutive event days.
    pub num_days: usize,
    /// Opening hour of every day.
    pub open_hour: u32,
    /// Closing hour of every day.
    pub close_hour: u32,
    pub num_applicants: usize,
    pub num_recruiters: usize,
    pub num_rooms: usize,
    /// Team names.
    pub teams: Vec<String>,
    /// Probability that a recruiter is on the wildcard team.
    pub wildcard_fraction: f64,
    /// Probability that a recruiter attends a given day.
    pub recruiter_attendance: f64,
    /// Availability windows per applicant range (min, max).
    pub windows_per_applicant_range: (usize, usize),
    /// Window length range in minutes (min, max).
    pub window_minutes_range: (i64, i64),
    /// Interested teams per applicant range (min, max).
    pub interests_per_applicant_range: (usize, usize),
}

impl Default for InstanceGeneratorConfig {
    fn default() -> Self {
        Self {
            first_day: NaiveDate::from_ymd_opt(2025, 9, 11).unwrap_or(NaiveDate::MIN),
            num_days: 3,
            open_hour: 17,
            close_hour: 21,
            num_applicants: 30,
            num_recruiters: 10,
            num_rooms: 4,
            teams: vec!["Astra".into(), "Juvo".into(), "Terra".into()],
            wildcard_fraction: 0.1,
            recruiter_attendance: 0.8,
            windows_per_applicant_range: (1, 3),
            window_minutes_range: (60, 180),
            interests_per_applicant_range: (1, 2),
        }
    }
}

impl InstanceGeneratorConfig {
    /// Easy: few applicants, plenty of recruiters and long windows.
    pub fn easy() -> Self {
        Self {
            num_applicants: 12,
            num_recruiters: 8,
            num_rooms: 3,
            recruiter_attendance: 1.0,
            window_minutes_range: (120, 240),
            ..Self::default()
        }
    }

    /// Medium: the default shape.
    pub fn medium() -> Self {
        Self::default()
    }

    /// Hard: many applicants, short windows, sparse recruiters.
    pub fn hard() -> Self {
        Self {
            num_applicants: 60,
            num_recruiters: 10,
            num_rooms: 3,
            recruiter_attendance: 0.6,
            windows_per_applicant_range: (1, 2),
            window_minutes_range: (40, 120),
            interests_per_applicant_range: (1, 3),
            ..Self::default()
        }
    }
}

/// A generated instance.
#[derive(Debug, Clone)]
pub struct GeneratedInstance {
    pub config: SchedulerConfig,
    pub applicants: Vec<Applicant>,
    pub recruiters: Vec<Recruiter>,
    pub rooms: Vec<Room>,
}

impl GeneratedInstance {
    /// Builds the resource pools for the instance.
    pub fn into_pools(self) -> Result<ResourcePools> {
        ResourcePools::new(self.applicants, self.recruiters, self.rooms, self.config)
    }
}

/// Generator for event instances.
pub struct InstanceGenerator {
    config: InstanceGeneratorConfig,
    rng: ChaCha8Rng,
}

impl InstanceGenerator {
    /// Create a new generator with the given config and seed.
    pub fn new(config: InstanceGeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate an instance.
    ///
    /// # Errors
    /// [`SchedulingError::InvalidConfig`] for impossible day or hour settings.
    pub fn generate(&mut self) -> Result<GeneratedInstance> {
        let days = self.event_days()?;
        let periods = days.iter().map(EventDay::interval).collect::<Result<Vec<_>>>()?;
        let config = SchedulerConfig::new(days).with_teams(self.config.teams.clone());

        let applicants = self.generate_applicants(&periods, config.slot_width_minutes)?;
        let recruiters = self.generate_recruiters(&periods);
        let rooms = (0..self.config.num_rooms)
            .map(|i| Room::new(format!("{}", 101 + i)).with_availability(periods.clone().into()))
            .collect();

        Ok(GeneratedInstance {
            config,
            applicants,
            recruiters,
            rooms,
        })
    }

    fn event_days(&self) -> Result<Vec<EventDay>> {
        let invalid = || {
            SchedulingError::InvalidConfig(format!(
                "cannot generate event days from {} open {}:00-{}:00",
                self.config.first_day, self.config.open_hour, self.config.close_hour
            ))
        };
        if self.config.num_days == 0 || self.config.open_hour >= self.config.close_hour {
            return Err(invalid());
        }
        let open = NaiveTime::from_hms_opt(self.config.open_hour, 0, 0).ok_or_else(invalid)?;
        let close = NaiveTime::from_hms_opt(self.config.close_hour, 0, 0).ok_or_else(invalid)?;

        (0..self.config.num_days)
            .map(|i| {
                self.config
                    .first_day
                    .checked_add_days(Days::new(i as u64))
                    .map(|date| EventDay::new(date, open, close))
                    .ok_or_else(invalid)
            })
            .collect()
    }

    fn generate_applicants(&mut self, periods: &[Interval], step_minutes: i64) -> Result<Vec<Applicant>> {
        let (min_windows, max_windows) = self.config.windows_per_applicant_range;
        let (min_len, max_len) = self.config.window_minutes_range;
        let (min_interests, max_interests) = self.config.interests_per_applicant_range;

        let mut applicants = Vec::with_capacity(self.config.num_applicants);
        for i in 0..self.config.num_applicants {
            let mut applicant = Applicant::new(format!("A{:03}", i + 1)).with_name(format!("Applicant {}", i + 1));

            let interests = self
                .rng
                .random_range(min_interests..=max_interests.max(min_interests));
            let teams: Vec<String> = self
                .config
                .teams
                .choose_multiple(&mut self.rng, interests)
                .cloned()
                .collect();
            for team in teams {
                applicant = applicant.with_team(team);
            }

            let windows = self.rng.random_range(min_windows.max(1)..=max_windows.max(1));
            for _ in 0..windows {
                let Some(period) = periods.choose(&mut self.rng) else {
                    break;
                };
                let cells = (period.duration_minutes() / step_minutes).max(1);
                let offset = self.rng.random_range(0..cells) * step_minutes;
                let length = self.rng.random_range(min_len.max(1)..=max_len.max(min_len.max(1)));
                let start = period.start() + chrono::Duration::minutes(offset);
                let end = (start + chrono::Duration::minutes(length)).min(period.end());
                applicant = applicant.with_window(Interval::new(start, end)?);
            }
            applicants.push(applicant);
        }
        Ok(applicants)
    }

    fn generate_recruiters(&mut self, periods: &[Interval]) -> Vec<Recruiter> {
        (0..self.config.num_recruiters)
            .map(|i| {
                let team = if self.rng.random_bool(self.config.wildcard_fraction.clamp(0.0, 1.0)) {
                    WILDCARD_TEAM.to_string()
                } else {
                    self.config
                        .teams
                        .choose(&mut self.rng)
                        .cloned()
                        .unwrap_or_else(|| WILDCARD_TEAM.to_string())
                };

                let attendance = self.config.recruiter_attendance.clamp(0.0, 1.0);
                let mut attended: Vec<Interval> = periods
                    .iter()
                    .filter(|_| self.rng.random_bool(attendance))
                    .copied()
                    .collect();
                if attended.is_empty() {
                    attended.extend(periods.choose(&mut self.rng).copied());
                }

                Recruiter::new(format!("R{:02}", i + 1), team)
                    .with_name(format!("Recruiter {}", i + 1))
                    .with_availability(attended.into())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::audit_schedule;
    use crate::greedy::GreedyConstruction;
    use crate::scheduler::Strategy;

    #[test]
    fn test_same_seed_same_instance() {
        let a = InstanceGenerator::new(InstanceGeneratorConfig::default(), 42).generate().unwrap();
        let b = InstanceGenerator::new(InstanceGeneratorConfig::default(), 42).generate().unwrap();

        assert_eq!(a.applicants.len(), 30);
        for (x, y) in a.applicants.iter().zip(&b.applicants) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.availability, y.availability);
            assert_eq!(x.interested_teams, y.interested_teams);
        }
        for (x, y) in a.recruiters.iter().zip(&b.recruiters) {
            assert_eq!(x.team, y.team);
            assert_eq!(x.availability, y.availability);
        }
    }

    #[test]
    fn test_generated_instance_is_valid() {
        for seed in 0..5 {
            let instance = InstanceGenerator::new(InstanceGeneratorConfig::hard(), seed)
                .generate()
                .unwrap();
            assert_eq!(instance.config.event_days.len(), 3);
            assert!(instance.recruiters.iter().all(|r| !r.availability.is_empty()));
            assert!(instance.into_pools().is_ok());
        }
    }

    #[test]
    fn test_greedy_on_generated_instance_is_sound() {
        let pools = InstanceGenerator::new(InstanceGeneratorConfig::easy(), 7)
            .generate()
            .unwrap()
            .into_pools()
            .unwrap();
        let schedule = GreedyConstruction::new().attempt(&pools);
        assert!(audit_schedule(&schedule, &pools).is_empty());
        assert_eq!(
            schedule.fully_scheduled_count() + schedule.unscheduled.len(),
            pools.applicants().len()
        );
    }

    #[test]
    fn test_invalid_hours_are_rejected() {
        let config = InstanceGeneratorConfig {
            open_hour: 21,
            close_hour: 17,
            ..InstanceGeneratorConfig::default()
        };
        assert!(matches!(
            InstanceGenerator::new(config, 1).generate(),
            Err(SchedulingError::InvalidConfig(_))
        ));
    }
}
