//! Strategy selection, scoring and KPI evaluation.
//!
//! # Algorithm
//!
//! The selector runs a fixed list of strategies one after another. Each
//! strategy builds its own [`SchedulingAttempt`](crate::attempt::SchedulingAttempt)
//! over the shared read-only pools, so no run sees another's bookings. Every
//! resulting schedule is scored with [`score_schedule`]; the highest score
//! wins and ties keep the strategy listed first.
//!
//! | Strategy | When listed |
//! |----------|-------------|
//! | [`ExactSolver`] | `exact_solver_enabled` |
//! | [`GreedyConstruction`] (scarcity order) | always |
//! | [`GreedyConstruction`] (shuffled order) | `shuffle_seed` is set |
//!
//! A run fails only when the winning schedule holds no interview at all.

mod kpi;
mod score;

use tracing::{info, warn};

pub use kpi::ScheduleKpi;
pub use score::{count_proximity_violations, score_schedule, ScheduleScore};

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulingError};
use crate::exact::ExactSolver;
use crate::greedy::GreedyConstruction;
use crate::models::{Applicant, Recruiter, Room, Schedule};
use crate::pool::ResourcePools;

/// A way of building a complete schedule from the resource pools.
pub trait Strategy {
    /// Stable name, recorded on the produced schedule.
    fn name(&self) -> &str;

    /// Builds a schedule from clean resource state.
    fn attempt(&self, pools: &ResourcePools) -> Schedule;
}

/// One strategy's scored schedule.
#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    pub strategy: String,
    pub score: ScheduleScore,
    pub schedule: Schedule,
}

/// Runs strategies and keeps the best schedule.
pub struct StrategySelector {
    strategies: Vec<Box<dyn Strategy>>,
}

impl StrategySelector {
    /// Selector with no strategies.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// The standard strategy list for a configuration.
    pub fn from_config(config: &SchedulerConfig) -> Self {
        let mut selector = Self::new();
        if config.exact_solver_enabled {
            selector = selector.with_strategy(ExactSolver::new());
        }
        selector = selector.with_strategy(GreedyConstruction::new());
        if let Some(seed) = config.shuffle_seed {
            selector = selector.with_strategy(GreedyConstruction::shuffled(seed));
        }
        selector
    }

    /// Appends a strategy.
    pub fn with_strategy(mut self, strategy: impl Strategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Names of the listed strategies, in run order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Runs every strategy and scores its schedule.
    pub fn run_all(&self, pools: &ResourcePools) -> Vec<StrategyOutcome> {
        self.strategies
            .iter()
            .map(|strategy| {
                let schedule = strategy.attempt(pools);
                let score = score_schedule(&schedule, pools);
                info!(
                    strategy = strategy.name(),
                    score = score.value,
                    fully_scheduled = score.fully_scheduled,
                    interviews = score.interviews,
                    proximity_violations = score.proximity_violations,
                    "strategy finished"
                );
                StrategyOutcome {
                    strategy: strategy.name().to_string(),
                    score,
                    schedule,
                }
            })
            .collect()
    }

    /// Picks the highest-scoring outcome; ties keep the earliest.
    pub fn select(outcomes: Vec<StrategyOutcome>) -> Option<StrategyOutcome> {
        outcomes.into_iter().fold(None, |best, outcome| match best {
            Some(b) if b.score.value >= outcome.score.value => Some(b),
            _ => Some(outcome),
        })
    }

    /// Runs every strategy and returns the winning schedule.
    ///
    /// # Errors
    /// [`SchedulingError::NoInterviewsScheduled`] when no strategy placed a
    /// single interview.
    pub fn run(&self, pools: &ResourcePools) -> Result<Schedule> {
        match Self::select(self.run_all(pools)) {
            Some(best) if !best.schedule.is_empty() => {
                info!(
                    strategy = %best.strategy,
                    score = best.score.value,
                    unscheduled = best.schedule.unscheduled.len(),
                    "schedule selected"
                );
                Ok(best.schedule)
            }
            _ => {
                warn!(
                    applicants = pools.applicants().len(),
                    strategies = self.strategies.len(),
                    "no strategy scheduled any interview"
                );
                Err(SchedulingError::NoInterviewsScheduled)
            }
        }
    }
}

impl Default for StrategySelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the pools and runs the standard strategy list.
///
/// # Errors
/// Any pool construction error, or [`SchedulingError::NoInterviewsScheduled`].
pub fn schedule_interviews(
    applicants: Vec<Applicant>,
    recruiters: Vec<Recruiter>,
    rooms: Vec<Room>,
    config: SchedulerConfig,
) -> Result<Schedule> {
    let pools = ResourcePools::new(applicants, recruiters, rooms, config)?;
    StrategySelector::from_config(pools.config()).run(&pools)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventDay, Interval, InterviewKind};
    use chrono::NaiveDate;

    fn window(from: u32, to: u32) -> Interval {
        let date = NaiveDate::from_ymd_opt(2025, 9, 13).unwrap();
        Interval::new(
            date.and_hms_opt(from, 0, 0).unwrap(),
            date.and_hms_opt(to, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn config() -> SchedulerConfig {
        SchedulerConfig::new(vec![EventDay::from_hours(2025, 9, 13, 9, 12).unwrap()])
            .with_teams(["Astra", "Juvo"])
            .with_solver_budget(10)
    }

    fn applicants(n: usize) -> Vec<Applicant> {
        (0..n)
            .map(|i| Applicant::new(format!("a{i}")).with_team("Astra").with_window(window(9, 12)))
            .collect()
    }

    fn recruiters() -> Vec<Recruiter> {
        vec![
            Recruiter::new("r0", "Astra").with_window(window(9, 12)),
            Recruiter::new("r1", "Astra").with_window(window(9, 12)),
            Recruiter::new("r2", "Juvo").with_window(window(9, 12)),
            Recruiter::new("r3", "Juvo").with_window(window(9, 12)),
        ]
    }

    fn rooms() -> Vec<Room> {
        vec![
            Room::new("101").with_window(window(9, 12)),
            Room::new("102").with_window(window(9, 12)),
        ]
    }

    struct Fixed(&'static str, Schedule);

    impl Strategy for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn attempt(&self, _pools: &ResourcePools) -> Schedule {
            self.1.clone()
        }
    }

    #[test]
    fn test_standard_strategy_list() {
        let selector = StrategySelector::from_config(&config().with_shuffle_seed(3));
        let names = selector.strategy_names();
        assert_eq!(
            names,
            vec![ExactSolver::NAME, GreedyConstruction::NAME, GreedyConstruction::SHUFFLED_NAME]
        );
        let selector = StrategySelector::from_config(&config().with_exact_solver(false));
        let names = selector.strategy_names();
        assert_eq!(names, vec![GreedyConstruction::NAME]);
    }

    #[test]
    fn test_schedule_interviews_covers_everyone() {
        let schedule = schedule_interviews(applicants(4), recruiters(), rooms(), config()).unwrap();
        assert_eq!(schedule.fully_scheduled_count(), 4);
        assert_eq!(schedule.count_of_kind(InterviewKind::Group), 1);
        assert!(schedule.unscheduled.is_empty());
    }

    #[test]
    fn test_ties_keep_first_strategy() {
        let pools = ResourcePools::new(applicants(4), recruiters(), rooms(), config()).unwrap();
        let greedy = GreedyConstruction::new().attempt(&pools);
        let selector = StrategySelector::new()
            .with_strategy(Fixed("first", greedy.clone()))
            .with_strategy(Fixed("second", greedy));

        let best = StrategySelector::select(selector.run_all(&pools)).unwrap();
        assert_eq!(best.strategy, "first");
    }

    #[test]
    fn test_higher_score_wins() {
        let pools = ResourcePools::new(applicants(4), recruiters(), rooms(), config()).unwrap();
        let selector = StrategySelector::new()
            .with_strategy(Fixed("empty", Schedule::new("empty")))
            .with_strategy(GreedyConstruction::new());

        let schedule = selector.run(&pools).unwrap();
        assert_eq!(schedule.strategy, GreedyConstruction::NAME);
    }

    #[test]
    fn test_total_failure_is_an_error() {
        // Applicants leave before any recruiter arrives.
        let applicants = (0..4)
            .map(|i| Applicant::new(format!("a{i}")).with_window(window(9, 10)))
            .collect();
        let late = (0..4)
            .map(|i| Recruiter::new(format!("r{i}"), "Astra").with_window(window(11, 12)))
            .collect();
        let result = schedule_interviews(applicants, late, rooms(), config());
        assert!(matches!(result, Err(SchedulingError::NoInterviewsScheduled)));
    }

    #[test]
    fn test_empty_selector_fails() {
        let pools = ResourcePools::new(applicants(4), recruiters(), rooms(), config()).unwrap();
        assert!(matches!(
            StrategySelector::new().run(&pools),
            Err(SchedulingError::NoInterviewsScheduled)
        ));
    }
}
