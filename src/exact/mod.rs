//! Exact constrained-search strategy.
//!
//! Formulates the assignment as a constraint-satisfaction problem: every pass
//! applicant gets exactly one group and one individual interview, every
//! `(slot, room)` hosts at most one interview, unavailable entities never
//! take part, groups hold `[min, max]` applicants and at least
//! `min_group_recruiters` recruiters, and individual interviews have one
//! recruiter. The soft rules (panel diversity, interviewer affinity,
//! proximity) are hard in the strict pass and dropped in the relaxed pass.
//!
//! # Passes
//! 1. **Presolve**: applicants with no admissible pair of non-overlapping
//!    group and individual slots can never be covered and are left out
//!    (reported unscheduled).
//! 2. **Strict pass** over the remaining applicants that have such a pair
//!    under the soft rules as well.
//! 3. **Relaxed pass** over the applicants the strict pass left without both
//!    interviews, on top of the strict pass's bookings.
//!
//! Each pass is all-or-nothing and runs under its own time budget. An
//! optimal or feasible pass is committed; any other outcome is a failure
//! of that pass only.
//!
//! # Reference
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming", Ch. 4

mod budget;
mod search;

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub use budget::TimeBudget;

use crate::attempt::{Placement, SchedulingAttempt};
use crate::models::{InterviewKind, Schedule};
use crate::pool::ResourcePools;
use crate::scheduler::Strategy;
use search::{pair_bound, PassSearch};

/// Which constraint set a pass enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassMode {
    /// Hard and soft constraints.
    Strict,
    /// Hard constraints only.
    Relaxed,
}

impl std::fmt::Display for PassMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassMode::Strict => write!(f, "strict"),
            PassMode::Relaxed => write!(f, "relaxed"),
        }
    }
}

/// A complete assignment of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSolution {
    /// Total start-to-start gap over the pass applicants (minutes).
    pub objective: i64,
    /// Every live placement of the attempt once the pass is applied.
    pub placements: Vec<Placement>,
}

/// Outcome class of a solver pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverResult {
    /// We have proven that the pass has no solution.
    Infeasible,
    /// We have found a solution and proven its optimality.
    Optimal(PassSolution),
    /// We have found a feasible solution, but not proven its optimality.
    Feasible(PassSolution),
    /// The budget ran out without a solution and without proving infeasibility.
    Unknown,
}

impl std::fmt::Display for SolverResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverResult::Infeasible => write!(f, "Infeasible"),
            SolverResult::Optimal(solution) => write!(f, "Optimal(objective={})", solution.objective),
            SolverResult::Feasible(solution) => write!(f, "Feasible(objective={})", solution.objective),
            SolverResult::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Why a pass stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The search proved optimality of its solution.
    OptimalityProven,
    /// The search proved that no solution exists.
    InfeasibilityProven,
    /// The search hit a limit; the string says which.
    Aborted(String),
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "Optimality Proven"),
            TerminationReason::InfeasibilityProven => write!(f, "Infeasibility Proven"),
            TerminationReason::Aborted(reason) => write!(f, "Aborted: {reason}"),
        }
    }
}

/// Full report of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    pub mode: PassMode,
    pub result: SolverResult,
    pub reason: TerminationReason,
    /// Number of applicants the pass covered.
    pub applicants: usize,
    /// Search nodes visited.
    pub steps: u64,
    pub elapsed: Duration,
}

impl PassOutcome {
    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_))
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self.result, SolverResult::Infeasible)
    }

    #[inline]
    pub fn has_solution(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_) | SolverResult::Feasible(_))
    }

    /// The pass solution, if one was found.
    pub fn solution(&self) -> Option<&PassSolution> {
        match &self.result {
            SolverResult::Optimal(s) | SolverResult::Feasible(s) => Some(s),
            _ => None,
        }
    }
}

/// Exact solver strategy.
#[derive(Debug, Clone, Default)]
pub struct ExactSolver;

impl ExactSolver {
    pub const NAME: &'static str = "exact_solver";

    pub fn new() -> Self {
        Self
    }

    /// Splits applicants into those a pass can consider and those with no
    /// admissible pair of non-overlapping group and individual slots.
    pub fn presolve(pools: &ResourcePools) -> (Vec<usize>, Vec<usize>) {
        (0..pools.applicants().len())
            .partition(|&a| pair_bound(pools, a, PassMode::Relaxed, None).is_some())
    }

    /// Runs one pass over `applicants` and commits its solution to the attempt.
    pub fn solve_pass(
        attempt: &mut SchedulingAttempt<'_>,
        applicants: &[usize],
        mode: PassMode,
        budget: Duration,
    ) -> PassOutcome {
        Self::solve_pass_within(attempt, applicants, mode, TimeBudget::new(budget))
    }

    /// [`solve_pass`](Self::solve_pass) under an explicit [`TimeBudget`].
    pub fn solve_pass_within(
        attempt: &mut SchedulingAttempt<'_>,
        applicants: &[usize],
        mode: PassMode,
        time_budget: TimeBudget,
    ) -> PassOutcome {
        let started = Instant::now();
        let pools = attempt.pools();
        let budget = time_budget.limit();

        let (result, reason, steps) = PassSearch::new(attempt, applicants, mode, time_budget).run();

        if let SolverResult::Optimal(solution) | SolverResult::Feasible(solution) = &result {
            *attempt = SchedulingAttempt::from_placements(pools, solution.placements.iter().cloned());
        }

        let outcome = PassOutcome {
            mode,
            result,
            reason,
            applicants: applicants.len(),
            steps,
            elapsed: started.elapsed(),
        };

        if matches!(outcome.reason, TerminationReason::Aborted(_)) {
            warn!(
                mode = %mode,
                applicants = outcome.applicants,
                budget_secs = budget.as_secs(),
                "exact pass ran out of time budget"
            );
        }
        info!(
            mode = %mode,
            result = %outcome.result,
            reason = %outcome.reason,
            applicants = outcome.applicants,
            steps = outcome.steps,
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "exact pass finished"
        );
        outcome
    }

    /// Runs presolve, the strict pass and, when needed, the relaxed pass.
    ///
    /// Returns the attempt together with the pass outcomes in run order.
    pub fn solve<'a>(&self, pools: &'a ResourcePools) -> (SchedulingAttempt<'a>, Vec<PassOutcome>) {
        let config = pools.config();
        let mut attempt = SchedulingAttempt::new(pools);
        let mut outcomes = Vec::new();

        if pools.applicants().len() > config.exact_solver_max_applicants {
            warn!(
                applicants = pools.applicants().len(),
                limit = config.exact_solver_max_applicants,
                "too many applicants for exact solving, skipping"
            );
            return (attempt, outcomes);
        }

        let (eligible, excluded) = Self::presolve(pools);
        debug!(
            eligible = eligible.len(),
            excluded = excluded.len(),
            "exact presolve"
        );
        if eligible.is_empty() {
            return (attempt, outcomes);
        }

        let budget = config.solver_time_budget();
        let strict: Vec<usize> = eligible
            .iter()
            .copied()
            .filter(|&a| pair_bound(pools, a, PassMode::Strict, None).is_some())
            .collect();
        if !strict.is_empty() {
            outcomes.push(Self::solve_pass(&mut attempt, &strict, PassMode::Strict, budget));
        }

        let leftovers: Vec<usize> = eligible
            .iter()
            .copied()
            .filter(|&a| !attempt.is_complete(a))
            .collect();
        if !leftovers.is_empty() {
            outcomes.push(Self::solve_pass(&mut attempt, &leftovers, PassMode::Relaxed, budget));
        }

        (attempt, outcomes)
    }
}

impl Strategy for ExactSolver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn attempt(&self, pools: &ResourcePools) -> Schedule {
        let (attempt, _) = self.solve(pools);
        attempt.into_schedule(self.name())
    }
}
