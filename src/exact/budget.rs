//! Wall-clock budget for the exact search.
//!
//! Reading the clock on every node is measurable in a tight DFS, so the
//! budget only consults `Instant::elapsed` when the step counter hits the
//! check mask.

use std::time::{Duration, Instant};

/// Step-counted time limit.
#[derive(Debug, Clone)]
pub struct TimeBudget {
    clock_check_mask: u64,
    steps: u64,
    limit: Duration,
    start: Instant,
}

impl TimeBudget {
    /// Check the clock every 1,024 steps (2^10).
    const DEFAULT_STEP_CLOCK_CHECK_MASK: u64 = 0x3FF;

    pub fn new(limit: Duration) -> Self {
        Self::with_clock_check_mask(limit, Self::DEFAULT_STEP_CLOCK_CHECK_MASK)
    }

    pub fn with_clock_check_mask(limit: Duration, clock_check_mask: u64) -> Self {
        Self {
            clock_check_mask,
            steps: 0,
            limit,
            start: Instant::now(),
        }
    }

    /// Records one search step.
    #[inline(always)]
    pub fn step(&mut self) {
        self.steps = self.steps.wrapping_add(1);
    }

    /// Whether the budget is spent. Only reads the clock on masked steps.
    #[inline(always)]
    pub fn exhausted(&self) -> bool {
        (self.steps & self.clock_check_mask) == 0 && self.start.elapsed() >= self.limit
    }

    /// Configured limit.
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Steps recorded so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Time since the budget started.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
