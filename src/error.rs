//! Engine error types.
//!
//! Only conditions that make a run unusable surface as errors: malformed
//! input or configuration, and the total-failure case where no strategy
//! produced a single interview. Constraint rejections inside a strategy are
//! absorbed locally and never reach this type.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::validation::ValidationError;

/// Errors surfaced by the scheduling engine.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// An interval whose start is not strictly before its end.
    #[error("invalid interval: start {start} is not before end {end}")]
    InvalidInterval {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// A configuration value outside its accepted range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input records failed validation.
    #[error("invalid input: {} problem(s) found", .0.len())]
    InvalidInput(Vec<ValidationError>),

    /// An id that does not name any loaded entity.
    #[error("unknown {kind} '{id}'")]
    UnknownEntity { kind: &'static str, id: String },

    /// Every strategy produced an empty schedule.
    #[error("no interviews could be scheduled by any strategy")]
    NoInterviewsScheduled,

    /// Configuration text could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SchedulingError>;
