//! Interview assignment engine for recruiting events.
//!
//! Every applicant needs one group interview (several applicants in front of
//! a panel of recruiters) and one individual interview (one applicant, one
//! recruiter). Interviews are placed on a fixed slot grid over the event
//! days, subject to applicant, recruiter and room availability.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Interval`, `Availability`, `Applicant`,
//!   `Recruiter`, `Room`, `SlotGrid`, `Interview`, `Schedule`
//! - **`config`**: `SchedulerConfig`, the event policy with serde defaults
//! - **`validation`**: Input integrity checks (duplicate ids, availability, teams)
//! - **`constraints`**: Pure hard and soft constraint predicates
//! - **`pool`**: Read-only resource pools and availability indices
//! - **`attempt`**: Mutable per-strategy state and occupancy
//! - **`exact`**: Two-pass exact search under a time budget
//! - **`greedy`**: Scored greedy construction with spacing repair
//! - **`scheduler`**: `Strategy` trait, selector, scoring and KPIs
//! - **`audit`**: Independent soundness checks of a finished schedule
//! - **`generator`**: Seeded random event instances
//!
//! # Rules
//!
//! | Rule | Kind |
//! |------|------|
//! | Availability containment | hard |
//! | No double booking | hard |
//! | Group of 4-8 applicants, at least 4 recruiters | hard |
//! | Panel covers every team | soft |
//! | Interviewer matches an applicant's team | soft |
//! | Interview starts within 90 minutes | soft |
//!
//! # Example
//!
//! ```no_run
//! use interview_schedule::{schedule_interviews, SchedulerConfig};
//! use interview_schedule::models::EventDay;
//!
//! let config = SchedulerConfig::new(vec![EventDay::from_hours(2025, 9, 11, 17, 21).unwrap()]);
//! let schedule = schedule_interviews(vec![], vec![], vec![], config);
//! assert!(schedule.is_err());
//! ```

pub mod attempt;
pub mod audit;
pub mod config;
pub mod constraints;
pub mod error;
pub mod exact;
pub mod generator;
pub mod greedy;
pub mod models;
pub mod pool;
pub mod scheduler;
pub mod validation;

pub use config::SchedulerConfig;
pub use error::{Result, SchedulingError};
pub use pool::ResourcePools;
pub use scheduler::{schedule_interviews, ScheduleKpi, Strategy, StrategySelector};
