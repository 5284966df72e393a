//! Interview scheduling domain models.
//!
//! Immutable value types for time, availability and participants, plus the
//! interview and schedule types a strategy produces.
//!
//! # Domain Mappings
//!
//! | Type | Role |
//! |------|------|
//! | Interval | `[start, end)` on the event calendar |
//! | Availability | Disjoint windows an entity can attend |
//! | Applicant / Recruiter / Room | The three resource pools |
//! | SlotGrid | Fixed-width scheduling grid over the event days |
//! | Interview | One committed group or individual session |
//! | Schedule | Output of one strategy attempt |

mod availability;
mod grid;
mod interval;
mod interview;
mod participant;
mod schedule;

pub use availability::Availability;
pub use grid::{EventDay, SlotGrid, TimeSlot};
pub use interval::Interval;
pub use interview::{Interview, InterviewKind};
pub use participant::{Applicant, Recruiter, Room, Team, WILDCARD_TEAM};
pub use schedule::{Schedule, UnscheduledApplicant, Violation, ViolationType};
