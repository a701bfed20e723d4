//! Entry points for schedule queries.
//!
//! - `ScheduleService`: the facade callers use
//! - `ScheduleSource`: per-subject-kind adapter the facade dispatches to

pub mod service;

pub use service::{GroupSource, ScheduleService, ScheduleSource, SubjectKind};
