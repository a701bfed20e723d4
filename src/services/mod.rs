//! Service layer for the schedule crawler.
//!
//! This module contains the business logic for:
//! - Group schedule extraction (`ScheduleExtractor`)
//! - Group listing and publication date (`GroupLister`)
//! - Fetching every group in one pass (`GroupFanOut`)
//! - Teacher schedules and directory (`TeacherSchedules`)

pub mod fanout;
pub mod groups;
pub mod schedule;
pub mod teachers;

pub use fanout::{FanOutOutcome, GroupFanOut, GroupSchedule};
pub use groups::GroupLister;
pub use schedule::ScheduleExtractor;
pub use teachers::TeacherSchedules;

use crate::error::{AppError, Result};

/// Reject blank subject names and the "0" placeholder.
pub fn validate_subject(name: &str) -> Result<()> {
    if name.trim().is_empty() || name == "0" {
        return Err(AppError::bad_request(format!(
            "subject name {name:?} is empty or a placeholder"
        )));
    }
    Ok(())
}
