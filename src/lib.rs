// src/lib.rs

//! College schedule crawler library.
//!
//! Parses group timetable pages, derives teacher schedules by scanning every
//! group, and keeps results in a TTL cache in front of the origin site.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

pub use error::{AppError, Result};
pub use pipeline::{ScheduleService, SubjectKind};
