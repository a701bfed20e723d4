// src/models/mod.rs

//! Domain models for the schedule crawler.

mod config;
mod schedule;

pub use config::{CacheBackend, CacheConfig, Config, CrawlerConfig, LoggingConfig, SourceConfig};
pub use schedule::{DayRecord, Lesson, ScheduleOption};
