// src/pipeline/service.rs

//! Schedule facade dispatching by subject kind.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::{Config, DayRecord, ScheduleOption};
use crate::services::{
    GroupFanOut, GroupLister, ScheduleExtractor, TeacherSchedules, validate_subject,
};
use crate::storage::CacheThrough;
use crate::utils::http::{HttpFetcher, PageFetcher};

/// Whose schedule is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Group,
    Teacher,
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectKind::Group => f.write_str("group"),
            SubjectKind::Teacher => f.write_str("teacher"),
        }
    }
}

impl FromStr for SubjectKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "group" => Ok(SubjectKind::Group),
            "teacher" => Ok(SubjectKind::Teacher),
            other => Err(AppError::bad_request(format!("unknown subject kind '{other}'"))),
        }
    }
}

/// Schedules and selectable options for one kind of subject.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    async fn schedule(
        &self,
        name: &str,
        date: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<DayRecord>>;

    async fn options(&self, cancel: &CancellationToken) -> Result<Vec<ScheduleOption>>;
}

/// Group schedules read straight from the group pages.
#[derive(Clone)]
pub struct GroupSource {
    lister: GroupLister,
    extractor: ScheduleExtractor,
}

impl GroupSource {
    pub fn new(lister: GroupLister, extractor: ScheduleExtractor) -> Self {
        Self { lister, extractor }
    }
}

#[async_trait]
impl ScheduleSource for GroupSource {
    async fn schedule(
        &self,
        name: &str,
        date: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<DayRecord>> {
        self.extractor.extract(name, date, cancel).await
    }

    async fn options(&self, cancel: &CancellationToken) -> Result<Vec<ScheduleOption>> {
        self.lister.list_groups(cancel).await
    }
}

#[async_trait]
impl ScheduleSource for TeacherSchedules {
    async fn schedule(
        &self,
        name: &str,
        date: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<DayRecord>> {
        self.schedule_for(name, date, cancel).await
    }

    async fn options(&self, cancel: &CancellationToken) -> Result<Vec<ScheduleOption>> {
        self.list_teachers(cancel).await
    }
}

/// Facade over group and teacher schedules sharing one fetcher and one
/// cache policy.
pub struct ScheduleService {
    groups: GroupSource,
    teachers: TeacherSchedules,
    lister: GroupLister,
    cache: CacheThrough,
}

impl ScheduleService {
    /// Wire every component to the given fetcher and cache policy.
    pub fn new(config: &Config, fetcher: Arc<dyn PageFetcher>, cache: CacheThrough) -> Self {
        let source = config.source.clone();
        let lister = GroupLister::new(Arc::clone(&fetcher), cache.clone(), source.clone());
        let extractor = ScheduleExtractor::new(fetcher, cache.clone(), source.clone());

        let fan_out = GroupFanOut::new(lister.clone(), extractor.clone())
            .with_concurrency(config.crawler.max_concurrent)
            .with_delay(Duration::from_millis(config.crawler.request_delay_ms));
        let teachers = TeacherSchedules::new(fan_out, cache.clone(), source.index_url());

        Self {
            groups: GroupSource::new(lister.clone(), extractor),
            teachers,
            lister,
            cache,
        }
    }

    /// Build a service with an HTTP fetcher and the configured cache store.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.crawler)?);
        let cache = CacheThrough::from_config(&config.cache);
        if !cache.is_enabled() {
            log::info!("Cache disabled; every query goes to the network");
        }
        Ok(Self::new(config, fetcher, cache))
    }

    pub fn source(&self, kind: SubjectKind) -> &dyn ScheduleSource {
        match kind {
            SubjectKind::Group => &self.groups,
            SubjectKind::Teacher => &self.teachers,
        }
    }

    /// Schedule for a named subject. Blank and "0" names are rejected
    /// before any network or cache access.
    pub async fn schedule(
        &self,
        kind: SubjectKind,
        name: &str,
        date: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<DayRecord>> {
        validate_subject(name)?;
        log::debug!("Schedule request: {} {:?}", kind, name);
        self.source(kind).schedule(name, date, cancel).await
    }

    pub async fn schedule_by_group(
        &self,
        group: &str,
        date: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<DayRecord>> {
        self.schedule(SubjectKind::Group, group, date, cancel).await
    }

    pub async fn schedule_by_teacher(
        &self,
        teacher: &str,
        date: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<DayRecord>> {
        self.schedule(SubjectKind::Teacher, teacher, date, cancel).await
    }

    pub async fn group_options(&self, cancel: &CancellationToken) -> Result<Vec<ScheduleOption>> {
        self.source(SubjectKind::Group).options(cancel).await
    }

    pub async fn teacher_options(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ScheduleOption>> {
        self.source(SubjectKind::Teacher).options(cancel).await
    }

    /// Publication timestamp of the current timetable.
    pub async fn last_update(&self, cancel: &CancellationToken) -> Result<String> {
        self.lister.last_update(cancel).await
    }

    /// Drop all cached listings and schedules.
    pub async fn clear_cache(&self) -> Result<()> {
        self.cache.flush().await?;
        log::info!("Cache cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_kind_from_str() {
        assert_eq!("group".parse::<SubjectKind>().unwrap(), SubjectKind::Group);
        assert_eq!("Teacher".parse::<SubjectKind>().unwrap(), SubjectKind::Teacher);
        assert!("room".parse::<SubjectKind>().is_err());
    }

    #[test]
    fn test_subject_kind_display() {
        assert_eq!(SubjectKind::Teacher.to_string(), "teacher");
    }
}
