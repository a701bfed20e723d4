// src/services/fanout.rs

//! Fetch every group's schedule, skipping groups that fail.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::{DayRecord, ScheduleOption};
use crate::services::{GroupLister, ScheduleExtractor};

/// One group's week as seen during a fan-out pass.
#[derive(Debug, Clone)]
pub struct GroupSchedule {
    pub group: ScheduleOption,
    pub days: Vec<DayRecord>,
}

/// Summary of a fan-out pass.
#[derive(Debug, Default)]
pub struct FanOutOutcome {
    /// Successful schedules in group listing order
    pub schedules: Vec<GroupSchedule>,
    pub group_total: usize,
    pub group_failures: usize,
}

/// Walks the group listing and extracts each group's schedule.
#[derive(Clone)]
pub struct GroupFanOut {
    lister: GroupLister,
    extractor: ScheduleExtractor,
    concurrency: usize,
    delay: Duration,
}

impl GroupFanOut {
    pub fn new(lister: GroupLister, extractor: ScheduleExtractor) -> Self {
        Self {
            lister,
            extractor,
            concurrency: 1,
            delay: Duration::ZERO,
        }
    }

    /// Number of group pages fetched at once (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Pause between group results. No pause follows the last group.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fetch every group's schedule.
    ///
    /// A failing group is counted and skipped. Failure to list groups and
    /// cancellation abort the whole pass. Results come back in listing order
    /// whatever order the fetches complete in.
    pub async fn run(&self, date: &str, cancel: &CancellationToken) -> Result<FanOutOutcome> {
        let groups = self.lister.list_groups(cancel).await?;
        let mut outcome = FanOutOutcome {
            group_total: groups.len(),
            ..FanOutOutcome::default()
        };

        let mut group_stream = stream::iter(groups)
            .map(|group| async move {
                let result = self.extractor.extract(&group.value, date, cancel).await;
                (group, result)
            })
            .buffered(self.concurrency);

        let mut seen = 0usize;
        while let Some((group, result)) = group_stream.next().await {
            seen += 1;
            match result {
                Ok(days) => outcome.schedules.push(GroupSchedule { group, days }),
                Err(error) if error.is_cancelled() => return Err(error),
                Err(error) => {
                    outcome.group_failures += 1;
                    log::warn!(
                        "Skipping group {} ({}): {}",
                        group.label,
                        group.value,
                        error
                    );
                }
            }

            if !self.delay.is_zero() && seen < outcome.group_total {
                tokio::time::sleep(self.delay).await;
            }
        }

        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        log::info!(
            "Fetched {}/{} group schedules ({} skipped)",
            outcome.schedules.len(),
            outcome.group_total,
            outcome.group_failures
        );
        Ok(outcome)
    }
}
