// src/services/groups.rs

//! Group index page: group listing and publication timestamp.

use std::sync::Arc;

use regex::Regex;
use scraper::Html;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::{ScheduleOption, SourceConfig};
use crate::storage::{CacheThrough, GROUPS_KEY};
use crate::utils::http::PageFetcher;
use crate::utils::parse_selector;

/// Marker phrase followed by the `dd.mm.yyyy hh:mm` publication time.
const UPDATED_PATTERN: &str = r"Расписание сформировано:\s*(\d{2}\.\d{2}\.\d{4}\s\d{2}:\d{2})";

/// Lists groups from the index page.
#[derive(Clone)]
pub struct GroupLister {
    fetcher: Arc<dyn PageFetcher>,
    cache: CacheThrough,
    source: SourceConfig,
}

impl GroupLister {
    pub fn new(fetcher: Arc<dyn PageFetcher>, cache: CacheThrough, source: SourceConfig) -> Self {
        Self {
            fetcher,
            cache,
            source,
        }
    }

    /// All groups in index page order.
    pub async fn list_groups(&self, cancel: &CancellationToken) -> Result<Vec<ScheduleOption>> {
        if let Some(options) = self.cache.read::<ScheduleOption>(GROUPS_KEY).await {
            return Ok(options);
        }

        let html = self.fetcher.fetch(&self.source.index_url(), cancel).await?;
        let options = parse_group_options(&html, &self.source.schedule_prefix)?;

        log::info!("Found {} groups on the index page", options.len());
        self.cache.write(GROUPS_KEY, &options).await;
        Ok(options)
    }

    /// Publication timestamp printed on the index page, verbatim.
    ///
    /// Always fetched fresh.
    pub async fn last_update(&self, cancel: &CancellationToken) -> Result<String> {
        let html = self.fetcher.fetch(&self.source.index_url(), cancel).await?;
        parse_last_update(&html)
    }
}

/// Collect links inside tables that point at group schedule pages.
///
/// Duplicated links produce duplicated options.
pub fn parse_group_options(html: &str, schedule_prefix: &str) -> Result<Vec<ScheduleOption>> {
    let document = Html::parse_document(html);
    let link_sel = parse_selector("table a")?;

    let options = document
        .select(&link_sel)
        .filter_map(|link| {
            let href = link.value().attr("href")?;
            if !href.contains(schedule_prefix) {
                return None;
            }
            let label = link.text().collect::<String>().trim().to_string();
            Some(ScheduleOption::new(label, href))
        })
        .collect();

    Ok(options)
}

/// Extract the publication timestamp from the index page.
pub fn parse_last_update(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let text: String = document.root_element().text().collect();

    let pattern = Regex::new(UPDATED_PATTERN)?;
    pattern
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| AppError::not_found("schedule publication date is missing"))
}
