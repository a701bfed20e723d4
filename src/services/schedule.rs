// src/services/schedule.rs

//! Group schedule extraction.
//!
//! Schedule pages lay out a week as one table. A day opens with a 3-cell row
//! (day, time, info) and continues with 2-cell rows (time, info) until the
//! next 3-cell row. The info cell holds `div.cell > div` blocks for the
//! discipline, teacher and room.

use std::collections::HashMap;
use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::{DayRecord, Lesson, SourceConfig};
use crate::storage::{CacheThrough, group_schedule_key};
use crate::utils::http::PageFetcher;
use crate::utils::parse_selector;
use crate::utils::text::{clean_text, format_name, format_time};

/// Text present in the schedule table header.
pub const HEADER_MARKER: &str = "Дисциплины";

const TABLE_SELECTOR: &str = "table.rasp_table";
const INFO_SELECTOR: &str = "div.cell > div";

/// Fetches and parses group schedule pages.
#[derive(Clone)]
pub struct ScheduleExtractor {
    fetcher: Arc<dyn PageFetcher>,
    cache: CacheThrough,
    source: SourceConfig,
}

impl ScheduleExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>, cache: CacheThrough, source: SourceConfig) -> Self {
        Self {
            fetcher,
            cache,
            source,
        }
    }

    /// Schedule for one group reference.
    ///
    /// `_date` is accepted for interface compatibility; the page always
    /// carries the whole published range and no filtering is applied.
    pub async fn extract(
        &self,
        reference: &str,
        _date: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<DayRecord>> {
        let key = group_schedule_key(reference);
        if let Some(days) = self.cache.read::<DayRecord>(&key).await {
            return Ok(days);
        }

        let url = self.source.schedule_url(reference);
        let html = self.fetcher.fetch(&url, cancel).await?;
        let days = parse_schedule(&html, &url)?;

        log::debug!("Parsed {} days from {}", days.len(), url);
        self.cache.write(&key, &days).await;
        Ok(days)
    }
}

/// Position of the row scan relative to day boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RowState {
    /// No day label seen yet (or the last one was blank)
    AwaitingDay,
    /// Rows belong to this day until the next opening row
    WithinDay(String),
}

impl RowState {
    /// Apply an opening row's day label.
    fn open(label: String) -> Self {
        if label.is_empty() {
            RowState::AwaitingDay
        } else {
            RowState::WithinDay(label)
        }
    }

    fn day(&self) -> Option<&str> {
        match self {
            RowState::AwaitingDay => None,
            RowState::WithinDay(day) => Some(day),
        }
    }
}

/// Cells of a data row, classified by shape.
enum RowShape<'a> {
    Opening {
        day: ElementRef<'a>,
        time: ElementRef<'a>,
        info: ElementRef<'a>,
    },
    Continuation {
        time: ElementRef<'a>,
        info: ElementRef<'a>,
    },
}

impl<'a> RowShape<'a> {
    fn classify(row: ElementRef<'a>) -> Option<Self> {
        let cells: Vec<ElementRef<'a>> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "td")
            .collect();

        match cells.as_slice() {
            [day, time, info] => Some(RowShape::Opening {
                day: *day,
                time: *time,
                info: *info,
            }),
            [time, info] => Some(RowShape::Continuation {
                time: *time,
                info: *info,
            }),
            _ => None,
        }
    }
}

/// Parse a schedule page into day records.
///
/// A page without a recognizable schedule table yields an empty list.
pub fn parse_schedule(html: &str, href: &str) -> Result<Vec<DayRecord>> {
    let document = Html::parse_document(html);
    let tables = find_schedule_tables(&document)?;
    if tables.is_empty() {
        log::debug!("No schedule table found at {}", href);
        return Ok(Vec::new());
    }

    let row_sel = parse_selector("tr")?;
    let info_sel = parse_selector(INFO_SELECTOR)?;

    let mut days: Vec<DayRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut state = RowState::AwaitingDay;

    let rows = tables.iter().flat_map(|table| table.select(&row_sel));
    for (i, row) in rows.enumerate() {
        if i == 0 || element_text(row).contains(HEADER_MARKER) {
            continue;
        }

        let Some(shape) = RowShape::classify(row) else {
            continue;
        };

        let (time_cell, info_cell) = match shape {
            RowShape::Opening { day, time, info } => {
                state = RowState::open(clean_text(day));
                (time, info)
            }
            RowShape::Continuation { time, info } => (time, info),
        };

        let Some(day) = state.day() else {
            continue;
        };

        let time = format_time(&clean_text(time_cell));
        if time.is_empty() {
            continue;
        }

        let lesson = parse_lesson(info_cell, &info_sel, time);
        let slot = *index.entry(day.to_string()).or_insert_with(|| {
            days.push(DayRecord::new(day, href));
            days.len() - 1
        });
        days[slot].push_numbered(lesson);
    }

    Ok(days)
}

/// Locate the schedule tables: every styled table if any exist, otherwise
/// the last table whose text carries the header marker.
fn find_schedule_tables(document: &Html) -> Result<Vec<ElementRef<'_>>> {
    let primary = parse_selector(TABLE_SELECTOR)?;
    let styled: Vec<ElementRef<'_>> = document.select(&primary).collect();
    if !styled.is_empty() {
        return Ok(styled);
    }

    let any_table = parse_selector("table")?;
    Ok(document
        .select(&any_table)
        .filter(|table| element_text(*table).contains(HEADER_MARKER))
        .last()
        .into_iter()
        .collect())
}

/// Build a lesson from an info cell. Fewer than three blocks leaves the
/// descriptive fields blank.
fn parse_lesson(info: ElementRef<'_>, info_sel: &Selector, time: String) -> Lesson {
    let blocks: Vec<ElementRef<'_>> = info.select(info_sel).collect();
    let mut lesson = Lesson {
        time,
        ..Lesson::default()
    };

    if let [name, teacher, room, ..] = blocks.as_slice() {
        lesson.name = clean_text(*name);
        lesson.teacher = format_name(&clean_text(*teacher));
        lesson.room = clean_text(*room);
    }
    lesson
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HREF: &str = "https://omsk-osma.ru/shedule_kolledzh/is-21";

    fn info(name: &str, teacher: &str, room: &str) -> String {
        format!(
            r#"<div class="cell"><div>{name}</div><div>{teacher}</div><div>{room}</div></div>"#
        )
    }

    fn page(class: &str, rows: &str) -> String {
        format!(
            r#"<html><body><table class="{class}">
            <tr><th>День</th><th>Время</th><th>Дисциплины</th></tr>
            {rows}
            </table></body></html>"#
        )
    }

    #[test]
    fn test_opening_then_continuation_row() {
        let rows = format!(
            "<tr><td>Пн</td><td>08:00-09:30</td><td>{}</td></tr>\
             <tr><td>10:00-11:30</td><td>{}</td></tr>",
            info("Анатомия", "Худякова Н.В.", "101"),
            info("Латынь", "Петров А.А.", "202"),
        );
        let days = parse_schedule(&page("rasp_table", &rows), HREF).unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, "Пн");
        assert_eq!(days[0].href, HREF);
        assert_eq!(days[0].lessons.len(), 2);
        assert_eq!(days[0].lessons[0].num, 1);
        assert_eq!(days[0].lessons[1].num, 2);
        assert_eq!(days[0].lessons[0].time, "08:00\n09:30");
        assert_eq!(days[0].lessons[0].teacher, "Худякова Н. В.");
        assert_eq!(days[0].lessons[1].name, "Латынь");
        assert_eq!(days[0].lessons[1].room, "202");
        assert!(days[0].lessons.iter().all(|l| l.group.is_empty()));
    }

    #[test]
    fn test_days_keep_first_seen_order() {
        let rows = format!(
            "<tr><td>Среда</td><td>08:00-09:30</td><td>{a}</td></tr>\
             <tr><td>Понедельник</td><td>08:00-09:30</td><td>{a}</td></tr>\
             <tr><td>10:00-11:30</td><td>{a}</td></tr>",
            a = info("Анатомия", "Иванов И.И.", "1"),
        );
        let days = parse_schedule(&page("rasp_table", &rows), HREF).unwrap();

        let labels: Vec<&str> = days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(labels, vec!["Среда", "Понедельник"]);
        assert_eq!(days[1].lessons.len(), 2);
    }

    #[test]
    fn test_rows_before_day_and_blank_time_skipped() {
        let rows = format!(
            "<tr><td>08:00-09:30</td><td>{a}</td></tr>\
             <tr><td>Вторник</td><td> </td><td>{a}</td></tr>\
             <tr><td>10:00-11:30</td><td>{a}</td></tr>\
             <tr><td>one</td><td>two</td><td>three</td><td>four</td></tr>",
            a = info("Анатомия", "Иванов И.И.", "1"),
        );
        let days = parse_schedule(&page("rasp_table", &rows), HREF).unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, "Вторник");
        assert_eq!(days[0].lessons.len(), 1);
        assert_eq!(days[0].lessons[0].num, 1);
        assert_eq!(days[0].lessons[0].time, "10:00\n11:30");
    }

    #[test]
    fn test_short_info_block_keeps_blank_lesson() {
        let rows = "<tr><td>Четверг</td><td>08:00-09:30</td>\
                    <td><div class=\"cell\"><div>Практика</div></div></td></tr>";
        let days = parse_schedule(&page("rasp_table", rows), HREF).unwrap();

        let lesson = &days[0].lessons[0];
        assert_eq!(lesson.time, "08:00\n09:30");
        assert!(lesson.name.is_empty());
        assert!(lesson.teacher.is_empty());
        assert!(lesson.room.is_empty());
    }

    #[test]
    fn test_fallback_table_by_header_marker() {
        let rows = format!(
            "<tr><td>Пятница</td><td>08:00-09:30</td><td>{}</td></tr>",
            info("Химия", "Сидорова Е.П.", "3")
        );
        let html = format!(
            "<table><tr><td>menu</td></tr></table>{}",
            page("plain", &rows)
        );
        let days = parse_schedule(&html, HREF).unwrap();

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].lessons[0].name, "Химия");
    }

    #[test]
    fn test_every_styled_table_is_read() {
        let html = format!(
            r#"<html><body>
            <table class="rasp_table">
            <tr><th>День</th><th>Время</th><th>Дисциплины</th></tr>
            <tr><td>Пн</td><td>08:00-09:30</td><td>{a}</td></tr>
            </table>
            <table class="rasp_table">
            <tr><td>Вт</td><td>10:00-11:30</td><td>{b}</td></tr>
            <tr><td>12:00-13:30</td><td>{c}</td></tr>
            </table></body></html>"#,
            a = info("Анатомия", "Худякова Н.В.", "101"),
            b = info("Латынь", "Петров А.А.", "202"),
            c = info("Химия", "Сидорова Е.П.", "203"),
        );
        let days = parse_schedule(&html, HREF).unwrap();

        let labels: Vec<&str> = days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(labels, ["Пн", "Вт"]);
        assert_eq!(days[1].lessons.len(), 2);
        assert_eq!(days[1].lessons[1].num, 2);
        assert_eq!(days[1].lessons[1].name, "Химия");
    }

    #[test]
    fn test_missing_table_is_empty() {
        let days = parse_schedule("<html><body><p>Нет данных</p></body></html>", HREF).unwrap();
        assert!(days.is_empty());
    }

    #[test]
    fn test_header_row_inside_body_skipped() {
        let rows = format!(
            "<tr><td>Суббота</td><td>08:00-09:30</td><td>{a}</td></tr>\
             <tr><td>Дисциплины</td><td>{a}</td></tr>",
            a = info("Химия", "Сидорова Е.П.", "3"),
        );
        let days = parse_schedule(&page("rasp_table", &rows), HREF).unwrap();
        assert_eq!(days[0].lessons.len(), 1);
    }

    #[test]
    fn test_row_state_transitions() {
        assert_eq!(RowState::open(String::new()), RowState::AwaitingDay);
        let state = RowState::open("Пн".to_string());
        assert_eq!(state.day(), Some("Пн"));
    }
}
