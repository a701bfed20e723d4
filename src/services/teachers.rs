// src/services/teachers.rs

//! Teacher views synthesized from every group's schedule.
//!
//! The origin publishes schedules per group only. A teacher's week is built
//! by scanning all groups, keeping lessons whose teacher text contains the
//! requested name and tagging each one with the group it came from.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::models::{DayRecord, ScheduleOption};
use crate::services::fanout::{GroupFanOut, GroupSchedule};
use crate::services::validate_subject;
use crate::storage::{CacheThrough, TEACHERS_KEY, teacher_schedule_key};
use crate::utils::text::format_name;

/// Surname followed by two initials, e.g. "Худякова Н. В.".
const TEACHER_NAME_PATTERN: &str = r"[А-ЯЁ][а-яё]+\s+[А-ЯЁ]\.\s*[А-ЯЁ]\.";

/// Builds teacher schedules and the teacher directory.
#[derive(Clone)]
pub struct TeacherSchedules {
    fan_out: GroupFanOut,
    cache: CacheThrough,
    listing_url: String,
}

impl TeacherSchedules {
    /// `listing_url` becomes the `href` of every synthesized day.
    pub fn new(fan_out: GroupFanOut, cache: CacheThrough, listing_url: impl Into<String>) -> Self {
        Self {
            fan_out,
            cache,
            listing_url: listing_url.into(),
        }
    }

    /// Week of lessons whose teacher text contains `name`.
    pub async fn schedule_for(
        &self,
        name: &str,
        date: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<DayRecord>> {
        validate_subject(name)?;

        let key = teacher_schedule_key(name);
        if let Some(days) = self.cache.read::<DayRecord>(&key).await {
            return Ok(days);
        }

        let outcome = self.fan_out.run(date, cancel).await?;
        let days = merge_teacher_days(&outcome.schedules, name, &self.listing_url);

        log::info!("Teacher {}: {} days with lessons", name, days.len());
        self.cache.write(&key, &days).await;
        Ok(days)
    }

    /// Every distinct teacher name found in any group's schedule, sorted.
    pub async fn list_teachers(&self, cancel: &CancellationToken) -> Result<Vec<ScheduleOption>> {
        if let Some(options) = self.cache.read::<ScheduleOption>(TEACHERS_KEY).await {
            return Ok(options);
        }

        let outcome = self.fan_out.run("", cancel).await?;
        let options = collect_teacher_names(&outcome.schedules)?;

        log::info!("Found {} distinct teachers", options.len());
        self.cache.write(TEACHERS_KEY, &options).await;
        Ok(options)
    }
}

/// Merge matching lessons from all groups into one record per day label.
///
/// Days keep the order in which they were first met while scanning groups
/// in listing order. Lessons within a day are sorted by their time text.
pub fn merge_teacher_days(
    schedules: &[GroupSchedule],
    fragment: &str,
    listing_url: &str,
) -> Vec<DayRecord> {
    let mut days: Vec<DayRecord> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for schedule in schedules {
        for day in &schedule.days {
            for lesson in day.lessons.iter().filter(|l| l.teacher.contains(fragment)) {
                let slot = *index.entry(day.date.as_str()).or_insert_with(|| {
                    days.push(DayRecord::new(day.date.as_str(), listing_url));
                    days.len() - 1
                });
                days[slot]
                    .lessons
                    .push(lesson.for_teacher_view(&schedule.group.label));
            }
        }
    }

    // TODO: compare parsed start times once "9:00"-style unpadded hours show up.
    for day in &mut days {
        day.sort_by_time();
    }
    days
}

/// Harvest distinct teacher names from every lesson, sorted by label.
pub fn collect_teacher_names(schedules: &[GroupSchedule]) -> Result<Vec<ScheduleOption>> {
    let pattern = Regex::new(TEACHER_NAME_PATTERN)?;
    let mut names = BTreeSet::new();

    let teachers = schedules
        .iter()
        .flat_map(|s| &s.days)
        .flat_map(|d| &d.lessons)
        .map(|l| l.teacher.as_str())
        .filter(|t| !t.is_empty());

    for teacher in teachers {
        for found in pattern.find_iter(teacher) {
            let name = format_name(found.as_str().trim());
            if !name.is_empty() {
                names.insert(name);
            }
        }
    }

    Ok(names
        .into_iter()
        .map(|name| ScheduleOption::new(name.clone(), name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lesson;

    const LISTING: &str = "https://omsk-osma.ru/shedule_kolledzh";

    fn lesson(time: &str, name: &str, teacher: &str) -> Lesson {
        Lesson {
            time: time.to_string(),
            name: name.to_string(),
            teacher: teacher.to_string(),
            room: "101".to_string(),
            ..Lesson::default()
        }
    }

    fn group(label: &str, days: Vec<(&str, Vec<Lesson>)>) -> GroupSchedule {
        GroupSchedule {
            group: ScheduleOption::new(label, format!("/shedule_kolledzh/{label}")),
            days: days
                .into_iter()
                .map(|(date, lessons)| {
                    let mut day = DayRecord::new(date, "");
                    for l in lessons {
                        day.push_numbered(l);
                    }
                    day
                })
                .collect(),
        }
    }

    fn fixture() -> Vec<GroupSchedule> {
        vec![
            group(
                "ИС-21",
                vec![
                    (
                        "Вторник",
                        vec![lesson("12:00\n13:30", "Анатомия", "Худякова Н. В.")],
                    ),
                    (
                        "Понедельник",
                        vec![lesson("08:00\n09:30", "Химия", "Петров А. А.")],
                    ),
                ],
            ),
            group(
                "ЛД-11",
                vec![(
                    "Вторник",
                    vec![
                        lesson("08:00\n09:30", "Гистология", "Худякова Н. В."),
                        lesson("10:00\n11:30", "Латынь", "Петров А. А., Иванова О. С."),
                    ],
                )],
            ),
        ]
    }

    #[test]
    fn test_merge_groups_by_day_and_sorts_by_time() {
        let days = merge_teacher_days(&fixture(), "Худякова Н. В.", LISTING);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, "Вторник");
        assert_eq!(days[0].href, LISTING);

        let groups: Vec<&str> = days[0].lessons.iter().map(|l| l.group.as_str()).collect();
        assert_eq!(groups, vec!["ЛД-11", "ИС-21"]);
        assert!(days[0].lessons.iter().all(|l| l.teacher.is_empty()));
    }

    #[test]
    fn test_merge_keeps_first_seen_day_order() {
        let days = merge_teacher_days(&fixture(), "Петров", LISTING);

        let labels: Vec<&str> = days.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(labels, vec!["Понедельник", "Вторник"]);
    }

    #[test]
    fn test_merge_is_case_sensitive_substring() {
        assert!(merge_teacher_days(&fixture(), "худякова", LISTING).is_empty());
        assert_eq!(merge_teacher_days(&fixture(), "Худяк", LISTING).len(), 1);
    }

    #[test]
    fn test_collect_teacher_names_dedups_and_sorts() {
        let options = collect_teacher_names(&fixture()).unwrap();

        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Иванова О. С.", "Петров А. А.", "Худякова Н. В."]
        );
        assert!(options.iter().all(|o| o.label == o.value));
    }

    #[test]
    fn test_collect_normalizes_compact_initials() {
        let schedules = vec![group(
            "ИС-21",
            vec![(
                "Пн",
                vec![
                    lesson("08:00\n09:30", "А", "Смирнов К.А."),
                    lesson("10:00\n11:30", "Б", "Смирнов К. А."),
                    lesson("12:00\n13:30", "В", "вакансия"),
                ],
            )],
        )];
        let options = collect_teacher_names(&schedules).unwrap();
        assert_eq!(options, vec![ScheduleOption::new("Смирнов К. А.", "Смирнов К. А.")]);
    }
}
