// src/models/schedule.rs

//! Lesson, day and option records shared by the group and teacher views.

use serde::{Deserialize, Serialize};

/// One scheduled class occurrence.
///
/// In the group view `teacher` may be set and `group` is empty. In the
/// teacher view `group` names the owning group and `teacher` is empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lesson {
    /// Position within the day, starting at 1
    pub num: u32,

    /// Display time range, start and end separated by a newline
    pub time: String,

    /// Discipline name
    pub name: String,

    /// Teacher display name
    #[serde(default)]
    pub teacher: String,

    /// Room identifier
    pub room: String,

    /// Owning group label (teacher view only)
    #[serde(default)]
    pub group: String,
}

impl Lesson {
    /// Project a group-view lesson into the teacher view.
    pub fn for_teacher_view(&self, group_label: &str) -> Self {
        Self {
            group: group_label.to_string(),
            teacher: String::new(),
            ..self.clone()
        }
    }
}

/// A single day's lessons for one group or teacher.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayRecord {
    /// Day label exactly as printed on the source page
    pub date: String,

    /// Page the day was read from
    pub href: String,

    /// Lessons in row order (group view) or time order (teacher view)
    pub lessons: Vec<Lesson>,
}

impl DayRecord {
    pub fn new(date: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            href: href.into(),
            lessons: Vec::new(),
        }
    }

    /// Append a lesson, assigning it the next ordinal.
    pub fn push_numbered(&mut self, mut lesson: Lesson) {
        lesson.num = self.lessons.len() as u32 + 1;
        self.lessons.push(lesson);
    }

    /// Sort lessons by the lexical value of their time text.
    pub fn sort_by_time(&mut self) {
        self.lessons.sort_by(|a, b| a.time.cmp(&b.time));
    }
}

/// A selectable schedule subject: a group or a teacher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleOption {
    pub label: String,
    pub value: String,
}

impl ScheduleOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}
