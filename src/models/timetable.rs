//! Weekly timetable payload.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

/// Day key (as sent by the service) to that day's schedule.
pub type TimeTable = BTreeMap<String, DaySchedule>;

#[derive(Debug, Clone, Deserialize)]
pub struct DaySchedule {
    #[serde(default)]
    pub classes: Vec<Lecture>,
    pub date: NaiveDate,
    #[serde(default)]
    pub weekday: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseDetails {
    #[serde(default)]
    pub faculty_name: String,
    #[serde(default)]
    pub subject_code: String,
    #[serde(default)]
    pub subject_name: String,
    #[serde(default)]
    pub section: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lecture {
    #[serde(default)]
    pub course: String,
    /// `[start, end]` pairs, e.g. `["09:40:00", "10:30:00"]`.
    #[serde(default)]
    pub time: Vec<Vec<String>>,
    #[serde(default)]
    pub course_details: CourseDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Lecture {
    /// Well-formed slots of this lecture; malformed pairs are skipped.
    pub fn slots(&self) -> Vec<TimeSlot> {
        self.time
            .iter()
            .filter_map(|pair| match pair.as_slice() {
                [start, end, ..] => Some(TimeSlot {
                    start: parse_clock(start)?,
                    end: parse_clock(end)?,
                }),
                _ => None,
            })
            .collect()
    }

    pub fn starts_at(&self, start: &str) -> bool {
        self.time.iter().any(|pair| pair.first().map(String::as_str) == Some(start))
    }
}

pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}
