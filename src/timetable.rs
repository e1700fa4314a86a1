//! Lecture status for the timetable view.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::timetable::TimeSlot;
use crate::models::{DaySchedule, Lecture, TimeTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LectureStatus {
    Completed,
    Ongoing,
    Upcoming,
}

/// Status of a lecture held on `date`, as seen at local time `now`.
///
/// Whole past days are completed and future days upcoming. On the day
/// itself the first slot decides: inside it is ongoing, before it upcoming,
/// after it completed.
pub fn lecture_status(slots: &[TimeSlot], date: NaiveDate, now: NaiveDateTime) -> LectureStatus {
    let today = now.date();
    if date < today {
        return LectureStatus::Completed;
    }
    if date > today {
        return LectureStatus::Upcoming;
    }

    for slot in slots {
        let start = date.and_time(slot.start);
        let end = date.and_time(slot.end);
        if start <= now && now <= end {
            return LectureStatus::Ongoing;
        }
        if now < start {
            return LectureStatus::Upcoming;
        }
        if now > end {
            return LectureStatus::Completed;
        }
    }

    LectureStatus::Upcoming
}

/// Sorted, de-duplicated start times across the whole week.
pub fn slot_grid(timetable: &TimeTable) -> Vec<String> {
    timetable
        .values()
        .flat_map(|day| day.classes.iter())
        .flat_map(|lecture| lecture.time.iter())
        .filter_map(|pair| pair.first().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn day_for(timetable: &TimeTable, date: NaiveDate) -> Option<&DaySchedule> {
    timetable.values().find(|day| day.date == date)
}

pub fn lecture_at<'a>(day: &'a DaySchedule, start: &str) -> Option<&'a Lecture> {
    day.classes.iter().find(|lecture| lecture.starts_at(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn slot(start: (u32, u32), end: (u32, u32)) -> TimeSlot {
        TimeSlot {
            start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn now(d: u32, h: u32, m: u32) -> NaiveDateTime {
        date(d).and_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_other_days() {
        let slots = [slot((9, 40), (10, 30))];
        assert_eq!(lecture_status(&slots, date(3), now(4, 8, 0)), LectureStatus::Completed);
        assert_eq!(lecture_status(&slots, date(5), now(4, 23, 0)), LectureStatus::Upcoming);
    }

    #[test]
    fn test_same_day() {
        let slots = [slot((9, 40), (10, 30))];
        assert_eq!(lecture_status(&slots, date(4), now(4, 9, 0)), LectureStatus::Upcoming);
        assert_eq!(lecture_status(&slots, date(4), now(4, 9, 40)), LectureStatus::Ongoing);
        assert_eq!(lecture_status(&slots, date(4), now(4, 10, 31)), LectureStatus::Completed);
        assert_eq!(lecture_status(&[], date(4), now(4, 10, 31)), LectureStatus::Upcoming);
    }

    #[test]
    fn test_slot_grid_and_lookup() {
        let timetable: TimeTable = serde_json::from_str(
            r#"{
                "mon": {"date": "2025-03-03", "weekday": "Monday", "classes": [
                    {"course": "DBMS", "time": [["10:30:00", "11:20:00"]]},
                    {"course": "OS", "time": [["09:40:00", "10:30:00"]]}
                ]},
                "tue": {"date": "2025-03-04", "weekday": "Tuesday", "classes": [
                    {"course": "CN", "time": [["09:40:00", "10:30:00"], ["11:20:00", "12:10:00"]]}
                ]}
            }"#,
        )
        .unwrap();

        assert_eq!(slot_grid(&timetable), ["09:40:00", "10:30:00", "11:20:00"]);

        let monday = day_for(&timetable, date(3)).unwrap();
        assert_eq!(lecture_at(monday, "09:40:00").map(|l| l.course.as_str()), Some("OS"));
        assert!(lecture_at(monday, "11:20:00").is_none());
        assert!(day_for(&timetable, date(9)).is_none());
    }
}
