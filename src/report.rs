//! Plain-text views for the non-interactive commands.

use std::fmt::Write;

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::attendance::{AttendanceBand, plan};
use crate::models::{
    AttendanceRecord, AttendanceReport, CourseAttendance, DaySchedule, EvaluatedQuiz, QuizReview, TimeTable, User,
};
use crate::timetable::{LectureStatus, lecture_at, lecture_status, slot_grid};

fn band_label(percent: f64) -> &'static str {
    match AttendanceBand::of(percent) {
        AttendanceBand::Good => "good",
        AttendanceBand::Warning => "warning",
        AttendanceBand::Low => "low",
    }
}

fn course_line(out: &mut String, course: &CourseAttendance, target: f64) {
    let summary = &course.attendance_summary;
    let advice = match plan(summary.present, summary.total, target) {
        Ok(outcome) => outcome.to_string(),
        Err(err) => err.to_string(),
    };
    let _ = writeln!(
        out,
        "{:<10} {:<32} {:>3}/{:<3} {:>6.2}% {:<8} {}",
        course.cdata.course_code,
        truncate(&course.cdata.course_name, 32),
        summary.present,
        summary.total,
        summary.percent,
        band_label(summary.percent),
        advice,
    );
}

/// Course table with the lectures that can be missed or must be attended
/// to stay at `target` percent.
pub fn attendance(report: &AttendanceReport, target: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<10} {:<32} {:>7} {:>7} {:<8} target {target}%", "CODE", "COURSE", "P/T", "%", "BAND");

    for course in &report.courses {
        course_line(&mut out, course, target);
    }

    if let Some(overall) = &report.overall {
        out.push('\n');
        course_line(&mut out, overall, target);
    }
    out
}

pub fn attendance_records(course: &CourseAttendance, records: &[AttendanceRecord]) -> String {
    let mut out = format!("{} {}\n", course.cdata.course_code, course.cdata.course_name);
    let present = records.iter().filter(|r| r.is_present()).count();
    let _ = writeln!(out, "{present} present of {} lectures", records.len());

    for record in records {
        let _ = writeln!(
            out,
            "{:<14} {:<8}-{:>8}  {}",
            record.date_formatted, record.start_time, record.end_time, record.status
        );
    }
    out
}

/// Lectures across all courses on one day.
pub fn daily_attendance(date: NaiveDate, records: &[AttendanceRecord]) -> String {
    let mut out = format!("{}\n", date.format("%A %d %b %Y"));
    if records.is_empty() {
        out.push_str("No attendance recorded\n");
        return out;
    }

    let present = records.iter().filter(|r| r.is_present()).count();
    let _ = writeln!(out, "{present} present, {} absent", records.len() - present);

    for record in records {
        let start = record
            .started_at()
            .map(|at| at.with_timezone(&Local).format("%H:%M").to_string())
            .unwrap_or_else(|| record.start_time.clone());
        let _ = writeln!(
            out,
            "{:<6} {:<8} {}",
            start,
            record.status,
            record.faculty_name.as_deref().unwrap_or("-"),
        );
    }
    out
}

pub fn timetable_day(day: &DaySchedule, now: NaiveDateTime) -> String {
    let mut out = format!("{} {}\n", day.weekday, day.date.format("%d %b %Y"));
    if day.classes.is_empty() {
        out.push_str("No lectures\n");
        return out;
    }

    let mut rows: Vec<_> = day
        .classes
        .iter()
        .flat_map(|lecture| lecture.slots().into_iter().map(move |slot| (slot, lecture)))
        .collect();
    rows.sort_by_key(|(slot, _)| slot.start);

    for (slot, lecture) in rows {
        let status = match lecture_status(&[slot], day.date, now) {
            LectureStatus::Completed => "done",
            LectureStatus::Ongoing => "now",
            LectureStatus::Upcoming => "next",
        };
        let _ = writeln!(
            out,
            "{}-{}  {:<4}  {:<28} {}",
            slot.start.format("%H:%M"),
            slot.end.format("%H:%M"),
            status,
            truncate(&lecture.course, 28),
            lecture.course_details.faculty_name,
        );
    }
    out
}

/// Week at a glance: one row per day, one column per start time.
pub fn timetable_week(timetable: &TimeTable) -> String {
    let grid = slot_grid(timetable);
    let mut out = format!("{:<10}", "");
    for start in &grid {
        let _ = write!(out, " {:<12}", start.get(..5).unwrap_or(start));
    }
    out.push('\n');

    let mut days: Vec<&DaySchedule> = timetable.values().collect();
    days.sort_by_key(|day| day.date);
    for day in days {
        let _ = write!(out, "{:<10}", truncate(&day.weekday, 10));
        for start in &grid {
            let course = lecture_at(day, start).map_or("-", |l| l.course.as_str());
            let _ = write!(out, " {:<12}", truncate(course, 12));
        }
        out.push('\n');
    }
    out
}

pub fn quizzes(quizzes: &[EvaluatedQuiz]) -> String {
    if quizzes.is_empty() {
        return "No evaluated quizzes\n".to_string();
    }

    let mut out = format!(
        "{:<12} {:<10} {:>6} {:>4} {:>4} {:>4}  {}\n",
        "QUIZ", "COURSE", "MARKS", "OK", "BAD", "N/A", "DATE"
    );
    for quiz in quizzes {
        let date = quiz
            .logged_in_at()
            .map(|at| at.with_timezone(&chrono::Local).format("%d %b %Y %H:%M").to_string())
            .unwrap_or_else(|| quiz.loggedin_at.clone());
        let _ = writeln!(
            out,
            "{:<12} {:<10} {:>6.2} {:>4} {:>4} {:>4}  {}",
            quiz.quiz_uc, quiz.master_course_code, quiz.marks_obtained, quiz.correct, quiz.incorrect, quiz.not_attempted, date
        );
    }
    out
}

/// Graded attempt with the correct option of every question marked `*`
/// and the student's choice marked `>`.
pub fn quiz_review(review: &QuizReview) -> String {
    let summary = &review.summary;
    let mut out = format!("{} {}\n", summary.master_course_code, summary.student_name);

    let score = summary.score_percent().map_or(String::new(), |p| format!(" ({p:.0}%)"));
    let _ = writeln!(out, "Marks {}/{}{score}", summary.marks_obtained, summary.total_marks);
    let _ = writeln!(
        out,
        "Correct {}  Incorrect {}  Not attempted {}",
        summary.correct, summary.incorrect, summary.not_attempted
    );
    if let Some(minutes) = summary.duration_minutes() {
        let _ = writeln!(out, "Time taken {minutes} min");
    }

    for (number, question) in review.questions.iter().enumerate() {
        let result = review.result_for(question.id);
        let verdict = match result {
            Some(r) if r.is_correct() => "correct",
            Some(r) if r.submitted_choice().is_some() => "incorrect",
            _ => "not attempted",
        };
        let _ = writeln!(out, "\nQ{}. {} [{verdict}]", number + 1, question.text);

        for (index, option) in question.options.iter().enumerate() {
            let key = if result.is_some_and(|r| r.correct_answer == index) { '*' } else { ' ' };
            let chosen = if result.and_then(|r| r.submitted_choice()) == Some(index) { '>' } else { ' ' };
            let _ = writeln!(out, "  {chosen}{key} {option}");
        }
    }
    out
}

pub fn profile(user: &User) -> String {
    let fields = [
        ("Name", user.name.clone()),
        ("Username", user.username.clone()),
        ("Roll number", user.roll_number.clone()),
        ("Email", user.email.clone()),
        ("Mobile", user.mobile.clone()),
        ("Batch", user.batch.to_string()),
        ("Year", user.year.to_string()),
        ("Semester", user.semester.to_string()),
        ("Section", user.section.clone()),
    ];

    fields
        .iter()
        .map(|(label, value)| format!("{label:<12} {value}\n"))
        .collect()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}
