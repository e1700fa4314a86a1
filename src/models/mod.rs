//! Typed payloads for the ERP, login/timetable and quiz services.

pub mod attendance;
pub mod quiz;
pub mod time;
pub mod timetable;
pub mod user;

pub use attendance::{AttendanceRecord, AttendanceReport, AttendanceSummary, CourseAttendance};
pub use quiz::{
    EvaluatedQuiz, Question, QuestionId, QuestionResult, QuizDetails, QuizReview, QuizSummary, QuizWindow,
    SubmittedAnswer,
};
pub use timetable::{DaySchedule, Lecture, TimeTable};
pub use user::User;
