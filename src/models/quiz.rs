//! Quiz backend payloads and the question model the session works with.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::time;

pub type QuestionId = u64;

/// Body shared by every quiz backend call.
#[derive(Debug, Clone, Serialize)]
pub struct QuizRequest<'a> {
    pub pin: &'a str,
    pub quiz_uc: &'a str,
    pub user_unique_code: &'a str,
}

/// Body of `submitAnswer`.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRequest<'a> {
    pub quiz_uc: &'a str,
    pub question_id: QuestionId,
    pub user_unique_code: &'a str,
    pub answer: usize,
    pub pin: &'a str,
}

/// Response wrapper used by both backends. The payload shows up either under
/// `response.data` or directly under `data` depending on the endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub time_now: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default = "no_payload")]
    pub response: Option<Payload<T>>,
    #[serde(default = "no_data")]
    pub data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Payload<T> {
    #[serde(default = "no_data")]
    pub data: Option<T>,
}

fn no_payload<T>() -> Option<Payload<T>> {
    None
}

fn no_data<T>() -> Option<T> {
    None
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> Option<T> {
        self.data.or_else(|| self.response.and_then(|r| r.data))
    }

    pub fn message(&self) -> Option<&str> {
        self.msg.as_deref().filter(|m| !m.is_empty())
    }
}

/// Login/start/end boundaries of a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuizWindow {
    #[serde(deserialize_with = "time::deserialize")]
    pub login_time: DateTime<Utc>,
    #[serde(deserialize_with = "time::deserialize")]
    pub start_time: DateTime<Utc>,
    #[serde(deserialize_with = "time::deserialize")]
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuizCourse {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

/// Quiz description returned by `fetchQuizDetails` once the login window
/// is open. Only the fields the client reads are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct QuizDetails {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub unique_code: Option<String>,
    #[serde(default)]
    pub cdata: QuizCourse,
    #[serde(default)]
    pub faculty_name: Option<String>,
    #[serde(default)]
    pub master_course_code: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub questions_count: Option<String>,
    #[serde(default)]
    pub total_marks: Option<String>,
    #[serde(flatten)]
    pub window: QuizWindow,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedAnswerPayload {
    pub answer: usize,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub answered_on: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionPayload {
    pub id: QuestionId,
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub marks: Option<f64>,
    #[serde(default)]
    pub topic_name: Option<String>,
    #[serde(default)]
    pub multiple_correct: Option<u8>,
    #[serde(default)]
    pub submitted_answer: Option<SubmittedAnswerPayload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmittedAnswer {
    pub choice_index: usize,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<String>,
    pub marks: Option<f64>,
    pub topic: Option<String>,
    pub submitted_answer: Option<SubmittedAnswer>,
}

impl From<QuestionPayload> for Question {
    fn from(payload: QuestionPayload) -> Self {
        let submitted_answer = payload.submitted_answer.map(|s| SubmittedAnswer {
            choice_index: s.answer,
            answered_at: DateTime::from_timestamp_millis(s.answered_on).unwrap_or_default(),
        });

        Self {
            id: payload.id,
            text: payload.question,
            options: payload.options,
            marks: payload.marks,
            topic: payload.topic_name,
            submitted_answer,
        }
    }
}

/// One row of `myEvaluatedQuizzes`.
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluatedQuiz {
    #[serde(default)]
    pub sl_num: u32,
    pub quiz_uc: String,
    #[serde(default)]
    pub master_course_code: String,
    #[serde(default)]
    pub marks_obtained: f64,
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub incorrect: u32,
    #[serde(default)]
    pub not_attempted: u32,
    #[serde(default)]
    pub loggedin_at: String,
    #[serde(default)]
    pub status: String,
}

impl EvaluatedQuiz {
    pub fn logged_in_at(&self) -> Option<DateTime<Utc>> {
        time::parse_timestamp(&self.loggedin_at)
    }
}

/// Header block of a graded attempt, as returned by `getQuestionsForQuiz`
/// once the quiz has been evaluated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuizSummary {
    pub student_name: String,
    pub student_adm_number: String,
    pub master_course_code: String,
    pub dept: String,
    pub section: String,
    pub start_end_time: String,
    pub ended_by_student: u8,
    pub total_marks: f64,
    pub marks_obtained: f64,
    pub correct: u32,
    pub incorrect: u32,
    pub not_attempted: u32,
    #[serde(deserialize_with = "time::deserialize_lenient")]
    pub login_time: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "time::deserialize_lenient")]
    pub end_time: Option<DateTime<Utc>>,
}

impl QuizSummary {
    /// Whole minutes between login and the end of the attempt.
    pub fn duration_minutes(&self) -> Option<i64> {
        Some((self.end_time? - self.login_time?).num_minutes())
    }

    pub fn score_percent(&self) -> Option<f64> {
        (self.total_marks > 0.0).then(|| self.marks_obtained * 100.0 / self.total_marks)
    }
}

/// Grading of one question.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionResult {
    #[serde(default)]
    pub correct: u8,
    pub correct_answer: usize,
    #[serde(default)]
    pub marks_obtained: f64,
    #[serde(default)]
    pub submitted_answer: Option<SubmittedAnswerPayload>,
}

impl QuestionResult {
    pub fn is_correct(&self) -> bool {
        self.correct != 0
    }

    pub fn submitted_choice(&self) -> Option<usize> {
        self.submitted_answer.as_ref().map(|s| s.answer)
    }
}

/// Raw body of `getQuestionsForQuiz` for an evaluated quiz.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewPayload {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub summary: Option<QuizSummary>,
    /// Keyed by question id; JSON object keys arrive as strings.
    #[serde(default)]
    pub result: BTreeMap<QuestionId, QuestionResult>,
    #[serde(default = "no_payload")]
    pub response: Option<Payload<Vec<QuestionPayload>>>,
}

/// A graded attempt: summary, questions and the per-question outcome.
#[derive(Debug, Clone)]
pub struct QuizReview {
    pub summary: QuizSummary,
    pub questions: Vec<Question>,
    pub results: BTreeMap<QuestionId, QuestionResult>,
}

impl QuizReview {
    pub fn result_for(&self, id: QuestionId) -> Option<&QuestionResult> {
        self.results.get(&id)
    }
}

impl ReviewPayload {
    /// `None` when the body carries no summary, i.e. the quiz is not graded
    /// or the code was rejected.
    pub fn into_review(self) -> Option<QuizReview> {
        let summary = self.summary?;
        let questions = self
            .response
            .and_then(|r| r.data)
            .unwrap_or_default()
            .into_iter()
            .map(Question::from)
            .collect();

        Some(QuizReview {
            summary,
            questions,
            results: self.result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_prefers_top_level_data() {
        let env: Envelope = serde_json::from_str(r#"{"data": 1, "response": {"data": 2}}"#).unwrap();
        assert_eq!(env.into_data(), Some(serde_json::json!(1)));

        let env: Envelope = serde_json::from_str(r#"{"msg": "", "response": {"data": 2}}"#).unwrap();
        assert_eq!(env.message(), None);
        assert_eq!(env.into_data(), Some(serde_json::json!(2)));
    }

    #[test]
    fn test_quiz_details_flattens_window() {
        let json = r#"{
            "id": 77,
            "unique_code": "QZ123",
            "cdata": {"course_name": "Operating Systems", "instructions": null},
            "duration": 20,
            "login_time": "2025-03-01T10:00:00Z",
            "start_time": "2025-03-01T10:05:00Z",
            "end_time": "2025-03-01T10:25:00Z"
        }"#;
        let details: QuizDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.cdata.course_name.as_deref(), Some("Operating Systems"));
        assert_eq!(details.window.end_time.to_rfc3339(), "2025-03-01T10:25:00+00:00");
    }

    #[test]
    fn test_question_payload_keeps_prior_answer() {
        let json = r#"{
            "id": 5, "question": "2 + 2?", "options": ["3", "4"], "type": "mcq",
            "submitted_answer": {"answer": 1, "answered_on": 1740823200000}
        }"#;
        let question: Question = serde_json::from_str::<QuestionPayload>(json).unwrap().into();
        let answer = question.submitted_answer.unwrap();
        assert_eq!(answer.choice_index, 1);
        assert_eq!(answer.answered_at.timestamp(), 1_740_823_200);
    }

    #[test]
    fn test_review_payload_pairs_results_with_questions() {
        let json = r#"{
            "msg": "",
            "time_now": 1740823200000,
            "summary": {
                "student_name": "Asha", "master_course_code": "KCS501",
                "total_marks": 2, "marks_obtained": 1, "correct": 1, "incorrect": 1, "not_attempted": 0,
                "login_time": "2025-03-01T10:00:00Z", "end_time": "2025-03-01T10:18:40Z"
            },
            "result": {
                "11": {"correct": 1, "correct_answer": 2, "marks_obtained": 1,
                       "submitted_answer": {"answer": 2, "answered_on": 1740823300000}},
                "12": {"correct": 0, "correct_answer": 0, "marks_obtained": 0,
                       "submitted_answer": {"answer": 1, "answered_on": 1740823400000}}
            },
            "response": {"data": [
                {"id": 11, "question": "Which is not a scheduling policy?", "options": ["FCFS", "SJF", "LRU"]},
                {"id": 12, "question": "Page size is usually", "options": ["4 KB", "4 MB"]}
            ]}
        }"#;
        let review = serde_json::from_str::<ReviewPayload>(json).unwrap().into_review().unwrap();

        assert_eq!(review.questions.len(), 2);
        assert_eq!(review.summary.duration_minutes(), Some(18));
        assert_eq!(review.summary.score_percent(), Some(50.0));

        let first = review.result_for(11).unwrap();
        assert!(first.is_correct());
        assert_eq!(first.correct_answer, 2);
        let second = review.result_for(12).unwrap();
        assert!(!second.is_correct());
        assert_eq!(second.submitted_choice(), Some(1));
    }

    #[test]
    fn test_review_payload_without_summary() {
        let payload: ReviewPayload = serde_json::from_str(r#"{"msg": "Invalid Quiz ID"}"#).unwrap();
        assert!(payload.into_review().is_none());
    }
}
