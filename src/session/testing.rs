//! Scripted quiz backend for session tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::api::{QuestionBatch, QuestionSet, QuizBackend, WindowInfo};
use crate::error::{PortalError, Result};
use crate::models::quiz::{QuizCourse, QuizDetails};
use crate::models::{Question, QuestionId, QuizWindow};

const BASE: i64 = 1_740_823_200;

/// `BASE + secs` as a timestamp.
pub(crate) fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(BASE + secs, 0).unwrap()
}

pub(crate) fn window(login: i64, start: i64, end: i64) -> QuizWindow {
    QuizWindow {
        login_time: at(login),
        start_time: at(start),
        end_time: at(end),
    }
}

/// `n` unanswered questions with ids `1..=n` and four options each.
pub(crate) fn questions(n: u64) -> Vec<Question> {
    (1..=n)
        .map(|id| Question {
            id,
            text: format!("Question {id}"),
            options: ["A", "B", "C", "D"].iter().map(|o| o.to_string()).collect(),
            marks: Some(1.0),
            topic: None,
            submitted_answer: None,
        })
        .collect()
}

#[derive(Clone)]
pub(crate) enum FakeWindow {
    NotStarted(QuizWindow),
    Details(QuizWindow),
    Invalid,
    Expired,
}

#[derive(Clone)]
pub(crate) enum FakeQuestions {
    Available(Vec<Question>),
    /// Questions with a server-moved end time.
    Extended(Vec<Question>, DateTime<Utc>),
    NotStarted(QuizWindow),
    Over,
    Broken,
}

pub(crate) struct FakeBackend {
    window: Mutex<FakeWindow>,
    questions: Mutex<VecDeque<FakeQuestions>>,
    last_questions: Mutex<Option<FakeQuestions>>,
    answer_rejection: Mutex<Option<String>>,
    finalize_failures: Mutex<VecDeque<String>>,
    pub window_calls: AtomicUsize,
    pub question_calls: AtomicUsize,
    pub answer_calls: AtomicUsize,
    pub finalize_calls: AtomicUsize,
}

impl FakeBackend {
    pub(crate) fn with_window(window: FakeWindow) -> Self {
        Self {
            window: Mutex::new(window),
            questions: Mutex::new(VecDeque::new()),
            last_questions: Mutex::new(None),
            answer_rejection: Mutex::new(None),
            finalize_failures: Mutex::new(VecDeque::new()),
            window_calls: AtomicUsize::new(0),
            question_calls: AtomicUsize::new(0),
            answer_calls: AtomicUsize::new(0),
            finalize_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_window(&self, window: FakeWindow) {
        *self.window.lock().unwrap() = window;
    }

    /// Queues a question-set response. Once the queue is drained the last
    /// response is repeated.
    pub(crate) fn push_questions(&self, response: FakeQuestions) {
        self.questions.lock().unwrap().push_back(response);
    }

    pub(crate) fn reject_answers(&self, message: &str) {
        *self.answer_rejection.lock().unwrap() = Some(message.to_string());
    }

    pub(crate) fn fail_next_finalize(&self, message: &str) {
        self.finalize_failures.lock().unwrap().push_back(message.to_string());
    }

    fn next_questions(&self) -> FakeQuestions {
        let mut last = self.last_questions.lock().unwrap();
        if let Some(next) = self.questions.lock().unwrap().pop_front() {
            *last = Some(next.clone());
            return next;
        }
        last.clone().unwrap_or(FakeQuestions::Broken)
    }
}

#[async_trait]
impl QuizBackend for FakeBackend {
    async fn window_info(&self, _quiz_code: &str) -> Result<WindowInfo> {
        self.window_calls.fetch_add(1, Ordering::SeqCst);
        match self.window.lock().unwrap().clone() {
            FakeWindow::NotStarted(window) => Ok(WindowInfo::NotStarted {
                window,
                message: "Login Window is not started yet.".to_string(),
            }),
            FakeWindow::Details(window) => Ok(WindowInfo::Details(QuizDetails {
                id: Some(1),
                unique_code: Some("QZ1".to_string()),
                cdata: QuizCourse {
                    course_name: Some("Compiler Design".to_string()),
                    ..QuizCourse::default()
                },
                faculty_name: None,
                master_course_code: None,
                duration: None,
                questions_count: None,
                total_marks: None,
                window,
            })),
            FakeWindow::Invalid => Err(PortalError::InvalidCode(String::new())),
            FakeWindow::Expired => Err(PortalError::WindowExpired),
        }
    }

    async fn questions(&self, _quiz_code: &str) -> Result<QuestionSet> {
        self.question_calls.fetch_add(1, Ordering::SeqCst);
        match self.next_questions() {
            FakeQuestions::Available(questions) => Ok(QuestionSet::Available(QuestionBatch {
                questions,
                ..QuestionBatch::default()
            })),
            FakeQuestions::Extended(questions, end_time) => Ok(QuestionSet::Available(QuestionBatch {
                questions,
                end_time: Some(end_time),
                ..QuestionBatch::default()
            })),
            FakeQuestions::NotStarted(window) => Ok(QuestionSet::NotStarted(window)),
            FakeQuestions::Over => Err(PortalError::QuizOver),
            FakeQuestions::Broken => Err(PortalError::UnexpectedResponse("broken".to_string())),
        }
    }

    async fn submit_answer(&self, _quiz_code: &str, _question_id: QuestionId, _choice: usize) -> Result<()> {
        self.answer_calls.fetch_add(1, Ordering::SeqCst);
        match self.answer_rejection.lock().unwrap().clone() {
            Some(message) => Err(PortalError::Server(message)),
            None => Ok(()),
        }
    }

    async fn finalize(&self, _quiz_code: &str) -> Result<()> {
        self.finalize_calls.fetch_add(1, Ordering::SeqCst);
        match self.finalize_failures.lock().unwrap().pop_front() {
            Some(message) => Err(PortalError::Server(message)),
            None => Ok(()),
        }
    }
}
