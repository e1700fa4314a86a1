//! Quiz session state machine.
//!
//! ```text
//! Idle --code--> Waiting --start_time & questions--> Active --end_time / finish--> Completed
//!                   |                                   |
//!                   +------------> Error <--------------+
//! ```
//!
//! Every transition issues at most one backend call. The controller never
//! reads the clock itself; callers pass `now` in, which keeps the driver in
//! charge of scheduling and makes the machine deterministic under test.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{QuestionBatch, QuestionSet, QuizBackend, WindowInfo};
use crate::error::{PortalError, Result};
use crate::models::{Question, QuestionId, QuizWindow, SubmittedAnswer};

use super::answers::AnswerBook;
use super::countdown::Countdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizStatus {
    #[default]
    Idle,
    Waiting,
    Active,
    Completed,
    Error,
}

impl QuizStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// What the current countdown is counting towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    LoginOpens,
    QuizStarts,
    QuizEnds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// Message for the student, replaced by the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, text: text.into() }
    }
}

/// One attempt at one quiz code.
#[derive(Debug, Clone)]
pub struct Session {
    /// Correlates log lines of one attempt.
    pub id: Uuid,
    pub quiz_code: String,
    pub window: Option<QuizWindow>,
    pub course_name: Option<String>,
    /// Last server clock reading; informational only.
    pub server_now: Option<DateTime<Utc>>,
}

impl Session {
    fn new(quiz_code: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            quiz_code: quiz_code.to_string(),
            window: None,
            course_name: None,
            server_now: None,
        }
    }
}

/// Everything the renderer needs, detached from the controller.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub status: QuizStatus,
    pub quiz_code: Option<String>,
    pub course_name: Option<String>,
    pub window: Option<QuizWindow>,
    pub countdown: Option<(Phase, Countdown)>,
    pub questions: Vec<Question>,
    pub answers: AnswerBook,
    pub notice: Option<Notice>,
}

pub struct SessionController<B> {
    backend: B,
    status: QuizStatus,
    session: Option<Session>,
    questions: Vec<Question>,
    answers: AnswerBook,
    notice: Option<Notice>,
    poll_interval: TimeDelta,
    next_poll_at: Option<DateTime<Utc>>,
}

impl<B: QuizBackend> SessionController<B> {
    pub fn new(backend: B, poll_interval: Duration) -> Self {
        Self {
            backend,
            status: QuizStatus::Idle,
            session: None,
            questions: Vec::new(),
            answers: AnswerBook::default(),
            notice: None,
            poll_interval: TimeDelta::from_std(poll_interval).unwrap_or(TimeDelta::seconds(30)),
            next_poll_at: None,
        }
    }

    pub fn status(&self) -> QuizStatus {
        self.status
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn window(&self) -> Option<&QuizWindow> {
        self.session.as_ref()?.window.as_ref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerBook {
        &self.answers
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn countdown(&self, now: DateTime<Utc>) -> Option<(Phase, Countdown)> {
        let window = self.window()?;
        match self.status {
            QuizStatus::Waiting if now < window.login_time => {
                Some((Phase::LoginOpens, Countdown::between(now, window.login_time)))
            }
            QuizStatus::Waiting => Some((Phase::QuizStarts, Countdown::between(now, window.start_time))),
            QuizStatus::Active => Some((Phase::QuizEnds, Countdown::between(now, window.end_time))),
            _ => None,
        }
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            quiz_code: self.session.as_ref().map(|s| s.quiz_code.clone()),
            course_name: self.session.as_ref().and_then(|s| s.course_name.clone()),
            window: self.window().cloned(),
            countdown: self.countdown(now),
            questions: self.questions.clone(),
            answers: self.answers.clone(),
            notice: self.notice.clone(),
        }
    }

    /// Drops the current session and returns to `Idle`.
    pub fn reset(&mut self) {
        if let Some(session) = &self.session {
            debug!(session = %session.id, "discarding quiz session");
        }
        self.status = QuizStatus::Idle;
        self.session = None;
        self.questions.clear();
        self.answers.clear();
        self.notice = None;
        self.next_poll_at = None;
    }

    /// Starts a new session for `code` and asks for its window.
    ///
    /// Re-entering the code of a session that is already waiting or active
    /// is ignored; any other code replaces the current session.
    pub async fn submit_code(&mut self, code: &str, now: DateTime<Utc>) {
        let code = code.trim();
        if code.is_empty() {
            self.notice = Some(Notice::error("Please enter a quiz code"));
            return;
        }

        if let Some(session) = &self.session {
            if session.quiz_code == code && matches!(self.status, QuizStatus::Waiting | QuizStatus::Active) {
                debug!(session = %session.id, "quiz code already in progress");
                return;
            }
        }

        self.reset();
        let session = Session::new(code);
        info!(session = %session.id, quiz = code, "quiz code submitted");
        self.session = Some(session);
        self.transition(QuizStatus::Waiting);
        self.load_window(now).await;
    }

    /// Advances the machine to `now`. Called once a second by the driver.
    pub async fn tick(&mut self, now: DateTime<Utc>) {
        match self.status {
            QuizStatus::Waiting => {
                if self.window().is_some_and(|w| now >= w.start_time) {
                    self.start_quiz(now).await;
                }
            }
            QuizStatus::Active => {
                if self.window().is_some_and(|w| now >= w.end_time) {
                    info!("quiz time is up, submitting");
                    self.finalize().await;
                } else if self.next_poll_at.is_some_and(|at| now >= at) {
                    self.poll(now).await;
                }
            }
            QuizStatus::Idle | QuizStatus::Completed | QuizStatus::Error => {}
        }
    }

    /// Sends one answer. Local state only changes once the server has
    /// recorded it.
    pub async fn submit_answer(&mut self, question_id: QuestionId, choice: usize, now: DateTime<Utc>) -> Result<()> {
        if self.status != QuizStatus::Active {
            return Err(PortalError::Validation("The quiz is not active".to_string()));
        }
        let Some(question) = self.questions.iter().find(|q| q.id == question_id) else {
            return Err(PortalError::Validation(format!("Unknown question {question_id}")));
        };
        if choice >= question.options.len() {
            return Err(PortalError::Validation(format!("Question {question_id} has no option {choice}")));
        }
        let Some(code) = self.quiz_code() else {
            return Err(PortalError::Validation("No quiz in progress".to_string()));
        };

        match self.backend.submit_answer(&code, question_id, choice).await {
            Ok(()) => {
                if self.answers.record(question_id, choice) {
                    debug!(question_id, choice, "answer recorded");
                }
                if let Some(question) = self.questions.iter_mut().find(|q| q.id == question_id) {
                    question.submitted_answer = Some(SubmittedAnswer {
                        choice_index: choice,
                        answered_at: now,
                    });
                }
                Ok(())
            }
            Err(err) => {
                warn!(%err, question_id, "answer not recorded");
                self.notice = Some(Notice::error(err.user_message()));
                Err(err)
            }
        }
    }

    /// Manual submit-and-exit.
    pub async fn finish(&mut self) {
        self.finalize().await;
    }

    async fn load_window(&mut self, now: DateTime<Utc>) {
        let Some(code) = self.quiz_code() else { return };

        match self.backend.window_info(&code).await {
            Ok(WindowInfo::NotStarted { window, message }) => {
                self.set_window(window);
                self.notice = Some(Notice::info(if message.is_empty() {
                    "Login window is not started yet.".to_string()
                } else {
                    message
                }));
            }
            Ok(WindowInfo::Details(details)) => {
                let login_time = details.window.login_time;
                if let Some(session) = self.session.as_mut() {
                    session.course_name = details.cdata.course_name.clone();
                }
                self.set_window(details.window);

                if now < login_time {
                    self.notice = Some(Notice::info(
                        "Quiz code accepted. The quiz opens automatically when it starts.",
                    ));
                } else {
                    self.start_quiz(now).await;
                }
            }
            Err(err) => self.fail(err),
        }
    }

    /// Waiting -> Active, if the server has questions for us.
    async fn start_quiz(&mut self, now: DateTime<Utc>) {
        let Some(code) = self.quiz_code() else { return };

        match self.backend.questions(&code).await {
            Ok(QuestionSet::Available(batch)) if !batch.questions.is_empty() => {
                info!(questions = batch.questions.len(), "quiz started");
                self.apply_batch(batch);
                self.transition(QuizStatus::Active);
                self.next_poll_at = Some(now + self.poll_interval);
                self.notice = None;
            }
            Ok(QuestionSet::Available(batch)) => {
                let message = batch
                    .message
                    .unwrap_or_else(|| "No questions are available for this quiz".to_string());
                self.fail(PortalError::Server(message));
            }
            Ok(QuestionSet::NotStarted(window)) => {
                debug!("quiz not started yet on the server, still waiting");
                self.set_window(window);
            }
            Err(err) => self.fail(err),
        }
    }

    async fn poll(&mut self, now: DateTime<Utc>) {
        self.next_poll_at = Some(now + self.poll_interval);
        let Some(code) = self.quiz_code() else { return };

        match self.backend.questions(&code).await {
            Ok(QuestionSet::Available(batch)) => {
                debug!(questions = batch.questions.len(), "refreshed questions");
                self.apply_batch(batch);
            }
            Ok(QuestionSet::NotStarted(_)) => {
                debug!("ignoring not-started report for an active quiz");
            }
            Err(PortalError::QuizOver) => {
                info!("server reports the quiz is over");
                self.finalize().await;
            }
            Err(err @ (PortalError::Network(_) | PortalError::UnexpectedResponse(_))) => self.fail(err),
            Err(err) => {
                warn!(%err, "question refresh rejected");
                self.notice = Some(Notice::error(err.user_message()));
            }
        }
    }

    /// Active -> Completed. A failure leaves the quiz active so the next
    /// tick past the end time tries again.
    async fn finalize(&mut self) {
        if self.status != QuizStatus::Active {
            return;
        }
        let Some(code) = self.quiz_code() else { return };

        match self.backend.finalize(&code).await {
            Ok(()) | Err(PortalError::QuizOver) => {
                self.transition(QuizStatus::Completed);
                self.next_poll_at = None;
                self.notice = Some(Notice::success("Quiz submitted successfully"));
            }
            Err(err) => {
                warn!(%err, "submit-and-exit failed");
                self.notice = Some(Notice::error(err.user_message()));
            }
        }
    }

    /// Replaces the question set; the server's view of answers wins.
    fn apply_batch(&mut self, batch: QuestionBatch) {
        self.questions = batch.questions;
        self.answers.rebuild_from(&self.questions);

        if let Some(session) = self.session.as_mut() {
            session.server_now = batch.server_now.or(session.server_now);
            if let Some(window) = session.window.as_mut() {
                if let Some(start) = batch.start_time {
                    window.start_time = start;
                }
                if let Some(end) = batch.end_time {
                    window.end_time = end;
                }
            }
        }
    }

    fn set_window(&mut self, window: QuizWindow) {
        if let Some(session) = self.session.as_mut() {
            session.window = Some(window);
        }
    }

    fn fail(&mut self, err: PortalError) {
        warn!(%err, "quiz session failed");
        self.transition(QuizStatus::Error);
        self.next_poll_at = None;
        self.notice = Some(Notice::error(err.user_message()));
    }

    fn transition(&mut self, next: QuizStatus) {
        if self.status == QuizStatus::Active && next == QuizStatus::Waiting {
            warn!("refusing to move an active quiz back to waiting");
            return;
        }
        if self.status != next {
            let session = self.session.as_ref().map(|s| s.id.to_string()).unwrap_or_default();
            info!(session, from = ?self.status, to = ?next, "quiz status changed");
        }
        self.status = next;
    }

    fn quiz_code(&self) -> Option<String> {
        self.session.as_ref().map(|s| s.quiz_code.clone())
    }
}
