//! Quiz-delivery backend.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::auth::QuizCredentials;
use crate::error::{PortalError, Result};
use crate::models::quiz::{
    AnswerRequest, Envelope, QuestionPayload, QuizDetails, QuizRequest, QuizReview, QuizWindow, ReviewPayload,
};
use crate::models::time::parse_timestamp;
use crate::models::{Question, QuestionId};

use super::status::{ServerStatus, classify};

const FETCH_DETAILS: &str = "fetchQuizDetails";
const GET_QUESTIONS: &str = "getQuestionsForQuiz";
const SUBMIT_ANSWER: &str = "submitAnswer";
const SUBMIT_AND_EXIT: &str = "submitAndExitQuiz";

/// Result of asking for the quiz window.
#[derive(Debug, Clone)]
pub enum WindowInfo {
    /// The login window has not opened; only the boundaries are known.
    NotStarted { window: QuizWindow, message: String },
    /// Full quiz details. The login window may or may not be open.
    Details(QuizDetails),
}

/// Questions plus the timing the server attached to them.
#[derive(Debug, Clone, Default)]
pub struct QuestionBatch {
    pub questions: Vec<Question>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub server_now: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

/// Result of asking for the question set.
#[derive(Debug, Clone)]
pub enum QuestionSet {
    Available(QuestionBatch),
    NotStarted(QuizWindow),
}

/// The four calls a quiz session makes.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    async fn window_info(&self, quiz_code: &str) -> Result<WindowInfo>;

    async fn questions(&self, quiz_code: &str) -> Result<QuestionSet>;

    async fn submit_answer(&self, quiz_code: &str, question_id: QuestionId, choice: usize) -> Result<()>;

    /// Submit-and-exit. Terminal for the session.
    async fn finalize(&self, quiz_code: &str) -> Result<()>;
}

#[async_trait]
impl<T: QuizBackend + ?Sized> QuizBackend for Arc<T> {
    async fn window_info(&self, quiz_code: &str) -> Result<WindowInfo> {
        (**self).window_info(quiz_code).await
    }

    async fn questions(&self, quiz_code: &str) -> Result<QuestionSet> {
        (**self).questions(quiz_code).await
    }

    async fn submit_answer(&self, quiz_code: &str, question_id: QuestionId, choice: usize) -> Result<()> {
        (**self).submit_answer(quiz_code, question_id, choice).await
    }

    async fn finalize(&self, quiz_code: &str) -> Result<()> {
        (**self).finalize(quiz_code).await
    }
}

/// [`QuizBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpQuizBackend {
    http: reqwest::Client,
    base: Url,
    credentials: QuizCredentials,
}

impl HttpQuizBackend {
    pub fn new(http: reqwest::Client, base: Url, credentials: QuizCredentials) -> Self {
        Self { http, base, credentials }
    }

    fn request<'a>(&'a self, quiz_code: &'a str) -> QuizRequest<'a> {
        QuizRequest {
            pin: &self.credentials.pin,
            quiz_uc: quiz_code,
            user_unique_code: &self.credentials.username,
        }
    }

    /// Graded attempt of an evaluated quiz: summary, questions and the
    /// correct option of each.
    #[instrument(skip(self))]
    pub async fn review(&self, quiz_code: &str) -> Result<QuizReview> {
        let (status, text) = self.send(GET_QUESTIONS, &self.request(quiz_code)).await?;
        let payload: ReviewPayload = match serde_json::from_str(&text) {
            Ok(payload) => payload,
            Err(_) if !(200..300).contains(&status) => {
                return Err(PortalError::Server("Failed to load quiz details".to_string()));
            }
            Err(e) => return Err(PortalError::UnexpectedResponse(format!("{GET_QUESTIONS}: {e}"))),
        };

        let message = payload.msg.clone().filter(|m| !m.is_empty());
        if let Some(review) = payload.into_review() {
            debug!(questions = review.questions.len(), "loaded quiz review");
            return Ok(review);
        }

        match classify(status, message.as_deref()) {
            ServerStatus::InvalidCode => Err(PortalError::InvalidCode(message.unwrap_or_default())),
            _ => Err(server_error(message, "Quiz has not been evaluated yet")),
        }
    }

    /// Posts `body` and returns the status and raw body text.
    async fn send<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<(u16, String)> {
        let url = self.base.join(endpoint)?;
        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        debug!(endpoint, status, bytes = text.len(), "quiz backend responded");
        Ok((status, text))
    }

    async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<(u16, Envelope)> {
        let (status, text) = self.send(endpoint, body).await?;
        let envelope: Envelope = serde_json::from_str(&text)
            .map_err(|e| PortalError::UnexpectedResponse(format!("{endpoint}: {e}")))?;

        debug!(endpoint, msg = ?envelope.msg, "decoded quiz envelope");
        Ok((status, envelope))
    }
}

#[async_trait]
impl QuizBackend for HttpQuizBackend {
    #[instrument(skip(self))]
    async fn window_info(&self, quiz_code: &str) -> Result<WindowInfo> {
        let (status, envelope) = self.post(FETCH_DETAILS, &self.request(quiz_code)).await?;
        let message = envelope.message().map(str::to_string);

        match classify(status, message.as_deref()) {
            ServerStatus::InvalidCode => Err(PortalError::InvalidCode(message.unwrap_or_default())),
            ServerStatus::WindowExpired => Err(PortalError::WindowExpired),
            ServerStatus::QuizOver => Err(PortalError::QuizOver),
            ServerStatus::NotStarted => Ok(WindowInfo::NotStarted {
                window: payload(FETCH_DETAILS, envelope)?,
                message: message.unwrap_or_default(),
            }),
            ServerStatus::AnswerRecorded | ServerStatus::Unrecognized => {
                match envelope.into_data() {
                    Some(data) => Ok(WindowInfo::Details(decode(FETCH_DETAILS, data)?)),
                    None => Err(server_error(message, "Failed to fetch quiz details")),
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn questions(&self, quiz_code: &str) -> Result<QuestionSet> {
        let (status, envelope) = self.post(GET_QUESTIONS, &self.request(quiz_code)).await?;
        let message = envelope.message().map(str::to_string);

        match classify(status, message.as_deref()) {
            ServerStatus::InvalidCode => Err(PortalError::InvalidCode(message.unwrap_or_default())),
            ServerStatus::WindowExpired => Err(PortalError::WindowExpired),
            ServerStatus::QuizOver => Err(PortalError::QuizOver),
            ServerStatus::NotStarted => Ok(QuestionSet::NotStarted(payload(GET_QUESTIONS, envelope)?)),
            ServerStatus::AnswerRecorded | ServerStatus::Unrecognized => {
                let start_time = envelope.start_time.as_deref().and_then(parse_timestamp);
                let end_time = envelope.end_time.as_deref().and_then(parse_timestamp);
                let server_now = envelope.time_now.as_deref().and_then(parse_timestamp);

                let Some(data) = envelope.into_data() else {
                    return Err(server_error(message, "Failed to fetch questions"));
                };
                let questions: Vec<QuestionPayload> = decode(GET_QUESTIONS, data)?;

                Ok(QuestionSet::Available(QuestionBatch {
                    questions: questions.into_iter().map(Question::from).collect(),
                    start_time,
                    end_time,
                    server_now,
                    message,
                }))
            }
        }
    }

    #[instrument(skip(self))]
    async fn submit_answer(&self, quiz_code: &str, question_id: QuestionId, choice: usize) -> Result<()> {
        let body = AnswerRequest {
            quiz_uc: quiz_code,
            question_id,
            user_unique_code: &self.credentials.username,
            answer: choice,
            pin: &self.credentials.pin,
        };
        let (status, envelope) = self.post(SUBMIT_ANSWER, &body).await?;
        let message = envelope.message().map(str::to_string);

        match classify(status, message.as_deref()) {
            ServerStatus::AnswerRecorded => Ok(()),
            ServerStatus::QuizOver => Err(PortalError::QuizOver),
            _ => Err(server_error(message, "Failed to submit answer")),
        }
    }

    #[instrument(skip(self))]
    async fn finalize(&self, quiz_code: &str) -> Result<()> {
        let (status, text) = self.send(SUBMIT_AND_EXIT, &self.request(quiz_code)).await?;
        if (200..300).contains(&status) {
            return Ok(());
        }

        // Error bodies are not always JSON.
        let message = serde_json::from_str::<Envelope>(&text)
            .ok()
            .and_then(|envelope| envelope.message().map(str::to_string));
        match classify(status, message.as_deref()) {
            ServerStatus::QuizOver => Err(PortalError::QuizOver),
            _ => Err(server_error(message, "Failed to submit quiz")),
        }
    }
}

fn payload<T: DeserializeOwned>(endpoint: &str, envelope: Envelope) -> Result<T> {
    let data = envelope
        .into_data()
        .ok_or_else(|| PortalError::UnexpectedResponse(format!("{endpoint}: missing data")))?;
    decode(endpoint, data)
}

fn decode<T: DeserializeOwned>(endpoint: &str, data: serde_json::Value) -> Result<T> {
    serde_json::from_value(data).map_err(|e| PortalError::UnexpectedResponse(format!("{endpoint}: {e}")))
}

fn server_error(message: Option<String>, fallback: &str) -> PortalError {
    PortalError::Server(message.unwrap_or_else(|| fallback.to_string()))
}
