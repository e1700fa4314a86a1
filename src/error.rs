//! Error types shared by the API clients, the quiz session and the CLI.

use std::io;

use thiserror::Error;

use crate::attendance::CalcError;

/// Everything that can go wrong while talking to the portal backends.
#[derive(Error, Debug)]
pub enum PortalError {
    /// The request never produced a usable HTTP response.
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The quiz backend rejected the quiz code.
    #[error("invalid quiz code: {0}")]
    InvalidCode(String),

    /// The login window for the quiz has closed.
    #[error("login window has expired")]
    WindowExpired,

    /// The quiz is over; nothing can be submitted any more.
    #[error("this quiz has already ended")]
    QuizOver,

    /// The server answered with a message we have no specific handling for.
    #[error("{0}")]
    Server(String),

    /// The server answered, but not with anything we can read.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The caller needs a logged-in context and there is none.
    #[error("not logged in")]
    NotAuthenticated,

    #[error("cache error: {0}")]
    Cache(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Calc(#[from] CalcError),
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::UnexpectedResponse(err.to_string())
    }
}

impl From<url::ParseError> for PortalError {
    fn from(err: url::ParseError) -> Self {
        PortalError::Config(err.to_string())
    }
}

impl PortalError {
    /// Message shown to the student when a flow halts on this error.
    pub fn user_message(&self) -> String {
        match self {
            PortalError::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            PortalError::InvalidCode(msg) if msg.is_empty() => "Invalid Quiz ID".to_string(),
            PortalError::InvalidCode(msg) => msg.clone(),
            PortalError::UnexpectedResponse(_) => "The server sent a response we could not read.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_for_invalid_code() {
        assert_eq!(PortalError::InvalidCode(String::new()).user_message(), "Invalid Quiz ID");
        assert_eq!(
            PortalError::InvalidCode("Quiz not found".to_string()).user_message(),
            "Quiz not found"
        );
    }

    #[test]
    fn test_user_message_passes_server_text_through() {
        let err = PortalError::Server("Answer window closed".to_string());
        assert_eq!(err.user_message(), "Answer window closed");
        assert_eq!(PortalError::WindowExpired.user_message(), "login window has expired");
    }

    #[test]
    fn test_json_error_is_unexpected_response() {
        let err: PortalError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, PortalError::UnexpectedResponse(_)));
    }
}
