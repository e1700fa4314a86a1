//! Translation of backend status messages.
//!
//! The quiz backend reports state through free-text `msg` fields and a few
//! HTTP status codes. This is the only place that inspects that text; the
//! rest of the crate works with [`ServerStatus`].

/// What a quiz backend response means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// The quiz code was rejected.
    InvalidCode,
    /// The login window closed before the student got in.
    WindowExpired,
    /// The quiz itself has ended.
    QuizOver,
    /// The login window or the quiz has not opened yet.
    NotStarted,
    /// An answer submission was accepted.
    AnswerRecorded,
    /// Nothing we recognise; callers fall back to the payload.
    Unrecognized,
}

const EXPIRED_MARKERS: [&str; 1] = ["login window has expired"];
const OVER_MARKERS: [&str; 1] = ["already over"];
const NOT_STARTED_MARKERS: [&str; 2] = ["login window is not started yet", "test is not started yet"];
const RECORDED_MARKERS: [&str; 1] = ["answer successfully recorded"];

/// Classifies a response by HTTP status and message.
///
/// Expired wins over not-started when a message mentions both.
pub fn classify(http_status: u16, msg: Option<&str>) -> ServerStatus {
    if matches!(http_status, 403 | 406) {
        return ServerStatus::InvalidCode;
    }

    let Some(msg) = msg else {
        return ServerStatus::Unrecognized;
    };
    let msg = msg.to_lowercase();
    let mentions = |markers: &[&str]| markers.iter().any(|m| msg.contains(m));

    if mentions(&EXPIRED_MARKERS) {
        ServerStatus::WindowExpired
    } else if mentions(&OVER_MARKERS) {
        ServerStatus::QuizOver
    } else if mentions(&NOT_STARTED_MARKERS) {
        ServerStatus::NotStarted
    } else if mentions(&RECORDED_MARKERS) {
        ServerStatus::AnswerRecorded
    } else {
        ServerStatus::Unrecognized
    }
}
