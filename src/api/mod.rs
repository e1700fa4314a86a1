//! HTTP clients for the ERP platform, the login/timetable service and the
//! quiz backend.

mod portal;
pub mod quiz;
pub mod status;

pub use portal::{PortalClient, validate_pin};
pub use quiz::{HttpQuizBackend, QuestionBatch, QuestionSet, QuizBackend, WindowInfo};
pub use status::{ServerStatus, classify};
