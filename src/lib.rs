//! # student-portal
//!
//! Terminal companion for the college student portal.
//!
//! The centre of the crate is the timed quiz session in [`session`]: a
//! state machine that waits for the quiz window, loads the questions, keeps
//! them in sync with the server while the quiz runs and submits the attempt
//! when time is up. Around it sit the attendance target calculator, the
//! timetable and evaluated-quiz views and the HTTP clients for the backing
//! services.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use student_portal::{Config, PortalClient, SessionController, SessionHandle, SystemClock};
//!
//! # async fn demo() -> student_portal::Result<()> {
//! let config = Config::from_env()?;
//! let portal = PortalClient::new(&config)?;
//! let auth = portal.login("student", "secret").await?;
//!
//! let controller = SessionController::new(portal.quiz_backend(&auth), config.poll_interval);
//! let handle = SessionHandle::spawn(controller, SystemClock);
//! student_portal::client::run(handle, Some("QZ1234".to_string())).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod attendance;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod quizzes;
pub mod report;
pub mod session;
pub mod terminal;
pub mod timetable;

pub use api::{HttpQuizBackend, PortalClient, QuizBackend};
pub use attendance::{AttendanceCache, CalcError, TargetOutcome, plan};
pub use auth::AuthContext;
pub use config::Config;
pub use error::{PortalError, Result};
pub use session::{Command, QuizStatus, SessionController, SessionHandle, SessionSnapshot, SystemClock};
