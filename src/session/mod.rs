//! Timed quiz session: state machine, countdowns, polling and answer
//! submission.

mod answers;
mod clock;
mod controller;
mod countdown;
mod driver;

#[cfg(test)]
pub(crate) mod testing;

pub use answers::AnswerBook;
pub use clock::{Clock, SystemClock};
pub use controller::{
    Notice, NoticeKind, Phase, QuizStatus, Session, SessionController, SessionSnapshot,
};
pub use countdown::Countdown;
pub use driver::{Command, SessionHandle};
