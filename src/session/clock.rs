use chrono::{DateTime, Utc};

/// Source of "now" for the session driver.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The client's wall clock. Window boundaries from the server are compared
/// against this directly; no skew correction is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
