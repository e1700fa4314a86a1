use std::fmt;

use chrono::{DateTime, Utc};

/// Whole minutes and seconds left until a target instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    pub minutes: u64,
    pub seconds: u64,
}

impl Countdown {
    /// `max(0, target - now)`, truncated to whole seconds.
    pub fn between(now: DateTime<Utc>, target: DateTime<Utc>) -> Self {
        let total = (target - now).num_seconds().max(0) as u64;
        Self {
            minutes: total / 60,
            seconds: total % 60,
        }
    }

    pub fn total_seconds(&self) -> u64 {
        self.minutes * 60 + self.seconds
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes, self.seconds)
    }
}
