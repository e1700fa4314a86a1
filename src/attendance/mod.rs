//! Attendance target planning and the local summary cache.

mod cache;
mod calculator;

pub use cache::AttendanceCache;
pub use calculator::{AttendanceBand, CalcError, TargetOutcome, plan};
