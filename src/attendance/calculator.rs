//! Target attendance arithmetic.
//!
//! With `p` lectures attended out of `t` and a target fraction `r`:
//! lectures that can still be missed are `floor(p / r - t)`, and lectures
//! still needed are `ceil((r * t - p) / (1 - r))`. The comparisons below are
//! done on percentages scaled by 100 so integer inputs stay exact.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOutcome {
    /// Already at or above target; this many lectures may be skipped.
    CanMiss(u32),
    /// Below target; this many consecutive lectures must be attended.
    Required(u32),
    /// No number of lectures reaches the target (target 100% with a miss).
    Unachievable,
}

impl fmt::Display for TargetOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetOutcome::CanMiss(0) => write!(f, "On target; no lectures to spare"),
            TargetOutcome::CanMiss(n) => write!(f, "You can miss {n} more lecture(s)"),
            TargetOutcome::Required(n) => write!(f, "Attend the next {n} lecture(s)"),
            TargetOutcome::Unachievable => write!(f, "Unachievable"),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CalcError {
    #[error("target must be in (0, 100], got {0}")]
    InvalidTarget(f64),
    #[error("present ({present}) exceeds total ({total})")]
    PresentExceedsTotal { present: u32, total: u32 },
}

pub fn plan(present: u32, total: u32, target_percent: f64) -> Result<TargetOutcome, CalcError> {
    if !target_percent.is_finite() || target_percent <= 0.0 || target_percent > 100.0 {
        return Err(CalcError::InvalidTarget(target_percent));
    }
    if present > total {
        return Err(CalcError::PresentExceedsTotal { present, total });
    }

    let p = f64::from(present);
    let t = f64::from(total);

    if p * 100.0 >= target_percent * t {
        let spare = (p * 100.0 / target_percent - t).floor();
        return Ok(if spare.is_finite() {
            TargetOutcome::CanMiss(spare.max(0.0) as u32)
        } else {
            TargetOutcome::Unachievable
        });
    }

    let needed = ((target_percent * t - p * 100.0) / (100.0 - target_percent)).ceil();
    if needed.is_finite() && needed <= f64::from(u32::MAX) {
        Ok(TargetOutcome::Required(needed.max(0.0) as u32))
    } else {
        Ok(TargetOutcome::Unachievable)
    }
}

/// Colour band used when showing a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceBand {
    Good,
    Warning,
    Low,
}

impl AttendanceBand {
    pub fn of(percent: f64) -> Self {
        if percent >= 85.0 {
            AttendanceBand::Good
        } else if percent >= 75.0 {
            AttendanceBand::Warning
        } else {
            AttendanceBand::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exactly_on_target_can_miss_zero() {
        assert_eq!(plan(60, 80, 75.0), Ok(TargetOutcome::CanMiss(0)));
    }

    #[test]
    fn test_above_target() {
        // 90 / 0.75 - 100 = 20
        assert_eq!(plan(90, 100, 75.0), Ok(TargetOutcome::CanMiss(20)));
        // 45 / 0.75 - 58 = 2
        assert_eq!(plan(45, 58, 75.0), Ok(TargetOutcome::CanMiss(2)));
    }

    #[test]
    fn test_below_target() {
        // (0.75 * 80 - 50) / 0.25 = 40
        assert_eq!(plan(50, 80, 75.0), Ok(TargetOutcome::Required(40)));
        // (0.75 * 10 - 7) / 0.25 = 2
        assert_eq!(plan(7, 10, 75.0), Ok(TargetOutcome::Required(2)));
    }

    #[test]
    fn test_non_integer_fraction_stays_exact() {
        assert_eq!(plan(7, 10, 70.0), Ok(TargetOutcome::CanMiss(0)));
    }

    #[test]
    fn test_full_target_with_a_miss_is_unachievable() {
        assert_eq!(plan(79, 80, 100.0), Ok(TargetOutcome::Unachievable));
        assert_eq!(plan(80, 80, 100.0), Ok(TargetOutcome::CanMiss(0)));
    }

    #[test]
    fn test_no_lectures_yet() {
        assert_eq!(plan(0, 0, 75.0), Ok(TargetOutcome::CanMiss(0)));
        assert_eq!(plan(0, 0, 100.0), Ok(TargetOutcome::CanMiss(0)));
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(plan(1, 2, 0.0), Err(CalcError::InvalidTarget(0.0)));
        assert_eq!(plan(1, 2, 100.5), Err(CalcError::InvalidTarget(100.5)));
        assert!(matches!(plan(1, 2, f64::NAN), Err(CalcError::InvalidTarget(_))));
        assert_eq!(
            plan(3, 2, 75.0),
            Err(CalcError::PresentExceedsTotal { present: 3, total: 2 })
        );
    }

    #[test]
    fn test_band() {
        assert_eq!(AttendanceBand::of(90.0), AttendanceBand::Good);
        assert_eq!(AttendanceBand::of(75.0), AttendanceBand::Warning);
        assert_eq!(AttendanceBand::of(74.9), AttendanceBand::Low);
    }
}
