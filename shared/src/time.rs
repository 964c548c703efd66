//! Time domain for boot timelines
//!
//! Monotonic timestamps are microseconds since kernel start. Raw collector
//! values use zero for "this transition never occurred"; `TimeUs::from_raw`
//! is the single place that sentinel is interpreted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

use crate::time_format::format_elapsed;

// Time conversion constants
pub const US_PER_SECOND: f64 = 1_000_000.0;
pub const US_PER_MILLISECOND: f64 = 1_000.0;

/// A point on the monotonic clock, in microseconds since kernel start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeUs(pub u64);

impl TimeUs {
    pub const ZERO: TimeUs = TimeUs(0);

    /// Interpret a raw collector value. Zero means the transition never happened.
    pub fn from_raw(raw: u64) -> Option<TimeUs> {
        (raw != 0).then_some(TimeUs(raw))
    }

    pub fn micros(self) -> u64 {
        self.0
    }

    /// Signed offset from the kernel origin, as used by timeline events.
    pub fn offset(self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }

    /// Elapsed time since `earlier`, or `None` if `earlier` is actually later.
    pub fn duration_since(self, earlier: TimeUs) -> Option<DurationUs> {
        self.0.checked_sub(earlier.0).map(DurationUs)
    }
}

impl fmt::Display for TimeUs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_elapsed(self.0 as f64))
    }
}

/// A non-negative length of time in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DurationUs(pub u64);

impl DurationUs {
    pub const ZERO: DurationUs = DurationUs(0);

    pub fn micros(self) -> u64 {
        self.0
    }

    pub fn as_offset(self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }
}

impl fmt::Display for DurationUs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_elapsed(self.0 as f64))
    }
}

impl Add for DurationUs {
    type Output = DurationUs;

    fn add(self, rhs: DurationUs) -> DurationUs {
        DurationUs(self.0.saturating_add(rhs.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_the_absent_sentinel() {
        assert_eq!(TimeUs::from_raw(0), None);
        assert_eq!(TimeUs::from_raw(1), Some(TimeUs(1)));
    }

    #[test]
    fn duration_never_goes_negative() {
        assert_eq!(TimeUs(300).duration_since(TimeUs(100)), Some(DurationUs(200)));
        assert_eq!(TimeUs(100).duration_since(TimeUs(100)), Some(DurationUs::ZERO));
        assert_eq!(TimeUs(100).duration_since(TimeUs(300)), None);
    }

    #[test]
    fn displays_with_elapsed_units() {
        assert_eq!(TimeUs(1_500).to_string(), "1.5ms");
        assert_eq!(DurationUs(2_000_000).to_string(), "2s");
    }
}
