//! Wall-clock time arithmetic.
//!
//! Times are tenant-local wall-clock values with no date or timezone
//! component, compared as minutes since midnight. Everything here is a pure
//! function over immutable values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Minutes in a day; `TimeOfDay` values are strictly below this.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A time within a single day, stored as minutes since midnight (0-1439).
///
/// Serializes as an `"HH:MM"` string. Parsing also tolerates a trailing
/// seconds component (`"HH:MM:SS"`), which time-typed database columns
/// commonly produce; seconds are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Build from an hour (0-23) and minute (0-59).
    pub fn from_hm(hour: u8, minute: u8) -> Result<Self, ScheduleError> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::InvalidTimeFormat(format!(
                "{hour:02}:{minute:02}"
            )));
        }
        Ok(Self(u16::from(hour) * 60 + u16::from(minute)))
    }

    /// Build from a raw minute count (0-1439).
    pub fn from_minutes(minutes: u16) -> Result<Self, ScheduleError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(ScheduleError::InvalidTimeFormat(format!(
                "{minutes} minutes"
            )));
        }
        Ok(Self(minutes))
    }

    /// Crate-internal constructor for known-good literals.
    pub(crate) const fn from_minutes_unchecked(minutes: u16) -> Self {
        Self(minutes)
    }

    /// Parse an `"HH:MM"` (or `"HH:MM:SS"`) string.
    pub fn parse(s: &str) -> Result<Self, ScheduleError> {
        let invalid = || ScheduleError::InvalidTimeFormat(s.to_string());

        let mut parts = s.split(':');
        let hour_str = parts.next().ok_or_else(invalid)?;
        let minute_str = parts.next().ok_or_else(invalid)?;
        // Optional seconds component is accepted and ignored.
        if let Some(secs) = parts.next() {
            if parts.next().is_some() || secs.parse::<u8>().map_or(true, |v| v > 59) {
                return Err(invalid());
            }
        }

        let hour: u8 = hour_str.parse().map_err(|_| invalid())?;
        let minute: u8 = minute_str.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Signed distance in minutes from `self` to `other`.
    ///
    /// Negative when `other` is earlier than `self`; ordering is the
    /// caller's responsibility to check.
    pub fn minutes_until(self, other: TimeOfDay) -> i32 {
        i32::from(other.0) - i32::from(self.0)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ScheduleError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

/// A `[start, end]` interval within a day.
///
/// Carries no validity guarantee of its own; `start < end` is enforced
/// where spans become part of a schedule structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeSpan {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// Signed duration in minutes; negative if the span is inverted.
    pub fn duration_minutes(self) -> i32 {
        self.start.minutes_until(self.end)
    }

    /// True iff `inner` lies fully within `self` (boundaries may touch).
    pub fn contains(self, inner: TimeSpan) -> bool {
        inner.start >= self.start && inner.end <= self.end
    }

    /// True iff the two spans share any interior point.
    ///
    /// Spans that merely touch at a boundary do not overlap.
    pub fn overlaps(self, other: TimeSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    #[test]
    fn parses_valid_times() {
        assert_eq!(t("00:00").minutes(), 0);
        assert_eq!(t("07:00").minutes(), 420);
        assert_eq!(t("23:59").minutes(), 1439);
    }

    #[test]
    fn tolerates_seconds_suffix() {
        assert_eq!(t("07:00:00"), t("07:00"));
        assert_eq!(t("14:30:59"), t("14:30"));
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["24:00", "12:60", "7", "", "ab:cd", "12:30:61", "12:30:00:00", "-1:00"] {
            assert!(
                matches!(TimeOfDay::parse(bad), Err(ScheduleError::InvalidTimeFormat(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn ordering_follows_the_clock() {
        assert!(t("07:00") < t("14:00"));
        assert!(t("10:30") > t("10:00"));
    }

    #[test]
    fn minutes_until_may_be_negative() {
        assert_eq!(t("07:00").minutes_until(t("14:00")), 420);
        assert_eq!(t("14:00").minutes_until(t("07:00")), -420);
        assert_eq!(t("09:15").minutes_until(t("09:15")), 0);
    }

    #[test]
    fn display_round_trips() {
        for s in ["00:00", "07:05", "23:59"] {
            assert_eq!(t(s).to_string(), s);
        }
    }

    #[test]
    fn span_containment() {
        let day = TimeSpan::new(t("07:00"), t("14:00"));
        assert!(day.contains(TimeSpan::new(t("10:00"), t("10:30"))));
        assert!(day.contains(TimeSpan::new(t("07:00"), t("14:00"))));
        assert!(!day.contains(TimeSpan::new(t("06:30"), t("07:30"))));
        assert!(!day.contains(TimeSpan::new(t("13:30"), t("14:30"))));
    }

    #[test]
    fn span_overlap_is_exclusive_at_boundaries() {
        let a = TimeSpan::new(t("10:00"), t("10:30"));
        assert!(a.overlaps(TimeSpan::new(t("10:15"), t("11:00"))));
        assert!(a.overlaps(TimeSpan::new(t("09:00"), t("10:01"))));
        // Touching spans do not overlap.
        assert!(!a.overlaps(TimeSpan::new(t("10:30"), t("11:00"))));
        assert!(!a.overlaps(TimeSpan::new(t("09:00"), t("10:00"))));
    }
}
