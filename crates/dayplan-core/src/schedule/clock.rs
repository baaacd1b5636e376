//! Conversion between `HH:MM` clock text and minutes since midnight.
//!
//! [`Clock`] is the validated form used by [`Task`](super::Task): it can only
//! hold 00:00-23:59 and serializes as `HH:MM` text. The free functions
//! [`to_minutes`] and [`to_clock`] work on raw text for boundary code.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Last representable minute of the day (23:59).
pub const LAST_MINUTE: u32 = MINUTES_PER_DAY - 1;

/// Strict `HH:MM` check: two digits, a colon, two digits, within 00:00-23:59.
pub fn is_clock(text: &str) -> bool {
    parse_parts(text).is_some()
}

/// Parse `HH:MM` into minutes since midnight (0-1439).
///
/// # Errors
/// Returns [`ValidationError::InvalidClock`] when the text is not a valid
/// clock time.
pub fn to_minutes(text: &str) -> Result<u32, ValidationError> {
    parse_parts(text)
        .map(|(hour, minute)| hour * 60 + minute)
        .ok_or_else(|| ValidationError::InvalidClock(text.to_string()))
}

/// Format minutes since midnight as zero-padded `HH:MM`.
///
/// The caller keeps `minutes` within 0-1439; no wrapping is applied.
pub fn to_clock(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Round `minutes` to the nearest multiple of `grid`.
pub fn round_to_grid(minutes: i32, grid: i32) -> i32 {
    if grid <= 1 {
        return minutes;
    }
    ((minutes as f64 / grid as f64).round() as i32) * grid
}

fn parse_parts(text: &str) -> Option<(u32, u32)> {
    let bytes = text.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    let digit = |b: u8| b.is_ascii_digit().then(|| (b - b'0') as u32);
    let hour = digit(bytes[0])? * 10 + digit(bytes[1])?;
    let minute = digit(bytes[3])? * 10 + digit(bytes[4])?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

/// A wall-clock time of day with minute granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Clock(u32);

impl Clock {
    pub const MIDNIGHT: Clock = Clock(0);

    /// Build from minutes since midnight; `None` outside 0-1439.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes <= LAST_MINUTE).then_some(Self(minutes))
    }

    /// Build from a signed minute value, clamping into 00:00-23:59.
    pub fn clamped(minutes: i32) -> Self {
        Self(minutes.clamp(0, LAST_MINUTE as i32) as u32)
    }

    /// Shorthand for `HH:MM` literals known to be valid.
    pub fn hm(hour: u32, minute: u32) -> Self {
        Self::clamped((hour * 60 + minute) as i32)
    }

    pub fn minutes(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_clock(self.0))
    }
}

impl FromStr for Clock {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        to_minutes(s).map(Self)
    }
}

impl Serialize for Clock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_clock(self.0))
    }
}

impl<'de> Deserialize<'de> for Clock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_boundaries() {
        assert_eq!(to_minutes("00:00").unwrap(), 0);
        assert_eq!(to_minutes("07:00").unwrap(), 420);
        assert_eq!(to_minutes("23:59").unwrap(), LAST_MINUTE);
    }

    #[test]
    fn rejects_malformed_text() {
        for bad in ["7:00", "07:0", "24:00", "12:60", "ab:cd", "07-00", "", "07:00:00", " 7:00"] {
            assert!(!is_clock(bad), "{bad} should be rejected");
            assert_eq!(
                to_minutes(bad),
                Err(ValidationError::InvalidClock(bad.to_string()))
            );
        }
    }

    #[test]
    fn formats_zero_padded() {
        assert_eq!(to_clock(0), "00:00");
        assert_eq!(to_clock(65), "01:05");
        assert_eq!(to_clock(1380), "23:00");
    }

    #[test]
    fn clock_text_survives_parse_and_format() {
        for minutes in [0, 1, 59, 60, 419, 420, 721, 1439] {
            assert_eq!(to_minutes(&to_clock(minutes)).unwrap(), minutes);
        }
    }

    #[test]
    fn rounds_to_nearest_grid_line() {
        assert_eq!(round_to_grid(422, 5), 420);
        assert_eq!(round_to_grid(423, 5), 425);
        assert_eq!(round_to_grid(437, 15), 435);
        assert_eq!(round_to_grid(443, 15), 450);
        assert_eq!(round_to_grid(443, 1), 443);
    }

    #[test]
    fn clock_range_is_enforced() {
        assert_eq!(Clock::from_minutes(1439).map(Clock::minutes), Some(1439));
        assert!(Clock::from_minutes(1440).is_none());
        assert_eq!(Clock::clamped(-30), Clock::MIDNIGHT);
        assert_eq!(Clock::clamped(5000).minutes(), LAST_MINUTE);
    }

    #[test]
    fn clock_serializes_as_text() {
        let json = serde_json::to_string(&Clock::hm(9, 5)).unwrap();
        assert_eq!(json, "\"09:05\"");
        let parsed: Clock = serde_json::from_str("\"18:30\"").unwrap();
        assert_eq!(parsed, Clock::hm(18, 30));
        assert!(serde_json::from_str::<Clock>("\"9:30\"").is_err());
    }
}
