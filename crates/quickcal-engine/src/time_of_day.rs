//! Time-of-day resolution for the tokens left after the anchor date.
//!
//! Three notations compete, tried in order:
//!
//! 1. `HH:MM` on a 24-hour clock (`14:30`, `9:05`)
//! 2. `H:MM AM|PM` (`2:30 PM`, `2:30pm`)
//! 3. compact digits with an optional meridiem (`2pm`, `232`, `1259`, `232 PM`)
//!
//! A rule either matches, does not apply, or applies to input that is out of
//! range (a 25th hour, a 61st minute), which is reported rather than passed on.

use std::fmt;

use chrono::NaiveTime;
use serde::Serialize;

use crate::error::{ParseError, Result};

const HOUR_24: &str = "00-23 for 24-hour times";
const HOUR_12: &str = "1-12 when using AM/PM";

/// A wall-clock time with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallTime {
    hour: u32,
    minute: u32,
}

impl WallTime {
    /// # Errors
    ///
    /// [`ParseError::InvalidHour`] or [`ParseError::InvalidMinute`] when out of range.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 {
            return Err(ParseError::InvalidHour {
                hour,
                expected: HOUR_24,
            });
        }
        if minute > 59 {
            return Err(ParseError::InvalidMinute(minute));
        }
        Ok(WallTime { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn to_naive(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default()
    }
}

impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for WallTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// Convert a 12-hour clock hour to 24-hour.
    fn to_24h(self, hour: u32) -> Result<u32> {
        if !(1..=12).contains(&hour) {
            return Err(ParseError::InvalidHour {
                hour,
                expected: HOUR_12,
            });
        }
        Ok(match (self, hour) {
            (Meridiem::Am, 12) => 0,
            (Meridiem::Am, h) => h,
            (Meridiem::Pm, 12) => 12,
            (Meridiem::Pm, h) => h + 12,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeRule {
    Clock24,
    Clock12,
    Compact,
}

const RULES: [TimeRule; 3] = [TimeRule::Clock24, TimeRule::Clock12, TimeRule::Compact];

impl TimeRule {
    fn apply(self, s: &str) -> Result<Option<WallTime>> {
        match self {
            TimeRule::Clock24 => match parse_colon_time(s) {
                Some((hour, minute)) => WallTime::new(hour, minute).map(Some),
                None => Ok(None),
            },
            TimeRule::Clock12 => {
                let (rest, meridiem) = split_meridiem(s);
                let (Some(meridiem), Some((hour, minute))) = (meridiem, parse_colon_time(rest))
                else {
                    return Ok(None);
                };
                check_minute(minute)?;
                WallTime::new(meridiem.to_24h(hour)?, minute).map(Some)
            }
            TimeRule::Compact => {
                let (digits, meridiem) = split_meridiem(s);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Ok(None);
                }
                let (hour, minute) = match digits.len() {
                    1 | 2 => (parse_u32(digits), 0),
                    3 | 4 => {
                        let split = digits.len() - 2;
                        (parse_u32(&digits[..split]), parse_u32(&digits[split..]))
                    }
                    _ => return Err(ParseError::TimeTooLong(digits.to_string())),
                };
                check_minute(minute)?;
                let hour = match meridiem {
                    Some(m) => m.to_24h(hour)?,
                    None => hour,
                };
                WallTime::new(hour, minute).map(Some)
            }
        }
    }
}

// ── resolve_time ─────────────────────────────────────────────────────────────

/// Resolve the text after the anchor date into a time of day.
///
/// Blank text means an all-day event and yields `Ok(None)`.
///
/// # Errors
///
/// [`ParseError::UnrecognizedTime`] when no notation matches, or the
/// range errors ([`ParseError::InvalidHour`], [`ParseError::InvalidMinute`],
/// [`ParseError::TimeTooLong`]) when one applies to out-of-range input.
pub fn resolve_time(text: &str) -> Result<Option<WallTime>> {
    let s = text.trim().to_lowercase();
    if s.is_empty() {
        return Ok(None);
    }

    for rule in RULES {
        if let Some(time) = rule.apply(&s)? {
            tracing::trace!(?rule, %time, "time of day matched");
            return Ok(Some(time));
        }
    }

    Err(ParseError::UnrecognizedTime(text.trim().to_string()))
}

/// Parse a clock time written as `HH:MM` or `H:MM AM|PM`.
///
/// Used for configured quick-access times, which never use compact digits.
///
/// # Errors
///
/// [`ParseError::UnrecognizedTime`] for other shapes, or a range error.
pub fn parse_wall_time(text: &str) -> Result<WallTime> {
    let s = text.trim().to_lowercase();
    for rule in [TimeRule::Clock24, TimeRule::Clock12] {
        if let Some(time) = rule.apply(&s)? {
            return Ok(time);
        }
    }
    Err(ParseError::UnrecognizedTime(text.trim().to_string()))
}

// ── Parsing helpers ──────────────────────────────────────────────────────────

/// `H:MM` or `HH:MM` with no trailing text.
fn parse_colon_time(s: &str) -> Option<(u32, u32)> {
    let (h, m) = s.split_once(':')?;
    let digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !(1..=2).contains(&h.len()) || m.len() != 2 || !digits(h) || !digits(m) {
        return None;
    }
    Some((parse_u32(h), parse_u32(m)))
}

/// Strip a trailing `am`/`pm`, allowing whitespace before it.
fn split_meridiem(s: &str) -> (&str, Option<Meridiem>) {
    if let Some(rest) = s.strip_suffix("am") {
        (rest.trim_end(), Some(Meridiem::Am))
    } else if let Some(rest) = s.strip_suffix("pm") {
        (rest.trim_end(), Some(Meridiem::Pm))
    } else {
        (s, None)
    }
}

fn check_minute(minute: u32) -> Result<()> {
    if minute > 59 {
        return Err(ParseError::InvalidMinute(minute));
    }
    Ok(())
}

/// Callers have already checked the input is 1-4 ASCII digits.
fn parse_u32(digits: &str) -> u32 {
    digits.parse().unwrap_or(0)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn t(hour: u32, minute: u32) -> Option<WallTime> {
        Some(WallTime::new(hour, minute).unwrap())
    }

    #[test]
    fn test_blank_is_all_day() {
        assert_eq!(resolve_time("").unwrap(), None);
        assert_eq!(resolve_time("   ").unwrap(), None);
    }

    #[test]
    fn test_24_hour_clock() {
        assert_eq!(resolve_time("14:30").unwrap(), t(14, 30));
        assert_eq!(resolve_time("9:05").unwrap(), t(9, 5));
        assert_eq!(resolve_time("00:00").unwrap(), t(0, 0));
    }

    #[test]
    fn test_24_hour_out_of_range() {
        assert!(matches!(
            resolve_time("24:00"),
            Err(ParseError::InvalidHour { hour: 24, .. })
        ));
        assert_eq!(resolve_time("10:75"), Err(ParseError::InvalidMinute(75)));
    }

    #[test]
    fn test_12_hour_clock() {
        assert_eq!(resolve_time("2:30 PM").unwrap(), t(14, 30));
        assert_eq!(resolve_time("2:30pm").unwrap(), t(14, 30));
        assert_eq!(resolve_time("12:15 am").unwrap(), t(0, 15));
        assert_eq!(resolve_time("12:15 pm").unwrap(), t(12, 15));
    }

    #[test]
    fn test_12_hour_clock_rejects_hour_13() {
        assert!(matches!(
            resolve_time("13:00 pm"),
            Err(ParseError::InvalidHour { hour: 13, .. })
        ));
    }

    #[test]
    fn test_compact_hour_only() {
        assert_eq!(resolve_time("2pm").unwrap(), t(14, 0));
        assert_eq!(resolve_time("9am").unwrap(), t(9, 0));
        assert_eq!(resolve_time("12am").unwrap(), t(0, 0));
        assert_eq!(resolve_time("12pm").unwrap(), t(12, 0));
        assert_eq!(resolve_time("17").unwrap(), t(17, 0));
        assert_eq!(resolve_time("0").unwrap(), t(0, 0));
    }

    #[test]
    fn test_compact_with_minutes() {
        assert_eq!(resolve_time("232").unwrap(), t(2, 32));
        assert_eq!(resolve_time("232 PM").unwrap(), t(14, 32));
        assert_eq!(resolve_time("1259").unwrap(), t(12, 59));
        assert_eq!(resolve_time("0930").unwrap(), t(9, 30));
    }

    #[test]
    fn test_compact_errors() {
        assert_eq!(
            resolve_time("12345"),
            Err(ParseError::TimeTooLong("12345".to_string()))
        );
        assert_eq!(resolve_time("961"), Err(ParseError::InvalidMinute(61)));
        assert!(matches!(
            resolve_time("2500"),
            Err(ParseError::InvalidHour { hour: 25, expected }) if expected == HOUR_24
        ));
        assert!(matches!(
            resolve_time("0pm"),
            Err(ParseError::InvalidHour { hour: 0, expected }) if expected == HOUR_12
        ));
        assert!(matches!(
            resolve_time("1300 pm"),
            Err(ParseError::InvalidHour { hour: 13, .. })
        ));
    }

    #[test]
    fn test_unrecognized_time() {
        let err = resolve_time("noonish").unwrap_err();
        assert_eq!(err, ParseError::UnrecognizedTime("noonish".to_string()));
        assert!(err.to_string().contains("'2:30 PM'"));
        assert!(matches!(
            resolve_time("9am mm"),
            Err(ParseError::UnrecognizedTime(_))
        ));
    }

    #[test]
    fn test_parse_wall_time_clock_forms_only() {
        assert_eq!(parse_wall_time("09:00").unwrap(), WallTime::new(9, 0).unwrap());
        assert_eq!(parse_wall_time("5:45 PM").unwrap(), WallTime::new(17, 45).unwrap());
        assert!(matches!(
            parse_wall_time("9am"),
            Err(ParseError::UnrecognizedTime(_))
        ));
    }

    #[test]
    fn test_wall_time_display() {
        assert_eq!(WallTime::new(7, 5).unwrap().to_string(), "07:05");
    }
}
