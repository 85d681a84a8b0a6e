//! Human duration strings (`1.5 hrs`, `30 min`) for deriving an end time.
//!
//! A string that does not parse is not an error: callers fall back to
//! asking for an explicit end instead.

use chrono::{Duration, Timelike};
use serde::Serialize;

use crate::instant::ResolvedInstant;
use crate::time_of_day::WallTime;

/// A non-negative length of time, rounded to whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct EventDuration {
    minutes: u32,
}

impl EventDuration {
    pub fn from_minutes(minutes: u32) -> Self {
        EventDuration { minutes }
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn to_chrono(self) -> Duration {
        Duration::minutes(i64::from(self.minutes))
    }

    /// End instant for a timed `start`, rolling into later days as needed.
    ///
    /// All-day starts have no time to add to and yield `None`.
    pub fn end_for(&self, start: &ResolvedInstant) -> Option<ResolvedInstant> {
        let end = start.naive()?.checked_add_signed(self.to_chrono())?;
        let time = WallTime::new(end.hour(), end.minute()).ok()?;
        Some(ResolvedInstant::timed(end.date(), time, start.timezone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DurationUnit {
    Hours,
    Minutes,
}

impl DurationUnit {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "hr" | "hrs" | "hour" | "hours" => Some(DurationUnit::Hours),
            "min" | "mins" | "minute" | "minutes" => Some(DurationUnit::Minutes),
            _ => None,
        }
    }

    fn minutes_per(self) -> f64 {
        match self {
            DurationUnit::Hours => 60.0,
            DurationUnit::Minutes => 1.0,
        }
    }
}

/// Parse `<number> <unit>`, where the number may be fractional and the
/// space is optional: `1.5 hrs`, `90min`, `2 hours`.
///
/// Returns `None` for anything else.
pub fn parse_duration(input: &str) -> Option<EventDuration> {
    let s = input.trim().to_lowercase();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);

    let digits = number.bytes().filter(u8::is_ascii_digit).count();
    let dots = number.bytes().filter(|&b| b == b'.').count();
    if digits == 0 || dots > 1 {
        return None;
    }

    let value: f64 = number.parse().ok()?;
    let unit = DurationUnit::parse(unit.trim_start())?;
    let minutes = (value * unit.minutes_per()).round();
    if !(0.0..=f64::from(u32::MAX)).contains(&minutes) {
        return None;
    }

    tracing::trace!(minutes, ?unit, "parsed duration");
    Some(EventDuration::from_minutes(minutes as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::UTC;

    fn minutes(input: &str) -> Option<u32> {
        parse_duration(input).map(|d| d.minutes())
    }

    #[test]
    fn test_fractional_hours() {
        assert_eq!(minutes("1.5 hrs"), Some(90));
        assert_eq!(minutes("0.25 hour"), Some(15));
        assert_eq!(minutes(".5hr"), Some(30));
    }

    #[test]
    fn test_minutes_and_spacing() {
        assert_eq!(minutes("30 min"), Some(30));
        assert_eq!(minutes("45mins"), Some(45));
        assert_eq!(minutes("  2 Hours "), Some(120));
        assert_eq!(minutes("10   minutes"), Some(10));
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(minutes("garbage"), None);
        assert_eq!(minutes(""), None);
        assert_eq!(minutes("hrs"), None);
        assert_eq!(minutes("1.2.3 hrs"), None);
        assert_eq!(minutes("2 days"), None);
        assert_eq!(minutes("2 hrs later"), None);
        assert_eq!(minutes("-1 hr"), None);
    }

    #[test]
    fn test_end_for_timed_start_rolls_over_midnight() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let start = ResolvedInstant::timed(date, WallTime::new(23, 0).unwrap(), UTC);
        let end = parse_duration("1.5 hrs").unwrap().end_for(&start).unwrap();
        assert_eq!(end.date(), NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
        assert_eq!(end.time(), Some(WallTime::new(0, 30).unwrap()));
    }

    #[test]
    fn test_end_for_all_day_is_none() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let start = ResolvedInstant::all_day(date, UTC);
        assert_eq!(EventDuration::from_minutes(30).end_for(&start), None);
    }
}
