//! Start/end pairs for a single event.

use chrono::Duration;
use serde::Serialize;

use crate::error::{ParseError, Result};
use crate::instant::{CalendarTime, ResolvedInstant};

/// A start and an end of the same kind (both all-day or both timed), with the
/// end not before the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSpan {
    start: ResolvedInstant,
    end: ResolvedInstant,
}

/// The span in calendar-client shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarSpan {
    pub start: CalendarTime,
    pub end: CalendarTime,
}

impl EventSpan {
    /// # Errors
    ///
    /// [`ParseError::MixedSpanKinds`] when one side has a time and the other
    /// does not, [`ParseError::EndBeforeStart`] when the end precedes the start.
    pub fn pair(start: ResolvedInstant, end: ResolvedInstant) -> Result<Self> {
        if start.is_all_day() != end.is_all_day() {
            return Err(ParseError::MixedSpanKinds);
        }
        let ordered = match (start.zoned(), end.zoned()) {
            (Some(s), Some(e)) => s <= e,
            _ => start.date() <= end.date(),
        };
        if !ordered {
            return Err(ParseError::EndBeforeStart {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(EventSpan { start, end })
    }

    /// An all-day event on a single date.
    pub fn all_day(day: ResolvedInstant) -> Self {
        let day = ResolvedInstant::all_day(day.date(), day.timezone());
        EventSpan {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> &ResolvedInstant {
        &self.start
    }

    pub fn end(&self) -> &ResolvedInstant {
        &self.end
    }

    /// The same span moved so that it starts on `occurrence`'s date.
    pub fn for_occurrence(&self, occurrence: &ResolvedInstant) -> Self {
        let shift = occurrence.date() - self.start.date();
        let shift_date = |i: &ResolvedInstant| i.on_date(i.date() + shift);
        EventSpan {
            start: shift_date(&self.start),
            end: shift_date(&self.end),
        }
    }

    /// Days between the start and end dates.
    pub fn day_length(&self) -> Duration {
        self.end.date() - self.start.date()
    }

    pub fn to_calendar(&self) -> CalendarSpan {
        CalendarSpan {
            start: self.start.to_calendar_time(),
            end: self.end.to_calendar_time(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_of_day::WallTime;
    use chrono::NaiveDate;
    use chrono_tz::Europe::London;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn timed(d: NaiveDate, h: u32, m: u32) -> ResolvedInstant {
        ResolvedInstant::timed(d, WallTime::new(h, m).unwrap(), London)
    }

    #[test]
    fn test_pair_timed() {
        let span = EventSpan::pair(timed(date(2026, 10, 19), 9, 0), timed(date(2026, 10, 19), 10, 30))
            .unwrap();
        assert_eq!(span.day_length(), Duration::zero());
    }

    #[test]
    fn test_pair_rejects_mixed_kinds() {
        let start = timed(date(2026, 10, 19), 9, 0);
        let end = ResolvedInstant::all_day(date(2026, 10, 20), London);
        assert_eq!(EventSpan::pair(start, end), Err(ParseError::MixedSpanKinds));
    }

    #[test]
    fn test_pair_rejects_end_before_start() {
        let start = timed(date(2026, 10, 19), 9, 0);
        let end = timed(date(2026, 10, 19), 8, 0);
        assert!(matches!(
            EventSpan::pair(start, end),
            Err(ParseError::EndBeforeStart { .. })
        ));
    }

    #[test]
    fn test_all_day_span_drops_time() {
        let span = EventSpan::all_day(timed(date(2026, 10, 19), 9, 0));
        assert!(span.start().is_all_day());
        assert_eq!(span.start(), span.end());
    }

    #[test]
    fn test_for_occurrence_shifts_both_ends() {
        let span = EventSpan::pair(timed(date(2026, 10, 19), 23, 0), timed(date(2026, 10, 20), 1, 0))
            .unwrap();
        let moved = span.for_occurrence(&timed(date(2026, 10, 26), 23, 0));
        assert_eq!(moved.start().date(), date(2026, 10, 26));
        assert_eq!(moved.end().date(), date(2026, 10, 27));
        assert_eq!(moved.end().time(), Some(WallTime::new(1, 0).unwrap()));
    }

    #[test]
    fn test_to_calendar_shape() {
        let span = EventSpan::all_day(ResolvedInstant::all_day(date(2026, 10, 19), London));
        let json = serde_json::to_value(span.to_calendar()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "start": { "date": "2026-10-19" },
                "end": { "date": "2026-10-19" },
            })
        );
    }
}
