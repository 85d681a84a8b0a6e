//! The resolution pipeline: raw text → tokens → directive → anchor date →
//! time of day → expanded series.
//!
//! All functions take the reference instant and timezone as arguments and
//! never read the system clock, so the same input always resolves the same way.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::anchor::resolve_anchor;
use crate::directive::extract_directive;
use crate::error::{ParseError, Result};
use crate::expander::{expand, RecurrenceSeries};
use crate::instant::ResolvedInstant;
use crate::time_of_day::resolve_time;
use crate::tokenizer::{join, tokenize};

/// Options for [`resolve_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Length of the window a bare day pattern (`monday 9am mwf`) fills, in weeks.
    pub day_pattern_weeks: u32,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            day_pattern_weeks: 4,
        }
    }
}

/// Resolve shorthand input into an ordered series of instants.
///
/// # Arguments
///
/// * `input` — The text as typed, e.g. `"today 2pm"`, `"817"`, `"monday 9am mwf d 0515"`
/// * `timezone` — An IANA timezone name; decides what "today" is and the offset of timed results
/// * `now` — The reference instant for relative expressions
///
/// # Errors
///
/// [`ParseError::EmptyInput`] for blank input (callers usually treat that as
/// "no value"; see [`resolve_optional`]), [`ParseError::InvalidTimezone`], and
/// any date, time or recurrence error from the individual stages.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use quickcal_engine::resolve;
///
/// let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
/// let series = resolve("today 2pm 5d", "America/New_York", now).unwrap();
/// assert_eq!(series.len(), 5);
/// assert_eq!(series.first().to_string(), "2026-10-19T14:00:00-04:00");
/// ```
pub fn resolve(input: &str, timezone: &str, now: DateTime<Utc>) -> Result<RecurrenceSeries> {
    resolve_with_options(input, timezone, now, &ResolveOptions::default())
}

/// [`resolve`] with explicit options.
pub fn resolve_with_options(
    input: &str,
    timezone: &str,
    now: DateTime<Utc>,
    options: &ResolveOptions,
) -> Result<RecurrenceSeries> {
    let tz = parse_timezone(timezone)?;
    let tokens = tokenize(input);
    if tokens.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let (directive, rest) = extract_directive(&tokens);
    if rest.is_empty() {
        // The whole input was a recurrence suffix with nothing to anchor it.
        return Err(ParseError::UnrecognizedDate(input.trim().to_string()));
    }

    let base = resolve_instant(&rest, tz, now)?;
    expand(base, &directive, options, |end| resolve_end_date(end, tz, now))
}

/// Like [`resolve`], but blank input is `Ok(None)` rather than an error.
pub fn resolve_optional(
    input: &str,
    timezone: &str,
    now: DateTime<Utc>,
) -> Result<Option<RecurrenceSeries>> {
    match resolve(input, timezone, now) {
        Ok(series) => Ok(Some(series)),
        Err(e) if e.is_empty_input() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Parse an IANA timezone name.
///
/// # Errors
///
/// [`ParseError::InvalidTimezone`] for unknown names.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.trim()
        .parse::<Tz>()
        .map_err(|_| ParseError::InvalidTimezone(s.to_string()))
}

/// Anchor date plus optional time of day, without any recurrence handling.
fn resolve_instant(tokens: &[String], tz: Tz, now: DateTime<Utc>) -> Result<ResolvedInstant> {
    let today = now.with_timezone(&tz).date_naive();
    let anchor = resolve_anchor(tokens, today)?;
    let time = resolve_time(&join(&tokens[anchor.consumed..]))?;

    let instant = match time {
        Some(time) => ResolvedInstant::timed(anchor.date, time, tz),
        None => ResolvedInstant::all_day(anchor.date, tz),
    };
    if !instant.exists_locally() {
        let local = instant.naive().map(|n| n.to_string()).unwrap_or_default();
        return Err(ParseError::NonexistentLocalTime(local));
    }
    Ok(instant)
}

/// End date of an until directive. The end expression is read as a plain
/// date/time; it is not scanned for a recurrence suffix of its own.
fn resolve_end_date(tokens: &[String], tz: Tz, now: DateTime<Utc>) -> Result<Option<NaiveDate>> {
    if tokens.is_empty() {
        return Ok(None);
    }
    resolve_instant(tokens, tz, now).map(|i| Some(i.date()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Monday, October 19, 2026, 14:30 UTC.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_today_is_local_date() {
        // 20:00 UTC on Oct 19 is already Oct 20 in Tokyo.
        let evening = Utc.with_ymd_and_hms(2026, 10, 19, 20, 0, 0).unwrap();
        let s = resolve("today", "Asia/Tokyo", evening).unwrap();
        assert_eq!(s.first().date(), date(2026, 10, 20));
        let s = resolve("today", "America/Los_Angeles", evening).unwrap();
        assert_eq!(s.first().date(), date(2026, 10, 19));
    }

    #[test]
    fn test_blank_input() {
        assert_eq!(resolve("  ", "UTC", now()), Err(ParseError::EmptyInput));
        assert_eq!(resolve_optional("", "UTC", now()), Ok(None));
    }

    #[test]
    fn test_invalid_timezone() {
        assert_eq!(
            resolve("today", "Mars/Olympus", now()),
            Err(ParseError::InvalidTimezone("Mars/Olympus".to_string()))
        );
    }

    #[test]
    fn test_directive_only_input() {
        assert!(matches!(
            resolve("mwf", "UTC", now()),
            Err(ParseError::UnrecognizedDate(_))
        ));
    }

    #[test]
    fn test_until_end_resolved_against_same_now() {
        let s = resolve("today 9am w 1109", "UTC", now()).unwrap();
        assert_eq!(s.len(), 4);
        assert_eq!(s.as_slice()[3].date(), date(2026, 11, 9));
    }

    #[test]
    fn test_until_end_with_time_uses_date_only() {
        let s = resolve("today d tomorrow 8am", "UTC", now()).unwrap();
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_until_end_is_not_rescanned_for_directives() {
        assert!(matches!(
            resolve("today d tomorrow 5d 8am", "UTC", now()),
            Err(ParseError::UnrecognizedTime(_))
        ));
    }

    #[test]
    fn test_until_bad_end_fails() {
        assert!(matches!(
            resolve("today d someday", "UTC", now()),
            Err(ParseError::UnrecognizedDate(_))
        ));
    }

    #[test]
    fn test_dst_gap_rejected_for_base() {
        // Sunday March 8, 2026: New York clocks jump from 02:00 to 03:00.
        let march = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert!(matches!(
            resolve("2026-03-08 2:30", "America/New_York", march),
            Err(ParseError::NonexistentLocalTime(_))
        ));
    }

    #[test]
    fn test_series_through_skipped_day_stays_timed() {
        let dec = Utc.with_ymd_and_hms(2011, 12, 1, 0, 0, 0).unwrap();
        let s = resolve("2011-12-29 9am 3d", "Pacific/Apia", dec).unwrap();
        assert_eq!(s.len(), 3);
        for instant in &s {
            assert!(!instant.is_all_day());
            assert!(instant.to_string().contains("T09:00:00"));
            assert!(matches!(
                instant.to_calendar_time(),
                crate::instant::CalendarTime::DateTime { .. }
            ));
        }
    }

    #[test]
    fn test_oversized_pattern_window_is_an_error() {
        let options = ResolveOptions {
            day_pattern_weeks: 20_000_000,
        };
        assert_eq!(
            resolve_with_options("monday 9am mwf", "UTC", now(), &options),
            Err(ParseError::RecurrenceCapExceeded { limit: 200 })
        );
    }

    #[test]
    fn test_options_change_pattern_window() {
        let options = ResolveOptions {
            day_pattern_weeks: 2,
        };
        let s = resolve_with_options("monday 9am mwf", "UTC", now(), &options).unwrap();
        // Mon Oct 26 through Mon Nov 9 inclusive.
        assert_eq!(s.len(), 7);
    }
}
