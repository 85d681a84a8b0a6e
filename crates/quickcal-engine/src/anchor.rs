//! Anchor date resolution: the calendar day named by the leading tokens.
//!
//! Rules are tried in a fixed order and the first one that matches wins:
//!
//! 1. `today`, `tomorrow`, `yesterday`
//! 2. `this <weekday>`, `next <weekday>`
//! 3. `<weekday>`
//! 4. digit runs: `817`, `0817`, `081725`, `08172025`
//! 5. `YYYY-MM-DD`, `MM-DD`
//!
//! Each rule reports how many tokens it consumed so the rest can go to the
//! time-of-day resolver. Without an explicit year, a day that has already
//! passed this year rolls over to next year.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{ParseError, Result};

/// A resolved calendar day and the number of leading tokens it used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub date: NaiveDate,
    pub consumed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnchorRule {
    RelativeDay,
    QualifiedWeekday,
    BareWeekday,
    DigitRun,
    DashedDate,
}

const RULES: [AnchorRule; 5] = [
    AnchorRule::RelativeDay,
    AnchorRule::QualifiedWeekday,
    AnchorRule::BareWeekday,
    AnchorRule::DigitRun,
    AnchorRule::DashedDate,
];

impl AnchorRule {
    /// `Ok(None)` means the rule does not apply; `Err` means it applies but
    /// the input names an impossible date.
    fn apply(self, tokens: &[String], today: NaiveDate) -> Result<Option<Anchor>> {
        let first = tokens[0].to_lowercase();
        let found = |date: NaiveDate, consumed: usize| -> Result<Option<Anchor>> {
            Ok(Some(Anchor { date, consumed }))
        };

        match self {
            AnchorRule::RelativeDay => match first.as_str() {
                "today" => found(today, 1),
                "tomorrow" => found(today + Duration::days(1), 1),
                "yesterday" => found(today - Duration::days(1), 1),
                _ => Ok(None),
            },
            AnchorRule::QualifiedWeekday => {
                let Some(weekday) = tokens.get(1).and_then(|t| parse_weekday(&t.to_lowercase()))
                else {
                    return Ok(None);
                };
                match first.as_str() {
                    "this" => found(this_weekday(today, weekday), 2),
                    "next" => found(next_week_weekday(today, weekday), 2),
                    _ => Ok(None),
                }
            }
            AnchorRule::BareWeekday => match parse_weekday(&first) {
                Some(weekday) => found(upcoming_weekday(today, weekday), 1),
                None => Ok(None),
            },
            AnchorRule::DigitRun => match parse_digit_run(&first, today)? {
                Some(date) => found(date, 1),
                None => Ok(None),
            },
            AnchorRule::DashedDate => match parse_dashed_date(&first, today)? {
                Some(date) => found(date, 1),
                None => Ok(None),
            },
        }
    }
}

// ── resolve_anchor ───────────────────────────────────────────────────────────

/// Resolve the anchor date from the leading tokens.
///
/// `today` is the current local date in the caller's timezone.
///
/// # Errors
///
/// [`ParseError::EmptyInput`] for no tokens, [`ParseError::InvalidDate`] when a
/// numeric form names a day that does not exist, and
/// [`ParseError::UnrecognizedDate`] when no rule matches.
pub fn resolve_anchor(tokens: &[String], today: NaiveDate) -> Result<Anchor> {
    if tokens.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    for rule in RULES {
        if let Some(anchor) = rule.apply(tokens, today)? {
            tracing::trace!(?rule, date = %anchor.date, consumed = anchor.consumed, "anchor matched");
            return Ok(anchor);
        }
    }

    Err(ParseError::UnrecognizedDate(tokens[0].clone()))
}

// ── Parsing helpers ──────────────────────────────────────────────────────────

/// Parse a weekday name or abbreviation (input already lower-cased).
pub(crate) fn parse_weekday(s: &str) -> Option<Weekday> {
    match s {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" | "weds" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn start_of_week(today: NaiveDate) -> NaiveDate {
    today - Duration::days(today.weekday().num_days_from_monday() as i64)
}

/// `this <weekday>`: that day in the current Monday-based week, moved a week
/// ahead if it has already passed. Today itself is allowed.
fn this_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let candidate =
        start_of_week(today) + Duration::days(weekday.num_days_from_monday() as i64);
    if candidate < today {
        candidate + Duration::weeks(1)
    } else {
        candidate
    }
}

/// `next <weekday>`: that day in the week after the current one.
fn next_week_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    start_of_week(today) + Duration::weeks(1) + Duration::days(weekday.num_days_from_monday() as i64)
}

/// Bare `<weekday>`: the next such day strictly after today.
fn upcoming_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let days_ahead = (weekday.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64
        + 7)
        % 7;
    let days_ahead = if days_ahead == 0 { 7 } else { days_ahead };
    today + Duration::days(days_ahead)
}

/// Digit shorthands: `MDD`, `MMDD`, `MMDDYY`, `MMDDYYYY`.
fn parse_digit_run(s: &str, today: NaiveDate) -> Result<Option<NaiveDate>> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    let num = |range: std::ops::Range<usize>| s[range].parse::<u32>().unwrap_or(0);

    let (month, day, year) = match s.len() {
        3 => (num(0..1), num(1..3), None),
        4 => (num(0..2), num(2..4), None),
        6 => {
            let yy = num(4..6) as i32;
            let year = if yy <= 69 { 2000 + yy } else { 1900 + yy };
            (num(0..2), num(2..4), Some(year))
        }
        8 => (num(0..2), num(2..4), Some(num(4..8) as i32)),
        _ => return Ok(None),
    };

    build_date(s, year, month, day, today).map(Some)
}

/// `YYYY-MM-DD` or `MM-DD`.
fn parse_dashed_date(s: &str, today: NaiveDate) -> Result<Option<NaiveDate>> {
    let parts: Vec<&str> = s.split('-').collect();
    let numeric = |p: &str, max_len: usize| {
        (!p.is_empty() && p.len() <= max_len && p.bytes().all(|b| b.is_ascii_digit()))
            .then(|| p.parse::<u32>().ok())
            .flatten()
    };

    let (year, month, day) = match parts.as_slice() {
        [y, m, d] if y.len() == 4 => match (numeric(y, 4), numeric(m, 2), numeric(d, 2)) {
            (Some(y), Some(m), Some(d)) => (Some(y as i32), m, d),
            _ => return Ok(None),
        },
        [m, d] => match (numeric(m, 2), numeric(d, 2)) {
            (Some(m), Some(d)) => (None, m, d),
            _ => return Ok(None),
        },
        _ => return Ok(None),
    };

    build_date(s, year, month, day, today).map(Some)
}

/// Build a date, defaulting to the current year and rolling a past date
/// into next year when no year was given.
fn build_date(
    raw: &str,
    year: Option<i32>,
    month: u32,
    day: u32,
    today: NaiveDate,
) -> Result<NaiveDate> {
    let invalid = || ParseError::InvalidDate(raw.to_string());

    match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid),
        None => match NaiveDate::from_ymd_opt(today.year(), month, day) {
            Some(date) if date >= today => Ok(date),
            // Past, or Feb 29 outside a leap year: try next year.
            _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day).ok_or_else(invalid),
        },
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
