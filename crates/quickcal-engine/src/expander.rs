//! Recurrence expansion: a base instant plus a directive → an ordered series.
//!
//! Every series starts with the base instant and only moves forward in time,
//! one calendar date per element. The time of day (or all-day status) of the
//! base is kept for every element.
//!
//! No series may hold more than [`MAX_SERIES_LEN`] elements. Reaching the cap
//! before the requested count or end date is an error, never a truncation.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::directive::{DayPattern, RecurrenceDirective, RepeatUnit};
use crate::error::{ParseError, Result};
use crate::instant::ResolvedInstant;
use crate::resolve::ResolveOptions;
use crate::time_of_day::WallTime;

/// Upper bound on the number of instants one input may produce.
pub const MAX_SERIES_LEN: usize = 200;

// ── RecurrenceSeries ─────────────────────────────────────────────────────────

/// An ordered, non-empty list of instants. The first is the resolved base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RecurrenceSeries {
    instants: Vec<ResolvedInstant>,
}

impl RecurrenceSeries {
    pub fn single(base: ResolvedInstant) -> Self {
        RecurrenceSeries {
            instants: vec![base],
        }
    }

    pub fn first(&self) -> &ResolvedInstant {
        &self.instants[0]
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    /// Always false; a series holds at least its base instant.
    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedInstant> {
        self.instants.iter()
    }

    pub fn as_slice(&self) -> &[ResolvedInstant] {
        &self.instants
    }

    pub fn into_vec(self) -> Vec<ResolvedInstant> {
        self.instants
    }

    /// The same dates with `time` bound onto every instant.
    pub fn with_time(self, time: WallTime) -> Self {
        RecurrenceSeries {
            instants: self.instants.into_iter().map(|i| i.with_time(time)).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RecurrenceSeries {
    type Item = &'a ResolvedInstant;
    type IntoIter = std::slice::Iter<'a, ResolvedInstant>;

    fn into_iter(self) -> Self::IntoIter {
        self.instants.iter()
    }
}

impl IntoIterator for RecurrenceSeries {
    type Item = ResolvedInstant;
    type IntoIter = std::vec::IntoIter<ResolvedInstant>;

    fn into_iter(self) -> Self::IntoIter {
        self.instants.into_iter()
    }
}

// ── Walk rules ───────────────────────────────────────────────────────────────

/// Where a walk stops.
#[derive(Debug, Clone, Copy)]
enum Bound {
    /// Exactly this many elements, base included.
    Count(usize),
    /// Every generated date up to and including this one.
    Until(NaiveDate),
}

/// How a walk advances from one date to the next.
#[derive(Debug, Clone, Copy)]
enum Step {
    Fixed(RepeatUnit),
    Weekdays(DayPattern),
}

impl Step {
    fn next(self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            Step::Fixed(unit) => from.checked_add_signed(unit.step()),
            Step::Weekdays(days) => (1..=7)
                .filter_map(|n| from.checked_add_signed(Duration::days(n)))
                .find(|d| days.contains(d.weekday())),
        }
    }
}

// ── expand ───────────────────────────────────────────────────────────────────

/// Expand `base` according to `directive`.
///
/// `resolve_end` turns the end-date tokens of an until directive into a date;
/// `Ok(None)` (no end given) degrades the series to the base alone.
///
/// # Errors
///
/// [`ParseError::RecurrenceCapExceeded`] when the series would exceed
/// [`MAX_SERIES_LEN`], or any error from `resolve_end`.
pub fn expand<F>(
    base: ResolvedInstant,
    directive: &RecurrenceDirective,
    options: &ResolveOptions,
    resolve_end: F,
) -> Result<RecurrenceSeries>
where
    F: FnOnce(&[String]) -> Result<Option<NaiveDate>>,
{
    let series = match directive {
        RecurrenceDirective::None => RecurrenceSeries::single(base),
        RecurrenceDirective::Repeat => walk(base, Step::Fixed(RepeatUnit::Weekly), Bound::Count(2))?,
        RecurrenceDirective::Count { count, unit } => {
            walk(base, Step::Fixed(*unit), Bound::Count(*count))?
        }
        RecurrenceDirective::Until { unit, end } => match resolve_end(end)? {
            Some(end) => walk(base, Step::Fixed(*unit), Bound::Until(end))?,
            None => RecurrenceSeries::single(base),
        },
        RecurrenceDirective::DayPattern { days } => {
            // A window past the calendar's end runs into the cap first.
            let end = base
                .date()
                .checked_add_signed(Duration::weeks(i64::from(options.day_pattern_weeks)))
                .unwrap_or(NaiveDate::MAX);
            walk(base, Step::Weekdays(*days), Bound::Until(end))?
        }
        RecurrenceDirective::DayPatternCount { days, count } => {
            walk(base, Step::Weekdays(*days), Bound::Count(*count))?
        }
        RecurrenceDirective::DayPatternUntil { days, end } => match resolve_end(end)? {
            Some(end) => walk(base, Step::Weekdays(*days), Bound::Until(end))?,
            None => RecurrenceSeries::single(base),
        },
    };

    tracing::debug!(len = series.len(), first = %series.first(), "expanded recurrence");
    Ok(series)
}

fn walk(base: ResolvedInstant, step: Step, bound: Bound) -> Result<RecurrenceSeries> {
    let mut instants = vec![base];
    let mut date = base.date();

    loop {
        if let Bound::Count(n) = bound {
            if instants.len() >= n {
                break;
            }
        }
        let Some(next) = step.next(date) else {
            break;
        };
        if let Bound::Until(end) = bound {
            if next > end {
                break;
            }
        }
        if instants.len() == MAX_SERIES_LEN {
            return Err(ParseError::RecurrenceCapExceeded {
                limit: MAX_SERIES_LEN,
            });
        }
        instants.push(base.on_date(next));
        date = next;
    }

    Ok(RecurrenceSeries { instants })
}

// ── Tests ────────────────────────────────────────────────────────────────────
