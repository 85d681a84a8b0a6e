//! Recurrence directive extraction.
//!
//! A directive is an optional suffix on the input that asks for more than one
//! occurrence. It is read from the tail of the token list before any date or
//! time parsing happens, and the tokens it consumes are removed.
//!
//! # Grammar
//!
//! Rules are tried in this order against the trailing tokens:
//!
//! 1. **Day pattern**: a last token of 2-7 distinct letters from `mtwrfsu`
//!    (`m`=Mon, `t`=Tue, `w`=Wed, `r`=Thu, `f`=Fri, `s`=Sat, `u`=Sun) is
//!    stripped and remembered.
//! 2. **Repeat**: `repeat` or `r` as the new last token.
//! 3. **Count**: `<digits>d` or `<digits>w` as the new last token.
//! 4. **Until**: the right-most standalone `d` or `w`; the tokens after it are
//!    the end-date expression.
//! 5. A remembered day pattern with nothing else becomes a plain
//!    [`RecurrenceDirective::DayPattern`].
//!
//! For rules 3 and 4 the day pattern may also sit directly in front of the
//! count or marker (`monday 9am mwf d 0515`).
//!
//! Nothing here fails: a token that does not fit a rule is left in place for
//! the date and time stages to reject.

use chrono::{Duration, Weekday};
use serde::Serialize;

use crate::error::{ParseError, Result};

// ── Day patterns ─────────────────────────────────────────────────────────────

/// Letters of the day-pattern alphabet, Monday first.
const DAY_LETTERS: [char; 7] = ['m', 't', 'w', 'r', 'f', 's', 'u'];

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Step between occurrences for count and until directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RepeatUnit {
    Daily,
    Weekly,
}

impl RepeatUnit {
    fn from_marker(s: &str) -> Option<Self> {
        match s {
            "d" | "D" => Some(RepeatUnit::Daily),
            "w" | "W" => Some(RepeatUnit::Weekly),
            _ => None,
        }
    }

    pub fn step(self) -> Duration {
        match self {
            RepeatUnit::Daily => Duration::days(1),
            RepeatUnit::Weekly => Duration::weeks(1),
        }
    }
}

/// A non-empty set of weekdays decoded from a compact code like `mwf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPattern {
    mask: u8,
}

impl DayPattern {
    /// Decode a day-pattern code.
    ///
    /// # Errors
    ///
    /// [`ParseError::EmptyDayPattern`] for an empty code,
    /// [`ParseError::InvalidDayPattern`] for a letter outside `mtwrfsu` or a
    /// length outside 2-7, and [`ParseError::DuplicateWeekdayInPattern`] when a
    /// weekday appears twice.
    pub fn from_code(code: &str) -> Result<Self> {
        if code.is_empty() {
            return Err(ParseError::EmptyDayPattern);
        }
        let len = code.chars().count();
        if !(2..=7).contains(&len) {
            return Err(ParseError::InvalidDayPattern(code.to_string()));
        }

        let mut mask = 0u8;
        for ch in code.chars() {
            let idx = DAY_LETTERS
                .iter()
                .position(|&l| l == ch.to_ascii_lowercase())
                .ok_or_else(|| ParseError::InvalidDayPattern(code.to_string()))?;
            let bit = 1u8 << idx;
            if mask & bit != 0 {
                return Err(ParseError::DuplicateWeekdayInPattern(code.to_string()));
            }
            mask |= bit;
        }
        Ok(DayPattern { mask })
    }

    pub fn contains(&self, weekday: Weekday) -> bool {
        self.mask & (1u8 << weekday.num_days_from_monday()) != 0
    }

    /// Weekday indices, 0 = Monday through 6 = Sunday, ascending.
    pub fn indices(&self) -> Vec<u8> {
        (0..7u8).filter(|i| self.mask & (1 << i) != 0).collect()
    }

    pub fn weekdays(&self) -> Vec<Weekday> {
        self.indices()
            .into_iter()
            .map(|i| WEEKDAYS[i as usize])
            .collect()
    }

    /// The canonical code, letters in Monday-first order.
    pub fn code(&self) -> String {
        self.indices()
            .into_iter()
            .map(|i| DAY_LETTERS[i as usize])
            .collect()
    }
}

impl Serialize for DayPattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.code())
    }
}

// ── extract_directive ────────────────────────────────────────────────────────

/// The recurrence requested by the tail of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecurrenceDirective {
    None,
    /// Base plus one week.
    Repeat,
    Count { count: usize, unit: RepeatUnit },
    Until { unit: RepeatUnit, end: Vec<String> },
    /// Matching weekdays in an implicit window after the base.
    DayPattern { days: DayPattern },
    DayPatternCount { days: DayPattern, count: usize },
    DayPatternUntil { days: DayPattern, end: Vec<String> },
}

/// Split a directive off the tail of `tokens`.
///
/// Returns the directive and the tokens left for date/time resolution.
pub fn extract_directive(tokens: &[String]) -> (RecurrenceDirective, Vec<String>) {
    let mut rest = tokens.to_vec();
    let directive = classify(&mut rest);
    tracing::debug!(?directive, remaining = rest.len(), "classified recurrence directive");
    (directive, rest)
}

fn classify(rest: &mut Vec<String>) -> RecurrenceDirective {
    let mut days = strip_day_pattern(rest);

    let Some(last) = rest.last().map(|t| t.to_lowercase()) else {
        return with_days(days);
    };

    if last == "repeat" || last == "r" {
        rest.pop();
        return RecurrenceDirective::Repeat;
    }

    if let Some((count, unit)) = parse_count(&last) {
        rest.pop();
        if days.is_none() {
            days = strip_day_pattern(rest);
        }
        return match days {
            Some(days) => RecurrenceDirective::DayPatternCount { days, count },
            None => RecurrenceDirective::Count { count, unit },
        };
    }

    if let Some(idx) = rest
        .iter()
        .rposition(|t| RepeatUnit::from_marker(t).is_some())
    {
        let end = rest.split_off(idx + 1);
        let unit = rest
            .pop()
            .and_then(|marker| RepeatUnit::from_marker(&marker))
            .unwrap_or(RepeatUnit::Daily);
        if days.is_none() {
            days = strip_day_pattern(rest);
        }
        return match days {
            Some(days) => RecurrenceDirective::DayPatternUntil { days, end },
            None => RecurrenceDirective::Until { unit, end },
        };
    }

    with_days(days)
}

// ── Internal helpers ─────────────────────────────────────────────────────────

fn with_days(days: Option<DayPattern>) -> RecurrenceDirective {
    match days {
        Some(days) => RecurrenceDirective::DayPattern { days },
        None => RecurrenceDirective::None,
    }
}

/// Pop the last token if it is a well-formed day-pattern code.
fn strip_day_pattern(rest: &mut Vec<String>) -> Option<DayPattern> {
    let days = DayPattern::from_code(rest.last()?).ok()?;
    rest.pop();
    Some(days)
}

/// `<digits><d|w>` → (count, unit). A zero count is not a directive. Counts
/// too large for `usize` saturate so the expander reports them as over the cap.
fn parse_count(token: &str) -> Option<(usize, RepeatUnit)> {
    let unit = match token.chars().last()? {
        'd' => RepeatUnit::Daily,
        'w' => RepeatUnit::Weekly,
        _ => return None,
    };
    let digits = &token[..token.len() - 1];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let count = digits.parse::<usize>().unwrap_or(usize::MAX);
    (count > 0).then_some((count, unit))
}

// ── Tests ────────────────────────────────────────────────────────────────────
