//! Error types for quickcal-engine operations.

use thiserror::Error;

const DATE_EXAMPLES: &str = "Examples: '2025-08-17', '08-17', '817', '0817', '081725' or \
     '08172025'; also 'today', 'tuesday', 'this fri', 'next wed'";

const TIME_EXAMPLES: &str = "Examples: '14:30', '2:30 PM', '232', '1259', or '232 PM'";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No tokens were supplied. Callers treat this as "no value", not a failure.
    #[error("No input supplied")]
    EmptyInput,

    #[error("Invalid date '{0}'. {examples}", examples = DATE_EXAMPLES)]
    UnrecognizedDate(String),

    #[error("Invalid date '{0}': no such calendar day")]
    InvalidDate(String),

    #[error("Invalid time '{0}'. {examples}", examples = TIME_EXAMPLES)]
    UnrecognizedTime(String),

    #[error("Minute must be 00-59, got {0}")]
    InvalidMinute(u32),

    #[error("Hour must be {expected}, got {hour}")]
    InvalidHour { hour: u32, expected: &'static str },

    #[error("Time too long: '{0}'. Use up to 4 digits, e.g. '232' or '1259'")]
    TimeTooLong(String),

    #[error("Recurrence would produce more than {limit} events; narrow the range")]
    RecurrenceCapExceeded { limit: usize },

    #[error("Day pattern '{0}' repeats a weekday")]
    DuplicateWeekdayInPattern(String),

    #[error("Day pattern is empty")]
    EmptyDayPattern,

    #[error("Invalid day pattern '{0}': use 2-7 letters from m,t,w,r,f,s,u")]
    InvalidDayPattern(String),

    #[error("Invalid timezone: '{0}'")]
    InvalidTimezone(String),

    #[error("Local time {0} does not exist in this timezone")]
    NonexistentLocalTime(String),

    #[error("End {end} is before start {start}")]
    EndBeforeStart { start: String, end: String },

    #[error("Start and end must both be all-day or both carry a time")]
    MixedSpanKinds,
}

impl ParseError {
    /// True when the error only signals that nothing was entered.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, ParseError::EmptyInput)
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
