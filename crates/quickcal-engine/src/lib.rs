//! # quickcal-engine
//!
//! Deterministic resolution of the shorthand people type into calendar
//! event fields.
//!
//! Input such as `today 2pm`, `817`, `next wed 9:30`, `tuesday 14:00 3w` or
//! `monday 9am mwf d 0515` is turned into one or more concrete instants in an
//! IANA timezone. The reference "now" is always passed in, so results depend
//! only on the arguments.
//!
//! ## Modules
//!
//! - [`tokenizer`] — Whitespace tokenization
//! - [`directive`] — Recurrence suffixes (`5d`, `w 1109`, `mwf`, `repeat`)
//! - [`anchor`] — Relative keywords, weekdays and numeric shorthands → calendar day
//! - [`time_of_day`] — `14:30`, `2:30 PM`, `232`, `2pm` → wall-clock time
//! - [`instant`] — Resolved instants and their serialized forms
//! - [`expander`] — Directive + base instant → ordered series (capped at 200)
//! - [`duration`] — `1.5 hrs`, `30 min` → minutes
//! - [`span`] — Start/end pairs
//! - [`resolve`] — The end-to-end pipeline
//! - [`error`] — Error types

pub mod anchor;
pub mod directive;
pub mod duration;
pub mod error;
pub mod expander;
pub mod instant;
pub mod resolve;
pub mod span;
pub mod time_of_day;
pub mod tokenizer;

pub use anchor::{resolve_anchor, Anchor};
pub use directive::{extract_directive, DayPattern, RecurrenceDirective, RepeatUnit};
pub use duration::{parse_duration, EventDuration};
pub use error::ParseError;
pub use expander::{expand, RecurrenceSeries, MAX_SERIES_LEN};
pub use instant::{CalendarTime, ResolvedInstant};
pub use resolve::{
    parse_timezone, resolve, resolve_optional, resolve_with_options, ResolveOptions,
};
pub use span::{CalendarSpan, EventSpan};
pub use time_of_day::{parse_wall_time, resolve_time, WallTime};
pub use tokenizer::tokenize;
