//! Resolved instants and their serialized forms.
//!
//! A [`ResolvedInstant`] is a calendar day, an optional wall-clock time and
//! the timezone it was resolved in. Without a time it is an all-day value and
//! never carries a UTC offset when serialized.

use std::fmt;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;

use crate::time_of_day::WallTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedInstant {
    date: NaiveDate,
    time: Option<WallTime>,
    timezone: Tz,
}

impl ResolvedInstant {
    pub fn all_day(date: NaiveDate, timezone: Tz) -> Self {
        ResolvedInstant {
            date,
            time: None,
            timezone,
        }
    }

    pub fn timed(date: NaiveDate, time: WallTime, timezone: Tz) -> Self {
        ResolvedInstant {
            date,
            time: Some(time),
            timezone,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> Option<WallTime> {
        self.time
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn is_all_day(&self) -> bool {
        self.time.is_none()
    }

    /// Attach a time of day, turning an all-day value into a timed one.
    pub fn with_time(self, time: WallTime) -> Self {
        ResolvedInstant {
            time: Some(time),
            ..self
        }
    }

    /// Same time of day (if any) on another date.
    pub fn on_date(self, date: NaiveDate) -> Self {
        ResolvedInstant { date, ..self }
    }

    /// Local date and time, or `None` for an all-day value.
    pub fn naive(&self) -> Option<NaiveDateTime> {
        self.time.map(|t| self.date.and_time(t.to_naive()))
    }

    /// Whether the wall time exists in the timezone on this date.
    ///
    /// All-day values always exist. A timed value inside a DST gap
    /// (e.g. 02:30 on a spring-forward day) does not.
    pub fn exists_locally(&self) -> bool {
        match self.naive() {
            Some(naive) => self.timezone.from_local_datetime(&naive).earliest().is_some(),
            None => true,
        }
    }

    /// The zoned datetime for a timed value.
    ///
    /// An ambiguous wall time (DST fall-back) takes the earlier offset. A wall
    /// time inside a gap (a DST jump, or a whole skipped day) is moved forward
    /// by the length of the gap.
    pub fn zoned(&self) -> Option<DateTime<Tz>> {
        let naive = self.naive()?;
        match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt),
            LocalResult::None => {
                // Offset in force a day before the gap.
                let probe = naive.checked_sub_signed(Duration::days(1)).unwrap_or(naive);
                let before = self.timezone.offset_from_utc_datetime(&probe).fix();
                let utc = naive
                    .checked_sub_signed(Duration::seconds(i64::from(before.local_minus_utc())))?;
                Some(self.timezone.from_utc_datetime(&utc))
            }
        }
    }

    /// The start/end shape handed to a calendar client.
    pub fn to_calendar_time(&self) -> CalendarTime {
        match self.time {
            Some(_) => CalendarTime::DateTime {
                date_time: self.timed_text(),
                time_zone: self.timezone.name().to_string(),
            },
            None => CalendarTime::Date {
                date: self.date.format("%Y-%m-%d").to_string(),
            },
        }
    }

    /// RFC 3339 text of a timed value. Falls back to the bare local
    /// datetime only when the zoned instant is outside chrono's range.
    fn timed_text(&self) -> String {
        match (self.zoned(), self.naive()) {
            (Some(dt), _) => dt.to_rfc3339(),
            (None, Some(naive)) => naive.format("%Y-%m-%dT%H:%M:%S").to_string(),
            (None, None) => self.date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Canonical text: `YYYY-MM-DD` for all-day, RFC 3339 with offset otherwise.
impl fmt::Display for ResolvedInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.time {
            Some(_) => f.write_str(&self.timed_text()),
            None => write!(f, "{}", self.date.format("%Y-%m-%d")),
        }
    }
}

#[derive(Serialize)]
struct InstantRecord {
    date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<WallTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
}

impl Serialize for ResolvedInstant {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let timed = self.time.is_some();
        InstantRecord {
            date: self.date.format("%Y-%m-%d").to_string(),
            time: self.time,
            timezone: timed.then(|| self.timezone.name().to_string()),
            date_time: timed.then(|| self.timed_text()),
        }
        .serialize(serializer)
    }
}

/// Calendar-client event boundary: `{"date"}` for all-day events,
/// `{"dateTime", "timeZone"}` for timed ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CalendarTime {
    Date {
        date: String,
    },
    DateTime {
        #[serde(rename = "dateTime")]
        date_time: String,
        #[serde(rename = "timeZone")]
        time_zone: String,
    },
}
