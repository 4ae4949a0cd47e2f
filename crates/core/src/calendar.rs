//! Calendar arithmetic in the reporting time zone.
//!
//! Every date boundary the engine uses (report day ends, month buckets) is
//! resolved here, so all of them agree on what "a day" and "a month" mean
//! for a given zone.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A calendar month, identified by year and month number.
///
/// Ordering is chronological. Two months with the same label in different
/// years are distinct keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Creates a key. Returns `None` unless `month` is in `1..=12`.
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// Returns the month containing `instant` as seen in `zone`.
    #[must_use]
    pub fn of(instant: DateTime<Utc>, zone: Tz) -> Self {
        let local = instant.with_timezone(&zone);
        Self {
            year: local.year(),
            month: local.month(),
        }
    }

    /// Year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Month number, 1-based.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Short English month name ("Jan").
    #[must_use]
    pub const fn label(&self) -> &'static str {
        MONTH_LABELS[(self.month - 1) as usize]
    }

    /// The month before this one.
    #[must_use]
    pub const fn pred(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The month after this one.
    #[must_use]
    pub const fn succ(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        // Only out of range for years chrono cannot represent.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// First instant of the month in `zone`.
    #[must_use]
    pub fn start(&self, zone: Tz) -> DateTime<Utc> {
        day_start(self.first_day(), zone)
    }

    /// Months from `self` forward to and including `last`, oldest first.
    ///
    /// Empty if `last` is before `self`.
    #[must_use]
    pub fn through(self, last: Self) -> Vec<Self> {
        let mut months = Vec::new();
        let mut current = self;
        while current <= last {
            months.push(current);
            current = current.succ();
        }
        months
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// First instant of `date` in `zone`.
///
/// When local midnight falls in a DST gap the day starts at the instant the
/// clocks jump; on an ambiguous midnight the earlier instant wins.
#[must_use]
pub fn day_start(date: NaiveDate, zone: Tz) -> DateTime<Utc> {
    resolve_local(date.and_time(NaiveTime::MIN), zone)
}

/// Last millisecond of `date` in `zone` (23:59:59.999 local).
#[must_use]
pub fn day_end(date: NaiveDate, zone: Tz) -> DateTime<Utc> {
    date.succ_opt().map_or(DateTime::<Utc>::MAX_UTC, |next| {
        day_start(next, zone) - Duration::milliseconds(1)
    })
}

fn resolve_local(naive: NaiveDateTime, zone: Tz) -> DateTime<Utc> {
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => at.with_timezone(&Utc),
        LocalResult::None => {
            let offset = zone.offset_from_utc_datetime(&naive).fix();
            let utc = naive - Duration::seconds(i64::from(offset.local_minus_utc()));
            Utc.from_utc_datetime(&utc)
        }
    }
}
