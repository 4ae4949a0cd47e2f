//! Report date ranges.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use super::error::LedgerError;
use crate::calendar::{day_end, day_start};

/// Inclusive instant range covering whole calendar days in the reporting
/// zone: from local midnight of the first day to 23:59:59.999 of the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl ReportRange {
    /// Builds the range for `start..=end`.
    pub fn from_dates(start: NaiveDate, end: NaiveDate, zone: Tz) -> Result<Self, LedgerError> {
        if start > end {
            return Err(LedgerError::InvalidRange { start, end });
        }
        Ok(Self {
            start: day_start(start, zone),
            end: day_end(end, zone),
        })
    }

    /// First included instant.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Last included instant.
    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns true if `at` falls inside the range.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}
