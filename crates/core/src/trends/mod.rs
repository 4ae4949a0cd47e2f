//! Monthly trend buckets and the naive expense forecast.
//!
//! The window is the trailing six calendar months, current month included,
//! in the reporting zone. The forecast is the mean expense of the last three
//! buckets.

mod service;

pub use service::build_trend_report;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use tally_shared::AppError;
use thiserror::Error;

pub use crate::calendar::MonthKey;
use crate::aggregation::round_money;
use crate::ledger::{LedgerError, MonthlyTotal, TransactionKind};

/// Number of months in the trend window.
pub const WINDOW_MONTHS: usize = 6;

/// Number of trailing buckets averaged by the forecast.
pub const FORECAST_MONTHS: usize = 3;

/// Title of the analytics payload.
pub const TREND_TITLE: &str = "Premium Financial Analysis";

/// Errors that can occur while building a trend report.
#[derive(Debug, Error)]
pub enum TrendError {
    /// The ledger could not be queried.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<TrendError> for AppError {
    fn from(err: TrendError) -> Self {
        match err {
            TrendError::Ledger(e) => e.into(),
        }
    }
}

/// Six consecutive months, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendWindow {
    months: [MonthKey; WINDOW_MONTHS],
}

impl TrendWindow {
    /// The window whose last month is `last`.
    #[must_use]
    pub fn ending_in(last: MonthKey) -> Self {
        let mut months = [last; WINDOW_MONTHS];
        for i in (0..WINDOW_MONTHS - 1).rev() {
            months[i] = months[i + 1].pred();
        }
        Self { months }
    }

    /// The window ending in the month containing `now` in `zone`.
    #[must_use]
    pub fn ending_at(now: DateTime<Utc>, zone: Tz) -> Self {
        Self::ending_in(MonthKey::of(now, zone))
    }

    /// Months of the window, oldest first.
    #[must_use]
    pub const fn months(&self) -> &[MonthKey; WINDOW_MONTHS] {
        &self.months
    }

    /// Oldest month.
    #[must_use]
    pub const fn first(&self) -> MonthKey {
        self.months[0]
    }

    /// Newest month.
    #[must_use]
    pub const fn last(&self) -> MonthKey {
        self.months[WINDOW_MONTHS - 1]
    }

    /// Folds store totals into one zeroed bucket per window month.
    ///
    /// Totals for months outside the window are ignored.
    #[must_use]
    pub fn fold(&self, totals: &[MonthlyTotal]) -> Vec<MonthBucket> {
        let mut buckets: Vec<MonthBucket> =
            self.months.iter().copied().map(MonthBucket::empty).collect();

        for row in totals {
            let Some(bucket) = buckets.iter_mut().find(|b| b.month == row.month) else {
                continue;
            };
            match row.kind {
                TransactionKind::Income => bucket.income += row.total,
                TransactionKind::Expense => bucket.expense += row.total,
            }
        }
        buckets
    }
}

/// Income and expense totals of one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBucket {
    /// Month.
    pub month: MonthKey,
    /// Sum of income.
    pub income: Decimal,
    /// Sum of expenses.
    pub expense: Decimal,
}

impl MonthBucket {
    /// A bucket with no activity.
    #[must_use]
    pub const fn empty(month: MonthKey) -> Self {
        Self {
            month,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
        }
    }
}

/// Mean expense of the last [`FORECAST_MONTHS`] buckets, rounded to cents.
///
/// Zero when there are no buckets.
#[must_use]
pub fn forecast(buckets: &[MonthBucket]) -> Decimal {
    let recent = &buckets[buckets.len().saturating_sub(FORECAST_MONTHS)..];
    if recent.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = recent.iter().map(|b| b.expense).sum();
    round_money(total / Decimal::from(recent.len()))
}

/// The premium analytics payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendReport {
    /// Heading.
    pub title: String,
    /// Sentence embedding the forecast.
    pub description: String,
    /// Window buckets, oldest first.
    pub buckets: Vec<MonthBucket>,
    /// Next month's expected expense.
    pub forecast: Decimal,
}

impl TrendReport {
    /// Builds the report from window buckets.
    #[must_use]
    pub fn from_buckets(buckets: Vec<MonthBucket>) -> Self {
        let forecast = forecast(&buckets);
        Self {
            title: TREND_TITLE.to_string(),
            description: format!(
                "Based on your recent activity, we forecast your expenses next month to be roughly ${forecast:.2}. Below is your {}-month trend.",
                buckets.len()
            ),
            buckets,
            forecast,
        }
    }

    /// Month labels, oldest first.
    #[must_use]
    pub fn chart_labels(&self) -> Vec<&'static str> {
        self.buckets.iter().map(|b| b.month.label()).collect()
    }

    /// Income per month, rounded to cents.
    #[must_use]
    pub fn chart_income(&self) -> Vec<Decimal> {
        self.buckets.iter().map(|b| round_money(b.income)).collect()
    }

    /// Expense per month, rounded to cents.
    #[must_use]
    pub fn chart_expense(&self) -> Vec<Decimal> {
        self.buckets.iter().map(|b| round_money(b.expense)).collect()
    }
}
