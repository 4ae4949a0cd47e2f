//! Balance and report aggregation.
//!
//! Sums are kept at full precision. Rounding to cents happens once, at
//! presentation, through [`Totals::rounded`] and [`ReportSummary::rounded`].

use rust_decimal::{Decimal, RoundingStrategy};

use crate::ledger::{Transaction, TransactionKind};

/// Rounds a money value to 2 decimal places, half away from zero.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Income, expense and resulting balance of a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// `total_income - total_expense`.
    pub balance: Decimal,
    /// Sum of income amounts.
    pub total_income: Decimal,
    /// Sum of expense amounts.
    pub total_expense: Decimal,
}

impl Totals {
    /// Copy rounded for display.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            balance: round_money(self.balance),
            total_income: round_money(self.total_income),
            total_expense: round_money(self.total_expense),
        }
    }
}

/// Computes totals over any set of transactions. Empty input is all zero.
pub fn compute_totals<'a, I>(transactions: I) -> Totals
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let (total_income, total_expense) = transactions.into_iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(income, expense), tx| match tx.kind {
            TransactionKind::Income => (income + tx.amount, expense),
            TransactionKind::Expense => (income, expense + tx.amount),
        },
    );

    Totals {
        balance: total_income - total_expense,
        total_income,
        total_expense,
    }
}

/// Summary block of a date-range report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    /// Sum of income amounts.
    pub total_income: Decimal,
    /// Sum of expense amounts.
    pub total_expense: Decimal,
    /// `total_income - total_expense`.
    pub net: Decimal,
}

impl ReportSummary {
    /// Copy rounded for display.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            total_income: round_money(self.total_income),
            total_expense: round_money(self.total_expense),
            net: round_money(self.net),
        }
    }
}

impl From<Totals> for ReportSummary {
    fn from(totals: Totals) -> Self {
        Self {
            total_income: totals.total_income,
            total_expense: totals.total_expense,
            net: totals.balance,
        }
    }
}

/// Transactions of a range together with their summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Newest first.
    pub transactions: Vec<Transaction>,
    /// Totals over `transactions`.
    pub summary: ReportSummary,
}

/// Builds a report: sorts newest first and summarises.
///
/// Records with equal `created_at` are ordered by ID, newest ID first, so
/// the output is deterministic.
#[must_use]
pub fn compute_report(mut transactions: Vec<Transaction>) -> Report {
    transactions.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    let summary = compute_totals(&transactions).into();

    Report {
        transactions,
        summary,
    }
}
