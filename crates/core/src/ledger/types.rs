//! Ledger record types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{TransactionId, UserId};

use super::error::LedgerError;
use crate::calendar::MonthKey;

/// Largest accepted amount, 999 999 999 999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Checks an amount is a positive whole number of cents within
/// [`MAX_AMOUNT`].
pub fn check_amount(amount: Decimal) -> Result<Decimal, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount);
    }
    if amount > MAX_AMOUNT {
        return Err(LedgerError::AmountTooLarge);
    }
    if amount.normalize().scale() > 2 {
        return Err(LedgerError::AmountPrecision);
    }
    Ok(amount)
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money in.
    Income,
    /// Money out.
    Expense,
}

impl TransactionKind {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(LedgerError::InvalidKind(Some(other.to_string()))),
        }
    }
}

/// A stored transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Free-form label.
    pub text: String,
    /// Positive magnitude. The sign comes from `kind`.
    pub amount: Decimal,
    /// Income or expense.
    pub kind: TransactionKind,
    /// Optional free-form category.
    pub category: Option<String>,
    /// Owning user. Never changes.
    pub owner_id: UserId,
    /// Insertion time. Never changes.
    pub created_at: DateTime<Utc>,
}

/// Unvalidated input for a new transaction, as it arrives from a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionDraft {
    /// Label.
    #[serde(default)]
    pub text: Option<String>,
    /// Amount.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Type name.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Category.
    #[serde(default)]
    pub category: Option<String>,
}

impl TransactionDraft {
    /// Validates the draft.
    ///
    /// Text is trimmed and must be non-empty, the amount must pass
    /// [`check_amount`] and the type must be `income` or `expense`. A blank category
    /// is treated as absent.
    pub fn validate(self) -> Result<NewTransaction, LedgerError> {
        let text = self
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(LedgerError::EmptyText)?
            .to_string();

        let amount = check_amount(self.amount.ok_or(LedgerError::InvalidAmount)?)?;

        let kind = self
            .kind
            .as_deref()
            .ok_or(LedgerError::InvalidKind(None))?
            .parse()?;

        Ok(NewTransaction {
            text,
            amount,
            kind,
            category: normalize_category(self.category),
        })
    }
}

/// A validated transaction, ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    text: String,
    amount: Decimal,
    kind: TransactionKind,
    category: Option<String>,
}

impl NewTransaction {
    /// Label.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Type.
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Category.
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Materialises the stored record.
    #[must_use]
    pub fn into_transaction(
        self,
        id: TransactionId,
        owner_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Transaction {
        Transaction {
            id,
            text: self.text,
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            owner_id,
            created_at,
        }
    }
}

/// Partial update. Only these fields are editable; anything else in the
/// request body is rejected at deserialization.
///
/// `category: null` clears the category, an absent `category` keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionPatch {
    /// New label.
    #[serde(default)]
    pub text: Option<String>,
    /// New amount.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// New type.
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionKind>,
    /// New category, or `Some(None)` to clear it.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub category: Option<Option<String>>,
}

impl TransactionPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none() && self.amount.is_none() && self.kind.is_none() && self.category.is_none()
    }

    /// Checks the same rules as creation for every field present.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if let Some(text) = &self.text
            && text.trim().is_empty()
        {
            return Err(LedgerError::EmptyText);
        }
        if let Some(amount) = self.amount {
            check_amount(amount)?;
        }
        Ok(())
    }

    /// Validates and applies the patch. `id`, `owner_id` and `created_at`
    /// are never touched.
    pub fn apply_to(&self, record: &mut Transaction) -> Result<(), LedgerError> {
        self.validate()?;

        if let Some(text) = &self.text {
            record.text = text.trim().to_string();
        }
        if let Some(amount) = self.amount {
            record.amount = amount;
        }
        if let Some(kind) = self.kind {
            record.kind = kind;
        }
        if let Some(category) = &self.category {
            record.category = normalize_category(category.clone());
        }
        Ok(())
    }
}

/// Store-side sum of one transaction type within one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyTotal {
    /// Calendar month in the reporting zone.
    pub month: MonthKey,
    /// Transaction type.
    pub kind: TransactionKind,
    /// Sum of amounts.
    pub total: Decimal,
}

fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}
