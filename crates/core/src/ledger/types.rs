//! Ledger domain types for journal validation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amount::{AmountError, checked_add};

/// Side of a journal line.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

/// Header fields of a journal entry as supplied by a caller.
#[derive(Debug, Clone, Default)]
pub struct JournalHeaderInput {
    /// Transaction date; required.
    pub journal_date: Option<DateTime<Utc>>,
    /// Originating document type; absent for manual entries.
    pub source_type: Option<String>,
    /// Originating document id; must accompany `source_type`.
    pub source_id: Option<Uuid>,
}

impl JournalHeaderInput {
    /// Manual entries are those without a source document.
    #[must_use]
    pub fn is_manual(&self) -> bool {
        self.source_type.as_deref().is_none_or(|s| s.trim().is_empty())
    }
}

/// One journal line as supplied by a caller, amount still a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    /// Account to post against.
    pub account_id: Uuid,
    /// Debit or credit.
    pub side: Side,
    /// Decimal string amount, must be > 0.
    pub amount: String,
    /// Optional cost center attribution.
    #[serde(default)]
    pub cost_center_id: Option<Uuid>,
    /// Optional line description.
    #[serde(default)]
    pub description: Option<String>,
}

/// A validated line ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine {
    /// Zero-based position in the entry, preserving input order.
    pub position: i32,
    /// Account to post against.
    pub account_id: Uuid,
    /// Debit or credit.
    pub side: Side,
    /// Parsed amount.
    pub amount: Decimal,
    /// Optional cost center attribution.
    pub cost_center_id: Option<Uuid>,
    /// Optional line description.
    pub description: Option<String>,
}

/// Debit and credit totals of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JournalTotals {
    /// Sum of debit amounts.
    pub debit: Decimal,
    /// Sum of credit amounts.
    pub credit: Decimal,
}

impl JournalTotals {
    /// Accumulates totals over resolved lines.
    ///
    /// # Errors
    ///
    /// Returns `Overflow` when a side's total leaves the decimal range.
    pub fn of(lines: &[ResolvedLine]) -> Result<Self, AmountError> {
        lines.iter().try_fold(Self::default(), |mut acc, line| {
            match line.side {
                Side::Debit => acc.debit = checked_add("debit total", acc.debit, line.amount)?,
                Side::Credit => {
                    acc.credit = checked_add("credit total", acc.credit, line.amount)?;
                }
            }
            Ok(acc)
        })
    }

    /// Exact comparison; `100.0` and `100.00` are equal, nothing is rounded.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit == self.credit
    }
}

/// What the validator needs to know about an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// The account ID.
    pub id: Uuid,
    /// Upper-case status name (`ACTIVE`, `INACTIVE`, `ARCHIVED`).
    pub status: String,
    /// Whether manual journal entries may post to the account.
    pub allow_manual_journal: bool,
}

impl AccountInfo {
    /// Only `ACTIVE` accounts accept postings.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == "ACTIVE"
    }
}
