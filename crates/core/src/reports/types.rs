//! Report data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregated postings of one account, as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountTotals {
    /// Account ID.
    pub account_id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type (`ASSET`, `LIABILITY`, `EQUITY`, `REVENUE`, `EXPENSE`).
    pub account_type: String,
    /// Sum of debit lines.
    pub total_debit: Decimal,
    /// Sum of credit lines.
    pub total_credit: Decimal,
}

/// One trial balance row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceLine {
    /// Account ID.
    pub account_id: Uuid,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: String,
    /// Total debit amount.
    pub total_debit: Decimal,
    /// Total credit amount.
    pub total_credit: Decimal,
    /// Balance on the account's normal side.
    pub balance: Decimal,
    /// Non-authoritative `balance`.
    pub balance_approx: f64,
}

/// Trial balance totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total debit.
    pub total_debit: Decimal,
    /// Total credit.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
    /// Non-authoritative `total_debit`.
    pub total_debit_approx: f64,
    /// Non-authoritative `total_credit`.
    pub total_credit_approx: f64,
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Report type identifier.
    pub report_type: String,
    /// Rows ordered by account code.
    pub accounts: Vec<TrialBalanceLine>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}

/// Aggregated expenses of one category, as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRow {
    /// Category; empty for uncategorized.
    pub category: String,
    /// Number of expenses.
    pub count: i64,
    /// Sum of amounts.
    pub total: Decimal,
}

/// One category of the expense summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Category name.
    pub category: String,
    /// Number of expenses.
    pub count: i64,
    /// Sum of amounts.
    pub total: Decimal,
    /// Non-authoritative `total`.
    pub total_approx: f64,
}

/// Expense summary report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseSummaryReport {
    /// Report type identifier.
    pub report_type: String,
    /// Categories ordered by name.
    pub categories: Vec<CategoryTotal>,
    /// Number of expenses.
    pub expense_count: i64,
    /// Sum over all categories.
    pub grand_total: Decimal,
    /// Non-authoritative `grand_total`.
    pub grand_total_approx: f64,
}
