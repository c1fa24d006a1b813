//! Financial report generation.
//!
//! Decimal totals are authoritative. The `*_approx` floating point mirrors
//! exist for dashboards and must not be fed back into bookkeeping.

pub mod service;
pub mod types;

pub use service::ReportService;
pub use types::{
    AccountTotals, CategoryTotal, ExpenseRow, ExpenseSummaryReport, TrialBalanceLine,
    TrialBalanceReport, TrialBalanceTotals,
};
