//! Bus topics and message keys.

use std::fmt;

/// Topic a message is produced to, one per entity family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Chart of accounts.
    Accounts,
    /// Journal entries.
    Journals,
    /// Invoices, their children and payments.
    Invoices,
    /// GST breakup, regime and document status.
    Gst,
    /// Credit and debit notes.
    CreditDebitNotes,
    /// Budgets and allocations.
    Budgets,
    /// Expenses.
    Expenses,
    /// Cost centers.
    CostCenters,
    /// Cost allocations and allocation rules.
    Allocations,
    /// Cash-flow forecasts.
    CashFlow,
    /// Consolidations.
    Consolidations,
    /// Exchange rates.
    ExchangeRates,
    /// Accruals.
    Accruals,
    /// Audit trail.
    Audit,
    /// Cross-module finance events.
    FinanceEvents,
}

impl Topic {
    /// Every topic.
    pub const ALL: [Self; 15] = [
        Self::Accounts,
        Self::Journals,
        Self::Invoices,
        Self::Gst,
        Self::CreditDebitNotes,
        Self::Budgets,
        Self::Expenses,
        Self::CostCenters,
        Self::Allocations,
        Self::CashFlow,
        Self::Consolidations,
        Self::ExchangeRates,
        Self::Accruals,
        Self::Audit,
        Self::FinanceEvents,
    ];

    /// Topic name on the bus.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::Journals => "journals",
            Self::Invoices => "invoices",
            Self::Gst => "gst",
            Self::CreditDebitNotes => "credit_debit_notes",
            Self::Budgets => "budgets",
            Self::Expenses => "expenses",
            Self::CostCenters => "cost_centers",
            Self::Allocations => "allocations",
            Self::CashFlow => "cash_flow",
            Self::Consolidations => "consolidations",
            Self::ExchangeRates => "exchange_rates",
            Self::Accruals => "accruals",
            Self::Audit => "audit",
            Self::FinanceEvents => "finance_events",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds a `<entity>.<verb>` message key.
#[must_use]
pub fn event_key(entity: &str, verb: &str) -> String {
    format!("{entity}.{verb}")
}
