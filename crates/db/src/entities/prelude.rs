//! Entity prelude.

pub use super::accounts::Entity as Accounts;
pub use super::accruals::Entity as Accruals;
pub use super::allocation_rules::Entity as AllocationRules;
pub use super::audit_events::Entity as AuditEvents;
pub use super::budget_allocations::Entity as BudgetAllocations;
pub use super::budgets::Entity as Budgets;
pub use super::cash_flow_forecasts::Entity as CashFlowForecasts;
pub use super::consolidations::Entity as Consolidations;
pub use super::cost_allocations::Entity as CostAllocations;
pub use super::cost_centers::Entity as CostCenters;
pub use super::credit_debit_notes::Entity as CreditDebitNotes;
pub use super::exchange_rates::Entity as ExchangeRates;
pub use super::expenses::Entity as Expenses;
pub use super::finance_events::Entity as FinanceEvents;
pub use super::gst_breakups::Entity as GstBreakups;
pub use super::gst_doc_statuses::Entity as GstDocStatuses;
pub use super::gst_regimes::Entity as GstRegimes;
pub use super::invoice_discounts::Entity as InvoiceDiscounts;
pub use super::invoice_items::Entity as InvoiceItems;
pub use super::invoice_taxes::Entity as InvoiceTaxes;
pub use super::invoices::Entity as Invoices;
pub use super::journal_entries::Entity as JournalEntries;
pub use super::journal_lines::Entity as JournalLines;
pub use super::payments::Entity as Payments;
