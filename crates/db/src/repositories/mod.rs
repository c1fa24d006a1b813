//! Repository abstractions for data access.
//!
//! Each repository borrows a connection, which may be the shared pool or an
//! open transaction, so the same code serves single statements and
//! multi-statement units of work.

pub mod account;
pub mod accrual;
pub mod allocation_rule;
pub mod audit;
pub mod audited;
pub mod budget;
pub mod cash_flow;
pub mod consolidation;
pub mod cost_allocation;
pub mod cost_center;
pub mod credit_debit_note;
pub mod exchange_rate;
pub mod expense;
pub mod finance_event;
pub mod gst;
pub mod invoice;
pub mod journal;
pub mod payment;

pub use account::{AccountFilter, AccountInput, AccountRepository};
pub use accrual::{AccrualInput, AccrualRepository};
pub use allocation_rule::{AllocationRuleInput, AllocationRuleRepository, targets_of};
pub use audit::{AuditEventInput, AuditFilter, AuditRepository};
pub use budget::{BudgetAllocationInput, BudgetInput, BudgetRepository};
pub use cash_flow::{CashFlowForecastInput, CashFlowRepository};
pub use consolidation::{ConsolidationInput, ConsolidationRepository};
pub use cost_allocation::{CostAllocationFilter, CostAllocationInput, CostAllocationRepository};
pub use cost_center::{CostCenterInput, CostCenterRepository};
pub use credit_debit_note::{CreditDebitNoteInput, CreditDebitNoteRepository};
pub use exchange_rate::{ExchangeRateFilter, ExchangeRateInput, ExchangeRateRepository};
pub use expense::{ExpenseFilter, ExpenseInput, ExpenseRepository};
pub use finance_event::{FinanceEventInput, FinanceEventRepository};
pub use gst::{GstBreakupInput, GstDocStatusInput, GstRegimeInput, GstRepository};
pub use invoice::{
    InvoiceDiscountInput, InvoiceFilter, InvoiceInput, InvoiceItemInput, InvoiceRepository,
    InvoiceTaxInput,
};
pub use journal::{JournalEntryWithLines, JournalHeader, JournalRepository, LedgerEntry, Posting};
pub use payment::{PaymentInput, PaymentRepository};
