//! `SeaORM` entity definitions.

pub mod prelude;

pub mod accounts;
pub mod accruals;
pub mod allocation_rules;
pub mod audit_events;
pub mod budget_allocations;
pub mod budgets;
pub mod cash_flow_forecasts;
pub mod consolidations;
pub mod cost_allocations;
pub mod cost_centers;
pub mod credit_debit_notes;
pub mod exchange_rates;
pub mod expenses;
pub mod finance_events;
pub mod gst_breakups;
pub mod gst_doc_statuses;
pub mod gst_regimes;
pub mod invoice_discounts;
pub mod invoice_items;
pub mod invoice_taxes;
pub mod invoices;
pub mod journal_entries;
pub mod journal_lines;
pub mod payments;
pub mod sea_orm_active_enums;
