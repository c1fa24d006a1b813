//! Domain services for Ledgerline.
//!
//! Every mutating operation follows the same shape: validate the input with
//! the rules in `ledgerline-core`, persist inside a gateway transaction, log
//! the outcome, publish exactly one event after commit, and return the stored
//! record. Reads go straight to the pool. All calls run under the caller's
//! [`RequestContext`](ledgerline_shared::RequestContext), so cancellation and
//! deadlines abort the statement and roll back.

pub mod account;
pub mod accrual;
pub mod allocation;
pub mod audit;
pub mod budget;
pub mod cash_flow;
pub mod consolidation;
pub mod cost_center;
pub mod exchange_rate;
pub mod expense;
pub mod finance_event;
pub mod gst;
pub mod invoice;
pub mod journal;
pub mod note;
pub mod payment;
pub mod report;

pub use account::AccountService;
pub use accrual::AccrualService;
pub use allocation::{AllocationRuleService, ApplyRuleRequest, CostAllocationService};
pub use audit::AuditService;
pub use budget::{BudgetComparisonReport, BudgetService};
pub use cash_flow::CashFlowService;
pub use consolidation::ConsolidationService;
pub use cost_center::CostCenterService;
pub use exchange_rate::ExchangeRateService;
pub use expense::ExpenseService;
pub use finance_event::FinanceEventService;
pub use gst::GstService;
pub use invoice::{InvoiceDetail, InvoiceService, NewInvoice};
pub use journal::{JournalInput, JournalService};
pub use note::CreditDebitNoteService;
pub use payment::{PaidPayment, PaymentService, ReconcileOutcome};
pub use report::ReportQueries;

use ledgerline_db::Gateway;
use ledgerline_events::EventPublisher;

/// One instance of every service over a shared gateway and publisher.
#[derive(Debug, Clone)]
pub struct Services {
    /// Chart of accounts.
    pub accounts: AccountService,
    /// Journal entries and the ledger view.
    pub journals: JournalService,
    /// Invoices and their children.
    pub invoices: InvoiceService,
    /// Scheduled payments and reconciliation.
    pub payments: PaymentService,
    /// Credit and debit notes.
    pub notes: CreditDebitNoteService,
    /// GST records.
    pub gst: GstService,
    /// Budgets and allocations.
    pub budgets: BudgetService,
    /// Expenses.
    pub expenses: ExpenseService,
    /// Cost centers.
    pub cost_centers: CostCenterService,
    /// Cost allocations.
    pub cost_allocations: CostAllocationService,
    /// Allocation rules.
    pub allocation_rules: AllocationRuleService,
    /// Cash-flow forecasts.
    pub cash_flow: CashFlowService,
    /// Consolidations.
    pub consolidations: ConsolidationService,
    /// Exchange rates.
    pub exchange_rates: ExchangeRateService,
    /// Accruals.
    pub accruals: AccrualService,
    /// Audit trail.
    pub audit: AuditService,
    /// Finance event log.
    pub finance_events: FinanceEventService,
    /// Reports.
    pub reports: ReportQueries,
}

impl Services {
    /// Builds every service over `gateway` and `events`.
    #[must_use]
    pub fn new(gateway: &Gateway, events: &EventPublisher) -> Self {
        Self {
            accounts: AccountService::new(gateway.clone(), events.clone()),
            journals: JournalService::new(gateway.clone(), events.clone()),
            invoices: InvoiceService::new(gateway.clone(), events.clone()),
            payments: PaymentService::new(gateway.clone(), events.clone()),
            notes: CreditDebitNoteService::new(gateway.clone(), events.clone()),
            gst: GstService::new(gateway.clone(), events.clone()),
            budgets: BudgetService::new(gateway.clone(), events.clone()),
            expenses: ExpenseService::new(gateway.clone(), events.clone()),
            cost_centers: CostCenterService::new(gateway.clone(), events.clone()),
            cost_allocations: CostAllocationService::new(gateway.clone(), events.clone()),
            allocation_rules: AllocationRuleService::new(gateway.clone(), events.clone()),
            cash_flow: CashFlowService::new(gateway.clone(), events.clone()),
            consolidations: ConsolidationService::new(gateway.clone(), events.clone()),
            exchange_rates: ExchangeRateService::new(gateway.clone(), events.clone()),
            accruals: AccrualService::new(gateway.clone(), events.clone()),
            audit: AuditService::new(gateway.clone(), events.clone()),
            finance_events: FinanceEventService::new(gateway.clone(), events.clone()),
            reports: ReportQueries::new(gateway.clone()),
        }
    }
}
