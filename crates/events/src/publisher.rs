//! Domain event publisher.
//!
//! Services call one typed method per event after their transaction commits.
//! Every method is best-effort: serialization or transport failures are logged
//! with topic, key and entity id and then dropped.

use std::sync::Arc;

use ledgerline_db::entities::sea_orm_active_enums::FinanceEventType;
use ledgerline_db::entities::{
    accounts, accruals, allocation_rules, audit_events, budget_allocations, budgets,
    cash_flow_forecasts, consolidations, cost_allocations, cost_centers, credit_debit_notes,
    exchange_rates, expenses, finance_events, gst_breakups, gst_doc_statuses, gst_regimes,
    invoice_discounts, invoice_items, invoice_taxes, invoices, payments,
};
use ledgerline_db::repositories::JournalEntryWithLines;
use ledgerline_shared::RequestContext;
use ledgerline_shared::config::{EventsConfig, TransportKind};
use serde::Serialize;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::topic::Topic;
use crate::transport::{InMemoryTransport, LoggingTransport, MessageTransport, TransportError};

/// Payload of every `<entity>.deleted` message.
#[derive(Debug, Clone, Copy, Serialize)]
struct Deleted {
    id: Uuid,
}

/// Publishes domain events to a shared transport.
#[derive(Clone)]
pub struct EventPublisher {
    transport: Arc<dyn MessageTransport>,
}

impl std::fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPublisher").finish_non_exhaustive()
    }
}

impl EventPublisher {
    /// Wraps an existing transport.
    #[must_use]
    pub fn new(transport: Arc<dyn MessageTransport>) -> Self {
        Self { transport }
    }

    /// Publisher backed by a fresh in-memory transport, returned alongside it.
    #[must_use]
    pub fn in_memory() -> (Self, Arc<InMemoryTransport>) {
        let transport = Arc::new(InMemoryTransport::new());
        (Self::new(transport.clone()), transport)
    }

    /// Builds the transport selected by configuration.
    ///
    /// # Errors
    ///
    /// Returns `Config` when Kafka is selected but unavailable or misconfigured.
    pub fn from_config(config: &EventsConfig) -> Result<Self, TransportError> {
        let transport: Arc<dyn MessageTransport> = match config.transport {
            TransportKind::Log => Arc::new(LoggingTransport),
            TransportKind::Memory => Arc::new(InMemoryTransport::new()),
            #[cfg(feature = "kafka")]
            TransportKind::Kafka => Arc::new(crate::transport::KafkaTransport::new(config)?),
            #[cfg(not(feature = "kafka"))]
            TransportKind::Kafka => {
                return Err(TransportError::Config(
                    "built without the kafka feature".into(),
                ));
            }
        };
        Ok(Self::new(transport))
    }

    /// Flushes and releases the transport.
    pub async fn shutdown(&self) {
        if let Err(e) = self.transport.close().await {
            error!(error = %e, "Failed to close event transport");
        }
    }

    /// Serializes `payload` and sends it, unless `ctx` is cancelled first.
    pub async fn publish<T>(
        &self,
        ctx: &RequestContext,
        topic: Topic,
        key: &str,
        entity_id: Uuid,
        payload: &T,
    ) where
        T: Serialize + ?Sized,
    {
        let bytes = match serde_json::to_vec(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(topic = %topic, key = %key, entity_id = %entity_id, error = %e, "Failed to serialize event");
                return;
            }
        };

        tokio::select! {
            biased;
            () = ctx.cancellation().cancelled() => {
                debug!(topic = %topic, key = %key, entity_id = %entity_id, "Event abandoned on cancellation");
            }
            result = self.transport.send(topic, key, bytes) => {
                if let Err(e) = result {
                    warn!(topic = %topic, key = %key, entity_id = %entity_id, error = %e, "Failed to publish event");
                }
            }
        }
    }

    /// Publishes `journal.created` with header and lines.
    pub async fn journal_created(&self, ctx: &RequestContext, journal: &JournalEntryWithLines) {
        self.publish(ctx, Topic::Journals, "journal.created", journal.entry.id, journal)
            .await;
    }

    /// Publishes `journal.updated` with the rewritten snapshot.
    pub async fn journal_updated(&self, ctx: &RequestContext, journal: &JournalEntryWithLines) {
        self.publish(ctx, Topic::Journals, "journal.updated", journal.entry.id, journal)
            .await;
    }

    /// Publishes `journal.deleted`.
    pub async fn journal_deleted(&self, ctx: &RequestContext, id: Uuid) {
        self.publish(ctx, Topic::Journals, "journal.deleted", id, &Deleted { id })
            .await;
    }

    /// Publishes `payment.paid`.
    pub async fn payment_paid(&self, ctx: &RequestContext, payment: &payments::Model) {
        self.publish(ctx, Topic::Invoices, "payment.paid", payment.id, payment)
            .await;
    }

    /// Publishes `budget_allocation.created`.
    pub async fn budget_allocation_created(
        &self,
        ctx: &RequestContext,
        allocation: &budget_allocations::Model,
    ) {
        self.publish(
            ctx,
            Topic::Budgets,
            "budget_allocation.created",
            allocation.id,
            allocation,
        )
        .await;
    }

    /// Publishes `audit.recorded` from a detached task.
    ///
    /// The send runs under a fresh background context so the caller's
    /// cancellation or deadline cannot abort it.
    pub fn audit_recorded(&self, event: &audit_events::Model) {
        let id = event.id;
        let payload = match serde_json::to_value(event) {
            Ok(value) => value,
            Err(e) => {
                error!(topic = %Topic::Audit, key = "audit.recorded", entity_id = %id, error = %e, "Failed to serialize event");
                return;
            }
        };
        let publisher = self.clone();
        tokio::spawn(async move {
            let ctx = RequestContext::background();
            publisher
                .publish(&ctx, Topic::Audit, "audit.recorded", id, &payload)
                .await;
        });
    }

    /// Publishes a finance event under the key of its kind.
    pub async fn finance_event_recorded(&self, ctx: &RequestContext, event: &finance_events::Model) {
        self.publish(
            ctx,
            Topic::FinanceEvents,
            finance_event_key(event.event_type),
            event.id,
            event,
        )
        .await;
    }
}

/// Message key for a finance event kind.
#[must_use]
pub const fn finance_event_key(kind: FinanceEventType) -> &'static str {
    match kind {
        FinanceEventType::InvoiceCreated => "invoice.created",
        FinanceEventType::PaymentReceived => "payment.received",
        FinanceEventType::InventoryCostPosted => "inventory_cost.posted",
        FinanceEventType::PayrollPosted => "payroll.posted",
        FinanceEventType::VendorBillApproved => "vendor_bill.approved",
    }
}

/// Generates `created`, `updated` and `deleted` methods for entities whose
/// model carries an `id`.
macro_rules! entity_events {
    ($($entity:literal => $topic:expr, $model:ty { $created:ident, $updated:ident, $deleted:ident })*) => {
        impl EventPublisher {
            $(
                #[doc = concat!("Publishes `", $entity, ".created`.")]
                pub async fn $created(&self, ctx: &RequestContext, model: &$model) {
                    self.publish(ctx, $topic, concat!($entity, ".created"), model.id, model).await;
                }

                #[doc = concat!("Publishes `", $entity, ".updated`.")]
                pub async fn $updated(&self, ctx: &RequestContext, model: &$model) {
                    self.publish(ctx, $topic, concat!($entity, ".updated"), model.id, model).await;
                }

                #[doc = concat!("Publishes `", $entity, ".deleted`.")]
                pub async fn $deleted(&self, ctx: &RequestContext, id: Uuid) {
                    self.publish(ctx, $topic, concat!($entity, ".deleted"), id, &Deleted { id }).await;
                }
            )*
        }
    };
}

/// Same as `entity_events!` for records that are never updated in place.
macro_rules! child_events {
    ($($entity:literal => $topic:expr, $model:ty { $created:ident, $deleted:ident })*) => {
        impl EventPublisher {
            $(
                #[doc = concat!("Publishes `", $entity, ".created`.")]
                pub async fn $created(&self, ctx: &RequestContext, model: &$model) {
                    self.publish(ctx, $topic, concat!($entity, ".created"), model.id, model).await;
                }

                #[doc = concat!("Publishes `", $entity, ".deleted`.")]
                pub async fn $deleted(&self, ctx: &RequestContext, id: Uuid) {
                    self.publish(ctx, $topic, concat!($entity, ".deleted"), id, &Deleted { id }).await;
                }
            )*
        }
    };
}

entity_events! {
    "account" => Topic::Accounts, accounts::Model { account_created, account_updated, account_deleted }
    "invoice" => Topic::Invoices, invoices::Model { invoice_created, invoice_updated, invoice_deleted }
    "gst_breakup" => Topic::Gst, gst_breakups::Model { gst_breakup_created, gst_breakup_updated, gst_breakup_deleted }
    "gst_regime" => Topic::Gst, gst_regimes::Model { gst_regime_created, gst_regime_updated, gst_regime_deleted }
    "gst_doc_status" => Topic::Gst, gst_doc_statuses::Model { gst_doc_status_created, gst_doc_status_updated, gst_doc_status_deleted }
    "credit_debit_note" => Topic::CreditDebitNotes, credit_debit_notes::Model { credit_debit_note_created, credit_debit_note_updated, credit_debit_note_deleted }
    "budget" => Topic::Budgets, budgets::Model { budget_created, budget_updated, budget_deleted }
    "expense" => Topic::Expenses, expenses::Model { expense_created, expense_updated, expense_deleted }
    "cost_center" => Topic::CostCenters, cost_centers::Model { cost_center_created, cost_center_updated, cost_center_deleted }
    "cost_allocation" => Topic::Allocations, cost_allocations::Model { cost_allocation_created, cost_allocation_updated, cost_allocation_deleted }
    "allocation_rule" => Topic::Allocations, allocation_rules::Model { allocation_rule_created, allocation_rule_updated, allocation_rule_deleted }
    "cash_flow_forecast" => Topic::CashFlow, cash_flow_forecasts::Model { cash_flow_forecast_created, cash_flow_forecast_updated, cash_flow_forecast_deleted }
    "consolidation" => Topic::Consolidations, consolidations::Model { consolidation_created, consolidation_updated, consolidation_deleted }
    "exchange_rate" => Topic::ExchangeRates, exchange_rates::Model { exchange_rate_created, exchange_rate_updated, exchange_rate_deleted }
    "accrual" => Topic::Accruals, accruals::Model { accrual_created, accrual_updated, accrual_deleted }
}

child_events! {
    "invoice_item" => Topic::Invoices, invoice_items::Model { invoice_item_created, invoice_item_deleted }
    "invoice_tax" => Topic::Invoices, invoice_taxes::Model { invoice_tax_created, invoice_tax_deleted }
    "invoice_discount" => Topic::Invoices, invoice_discounts::Model { invoice_discount_created, invoice_discount_deleted }
    "payment" => Topic::Invoices, payments::Model { payment_created, payment_deleted }
}
