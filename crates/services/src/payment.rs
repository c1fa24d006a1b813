//! Scheduled payments and invoice reconciliation.

use chrono::{DateTime, Utc};
use ledgerline_core::amount::require_positive;
use ledgerline_core::invoice::{Reconciliation, reconcile};
use ledgerline_db::Gateway;
use ledgerline_db::entities::sea_orm_active_enums::{FinanceEventType, InvoiceStatus, PaymentStatus};
use ledgerline_db::entities::{finance_events, invoices, payments};
use ledgerline_db::repositories::{
    FinanceEventInput, FinanceEventRepository, InvoiceRepository, PaymentInput, PaymentRepository,
};
use ledgerline_events::EventPublisher;
use ledgerline_shared::{AppError, AppResult, RequestContext};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

/// Result of marking a payment as paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaidPayment {
    /// Payment after the update.
    pub payment: payments::Model,
    /// The `PAYMENT_RECEIVED` finance event recorded with it.
    pub finance_event: finance_events::Model,
}

/// Result of a reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// Figures.
    #[serde(flatten)]
    pub figures: Reconciliation,
    /// Invoice status after reconciling.
    pub status: InvoiceStatus,
}

/// Payment service.
#[derive(Debug, Clone)]
pub struct PaymentService {
    gateway: Gateway,
    events: EventPublisher,
}

impl PaymentService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Schedules a pending payment against an existing invoice.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
        input: PaymentInput,
    ) -> AppResult<payments::Model> {
        require_positive("amount", input.amount)?;
        let actor = ctx.actor();

        let payment = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    InvoiceRepository::new(txn).get(invoice_id).await?;
                    let payment = PaymentRepository::new(txn)
                        .create(invoice_id, input, actor)
                        .await?;
                    Ok::<_, AppError>(payment)
                })
            }))
            .await?;

        info!(
            payment_id = %payment.id,
            invoice_id = %invoice_id,
            amount = %payment.amount,
            "Payment scheduled"
        );
        self.events.payment_created(ctx, &payment).await;
        Ok(payment)
    }

    /// Fetches a payment.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<payments::Model> {
        ctx.run(async {
            PaymentRepository::new(self.gateway.connection())
                .get(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Payments of an invoice ordered by due date.
    pub async fn for_invoice(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
    ) -> AppResult<Vec<payments::Model>> {
        ctx.run(async {
            InvoiceRepository::new(self.gateway.connection())
                .get(invoice_id)
                .await?;
            let payments = PaymentRepository::new(self.gateway.connection())
                .for_invoice(invoice_id)
                .await?;
            Ok::<_, AppError>(payments)
        })
        .await
    }

    /// Marks a pending payment as paid and records a `PAYMENT_RECEIVED`
    /// finance event in the same transaction.
    pub async fn mark_paid(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        paid_at: Option<DateTime<Utc>>,
    ) -> AppResult<PaidPayment> {
        let paid_at = paid_at.unwrap_or_else(Utc::now);
        let actor = ctx.actor();

        let paid = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let payments = PaymentRepository::new(txn);
                    let payment = payments.get(id).await?;
                    if payment.status == PaymentStatus::Paid {
                        return Err(AppError::FailedPrecondition(format!(
                            "payment {id} is already paid"
                        )));
                    }
                    let invoice = InvoiceRepository::new(txn).get(payment.invoice_id).await?;
                    let payment = payments
                        .mark_paid(id, payment.revision, paid_at, actor)
                        .await?;
                    let finance_event = FinanceEventRepository::new(txn)
                        .record(
                            FinanceEventType::PaymentReceived,
                            FinanceEventInput {
                                organization_id: invoice.organization_id,
                                reference_id: Some(invoice.id),
                                amount: Some(payment.amount),
                                currency: Some(invoice.currency),
                                payload: json!({
                                    "payment_id": payment.id,
                                    "invoice_number": invoice.invoice_number,
                                }),
                                occurred_at: Some(paid_at),
                            },
                            actor,
                        )
                        .await?;
                    Ok::<_, AppError>(PaidPayment {
                        payment,
                        finance_event,
                    })
                })
            }))
            .await?;

        info!(
            payment_id = %id,
            invoice_id = %paid.payment.invoice_id,
            amount = %paid.payment.amount,
            "Payment marked as paid"
        );
        self.events.payment_paid(ctx, &paid.payment).await;
        self.events
            .finance_event_recorded(ctx, &paid.finance_event)
            .await;
        Ok(paid)
    }

    /// Compares paid payments with the invoice grand total. A fully paid
    /// invoice is moved to `PAID`.
    pub async fn reconcile(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
    ) -> AppResult<ReconcileOutcome> {
        let actor = ctx.actor();

        let (figures, invoice, changed): (Reconciliation, invoices::Model, bool) = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let invoices = InvoiceRepository::new(txn);
                    let invoice = invoices.get(invoice_id).await?;
                    let paid = PaymentRepository::new(txn).paid_amounts(invoice_id).await?;
                    let figures = reconcile(invoice.grand_total, &paid)?;
                    let settle = figures.fully_paid
                        && !paid.is_empty()
                        && invoice.status != InvoiceStatus::Paid
                        && invoice.status != InvoiceStatus::Cancelled;
                    if settle {
                        let invoice = invoices
                            .set_status(invoice_id, invoice.revision, InvoiceStatus::Paid, actor)
                            .await?;
                        return Ok::<_, AppError>((figures, invoice, true));
                    }
                    Ok::<_, AppError>((figures, invoice, false))
                })
            }))
            .await?;

        if changed {
            info!(invoice_id = %invoice_id, paid = %figures.paid, "Invoice settled");
            self.events.invoice_updated(ctx, &invoice).await;
        } else {
            debug!(
                invoice_id = %invoice_id,
                outstanding = %figures.outstanding,
                "Invoice reconciled without status change"
            );
        }
        Ok(ReconcileOutcome {
            figures,
            status: invoice.status,
        })
    }

    /// Deletes a payment. A missing id is not an error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(async {
                PaymentRepository::new(self.gateway.connection())
                    .delete(id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(payment_id = %id, "Payment deleted");
            self.events.payment_deleted(ctx, id).await;
        } else {
            debug!(payment_id = %id, "Payment already absent");
        }
        Ok(())
    }
}
