//! Cross-module finance event log.

use ledgerline_core::amount::check_optional_money;
use ledgerline_db::Gateway;
use ledgerline_db::entities::finance_events;
use ledgerline_db::entities::sea_orm_active_enums::FinanceEventType;
use ledgerline_db::repositories::{FinanceEventInput, FinanceEventRepository};
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use tracing::info;
use uuid::Uuid;

/// Finance event service.
#[derive(Debug, Clone)]
pub struct FinanceEventService {
    gateway: Gateway,
    events: EventPublisher,
}

impl FinanceEventService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Persists an event of `event_type` and publishes it.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        event_type: FinanceEventType,
        input: FinanceEventInput,
    ) -> AppResult<finance_events::Model> {
        if input.organization_id.is_nil() {
            return Err(AppError::missing_field("organization_id"));
        }
        check_optional_money("amount", input.amount)?;
        let actor = ctx.actor();

        let event = ctx
            .run(async {
                FinanceEventRepository::new(self.gateway.connection())
                    .record(event_type, input, actor)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        info!(
            finance_event_id = %event.id,
            organization_id = %event.organization_id,
            event_type = ?event.event_type,
            "Finance event recorded"
        );
        self.events.finance_event_recorded(ctx, &event).await;
        Ok(event)
    }

    /// Records `INVOICE_CREATED`.
    pub async fn record_invoice_created(
        &self,
        ctx: &RequestContext,
        input: FinanceEventInput,
    ) -> AppResult<finance_events::Model> {
        self.record(ctx, FinanceEventType::InvoiceCreated, input).await
    }

    /// Records `PAYMENT_RECEIVED`.
    pub async fn record_payment_received(
        &self,
        ctx: &RequestContext,
        input: FinanceEventInput,
    ) -> AppResult<finance_events::Model> {
        self.record(ctx, FinanceEventType::PaymentReceived, input).await
    }

    /// Records `INVENTORY_COST_POSTED`.
    pub async fn record_inventory_cost_posted(
        &self,
        ctx: &RequestContext,
        input: FinanceEventInput,
    ) -> AppResult<finance_events::Model> {
        self.record(ctx, FinanceEventType::InventoryCostPosted, input).await
    }

    /// Records `PAYROLL_POSTED`.
    pub async fn record_payroll_posted(
        &self,
        ctx: &RequestContext,
        input: FinanceEventInput,
    ) -> AppResult<finance_events::Model> {
        self.record(ctx, FinanceEventType::PayrollPosted, input).await
    }

    /// Records `VENDOR_BILL_APPROVED`.
    pub async fn record_vendor_bill_approved(
        &self,
        ctx: &RequestContext,
        input: FinanceEventInput,
    ) -> AppResult<finance_events::Model> {
        self.record(ctx, FinanceEventType::VendorBillApproved, input).await
    }

    /// Events of one organization, most recent first.
    pub async fn list_by_organization(
        &self,
        ctx: &RequestContext,
        organization_id: Uuid,
        event_type: Option<FinanceEventType>,
        page: Page,
    ) -> AppResult<PageResponse<finance_events::Model>> {
        ctx.run(async {
            let (items, total) = FinanceEventRepository::new(self.gateway.connection())
                .list_by_organization(organization_id, event_type, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }
}
