//! Accruals.

use ledgerline_core::amount::require_positive;
use ledgerline_core::period::validate_open_range;
use ledgerline_db::Gateway;
use ledgerline_db::entities::accruals;
use ledgerline_db::entities::sea_orm_active_enums::AccrualStatus;
use ledgerline_db::repositories::{AccountRepository, AccrualInput, AccrualRepository};
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use tracing::{debug, info};
use uuid::Uuid;

fn validate(input: &AccrualInput) -> AppResult<()> {
    if input.description.trim().is_empty() {
        return Err(AppError::missing_field("description"));
    }
    require_positive("amount", input.amount)?;
    validate_open_range(
        "accrual_date",
        Some(input.accrual_date),
        "reversal_date",
        input.reversal_date,
    )?;
    Ok(())
}

/// Accrual service.
#[derive(Debug, Clone)]
pub struct AccrualService {
    gateway: Gateway,
    events: EventPublisher,
}

impl AccrualService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Records an accrual against an existing account.
    pub async fn create(&self, ctx: &RequestContext, input: AccrualInput) -> AppResult<accruals::Model> {
        validate(&input)?;
        let actor = ctx.actor();

        let accrual = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    AccountRepository::new(txn).get(input.account_id).await?;
                    let accrual = AccrualRepository::new(txn).create(input, actor).await?;
                    Ok::<_, AppError>(accrual)
                })
            }))
            .await?;

        info!(accrual_id = %accrual.id, amount = %accrual.amount, "Accrual created");
        self.events.accrual_created(ctx, &accrual).await;
        Ok(accrual)
    }

    /// Fetches an accrual.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<accruals::Model> {
        ctx.run(async {
            AccrualRepository::new(self.gateway.connection())
                .get(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Lists accruals, optionally in one status.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        status: Option<AccrualStatus>,
        page: Page,
    ) -> AppResult<PageResponse<accruals::Model>> {
        ctx.run(async {
            let (items, total) = AccrualRepository::new(self.gateway.connection())
                .list(status, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Rewrites an accrual, including reversing it.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        revision: i64,
        input: AccrualInput,
    ) -> AppResult<accruals::Model> {
        validate(&input)?;
        let actor = ctx.actor();

        let accrual = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    AccountRepository::new(txn).get(input.account_id).await?;
                    let accrual = AccrualRepository::new(txn)
                        .update(id, revision, input, actor)
                        .await?;
                    Ok::<_, AppError>(accrual)
                })
            }))
            .await?;

        info!(
            accrual_id = %accrual.id,
            revision = accrual.revision,
            status = ?accrual.status,
            "Accrual updated"
        );
        self.events.accrual_updated(ctx, &accrual).await;
        Ok(accrual)
    }

    /// Deletes an accrual. A missing id is not an error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(async {
                AccrualRepository::new(self.gateway.connection())
                    .delete(id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(accrual_id = %id, "Accrual deleted");
            self.events.accrual_deleted(ctx, id).await;
        } else {
            debug!(accrual_id = %id, "Accrual already absent");
        }
        Ok(())
    }
}
