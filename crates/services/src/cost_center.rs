//! Cost centers.

use ledgerline_db::Gateway;
use ledgerline_db::entities::cost_centers;
use ledgerline_db::repositories::{CostCenterInput, CostCenterRepository};
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use tracing::{debug, info};
use uuid::Uuid;

fn validate(input: &CostCenterInput) -> AppResult<()> {
    if input.code.trim().is_empty() {
        return Err(AppError::missing_field("code"));
    }
    if input.name.trim().is_empty() {
        return Err(AppError::missing_field("name"));
    }
    Ok(())
}

/// Cost center service.
#[derive(Debug, Clone)]
pub struct CostCenterService {
    gateway: Gateway,
    events: EventPublisher,
}

impl CostCenterService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Creates a cost center.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CostCenterInput,
    ) -> AppResult<cost_centers::Model> {
        validate(&input)?;
        let actor = ctx.actor();

        let center = ctx
            .run(async {
                CostCenterRepository::new(self.gateway.connection())
                    .create(input, actor)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        info!(cost_center_id = %center.id, code = %center.code, "Cost center created");
        self.events.cost_center_created(ctx, &center).await;
        Ok(center)
    }

    /// Fetches a cost center.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<cost_centers::Model> {
        ctx.run(async {
            CostCenterRepository::new(self.gateway.connection())
                .get(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Lists cost centers, optionally only active ones.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        active_only: bool,
        page: Page,
    ) -> AppResult<PageResponse<cost_centers::Model>> {
        ctx.run(async {
            let (items, total) = CostCenterRepository::new(self.gateway.connection())
                .list(active_only, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Rewrites a cost center.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        revision: i64,
        input: CostCenterInput,
    ) -> AppResult<cost_centers::Model> {
        validate(&input)?;
        let actor = ctx.actor();

        let center = ctx
            .run(async {
                CostCenterRepository::new(self.gateway.connection())
                    .update(id, revision, input, actor)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        info!(cost_center_id = %center.id, revision = center.revision, "Cost center updated");
        self.events.cost_center_updated(ctx, &center).await;
        Ok(center)
    }

    /// Deletes a cost center. A missing id is not an error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(async {
                CostCenterRepository::new(self.gateway.connection())
                    .delete(id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(cost_center_id = %id, "Cost center deleted");
            self.events.cost_center_deleted(ctx, id).await;
        } else {
            debug!(cost_center_id = %id, "Cost center already absent");
        }
        Ok(())
    }
}
