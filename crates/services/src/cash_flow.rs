//! Cash-flow forecasts.

use ledgerline_core::amount::{check_money, require_non_negative};
use ledgerline_core::currency::normalize_code;
use ledgerline_core::period::validate_range;
use ledgerline_db::Gateway;
use ledgerline_db::entities::cash_flow_forecasts;
use ledgerline_db::repositories::{CashFlowForecastInput, CashFlowRepository};
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use tracing::{debug, info};
use uuid::Uuid;

fn validate(mut input: CashFlowForecastInput) -> AppResult<CashFlowForecastInput> {
    validate_range("period_start", input.period_start, "period_end", input.period_end)?;
    input.currency = normalize_code("currency", &input.currency)?;
    check_money("opening_balance", input.opening_balance)?;
    require_non_negative("projected_inflow", input.projected_inflow)?;
    require_non_negative("projected_outflow", input.projected_outflow)?;
    Ok(input)
}

/// Cash-flow forecast service.
#[derive(Debug, Clone)]
pub struct CashFlowService {
    gateway: Gateway,
    events: EventPublisher,
}

impl CashFlowService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Creates a forecast.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CashFlowForecastInput,
    ) -> AppResult<cash_flow_forecasts::Model> {
        let input = validate(input)?;
        let actor = ctx.actor();

        let forecast = ctx
            .run(async {
                CashFlowRepository::new(self.gateway.connection())
                    .create(input, actor)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        info!(
            forecast_id = %forecast.id,
            organization_id = %forecast.organization_id,
            "Cash-flow forecast created"
        );
        self.events.cash_flow_forecast_created(ctx, &forecast).await;
        Ok(forecast)
    }

    /// Fetches a forecast.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> AppResult<cash_flow_forecasts::Model> {
        ctx.run(async {
            CashFlowRepository::new(self.gateway.connection())
                .get(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Lists forecasts, optionally for one organization.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        organization_id: Option<Uuid>,
        page: Page,
    ) -> AppResult<PageResponse<cash_flow_forecasts::Model>> {
        ctx.run(async {
            let (items, total) = CashFlowRepository::new(self.gateway.connection())
                .list(organization_id, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Rewrites a forecast.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        revision: i64,
        input: CashFlowForecastInput,
    ) -> AppResult<cash_flow_forecasts::Model> {
        let input = validate(input)?;
        let actor = ctx.actor();

        let forecast = ctx
            .run(async {
                CashFlowRepository::new(self.gateway.connection())
                    .update(id, revision, input, actor)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        info!(forecast_id = %forecast.id, revision = forecast.revision, "Cash-flow forecast updated");
        self.events.cash_flow_forecast_updated(ctx, &forecast).await;
        Ok(forecast)
    }

    /// Deletes a forecast. A missing id is not an error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(async {
                CashFlowRepository::new(self.gateway.connection())
                    .delete(id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(forecast_id = %id, "Cash-flow forecast deleted");
            self.events.cash_flow_forecast_deleted(ctx, id).await;
        } else {
            debug!(forecast_id = %id, "Cash-flow forecast already absent");
        }
        Ok(())
    }
}
