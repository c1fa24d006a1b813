//! Consolidations of several entities' books over a period.

use ledgerline_core::period::{distinct_non_empty, validate_range};
use ledgerline_db::Gateway;
use ledgerline_db::entities::consolidations;
use ledgerline_db::repositories::{ConsolidationInput, ConsolidationRepository};
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use tracing::{debug, info};
use uuid::Uuid;

fn validate(mut input: ConsolidationInput) -> AppResult<ConsolidationInput> {
    if input.name.trim().is_empty() {
        return Err(AppError::missing_field("name"));
    }
    input.entity_ids = distinct_non_empty("entity_ids", &input.entity_ids)?;
    validate_range("period_start", input.period_start, "period_end", input.period_end)?;
    Ok(input)
}

/// Consolidation service.
#[derive(Debug, Clone)]
pub struct ConsolidationService {
    gateway: Gateway,
    events: EventPublisher,
}

impl ConsolidationService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Creates a consolidation. Duplicate entity ids are collapsed.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: ConsolidationInput,
    ) -> AppResult<consolidations::Model> {
        let input = validate(input)?;
        let actor = ctx.actor();

        let consolidation = ctx
            .run(async {
                ConsolidationRepository::new(self.gateway.connection())
                    .create(input, actor)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        info!(consolidation_id = %consolidation.id, "Consolidation created");
        self.events.consolidation_created(ctx, &consolidation).await;
        Ok(consolidation)
    }

    /// Fetches a consolidation.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<consolidations::Model> {
        ctx.run(async {
            ConsolidationRepository::new(self.gateway.connection())
                .get(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Lists consolidations newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: Page,
    ) -> AppResult<PageResponse<consolidations::Model>> {
        ctx.run(async {
            let (items, total) = ConsolidationRepository::new(self.gateway.connection())
                .list(page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Rewrites a consolidation.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        revision: i64,
        input: ConsolidationInput,
    ) -> AppResult<consolidations::Model> {
        let input = validate(input)?;
        let actor = ctx.actor();

        let consolidation = ctx
            .run(async {
                ConsolidationRepository::new(self.gateway.connection())
                    .update(id, revision, input, actor)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        info!(
            consolidation_id = %consolidation.id,
            revision = consolidation.revision,
            "Consolidation updated"
        );
        self.events.consolidation_updated(ctx, &consolidation).await;
        Ok(consolidation)
    }

    /// Deletes a consolidation. A missing id is not an error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(async {
                ConsolidationRepository::new(self.gateway.connection())
                    .delete(id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(consolidation_id = %id, "Consolidation deleted");
            self.events.consolidation_deleted(ctx, id).await;
        } else {
            debug!(consolidation_id = %id, "Consolidation already absent");
        }
        Ok(())
    }
}
