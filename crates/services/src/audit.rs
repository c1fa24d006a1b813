//! Append-only audit trail.
//!
//! Recording persists synchronously; publication is handed to a detached task
//! so the caller never waits on the bus.

use ledgerline_core::period::validate_open_range;
use ledgerline_db::Gateway;
use ledgerline_db::entities::audit_events;
use ledgerline_db::repositories::{AuditEventInput, AuditFilter, AuditRepository};
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use tracing::info;
use uuid::Uuid;

/// Audit service.
#[derive(Debug, Clone)]
pub struct AuditService {
    gateway: Gateway,
    events: EventPublisher,
}

impl AuditService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Appends a record. `user_id` and `action` are required.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        input: AuditEventInput,
    ) -> AppResult<audit_events::Model> {
        if input.user_id.is_nil() {
            return Err(AppError::missing_field("user_id"));
        }
        if input.action.trim().is_empty() {
            return Err(AppError::missing_field("action"));
        }

        let event = ctx
            .run(async {
                AuditRepository::new(self.gateway.connection())
                    .record(input)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        info!(audit_id = %event.id, user_id = %event.user_id, action = %event.action, "Audit event recorded");
        self.events.audit_recorded(&event);
        Ok(event)
    }

    /// Fetches a record.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<audit_events::Model> {
        ctx.run(async {
            AuditRepository::new(self.gateway.connection())
                .get(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Every record, most recent first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: Page,
    ) -> AppResult<PageResponse<audit_events::Model>> {
        ctx.run(async {
            let (items, total) = AuditRepository::new(self.gateway.connection())
                .list(page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Records matching every set field of `filter`, most recent first.
    pub async fn filter(
        &self,
        ctx: &RequestContext,
        filter: &AuditFilter,
        page: Page,
    ) -> AppResult<PageResponse<audit_events::Model>> {
        validate_open_range("from", filter.from, "to", filter.to)?;
        ctx.run(async {
            let (items, total) = AuditRepository::new(self.gateway.connection())
                .filter(filter, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }
}
