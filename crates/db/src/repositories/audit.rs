//! Append-only audit trail.

use chrono::{DateTime, Utc};
use ledgerline_shared::types::Page;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::audit_events;
use crate::error::GatewayError;

/// A new audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventInput {
    /// Acting user.
    pub user_id: Uuid,
    /// What was done, e.g. `account.update`.
    pub action: String,
    /// Kind of the affected resource.
    #[serde(default)]
    pub resource_type: Option<String>,
    /// Id of the affected resource.
    #[serde(default)]
    pub resource_id: Option<String>,
    /// Free-form details.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    /// When it happened; defaults to now.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Audit filter. Unset fields match anything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilter {
    /// Acting user.
    pub user_id: Option<Uuid>,
    /// Exact action.
    pub action: Option<String>,
    /// Resource kind.
    pub resource_type: Option<String>,
    /// Resource id.
    pub resource_id: Option<String>,
    /// Earliest occurrence, inclusive.
    pub from: Option<DateTime<Utc>>,
    /// Latest occurrence, inclusive.
    pub to: Option<DateTime<Utc>>,
}

/// Audit repository.
#[derive(Debug)]
pub struct AuditRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> AuditRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Appends a record.
    pub async fn record(&self, input: AuditEventInput) -> Result<audit_events::Model, GatewayError> {
        let now = Utc::now();
        let row = audit_events::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id),
            action: Set(input.action),
            resource_type: Set(input.resource_type),
            resource_id: Set(input.resource_id),
            details: Set(input.details),
            occurred_at: Set(input.occurred_at.unwrap_or(now)),
            created_at: Set(now),
        };
        Ok(row.insert(self.db).await?)
    }

    /// Fetches a record by id.
    pub async fn get(&self, id: Uuid) -> Result<audit_events::Model, GatewayError> {
        audit_events::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| GatewayError::not_found("audit event", id))
    }

    /// Records matching `filter`, most recent first.
    pub async fn filter(
        &self,
        filter: &AuditFilter,
        page: Page,
    ) -> Result<(Vec<audit_events::Model>, u64), GatewayError> {
        let mut query = audit_events::Entity::find();
        if let Some(user_id) = filter.user_id {
            query = query.filter(audit_events::Column::UserId.eq(user_id));
        }
        if let Some(action) = &filter.action {
            query = query.filter(audit_events::Column::Action.eq(action.as_str()));
        }
        if let Some(resource_type) = &filter.resource_type {
            query = query.filter(audit_events::Column::ResourceType.eq(resource_type.as_str()));
        }
        if let Some(resource_id) = &filter.resource_id {
            query = query.filter(audit_events::Column::ResourceId.eq(resource_id.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(audit_events::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(audit_events::Column::OccurredAt.lte(to));
        }
        let query = query
            .order_by_desc(audit_events::Column::OccurredAt)
            .order_by_desc(audit_events::Column::Id);
        audited::fetch_page(self.db, query, page).await
    }

    /// Every record, most recent first.
    pub async fn list(&self, page: Page) -> Result<(Vec<audit_events::Model>, u64), GatewayError> {
        self.filter(&AuditFilter::default(), page).await
    }
}
