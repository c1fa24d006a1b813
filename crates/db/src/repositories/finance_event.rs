//! Append-only log of cross-module finance events.

use chrono::{DateTime, Utc};
use ledgerline_shared::types::Page;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::finance_events;
use crate::entities::sea_orm_active_enums::FinanceEventType;
use crate::error::GatewayError;

/// Body of a finance event; the kind is chosen by the recording operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceEventInput {
    /// Organization the event belongs to.
    pub organization_id: Uuid,
    /// Document the event is about.
    #[serde(default)]
    pub reference_id: Option<Uuid>,
    /// Monetary amount, if any.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// ISO currency code of `amount`.
    #[serde(default)]
    pub currency: Option<String>,
    /// Free-form payload.
    #[serde(default)]
    pub payload: serde_json::Value,
    /// When it happened; defaults to now.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Finance event repository.
#[derive(Debug)]
pub struct FinanceEventRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> FinanceEventRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Appends an event of `event_type`.
    pub async fn record(
        &self,
        event_type: FinanceEventType,
        input: FinanceEventInput,
        actor: Option<Uuid>,
    ) -> Result<finance_events::Model, GatewayError> {
        let now = Utc::now();
        let row = finance_events::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(input.organization_id),
            event_type: Set(event_type),
            reference_id: Set(input.reference_id),
            amount: Set(input.amount),
            currency: Set(input.currency),
            payload: Set(input.payload),
            occurred_at: Set(input.occurred_at.unwrap_or(now)),
            created_at: Set(now),
            created_by: Set(actor),
        };
        Ok(row.insert(self.db).await?)
    }

    /// Events of one organization, most recent first, optionally of one kind.
    pub async fn list_by_organization(
        &self,
        organization_id: Uuid,
        event_type: Option<FinanceEventType>,
        page: Page,
    ) -> Result<(Vec<finance_events::Model>, u64), GatewayError> {
        let mut query = finance_events::Entity::find()
            .filter(finance_events::Column::OrganizationId.eq(organization_id));
        if let Some(event_type) = event_type {
            query = query.filter(finance_events::Column::EventType.eq(event_type));
        }
        let query = query
            .order_by_desc(finance_events::Column::OccurredAt)
            .order_by_desc(finance_events::Column::Id);
        audited::fetch_page(self.db, query, page).await
    }
}
