//! Cash-flow forecasts.

use chrono::{DateTime, Utc};
use ledgerline_shared::types::Page;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::cash_flow_forecasts;
use crate::error::GatewayError;

/// Writable fields of a forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowForecastInput {
    /// Organization the forecast belongs to.
    pub organization_id: Uuid,
    /// Period start.
    pub period_start: DateTime<Utc>,
    /// Period end; not before `period_start`.
    pub period_end: DateTime<Utc>,
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Cash at period start.
    #[serde(default)]
    pub opening_balance: Decimal,
    /// Expected receipts.
    #[serde(default)]
    pub projected_inflow: Decimal,
    /// Expected payments.
    #[serde(default)]
    pub projected_outflow: Decimal,
    /// Free-form breakdown.
    #[serde(default)]
    pub detail: serde_json::Value,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// Cash-flow forecast repository.
#[derive(Debug)]
pub struct CashFlowRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CashFlowRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn changes(input: CashFlowForecastInput) -> cash_flow_forecasts::ActiveModel {
        cash_flow_forecasts::ActiveModel {
            organization_id: Set(input.organization_id),
            period_start: Set(input.period_start),
            period_end: Set(input.period_end),
            currency: Set(input.currency),
            opening_balance: Set(input.opening_balance),
            projected_inflow: Set(input.projected_inflow),
            projected_outflow: Set(input.projected_outflow),
            detail: Set(input.detail),
            ..Default::default()
        }
    }

    /// Inserts a forecast.
    pub async fn create(
        &self,
        input: CashFlowForecastInput,
        actor: Option<Uuid>,
    ) -> Result<cash_flow_forecasts::Model, GatewayError> {
        audited::insert_new::<cash_flow_forecasts::Entity, _, _>(self.db, Self::changes(input), actor)
            .await
    }

    /// Fetches a forecast by id.
    pub async fn get(&self, id: Uuid) -> Result<cash_flow_forecasts::Model, GatewayError> {
        audited::get::<cash_flow_forecasts::Entity, _>(self.db, id).await
    }

    /// Lists forecasts newest first, optionally for one organization.
    pub async fn list(
        &self,
        organization_id: Option<Uuid>,
        page: Page,
    ) -> Result<(Vec<cash_flow_forecasts::Model>, u64), GatewayError> {
        let mut query = cash_flow_forecasts::Entity::find();
        if let Some(organization_id) = organization_id {
            query = query.filter(cash_flow_forecasts::Column::OrganizationId.eq(organization_id));
        }
        let query = query
            .order_by_desc(cash_flow_forecasts::Column::CreatedAt)
            .order_by_desc(cash_flow_forecasts::Column::Id);
        audited::fetch_page(self.db, query, page).await
    }

    /// Rewrites every writable field if `revision` still matches.
    pub async fn update(
        &self,
        id: Uuid,
        revision: i64,
        input: CashFlowForecastInput,
        actor: Option<Uuid>,
    ) -> Result<cash_flow_forecasts::Model, GatewayError> {
        audited::update_checked::<cash_flow_forecasts::Entity, _, _>(
            self.db,
            id,
            revision,
            Self::changes(input),
            actor,
        )
        .await
    }

    /// Deletes a forecast.
    pub async fn delete(&self, id: Uuid) -> Result<bool, GatewayError> {
        audited::delete::<cash_flow_forecasts::Entity, _>(self.db, id).await
    }
}
