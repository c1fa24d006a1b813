//! Apportionments of amounts to cost centers.

use chrono::{DateTime, Utc};
use ledgerline_shared::types::Page;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::cost_allocations;
use crate::error::GatewayError;

/// Writable fields of a cost allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostAllocationInput {
    /// Cost center receiving the amount; must exist.
    pub cost_center_id: Uuid,
    /// Kind of the source document, e.g. `EXPENSE`.
    pub reference_type: String,
    /// Source document id.
    pub reference_id: Uuid,
    /// Amount attributed.
    pub amount: Decimal,
    /// Effective date.
    pub allocation_date: DateTime<Utc>,
    /// Rule that produced the allocation, if any.
    #[serde(default)]
    pub rule_id: Option<Uuid>,
}

/// Filter options for listing cost allocations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CostAllocationFilter {
    /// Cost center.
    pub cost_center_id: Option<Uuid>,
    /// Source document kind.
    pub reference_type: Option<String>,
    /// Source document id.
    pub reference_id: Option<Uuid>,
}

/// Cost allocation repository.
#[derive(Debug)]
pub struct CostAllocationRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CostAllocationRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn changes(input: CostAllocationInput) -> cost_allocations::ActiveModel {
        cost_allocations::ActiveModel {
            cost_center_id: Set(input.cost_center_id),
            reference_type: Set(input.reference_type),
            reference_id: Set(input.reference_id),
            amount: Set(input.amount),
            allocation_date: Set(input.allocation_date),
            rule_id: Set(input.rule_id),
            ..Default::default()
        }
    }

    /// Inserts a cost allocation.
    pub async fn create(
        &self,
        input: CostAllocationInput,
        actor: Option<Uuid>,
    ) -> Result<cost_allocations::Model, GatewayError> {
        audited::insert_new::<cost_allocations::Entity, _, _>(self.db, Self::changes(input), actor)
            .await
    }

    /// Inserts several allocations in order. Must run inside a transaction.
    pub async fn create_many(
        &self,
        inputs: Vec<CostAllocationInput>,
        actor: Option<Uuid>,
    ) -> Result<Vec<cost_allocations::Model>, GatewayError> {
        let mut stored = Vec::with_capacity(inputs.len());
        for input in inputs {
            stored.push(self.create(input, actor).await?);
        }
        Ok(stored)
    }

    /// Fetches a cost allocation by id.
    pub async fn get(&self, id: Uuid) -> Result<cost_allocations::Model, GatewayError> {
        audited::get::<cost_allocations::Entity, _>(self.db, id).await
    }

    /// Lists cost allocations newest first.
    pub async fn list(
        &self,
        filter: &CostAllocationFilter,
        page: Page,
    ) -> Result<(Vec<cost_allocations::Model>, u64), GatewayError> {
        let mut query = cost_allocations::Entity::find();
        if let Some(cost_center_id) = filter.cost_center_id {
            query = query.filter(cost_allocations::Column::CostCenterId.eq(cost_center_id));
        }
        if let Some(reference_type) = &filter.reference_type {
            query = query.filter(cost_allocations::Column::ReferenceType.eq(reference_type.as_str()));
        }
        if let Some(reference_id) = filter.reference_id {
            query = query.filter(cost_allocations::Column::ReferenceId.eq(reference_id));
        }
        let query = query
            .order_by_desc(cost_allocations::Column::CreatedAt)
            .order_by_desc(cost_allocations::Column::Id);
        audited::fetch_page(self.db, query, page).await
    }

    /// Rewrites every writable field if `revision` still matches.
    pub async fn update(
        &self,
        id: Uuid,
        revision: i64,
        input: CostAllocationInput,
        actor: Option<Uuid>,
    ) -> Result<cost_allocations::Model, GatewayError> {
        audited::update_checked::<cost_allocations::Entity, _, _>(
            self.db,
            id,
            revision,
            Self::changes(input),
            actor,
        )
        .await
    }

    /// Deletes a cost allocation.
    pub async fn delete(&self, id: Uuid) -> Result<bool, GatewayError> {
        audited::delete::<cost_allocations::Entity, _>(self.db, id).await
    }
}
