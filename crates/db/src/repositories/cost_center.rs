//! Cost centers.

use ledgerline_shared::types::Page;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::cost_centers;
use crate::error::GatewayError;

/// Writable fields of a cost center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostCenterInput {
    /// Unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether new allocations may target it.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// Cost center repository.
#[derive(Debug)]
pub struct CostCenterRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CostCenterRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn changes(input: CostCenterInput) -> cost_centers::ActiveModel {
        cost_centers::ActiveModel {
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            is_active: Set(input.is_active),
            ..Default::default()
        }
    }

    /// Inserts a cost center.
    pub async fn create(
        &self,
        input: CostCenterInput,
        actor: Option<Uuid>,
    ) -> Result<cost_centers::Model, GatewayError> {
        audited::insert_new::<cost_centers::Entity, _, _>(self.db, Self::changes(input), actor).await
    }

    /// Fetches a cost center by id.
    pub async fn get(&self, id: Uuid) -> Result<cost_centers::Model, GatewayError> {
        audited::get::<cost_centers::Entity, _>(self.db, id).await
    }

    /// Lists cost centers newest first.
    pub async fn list(
        &self,
        active_only: bool,
        page: Page,
    ) -> Result<(Vec<cost_centers::Model>, u64), GatewayError> {
        let mut query = cost_centers::Entity::find();
        if active_only {
            query = query.filter(cost_centers::Column::IsActive.eq(true));
        }
        let query = query
            .order_by_desc(cost_centers::Column::CreatedAt)
            .order_by_desc(cost_centers::Column::Id);
        audited::fetch_page(self.db, query, page).await
    }

    /// Rewrites every writable field if `revision` still matches.
    pub async fn update(
        &self,
        id: Uuid,
        revision: i64,
        input: CostCenterInput,
        actor: Option<Uuid>,
    ) -> Result<cost_centers::Model, GatewayError> {
        audited::update_checked::<cost_centers::Entity, _, _>(
            self.db,
            id,
            revision,
            Self::changes(input),
            actor,
        )
        .await
    }

    /// Deletes a cost center.
    pub async fn delete(&self, id: Uuid) -> Result<bool, GatewayError> {
        audited::delete::<cost_centers::Entity, _>(self.db, id).await
    }

    /// Which of `ids` exist.
    pub async fn existing_ids(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, GatewayError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(cost_centers::Entity::find()
            .select_only()
            .column(cost_centers::Column::Id)
            .filter(cost_centers::Column::Id.is_in(ids.iter().copied()))
            .into_tuple()
            .all(self.db)
            .await?)
    }
}
