//! Consolidations of several legal-entity books.

use chrono::{DateTime, Utc};
use ledgerline_shared::types::Page;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::consolidations;
use crate::error::GatewayError;

/// Writable fields of a consolidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationInput {
    /// Display name.
    pub name: String,
    /// Consolidated entities; non-empty.
    pub entity_ids: Vec<Uuid>,
    /// Period start.
    pub period_start: DateTime<Utc>,
    /// Period end; not before `period_start`.
    pub period_end: DateTime<Utc>,
    /// Report payload.
    #[serde(default)]
    pub report: serde_json::Value,
}

/// Consolidation repository.
#[derive(Debug)]
pub struct ConsolidationRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ConsolidationRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn changes(input: ConsolidationInput) -> Result<consolidations::ActiveModel, GatewayError> {
        let entity_ids = serde_json::to_value(&input.entity_ids)
            .map_err(|e| GatewayError::from(DbErr::Json(e.to_string())))?;
        Ok(consolidations::ActiveModel {
            name: Set(input.name),
            entity_ids: Set(entity_ids),
            period_start: Set(input.period_start),
            period_end: Set(input.period_end),
            report: Set(input.report),
            ..Default::default()
        })
    }

    /// Inserts a consolidation.
    pub async fn create(
        &self,
        input: ConsolidationInput,
        actor: Option<Uuid>,
    ) -> Result<consolidations::Model, GatewayError> {
        let active = Self::changes(input)?;
        audited::insert_new::<consolidations::Entity, _, _>(self.db, active, actor).await
    }

    /// Fetches a consolidation by id.
    pub async fn get(&self, id: Uuid) -> Result<consolidations::Model, GatewayError> {
        audited::get::<consolidations::Entity, _>(self.db, id).await
    }

    /// Lists consolidations newest first.
    pub async fn list(&self, page: Page) -> Result<(Vec<consolidations::Model>, u64), GatewayError> {
        let query = consolidations::Entity::find()
            .order_by_desc(consolidations::Column::CreatedAt)
            .order_by_desc(consolidations::Column::Id);
        audited::fetch_page(self.db, query, page).await
    }

    /// Rewrites every writable field if `revision` still matches.
    pub async fn update(
        &self,
        id: Uuid,
        revision: i64,
        input: ConsolidationInput,
        actor: Option<Uuid>,
    ) -> Result<consolidations::Model, GatewayError> {
        let changes = Self::changes(input)?;
        audited::update_checked::<consolidations::Entity, _, _>(self.db, id, revision, changes, actor)
            .await
    }

    /// Deletes a consolidation.
    pub async fn delete(&self, id: Uuid) -> Result<bool, GatewayError> {
        audited::delete::<consolidations::Entity, _>(self.db, id).await
    }
}
