//! Allocation rules. Targets are stored as a JSON array.

use ledgerline_core::allocation::RuleTarget;
use ledgerline_shared::types::Page;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::allocation_rules;
use crate::entities::sea_orm_active_enums::AllocationBasis;
use crate::error::GatewayError;

/// Writable fields of an allocation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRuleInput {
    /// Display name.
    pub name: String,
    /// How targets are weighed.
    pub basis: AllocationBasis,
    /// Account whose amounts the rule spreads.
    pub source_account_id: Uuid,
    /// Cost centers receiving a share.
    pub targets: Vec<RuleTarget>,
    /// Whether the rule may be applied.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// Decodes the stored targets of a rule.
///
/// # Errors
///
/// Returns a database error when the stored JSON is not a target list.
pub fn targets_of(rule: &allocation_rules::Model) -> Result<Vec<RuleTarget>, GatewayError> {
    serde_json::from_value(rule.targets.clone())
        .map_err(|e| GatewayError::from(DbErr::Json(e.to_string())))
}

/// Allocation rule repository.
#[derive(Debug)]
pub struct AllocationRuleRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> AllocationRuleRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn changes(input: AllocationRuleInput) -> Result<allocation_rules::ActiveModel, GatewayError> {
        let targets = serde_json::to_value(&input.targets)
            .map_err(|e| GatewayError::from(DbErr::Json(e.to_string())))?;
        Ok(allocation_rules::ActiveModel {
            name: Set(input.name),
            basis: Set(input.basis),
            source_account_id: Set(input.source_account_id),
            targets: Set(targets),
            is_active: Set(input.is_active),
            ..Default::default()
        })
    }

    /// Inserts a rule.
    pub async fn create(
        &self,
        input: AllocationRuleInput,
        actor: Option<Uuid>,
    ) -> Result<allocation_rules::Model, GatewayError> {
        let active = Self::changes(input)?;
        audited::insert_new::<allocation_rules::Entity, _, _>(self.db, active, actor).await
    }

    /// Fetches a rule by id.
    pub async fn get(&self, id: Uuid) -> Result<allocation_rules::Model, GatewayError> {
        audited::get::<allocation_rules::Entity, _>(self.db, id).await
    }

    /// Lists rules newest first.
    pub async fn list(
        &self,
        active_only: bool,
        page: Page,
    ) -> Result<(Vec<allocation_rules::Model>, u64), GatewayError> {
        let mut query = allocation_rules::Entity::find();
        if active_only {
            query = query.filter(allocation_rules::Column::IsActive.eq(true));
        }
        let query = query
            .order_by_desc(allocation_rules::Column::CreatedAt)
            .order_by_desc(allocation_rules::Column::Id);
        audited::fetch_page(self.db, query, page).await
    }

    /// Rewrites every writable field if `revision` still matches.
    pub async fn update(
        &self,
        id: Uuid,
        revision: i64,
        input: AllocationRuleInput,
        actor: Option<Uuid>,
    ) -> Result<allocation_rules::Model, GatewayError> {
        let changes = Self::changes(input)?;
        audited::update_checked::<allocation_rules::Entity, _, _>(self.db, id, revision, changes, actor)
            .await
    }

    /// Deletes a rule.
    pub async fn delete(&self, id: Uuid) -> Result<bool, GatewayError> {
        audited::delete::<allocation_rules::Entity, _>(self.db, id).await
    }
}
