//! Chart of accounts persistence.

use std::collections::HashMap;

use ledgerline_shared::types::Page;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::accounts;
use crate::entities::sea_orm_active_enums::{AccountStatus, AccountType};
use crate::error::GatewayError;

/// Writable fields of an account, used for both create and full update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInput {
    /// Unique, non-empty account code.
    pub code: String,
    /// Non-empty display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Account classification.
    #[serde(alias = "type")]
    pub account_type: AccountType,
    /// Lifecycle status; defaults to `ACTIVE`.
    #[serde(default = "default_status")]
    pub status: AccountStatus,
    /// Parent in the account hierarchy.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Whether manual journals may post here; defaults to true.
    #[serde(default = "default_allow_manual")]
    pub allow_manual_journal: bool,
}

const fn default_status() -> AccountStatus {
    AccountStatus::Active
}

const fn default_allow_manual() -> bool {
    true
}

/// Filter options for listing accounts. Unset fields match anything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountFilter {
    /// Account type.
    pub account_type: Option<AccountType>,
    /// Lifecycle status.
    pub status: Option<AccountStatus>,
    /// Direct parent.
    pub parent_id: Option<Uuid>,
}

/// Account repository.
#[derive(Debug)]
pub struct AccountRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> AccountRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn changes(input: AccountInput) -> accounts::ActiveModel {
        accounts::ActiveModel {
            code: Set(input.code),
            name: Set(input.name),
            description: Set(input.description),
            account_type: Set(input.account_type),
            status: Set(input.status),
            parent_id: Set(input.parent_id),
            allow_manual_journal: Set(input.allow_manual_journal),
            ..Default::default()
        }
    }

    /// Inserts an account.
    pub async fn create(
        &self,
        input: AccountInput,
        actor: Option<Uuid>,
    ) -> Result<accounts::Model, GatewayError> {
        audited::insert_new::<accounts::Entity, _, _>(self.db, Self::changes(input), actor).await
    }

    /// Fetches an account by id.
    pub async fn get(&self, id: Uuid) -> Result<accounts::Model, GatewayError> {
        audited::get::<accounts::Entity, _>(self.db, id).await
    }

    /// Lists accounts ordered by code.
    pub async fn list(
        &self,
        filter: &AccountFilter,
        page: Page,
    ) -> Result<(Vec<accounts::Model>, u64), GatewayError> {
        let mut query = accounts::Entity::find();
        if let Some(account_type) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(account_type));
        }
        if let Some(status) = filter.status {
            query = query.filter(accounts::Column::Status.eq(status));
        }
        if let Some(parent_id) = filter.parent_id {
            query = query.filter(accounts::Column::ParentId.eq(parent_id));
        }
        let query = query
            .order_by_asc(accounts::Column::Code)
            .order_by_asc(accounts::Column::Id);
        audited::fetch_page(self.db, query, page).await
    }

    /// Rewrites every writable field if `revision` still matches.
    pub async fn update(
        &self,
        id: Uuid,
        revision: i64,
        input: AccountInput,
        actor: Option<Uuid>,
    ) -> Result<accounts::Model, GatewayError> {
        audited::update_checked::<accounts::Entity, _, _>(
            self.db,
            id,
            revision,
            Self::changes(input),
            actor,
        )
        .await
    }

    /// Deletes an account. Fails with `Referenced` while journal lines post to it.
    pub async fn delete(&self, id: Uuid) -> Result<bool, GatewayError> {
        audited::delete::<accounts::Entity, _>(self.db, id).await
    }

    /// Loads the accounts with the given ids; missing ids are simply absent.
    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<accounts::Model>, GatewayError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(ids.iter().copied()))
            .all(self.db)
            .await?)
    }

    /// Every account's parent link, for hierarchy walks.
    pub async fn parent_map(&self) -> Result<HashMap<Uuid, Option<Uuid>>, GatewayError> {
        let rows: Vec<(Uuid, Option<Uuid>)> = accounts::Entity::find()
            .select_only()
            .column(accounts::Column::Id)
            .column(accounts::Column::ParentId)
            .into_tuple()
            .all(self.db)
            .await?;
        Ok(rows.into_iter().collect())
    }

    /// Every account, ordered by code.
    pub async fn all(&self) -> Result<Vec<accounts::Model>, GatewayError> {
        Ok(accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .order_by_asc(accounts::Column::Id)
            .all(self.db)
            .await?)
    }
}
