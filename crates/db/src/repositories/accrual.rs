//! Accruals.

use chrono::{DateTime, Utc};
use ledgerline_shared::types::Page;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::accruals;
use crate::entities::sea_orm_active_enums::AccrualStatus;
use crate::error::GatewayError;

/// Writable fields of an accrual.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualInput {
    /// What is being accrued.
    pub description: String,
    /// Account the accrual is booked against.
    pub account_id: Uuid,
    /// Amount recognized; must be positive.
    pub amount: Decimal,
    /// Recognition date.
    pub accrual_date: DateTime<Utc>,
    /// Planned reversal date; not before `accrual_date`.
    #[serde(default)]
    pub reversal_date: Option<DateTime<Utc>>,
    /// Lifecycle status; defaults to `OPEN`.
    #[serde(default = "default_status")]
    pub status: AccrualStatus,
}

const fn default_status() -> AccrualStatus {
    AccrualStatus::Open
}

/// Accrual repository.
#[derive(Debug)]
pub struct AccrualRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> AccrualRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn changes(input: AccrualInput) -> accruals::ActiveModel {
        accruals::ActiveModel {
            description: Set(input.description),
            account_id: Set(input.account_id),
            amount: Set(input.amount),
            accrual_date: Set(input.accrual_date),
            reversal_date: Set(input.reversal_date),
            status: Set(input.status),
            ..Default::default()
        }
    }

    /// Inserts an accrual.
    pub async fn create(
        &self,
        input: AccrualInput,
        actor: Option<Uuid>,
    ) -> Result<accruals::Model, GatewayError> {
        audited::insert_new::<accruals::Entity, _, _>(self.db, Self::changes(input), actor).await
    }

    /// Fetches an accrual by id.
    pub async fn get(&self, id: Uuid) -> Result<accruals::Model, GatewayError> {
        audited::get::<accruals::Entity, _>(self.db, id).await
    }

    /// Lists accruals newest first, optionally in one status.
    pub async fn list(
        &self,
        status: Option<AccrualStatus>,
        page: Page,
    ) -> Result<(Vec<accruals::Model>, u64), GatewayError> {
        let mut query = accruals::Entity::find();
        if let Some(status) = status {
            query = query.filter(accruals::Column::Status.eq(status));
        }
        let query = query
            .order_by_desc(accruals::Column::CreatedAt)
            .order_by_desc(accruals::Column::Id);
        audited::fetch_page(self.db, query, page).await
    }

    /// Rewrites every writable field if `revision` still matches.
    pub async fn update(
        &self,
        id: Uuid,
        revision: i64,
        input: AccrualInput,
        actor: Option<Uuid>,
    ) -> Result<accruals::Model, GatewayError> {
        audited::update_checked::<accruals::Entity, _, _>(
            self.db,
            id,
            revision,
            Self::changes(input),
            actor,
        )
        .await
    }

    /// Deletes an accrual.
    pub async fn delete(&self, id: Uuid) -> Result<bool, GatewayError> {
        audited::delete::<accruals::Entity, _>(self.db, id).await
    }
}
