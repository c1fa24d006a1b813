//! Budgets and their per-department allocations.

use ledgerline_core::budget::AllocationFigures;
use ledgerline_shared::types::Page;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited::{self, Audited};
use crate::entities::sea_orm_active_enums::BudgetStatus;
use crate::entities::{budget_allocations, budgets};
use crate::error::GatewayError;

/// Writable fields of a budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetInput {
    /// Display name.
    pub name: String,
    /// Fiscal year the budget covers.
    pub fiscal_year: i32,
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Ceiling for the sum of allocations.
    pub total_amount: Decimal,
    /// Lifecycle status; defaults to `DRAFT`.
    #[serde(default = "default_status")]
    pub status: BudgetStatus,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

fn default_currency() -> String {
    "INR".to_string()
}

const fn default_status() -> BudgetStatus {
    BudgetStatus::Draft
}

/// A department's share of a budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetAllocationInput {
    /// Department name.
    pub department: String,
    /// Amount set aside.
    pub allocated_amount: Decimal,
    /// Amount already spent.
    #[serde(default)]
    pub spent_amount: Decimal,
}

/// Budget repository.
#[derive(Debug)]
pub struct BudgetRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> BudgetRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn changes(input: BudgetInput) -> budgets::ActiveModel {
        budgets::ActiveModel {
            name: Set(input.name),
            fiscal_year: Set(input.fiscal_year),
            currency: Set(input.currency),
            total_amount: Set(input.total_amount),
            status: Set(input.status),
            description: Set(input.description),
            ..Default::default()
        }
    }

    /// Inserts a budget.
    pub async fn create(
        &self,
        input: BudgetInput,
        actor: Option<Uuid>,
    ) -> Result<budgets::Model, GatewayError> {
        audited::insert_new::<budgets::Entity, _, _>(self.db, Self::changes(input), actor).await
    }

    /// Fetches a budget by id.
    pub async fn get(&self, id: Uuid) -> Result<budgets::Model, GatewayError> {
        audited::get::<budgets::Entity, _>(self.db, id).await
    }

    /// Fetches a budget and holds its row lock until the transaction ends.
    ///
    /// Allocation writes take this lock before summing, so two of them on
    /// the same budget run one after the other. SQLite has no row locks and
    /// serializes writers on its own.
    pub async fn get_for_update(&self, id: Uuid) -> Result<budgets::Model, GatewayError> {
        budgets::Entity::find_by_id(id)
            .lock_exclusive()
            .one(self.db)
            .await?
            .ok_or_else(|| GatewayError::not_found(budgets::Entity::NAME, id))
    }

    /// Lists budgets newest first, optionally for one fiscal year.
    pub async fn list(
        &self,
        fiscal_year: Option<i32>,
        page: Page,
    ) -> Result<(Vec<budgets::Model>, u64), GatewayError> {
        let mut query = budgets::Entity::find();
        if let Some(year) = fiscal_year {
            query = query.filter(budgets::Column::FiscalYear.eq(year));
        }
        let query = query
            .order_by_desc(budgets::Column::CreatedAt)
            .order_by_desc(budgets::Column::Id);
        audited::fetch_page(self.db, query, page).await
    }

    /// Rewrites every writable field if `revision` still matches.
    pub async fn update(
        &self,
        id: Uuid,
        revision: i64,
        input: BudgetInput,
        actor: Option<Uuid>,
    ) -> Result<budgets::Model, GatewayError> {
        audited::update_checked::<budgets::Entity, _, _>(
            self.db,
            id,
            revision,
            Self::changes(input),
            actor,
        )
        .await
    }

    /// Deletes a budget with its allocations. Must run inside a transaction.
    pub async fn delete_cascade(&self, id: Uuid) -> Result<bool, GatewayError> {
        budget_allocations::Entity::delete_many()
            .filter(budget_allocations::Column::BudgetId.eq(id))
            .exec(self.db)
            .await?;
        audited::delete::<budgets::Entity, _>(self.db, id).await
    }

    /// Adds an allocation to a budget.
    pub async fn add_allocation(
        &self,
        budget_id: Uuid,
        input: BudgetAllocationInput,
        actor: Option<Uuid>,
    ) -> Result<budget_allocations::Model, GatewayError> {
        let active = budget_allocations::ActiveModel {
            budget_id: Set(budget_id),
            department: Set(input.department),
            allocated_amount: Set(input.allocated_amount),
            spent_amount: Set(input.spent_amount),
            ..Default::default()
        };
        audited::insert_new::<budget_allocations::Entity, _, _>(self.db, active, actor).await
    }

    /// Allocations of a budget in insertion order.
    pub async fn allocations(
        &self,
        budget_id: Uuid,
    ) -> Result<Vec<budget_allocations::Model>, GatewayError> {
        Ok(budget_allocations::Entity::find()
            .filter(budget_allocations::Column::BudgetId.eq(budget_id))
            .order_by_asc(budget_allocations::Column::CreatedAt)
            .order_by_asc(budget_allocations::Column::Id)
            .all(self.db)
            .await?)
    }

    /// Allocated amounts of a budget.
    pub async fn allocated_amounts(&self, budget_id: Uuid) -> Result<Vec<Decimal>, GatewayError> {
        Ok(budget_allocations::Entity::find()
            .select_only()
            .column(budget_allocations::Column::AllocatedAmount)
            .filter(budget_allocations::Column::BudgetId.eq(budget_id))
            .into_tuple()
            .all(self.db)
            .await?)
    }

    /// Department, allocated and spent figures of every allocation of a
    /// budget, read in one statement.
    pub async fn allocation_figures(
        &self,
        budget_id: Uuid,
    ) -> Result<Vec<AllocationFigures>, GatewayError> {
        let rows: Vec<(String, Decimal, Decimal)> = budget_allocations::Entity::find()
            .select_only()
            .column(budget_allocations::Column::Department)
            .column(budget_allocations::Column::AllocatedAmount)
            .column(budget_allocations::Column::SpentAmount)
            .filter(budget_allocations::Column::BudgetId.eq(budget_id))
            .order_by_asc(budget_allocations::Column::Department)
            .into_tuple()
            .all(self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(department, allocated, spent)| AllocationFigures {
                department,
                allocated,
                spent,
            })
            .collect())
    }
}
