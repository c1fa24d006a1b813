//! Expenses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ledgerline_core::reports::ExpenseRow;
use ledgerline_shared::types::Page;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::expenses;
use crate::error::GatewayError;

/// Writable fields of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseInput {
    /// What the money was spent on.
    pub description: String,
    /// Reporting category.
    #[serde(default)]
    pub category: Option<String>,
    /// Amount spent; must be positive.
    pub amount: Decimal,
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// When the expense occurred.
    pub expense_date: DateTime<Utc>,
    /// Cost center charged.
    #[serde(default)]
    pub cost_center_id: Option<Uuid>,
    /// Expense account.
    #[serde(default)]
    pub account_id: Option<Uuid>,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// Filter options for listing expenses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseFilter {
    /// Exact category.
    pub category: Option<String>,
    /// Cost center charged.
    pub cost_center_id: Option<Uuid>,
    /// Earliest expense date, inclusive.
    pub from: Option<DateTime<Utc>>,
    /// Latest expense date, inclusive.
    pub to: Option<DateTime<Utc>>,
}

/// Expense repository.
#[derive(Debug)]
pub struct ExpenseRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ExpenseRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn changes(input: ExpenseInput) -> expenses::ActiveModel {
        expenses::ActiveModel {
            description: Set(input.description),
            category: Set(input.category),
            amount: Set(input.amount),
            currency: Set(input.currency),
            expense_date: Set(input.expense_date),
            cost_center_id: Set(input.cost_center_id),
            account_id: Set(input.account_id),
            ..Default::default()
        }
    }

    fn filtered(filter: &ExpenseFilter) -> sea_orm::Select<expenses::Entity> {
        let mut query = expenses::Entity::find();
        if let Some(category) = &filter.category {
            query = query.filter(expenses::Column::Category.eq(category.as_str()));
        }
        if let Some(cost_center_id) = filter.cost_center_id {
            query = query.filter(expenses::Column::CostCenterId.eq(cost_center_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(expenses::Column::ExpenseDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(expenses::Column::ExpenseDate.lte(to));
        }
        query
    }

    /// Inserts an expense.
    pub async fn create(
        &self,
        input: ExpenseInput,
        actor: Option<Uuid>,
    ) -> Result<expenses::Model, GatewayError> {
        audited::insert_new::<expenses::Entity, _, _>(self.db, Self::changes(input), actor).await
    }

    /// Fetches an expense by id.
    pub async fn get(&self, id: Uuid) -> Result<expenses::Model, GatewayError> {
        audited::get::<expenses::Entity, _>(self.db, id).await
    }

    /// Lists expenses newest first.
    pub async fn list(
        &self,
        filter: &ExpenseFilter,
        page: Page,
    ) -> Result<(Vec<expenses::Model>, u64), GatewayError> {
        let query = Self::filtered(filter)
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id);
        audited::fetch_page(self.db, query, page).await
    }

    /// Rewrites every writable field if `revision` still matches.
    pub async fn update(
        &self,
        id: Uuid,
        revision: i64,
        input: ExpenseInput,
        actor: Option<Uuid>,
    ) -> Result<expenses::Model, GatewayError> {
        audited::update_checked::<expenses::Entity, _, _>(
            self.db,
            id,
            revision,
            Self::changes(input),
            actor,
        )
        .await
    }

    /// Deletes an expense.
    pub async fn delete(&self, id: Uuid) -> Result<bool, GatewayError> {
        audited::delete::<expenses::Entity, _>(self.db, id).await
    }

    /// Count and total per category over the filtered expenses, ordered by
    /// category name.
    pub async fn totals_by_category(
        &self,
        filter: &ExpenseFilter,
    ) -> Result<Vec<ExpenseRow>, GatewayError> {
        let rows: Vec<(Option<String>, Decimal)> = Self::filtered(filter)
            .select_only()
            .column(expenses::Column::Category)
            .column(expenses::Column::Amount)
            .into_tuple()
            .all(self.db)
            .await?;

        let mut grouped: BTreeMap<String, (i64, Decimal)> = BTreeMap::new();
        for (category, amount) in rows {
            let slot = grouped.entry(category.unwrap_or_default()).or_default();
            slot.0 += 1;
            slot.1 += amount;
        }
        Ok(grouped
            .into_iter()
            .map(|(category, (count, total))| ExpenseRow {
                category,
                count,
                total,
            })
            .collect())
    }
}
