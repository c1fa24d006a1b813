//! Budgets, expenses, cost allocations, accruals, forecasts, consolidations
//! and exchange rates.

use sea_orm_migration::prelude::*;

use super::{create_entity_table, drop_entity_table};
use crate::entities::{
    accruals, allocation_rules, budget_allocations, budgets, cash_flow_forecasts,
    consolidations, cost_allocations, exchange_rates, expenses,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_entity_table(manager, budgets::Entity).await?;
        create_entity_table(manager, budget_allocations::Entity).await?;
        create_entity_table(manager, expenses::Entity).await?;
        create_entity_table(manager, cost_allocations::Entity).await?;
        create_entity_table(manager, allocation_rules::Entity).await?;
        create_entity_table(manager, accruals::Entity).await?;
        create_entity_table(manager, cash_flow_forecasts::Entity).await?;
        create_entity_table(manager, consolidations::Entity).await?;
        create_entity_table(manager, exchange_rates::Entity).await?;

        // One quote per pair per instant.
        manager
            .create_index(
                Index::create()
                    .name("uq_exchange_rates_pair_as_of")
                    .table(exchange_rates::Entity)
                    .col(exchange_rates::Column::BaseCurrency)
                    .col(exchange_rates::Column::QuoteCurrency)
                    .col(exchange_rates::Column::AsOf)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_budget_allocations_budget")
                    .table(budget_allocations::Entity)
                    .col(budget_allocations::Column::BudgetId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_entity_table(manager, exchange_rates::Entity).await?;
        drop_entity_table(manager, consolidations::Entity).await?;
        drop_entity_table(manager, cash_flow_forecasts::Entity).await?;
        drop_entity_table(manager, accruals::Entity).await?;
        drop_entity_table(manager, allocation_rules::Entity).await?;
        drop_entity_table(manager, cost_allocations::Entity).await?;
        drop_entity_table(manager, expenses::Entity).await?;
        drop_entity_table(manager, budget_allocations::Entity).await?;
        drop_entity_table(manager, budgets::Entity).await
    }
}
