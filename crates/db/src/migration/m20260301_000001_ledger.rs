//! Chart of accounts, journal entries and lines, cost centers.

use sea_orm_migration::prelude::*;

use super::{create_entity_table, drop_entity_table};
use crate::entities::{accounts, cost_centers, journal_entries, journal_lines};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_entity_table(manager, accounts::Entity).await?;
        create_entity_table(manager, cost_centers::Entity).await?;
        create_entity_table(manager, journal_entries::Entity).await?;
        create_entity_table(manager, journal_lines::Entity).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_parent")
                    .table(accounts::Entity)
                    .col(accounts::Column::ParentId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_entries_date")
                    .table(journal_entries::Entity)
                    .col(journal_entries::Column::JournalDate)
                    .col(journal_entries::Column::Id)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_journal_lines_entry_position")
                    .table(journal_lines::Entity)
                    .col(journal_lines::Column::JournalEntryId)
                    .col(journal_lines::Column::Position)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_journal_lines_account")
                    .table(journal_lines::Entity)
                    .col(journal_lines::Column::AccountId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_entity_table(manager, journal_lines::Entity).await?;
        drop_entity_table(manager, journal_entries::Entity).await?;
        drop_entity_table(manager, cost_centers::Entity).await?;
        drop_entity_table(manager, accounts::Entity).await
    }
}
