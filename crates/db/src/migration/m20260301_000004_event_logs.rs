//! Append-only audit trail and finance event log.

use sea_orm_migration::prelude::*;

use super::{create_entity_table, drop_entity_table};
use crate::entities::{audit_events, finance_events};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_entity_table(manager, audit_events::Entity).await?;
        create_entity_table(manager, finance_events::Entity).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_audit_events_occurred")
                    .table(audit_events::Entity)
                    .col(audit_events::Column::OccurredAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_finance_events_org")
                    .table(finance_events::Entity)
                    .col(finance_events::Column::OrganizationId)
                    .col(finance_events::Column::OccurredAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_entity_table(manager, finance_events::Entity).await?;
        drop_entity_table(manager, audit_events::Entity).await
    }
}
