//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration. Tables are derived from the
//! entity definitions so the same migrations run against PostgreSQL and the
//! in-memory SQLite used by tests.

pub use sea_orm_migration::prelude::*;

use sea_orm::{EntityTrait, Schema};

mod m20260301_000001_ledger;
mod m20260301_000002_invoicing;
mod m20260301_000003_planning;
mod m20260301_000004_event_logs;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_ledger::Migration),
            Box::new(m20260301_000002_invoicing::Migration),
            Box::new(m20260301_000003_planning::Migration),
            Box::new(m20260301_000004_event_logs::Migration),
        ]
    }
}

/// Creates the table for `entity` from its `SeaORM` definition.
async fn create_entity_table<E>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    let schema = Schema::new(manager.get_database_backend());
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await
}

/// Drops the table for `entity` if it exists.
async fn drop_entity_table<E>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr>
where
    E: EntityTrait,
{
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectOptions, Database};

    #[tokio::test]
    async fn test_migrations_apply_and_revert_on_sqlite() {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();

        Migrator::up(&db, None).await.unwrap();
        let manager = SchemaManager::new(&db);
        for table in ["journal_lines", "invoices", "budget_allocations", "exchange_rates"] {
            assert!(manager.has_table(table).await.unwrap(), "{table} missing");
        }

        Migrator::down(&db, None).await.unwrap();
        assert!(!manager.has_table("journal_lines").await.unwrap());

        Migrator::up(&db, None).await.unwrap();
        assert!(manager.has_table("journal_lines").await.unwrap());
    }
}
