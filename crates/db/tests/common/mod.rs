//! Shared setup for repository tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use ledgerline_db::migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Fresh in-memory database with every migration applied.
///
/// One pooled connection keeps the in-memory database alive and shared.
pub async fn setup() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    db
}

/// UTC timestamp at midnight of the given day.
pub fn day(year: i32, month: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, d, 0, 0, 0).unwrap()
}
