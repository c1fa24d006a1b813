//! Persistence gateway for Ledgerline.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repositories with revision-checked updates
//! - A transactional scope over the pool
//! - Database migrations

pub mod entities;
pub mod error;
pub mod gateway;
pub mod migration;
pub mod repositories;

pub use error::GatewayError;
pub use gateway::{Gateway, TxFuture};

use std::time::Duration;

use ledgerline_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool sized by `config`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);
    Database::connect(options).await
}
