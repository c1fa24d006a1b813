//! Transactional scope over the shared connection pool.

use std::future::Future;
use std::pin::Pin;

use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend,
    IsolationLevel, TransactionTrait,
};
use tracing::warn;

use crate::error::GatewayError;

/// Boxed future returned by a transaction body.
pub type TxFuture<'c, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'c>>;

/// Entry point to the relational store.
///
/// Plain reads and single-row writes go straight to [`Gateway::connection`];
/// multi-statement writes run inside [`Gateway::with_transaction`], whose body
/// receives a connection bound to the transaction. Repositories accept either.
#[derive(Debug, Clone)]
pub struct Gateway {
    db: DatabaseConnection,
}

impl Gateway {
    /// Wraps a connection pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The pooled connection for non-transactional work.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Backend of the underlying pool.
    #[must_use]
    pub fn backend(&self) -> DbBackend {
        self.db.get_database_backend()
    }

    /// Checks that the store answers.
    ///
    /// # Errors
    ///
    /// Returns a gateway error when no connection can be used.
    pub async fn ping(&self) -> Result<(), GatewayError> {
        self.db.ping().await.map_err(GatewayError::from)
    }

    /// Runs `body` inside a transaction.
    ///
    /// Commits when `body` returns `Ok`, rolls back when it returns `Err`.
    /// If the future is dropped (cancellation, deadline, panic) the transaction
    /// is dropped uncommitted and the driver rolls it back. `isolation` is
    /// applied on PostgreSQL; SQLite transactions are already serialized.
    ///
    /// # Errors
    ///
    /// Returns the body's error, or a gateway error when the transaction
    /// cannot be opened or committed.
    pub async fn with_transaction<T, E, F>(
        &self,
        isolation: Option<IsolationLevel>,
        body: F,
    ) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxFuture<'c, T, E> + Send,
        T: Send,
        E: From<GatewayError> + Send,
    {
        let isolation = isolation.filter(|_| self.backend() == DbBackend::Postgres);
        let access = isolation.map(|_| AccessMode::ReadWrite);
        let txn = self
            .db
            .begin_with_config(isolation, access)
            .await
            .map_err(GatewayError::from)?;

        match body(&txn).await {
            Ok(value) => {
                txn.commit().await.map_err(GatewayError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(error = %rollback, "Transaction rollback failed");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectOptions, Database, Statement};

    async fn gateway() -> Gateway {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        db.execute_unprepared("CREATE TABLE t (v INTEGER NOT NULL)")
            .await
            .unwrap();
        Gateway::new(db)
    }

    async fn count(gateway: &Gateway) -> i64 {
        let row = gateway
            .connection()
            .query_one(Statement::from_string(
                DbBackend::Sqlite,
                "SELECT COUNT(*) AS n FROM t",
            ))
            .await
            .unwrap()
            .unwrap();
        row.try_get("", "n").unwrap()
    }

    #[tokio::test]
    async fn test_commit_on_ok() {
        let gateway = gateway().await;
        let result: Result<(), GatewayError> = gateway
            .with_transaction(None, |txn| {
                Box::pin(async move {
                    txn.execute_unprepared("INSERT INTO t VALUES (1)").await?;
                    Ok(())
                })
            })
            .await;
        assert!(result.is_ok());
        assert_eq!(count(&gateway).await, 1);
    }

    #[tokio::test]
    async fn test_rollback_on_err() {
        let gateway = gateway().await;
        let result: Result<(), GatewayError> = gateway
            .with_transaction(Some(IsolationLevel::Serializable), |txn| {
                Box::pin(async move {
                    txn.execute_unprepared("INSERT INTO t VALUES (1)").await?;
                    Err(GatewayError::not_found("thing", 1))
                })
            })
            .await;
        assert!(matches!(result, Err(GatewayError::NotFound { .. })));
        assert_eq!(count(&gateway).await, 0);
    }
}
