//! Persistence gateway errors and their mapping onto the application taxonomy.

use ledgerline_shared::AppError;
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// Errors raised by the persistence gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No row with the requested id.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity name.
        entity: &'static str,
        /// Requested id.
        id: String,
    },

    /// The stored revision differs from the one the caller read.
    #[error("{entity} {id} revision mismatch: expected {expected}, stored {actual}")]
    Conflict {
        /// Entity name.
        entity: &'static str,
        /// Row id.
        id: String,
        /// Revision supplied by the caller.
        expected: i64,
        /// Revision currently stored.
        actual: i64,
    },

    /// A unique key is already taken.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// The row is still referenced by another row.
    #[error("row is still referenced: {0}")]
    Referenced(String),

    /// Any other database failure.
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl GatewayError {
    /// Shorthand for [`GatewayError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true for connection, pool and I/O failures, serialization
    /// failures and deadlocks.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database(err) => is_transient(err),
            _ => false,
        }
    }
}

impl From<DbErr> for GatewayError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => Self::Duplicate(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::Referenced(msg),
            _ => Self::Database(err),
        }
    }
}

/// Serialization failure and deadlock; the whole transaction can be retried.
const RETRYABLE_SQLSTATES: [&str; 2] = ["40001", "40P01"];

fn is_transient(err: &DbErr) -> bool {
    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => true,
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => match e {
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => true,
            sqlx::Error::Database(db) => db
                .code()
                .is_some_and(|code| RETRYABLE_SQLSTATES.iter().any(|s| *s == code)),
            _ => false,
        },
        _ => false,
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound { .. } => Self::NotFound(err.to_string()),
            GatewayError::Conflict { .. } | GatewayError::Duplicate(_) => {
                Self::Conflict(err.to_string())
            }
            GatewayError::Referenced(_) => Self::FailedPrecondition(err.to_string()),
            GatewayError::Database(ref db) if is_transient(db) => {
                Self::Unavailable(err.to_string())
            }
            GatewayError::Database(_) => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps() {
        let err: AppError = GatewayError::not_found("account", "abc").into();
        assert_eq!(err, AppError::NotFound("account abc not found".into()));
    }

    #[test]
    fn test_conflict_names_revisions() {
        let err: AppError = GatewayError::Conflict {
            entity: "account",
            id: "abc".into(),
            expected: 1,
            actual: 2,
        }
        .into();
        assert_eq!(
            err,
            AppError::Conflict("account abc revision mismatch: expected 1, stored 2".into())
        );
    }

    #[test]
    fn test_connection_errors_are_unavailable() {
        let gateway = GatewayError::from(DbErr::Conn(RuntimeErr::Internal("refused".into())));
        assert!(gateway.is_transient());
        assert!(matches!(AppError::from(gateway), AppError::Unavailable(_)));

        let pool = GatewayError::from(DbErr::Query(RuntimeErr::SqlxError(
            sqlx::Error::PoolTimedOut,
        )));
        assert!(matches!(AppError::from(pool), AppError::Unavailable(_)));
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err: AppError = GatewayError::from(DbErr::Custom("boom".into())).into();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[derive(Debug)]
    struct PgError(&'static str);

    impl std::fmt::Display for PgError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "SQLSTATE {}", self.0)
        }
    }

    impl std::error::Error for PgError {}

    impl sqlx::error::DatabaseError for PgError {
        fn message(&self) -> &str {
            "could not serialize access"
        }

        fn code(&self) -> Option<std::borrow::Cow<'_, str>> {
            Some(self.0.into())
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::Other
        }
    }

    fn pg_error(code: &'static str) -> GatewayError {
        GatewayError::from(DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(
            Box::new(PgError(code)),
        ))))
    }

    #[test]
    fn test_serialization_failures_are_unavailable() {
        for code in ["40001", "40P01"] {
            let err = pg_error(code);
            assert!(err.is_transient(), "{code} should be retryable");
            assert!(matches!(AppError::from(err), AppError::Unavailable(_)));
        }
    }

    #[test]
    fn test_other_statement_failures_are_internal() {
        let err = pg_error("22003");
        assert!(!err.is_transient());
        assert!(matches!(AppError::from(err), AppError::Internal(_)));
    }
}
