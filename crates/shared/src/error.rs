//! Application-wide error taxonomy.
//!
//! Every layer converges on [`AppError`]. The variants are transport-agnostic;
//! handlers translate them with [`AppError::status_code`] and
//! [`AppError::error_code`].

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Malformed id, missing required field, unparseable amount or page token.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Entity with the requested id does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A domain invariant would be violated.
    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    /// Optimistic revision mismatch or duplicate unique key.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Transient persistence or transport failure; safe to retry.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// The caller cancelled the request.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// The caller's deadline elapsed before the operation finished.
    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    /// Bug; not retried.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidArgument(_) => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::FailedPrecondition(_) => 422,
            // nginx's "client closed request"
            Self::Cancelled(_) => 499,
            Self::Internal(_) => 500,
            Self::Unavailable(_) => 503,
            Self::DeadlineExceeded(_) => 504,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::FailedPrecondition(_) => "FAILED_PRECONDITION",
            Self::Conflict(_) => "CONFLICT",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Cancelled(_) => "CANCELLED",
            Self::DeadlineExceeded(_) => "DEADLINE_EXCEEDED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Returns the message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidArgument(m)
            | Self::NotFound(m)
            | Self::FailedPrecondition(m)
            | Self::Conflict(m)
            | Self::Unavailable(m)
            | Self::Cancelled(m)
            | Self::DeadlineExceeded(m)
            | Self::Internal(m) => m,
        }
    }

    /// Returns true when the same request may succeed if retried unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Shorthand for a missing required field.
    #[must_use]
    pub fn missing_field(field: &str) -> Self {
        Self::InvalidArgument(format!("{field} is required"))
    }

    /// Shorthand for an absent entity.
    #[must_use]
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity} {id} not found"))
    }
}
