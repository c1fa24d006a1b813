//! Request-scoped context threaded through every service call.
//!
//! Carries the actor identity recorded in audit columns, a cancellation token,
//! and an optional deadline. Futures run through [`RequestContext::run`] are
//! dropped when the token fires or the deadline passes, which rolls back any
//! database transaction they hold.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Per-request execution context.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    actor: Option<Uuid>,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// Creates a context with no actor, no deadline and a fresh token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh cancellation-free context for detached background work.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Sets the acting user.
    #[must_use]
    pub fn with_actor(mut self, actor: Option<Uuid>) -> Self {
        self.actor = actor;
        self
    }

    /// Sets the deadline to `timeout` from now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Sets an absolute deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Uses an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The acting user, if the request carried one.
    #[must_use]
    pub const fn actor(&self) -> Option<Uuid> {
        self.actor
    }

    /// The absolute deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The cancellation token for this request.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Returns true once the request has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancels the request.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Runs `fut` to completion unless the request is cancelled or its deadline
    /// passes first.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` or `DeadlineExceeded`, or whatever `fut` returns.
    pub async fn run<F, T>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(AppError::Cancelled("request was cancelled".into()));
        }

        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, fut)
                    .await
                    .map_err(|_| AppError::DeadlineExceeded("request deadline elapsed".into()))?,
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(AppError::Cancelled("request was cancelled".into())),
            result = bounded => result,
        }
    }
}
