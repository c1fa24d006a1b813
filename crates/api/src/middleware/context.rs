//! Request context middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use ledgerline_shared::{AppError, RequestContext};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Header carrying the acting user's id.
pub const ACTOR_HEADER: &str = "x-user-id";

/// Reads the actor from `X-User-ID`, when present.
fn actor_from(request: &Request) -> Result<Option<Uuid>, AppError> {
    let Some(value) = request.headers().get(ACTOR_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .map(Some)
        .ok_or_else(|| AppError::InvalidArgument("X-User-ID must be a UUID".to_string()))
}

/// Builds the [`RequestContext`] for the request and stores it in the
/// request extensions for [`Ctx`](crate::extractors::Ctx).
///
/// The context carries the actor from `X-User-ID` and, when configured, a
/// deadline of `request_timeout` from now. A malformed header is rejected with
/// `INVALID_ARGUMENT` before the handler runs.
pub async fn request_context(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let actor = match actor_from(&request) {
        Ok(actor) => actor,
        Err(e) => return ApiError(e).into_response(),
    };

    let mut ctx = RequestContext::new().with_actor(actor);
    if let Some(timeout) = state.request_timeout {
        ctx = ctx.with_timeout(timeout);
    }
    request.extensions_mut().insert(ctx);
    next.run(request).await
}
