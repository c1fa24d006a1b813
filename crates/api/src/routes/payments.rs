//! Payment routes. Scheduling happens under `/invoices/{id}/payments`.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, Ctx},
};

/// Body of `POST /payments/{id}/mark-paid`.
#[derive(Debug, Default, Deserialize)]
pub struct MarkPaidRequest {
    /// Settlement time; defaults to now.
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments/{id}", get(get_payment).delete(delete_payment))
        .route("/payments/{id}/mark-paid", post(mark_paid))
}

/// GET `/payments/{id}`
async fn get_payment(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.payments.get(&ctx, id).await?))
}

/// POST `/payments/{id}/mark-paid` - Settle a payment and record
/// `PAYMENT_RECEIVED`.
async fn mark_paid(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<MarkPaidRequest>,
) -> ApiResult<impl IntoResponse> {
    let paid = state.services.payments.mark_paid(&ctx, id, body.paid_at).await?;
    Ok(Json(paid))
}

/// DELETE `/payments/{id}`
async fn delete_payment(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.payments.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
