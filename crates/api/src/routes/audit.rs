//! Audit trail routes. Records are append-only.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ledgerline_db::repositories::{AuditEventInput, AuditFilter};
use ledgerline_shared::types::pagination::DEFAULT_PAGE_SIZE;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, Ctx, PageParams},
};

/// Creates the audit routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/audit-events", get(list_events).post(record_event))
        .route("/audit-events/filter", get(filter_events))
        .route("/audit-events/{id}", get(get_event))
}

/// GET `/audit-events` - Newest first.
async fn list_events(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(state.services.audit.list(&ctx, page).await?))
}

/// GET `/audit-events/filter` - By user, action, resource and time range.
async fn filter_events(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(filter): ApiQuery<AuditFilter>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(state.services.audit.filter(&ctx, &filter, page).await?))
}

/// POST `/audit-events`
async fn record_event(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<AuditEventInput>,
) -> ApiResult<impl IntoResponse> {
    let event = state.services.audit.record(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET `/audit-events/{id}`
async fn get_event(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.audit.get(&ctx, id).await?))
}
