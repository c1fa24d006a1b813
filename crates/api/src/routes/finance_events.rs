//! Finance event log routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ledgerline_db::entities::sea_orm_active_enums::FinanceEventType;
use ledgerline_db::repositories::FinanceEventInput;
use ledgerline_shared::types::pagination::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiQuery, Ctx, PageParams},
};

/// Query parameters for listing an organization's events.
#[derive(Debug, Deserialize)]
pub struct FinanceEventQuery {
    /// Organization whose events to list.
    pub organization_id: Uuid,
    /// Only events of this kind.
    pub event_type: Option<FinanceEventType>,
}

/// Body of `POST /finance-events`.
#[derive(Debug, Deserialize)]
pub struct RecordFinanceEventRequest {
    /// Kind of event.
    pub event_type: FinanceEventType,
    /// Event body.
    #[serde(flatten)]
    pub input: FinanceEventInput,
}

/// Creates the finance event routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/finance-events", get(list_events).post(record_event))
}

/// GET `/finance-events?organization_id=` - Newest first.
async fn list_events(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(query): ApiQuery<FinanceEventQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    let events = state
        .services
        .finance_events
        .list_by_organization(&ctx, query.organization_id, query.event_type, page)
        .await?;
    Ok(Json(events))
}

/// POST `/finance-events`
async fn record_event(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(body): ApiJson<RecordFinanceEventRequest>,
) -> ApiResult<impl IntoResponse> {
    let event = state
        .services
        .finance_events
        .record(&ctx, body.event_type, body.input)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}
