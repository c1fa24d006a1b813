//! Cash-flow forecast routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ledgerline_db::repositories::CashFlowForecastInput;
use ledgerline_shared::types::pagination::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use uuid::Uuid;

use super::UpdateRequest;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, Ctx, PageParams},
};

/// Query parameters for listing forecasts.
#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    /// Only forecasts of this organization.
    pub organization_id: Option<Uuid>,
}

/// Creates the forecast routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cash-flow-forecasts",
            get(list_forecasts).post(create_forecast),
        )
        .route(
            "/cash-flow-forecasts/{id}",
            get(get_forecast).put(update_forecast).delete(delete_forecast),
        )
}

async fn list_forecasts(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(query): ApiQuery<ForecastQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(
        state
            .services
            .cash_flow
            .list(&ctx, query.organization_id, page)
            .await?,
    ))
}

async fn create_forecast(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<CashFlowForecastInput>,
) -> ApiResult<impl IntoResponse> {
    let forecast = state.services.cash_flow.create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(forecast)))
}

async fn get_forecast(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.cash_flow.get(&ctx, id).await?))
}

async fn update_forecast(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateRequest<CashFlowForecastInput>>,
) -> ApiResult<impl IntoResponse> {
    let forecast = state
        .services
        .cash_flow
        .update(&ctx, id, body.revision, body.data)
        .await?;
    Ok(Json(forecast))
}

async fn delete_forecast(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.cash_flow.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
