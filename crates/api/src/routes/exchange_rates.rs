//! Exchange rate routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use ledgerline_db::repositories::{ExchangeRateFilter, ExchangeRateInput};
use ledgerline_shared::types::pagination::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use uuid::Uuid;

use super::UpdateRequest;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, Ctx, PageParams},
};

/// Query parameters for the latest-rate lookup.
#[derive(Debug, Deserialize)]
pub struct LatestRateQuery {
    /// Base currency code.
    pub base: String,
    /// Quote currency code.
    pub quote: String,
    /// Point in time; defaults to now.
    pub at: Option<DateTime<Utc>>,
}

/// Creates the exchange rate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/exchange-rates", get(list_rates).post(create_rate))
        .route("/exchange-rates/latest", get(latest_rate))
        .route(
            "/exchange-rates/{id}",
            get(get_rate).put(update_rate).delete(delete_rate),
        )
}

/// GET `/exchange-rates` - Quotes, newest `as_of` first.
async fn list_rates(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(filter): ApiQuery<ExchangeRateFilter>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(
        state.services.exchange_rates.list(&ctx, filter, page).await?,
    ))
}

/// GET `/exchange-rates/latest?base=&quote=&at=` - Most recent quote at or
/// before `at`.
async fn latest_rate(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(query): ApiQuery<LatestRateQuery>,
) -> ApiResult<impl IntoResponse> {
    let rate = state
        .services
        .exchange_rates
        .latest(&ctx, &query.base, &query.quote, query.at)
        .await?;
    Ok(Json(rate))
}

/// POST `/exchange-rates`
async fn create_rate(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<ExchangeRateInput>,
) -> ApiResult<impl IntoResponse> {
    let rate = state.services.exchange_rates.create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

/// GET `/exchange-rates/{id}`
async fn get_rate(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.exchange_rates.get(&ctx, id).await?))
}

/// PUT `/exchange-rates/{id}`
async fn update_rate(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateRequest<ExchangeRateInput>>,
) -> ApiResult<impl IntoResponse> {
    let rate = state
        .services
        .exchange_rates
        .update(&ctx, id, body.revision, body.data)
        .await?;
    Ok(Json(rate))
}

/// DELETE `/exchange-rates/{id}`
async fn delete_rate(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.exchange_rates.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
