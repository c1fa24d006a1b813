//! Cost center routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ledgerline_db::repositories::CostCenterInput;
use ledgerline_shared::types::pagination::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use uuid::Uuid;

use super::UpdateRequest;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, Ctx, PageParams},
};

/// Query parameters for listing cost centers and allocation rules.
#[derive(Debug, Default, Deserialize)]
pub struct ActiveQuery {
    /// Hide inactive records.
    #[serde(default)]
    pub active_only: bool,
}

/// Creates the cost center routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cost-centers", get(list_cost_centers).post(create_cost_center))
        .route(
            "/cost-centers/{id}",
            get(get_cost_center)
                .put(update_cost_center)
                .delete(delete_cost_center),
        )
}

async fn list_cost_centers(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(query): ApiQuery<ActiveQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(
        state
            .services
            .cost_centers
            .list(&ctx, query.active_only, page)
            .await?,
    ))
}

async fn create_cost_center(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<CostCenterInput>,
) -> ApiResult<impl IntoResponse> {
    let center = state.services.cost_centers.create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(center)))
}

async fn get_cost_center(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.cost_centers.get(&ctx, id).await?))
}

async fn update_cost_center(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateRequest<CostCenterInput>>,
) -> ApiResult<impl IntoResponse> {
    let center = state
        .services
        .cost_centers
        .update(&ctx, id, body.revision, body.data)
        .await?;
    Ok(Json(center))
}

async fn delete_cost_center(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.cost_centers.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
