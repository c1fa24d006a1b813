//! Budget routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ledgerline_db::repositories::{BudgetAllocationInput, BudgetInput};
use ledgerline_shared::types::pagination::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use uuid::Uuid;

use super::UpdateRequest;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, Ctx, PageParams},
};

/// Query parameters for listing budgets.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetQuery {
    /// Only budgets of this fiscal year.
    pub fiscal_year: Option<i32>,
}

/// Creates the budget routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/budgets", get(list_budgets).post(create_budget))
        .route(
            "/budgets/{id}",
            get(get_budget).put(update_budget).delete(delete_budget),
        )
        .route(
            "/budgets/{id}/allocations",
            get(list_allocations).post(create_allocation),
        )
        .route("/budgets/{id}/comparison", get(comparison))
}

/// GET `/budgets`
async fn list_budgets(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(query): ApiQuery<BudgetQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(
        state.services.budgets.list(&ctx, query.fiscal_year, page).await?,
    ))
}

/// POST `/budgets`
async fn create_budget(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<BudgetInput>,
) -> ApiResult<impl IntoResponse> {
    let budget = state.services.budgets.create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

/// GET `/budgets/{id}`
async fn get_budget(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.budgets.get(&ctx, id).await?))
}

/// PUT `/budgets/{id}` - The new total may not drop below what is allocated.
async fn update_budget(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateRequest<BudgetInput>>,
) -> ApiResult<impl IntoResponse> {
    let budget = state
        .services
        .budgets
        .update(&ctx, id, body.revision, body.data)
        .await?;
    Ok(Json(budget))
}

/// DELETE `/budgets/{id}`
async fn delete_budget(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.budgets.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/budgets/{id}/allocations`
async fn list_allocations(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.budgets.allocations(&ctx, id).await?))
}

/// POST `/budgets/{id}/allocations` - Allocate part of the budget.
async fn create_allocation(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<BudgetAllocationInput>,
) -> ApiResult<impl IntoResponse> {
    let allocation = state.services.budgets.allocate(&ctx, id, input).await?;
    Ok((StatusCode::CREATED, Json(allocation)))
}

/// GET `/budgets/{id}/comparison` - Allocated and spent against the total.
async fn comparison(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.budgets.comparison(&ctx, id).await?))
}
