//! Cost allocation and allocation rule routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use ledgerline_db::repositories::{AllocationRuleInput, CostAllocationFilter, CostAllocationInput};
use ledgerline_services::ApplyRuleRequest;
use ledgerline_shared::types::pagination::DEFAULT_PAGE_SIZE;
use uuid::Uuid;

use super::{UpdateRequest, cost_centers::ActiveQuery};
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, Ctx, PageParams},
};

/// Creates the allocation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cost-allocations",
            get(list_allocations).post(create_allocation),
        )
        .route(
            "/cost-allocations/{id}",
            get(get_allocation)
                .put(update_allocation)
                .delete(delete_allocation),
        )
        .route("/allocation-rules", get(list_rules).post(create_rule))
        .route(
            "/allocation-rules/{id}",
            get(get_rule).put(update_rule).delete(delete_rule),
        )
        .route("/allocation-rules/{id}/apply", post(apply_rule))
}

// ============================================================================
// Cost allocations
// ============================================================================

async fn list_allocations(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(filter): ApiQuery<CostAllocationFilter>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(
        state
            .services
            .cost_allocations
            .list(&ctx, &filter, page)
            .await?,
    ))
}

async fn create_allocation(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<CostAllocationInput>,
) -> ApiResult<impl IntoResponse> {
    let allocation = state.services.cost_allocations.create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(allocation)))
}

async fn get_allocation(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.cost_allocations.get(&ctx, id).await?))
}

async fn update_allocation(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateRequest<CostAllocationInput>>,
) -> ApiResult<impl IntoResponse> {
    let allocation = state
        .services
        .cost_allocations
        .update(&ctx, id, body.revision, body.data)
        .await?;
    Ok(Json(allocation))
}

async fn delete_allocation(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.cost_allocations.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Allocation rules
// ============================================================================

async fn list_rules(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(query): ApiQuery<ActiveQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(
        state
            .services
            .allocation_rules
            .list(&ctx, query.active_only, page)
            .await?,
    ))
}

async fn create_rule(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<AllocationRuleInput>,
) -> ApiResult<impl IntoResponse> {
    let rule = state.services.allocation_rules.create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

async fn get_rule(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.allocation_rules.get(&ctx, id).await?))
}

async fn update_rule(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateRequest<AllocationRuleInput>>,
) -> ApiResult<impl IntoResponse> {
    let rule = state
        .services
        .allocation_rules
        .update(&ctx, id, body.revision, body.data)
        .await?;
    Ok(Json(rule))
}

async fn delete_rule(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.allocation_rules.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/allocation-rules/{id}/apply` - Spread an amount over the rule's
/// targets, one allocation per target.
async fn apply_rule(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<ApplyRuleRequest>,
) -> ApiResult<impl IntoResponse> {
    let allocations = state
        .services
        .allocation_rules
        .apply(&ctx, id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(allocations)))
}
