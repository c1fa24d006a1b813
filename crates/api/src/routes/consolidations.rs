//! Consolidation routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ledgerline_db::repositories::ConsolidationInput;
use ledgerline_shared::types::pagination::DEFAULT_PAGE_SIZE;
use uuid::Uuid;

use super::UpdateRequest;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, Ctx, PageParams},
};

/// Creates the consolidation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/consolidations",
            get(list_consolidations).post(create_consolidation),
        )
        .route(
            "/consolidations/{id}",
            get(get_consolidation)
                .put(update_consolidation)
                .delete(delete_consolidation),
        )
}

async fn list_consolidations(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(state.services.consolidations.list(&ctx, page).await?))
}

async fn create_consolidation(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<ConsolidationInput>,
) -> ApiResult<impl IntoResponse> {
    let consolidation = state.services.consolidations.create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(consolidation)))
}

async fn get_consolidation(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.consolidations.get(&ctx, id).await?))
}

async fn update_consolidation(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateRequest<ConsolidationInput>>,
) -> ApiResult<impl IntoResponse> {
    let consolidation = state
        .services
        .consolidations
        .update(&ctx, id, body.revision, body.data)
        .await?;
    Ok(Json(consolidation))
}

async fn delete_consolidation(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.consolidations.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
