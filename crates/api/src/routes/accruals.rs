//! Accrual routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ledgerline_db::entities::sea_orm_active_enums::AccrualStatus;
use ledgerline_db::repositories::AccrualInput;
use ledgerline_shared::types::pagination::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use uuid::Uuid;

use super::UpdateRequest;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, Ctx, PageParams},
};

/// Query parameters for listing accruals.
#[derive(Debug, Default, Deserialize)]
pub struct AccrualQuery {
    /// Only accruals in this status.
    pub status: Option<AccrualStatus>,
}

/// Creates the accrual routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accruals", get(list_accruals).post(create_accrual))
        .route(
            "/accruals/{id}",
            get(get_accrual).put(update_accrual).delete(delete_accrual),
        )
}

async fn list_accruals(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(query): ApiQuery<AccrualQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(
        state.services.accruals.list(&ctx, query.status, page).await?,
    ))
}

async fn create_accrual(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<AccrualInput>,
) -> ApiResult<impl IntoResponse> {
    let accrual = state.services.accruals.create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(accrual)))
}

async fn get_accrual(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.accruals.get(&ctx, id).await?))
}

async fn update_accrual(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateRequest<AccrualInput>>,
) -> ApiResult<impl IntoResponse> {
    let accrual = state
        .services
        .accruals
        .update(&ctx, id, body.revision, body.data)
        .await?;
    Ok(Json(accrual))
}

async fn delete_accrual(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.accruals.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
