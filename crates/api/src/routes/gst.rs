//! GST routes. Each invoice has at most one breakup, regime and document
//! status; `PUT` creates or replaces it.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ledgerline_db::repositories::{GstBreakupInput, GstDocStatusInput, GstRegimeInput};
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, Ctx},
};

/// Creates the GST routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/gst/invoices/{id}/breakup",
            get(get_breakup).put(save_breakup).delete(delete_breakup),
        )
        .route(
            "/gst/invoices/{id}/regime",
            get(get_regime).put(save_regime).delete(delete_regime),
        )
        .route(
            "/gst/invoices/{id}/doc-status",
            get(get_doc_status)
                .put(save_doc_status)
                .delete(delete_doc_status),
        )
}

// ============================================================================
// Breakup
// ============================================================================

async fn get_breakup(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.gst.breakup(&ctx, id).await?))
}

async fn save_breakup(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<GstBreakupInput>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.gst.save_breakup(&ctx, id, input).await?))
}

async fn delete_breakup(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.gst.delete_breakup(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Regime
// ============================================================================

async fn get_regime(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.gst.regime(&ctx, id).await?))
}

async fn save_regime(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<GstRegimeInput>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.gst.save_regime(&ctx, id, input).await?))
}

async fn delete_regime(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.gst.delete_regime(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Document status
// ============================================================================

async fn get_doc_status(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.gst.doc_status(&ctx, id).await?))
}

async fn save_doc_status(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<GstDocStatusInput>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state.services.gst.save_doc_status(&ctx, id, input).await?,
    ))
}

async fn delete_doc_status(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.gst.delete_doc_status(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
