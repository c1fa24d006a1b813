//! Journal entry and ledger routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ledgerline_services::JournalInput;
use ledgerline_shared::types::pagination::{DEFAULT_PAGE_SIZE, LARGE_PAGE_SIZE};
use uuid::Uuid;

use super::UpdateRequest;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, Ctx, PageParams},
};

/// Creates the journal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/journal-entries", get(list_entries).post(create_entry))
        .route(
            "/journal-entries/{id}",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .route("/ledger-entries", get(list_ledger))
}

/// GET `/journal-entries` - List entries newest first, each with its lines.
async fn list_entries(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(state.services.journals.list(&ctx, page).await?))
}

/// POST `/journal-entries` - Post a balanced entry.
async fn create_entry(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<JournalInput>,
) -> ApiResult<impl IntoResponse> {
    let entry = state.services.journals.create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET `/journal-entries/{id}` - Fetch an entry with its lines.
async fn get_entry(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.journals.get(&ctx, id).await?))
}

/// PUT `/journal-entries/{id}` - Replace the header and every line.
async fn update_entry(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateRequest<JournalInput>>,
) -> ApiResult<impl IntoResponse> {
    let entry = state
        .services
        .journals
        .update(&ctx, id, body.revision, body.data)
        .await?;
    Ok(Json(entry))
}

/// DELETE `/journal-entries/{id}` - Delete an entry and its lines.
async fn delete_entry(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.journals.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/ledger-entries` - Flattened ledger, one row per line.
async fn list_ledger(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(LARGE_PAGE_SIZE)?;
    Ok(Json(state.services.journals.ledger(&ctx, page).await?))
}
