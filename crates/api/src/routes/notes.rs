//! Credit and debit note routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ledgerline_db::repositories::CreditDebitNoteInput;
use ledgerline_shared::types::pagination::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use uuid::Uuid;

use super::UpdateRequest;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, Ctx, PageParams},
};

/// Query parameters for listing notes.
#[derive(Debug, Default, Deserialize)]
pub struct NoteQuery {
    /// Only notes against this invoice.
    pub invoice_id: Option<Uuid>,
}

/// Creates the note routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/credit-debit-notes", get(list_notes).post(create_note))
        .route(
            "/credit-debit-notes/{id}",
            get(get_note).put(update_note).delete(delete_note),
        )
}

async fn list_notes(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(query): ApiQuery<NoteQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(
        state.services.notes.list(&ctx, query.invoice_id, page).await?,
    ))
}

async fn create_note(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<CreditDebitNoteInput>,
) -> ApiResult<impl IntoResponse> {
    let note = state.services.notes.create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

async fn get_note(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.notes.get(&ctx, id).await?))
}

async fn update_note(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateRequest<CreditDebitNoteInput>>,
) -> ApiResult<impl IntoResponse> {
    let note = state
        .services
        .notes
        .update(&ctx, id, body.revision, body.data)
        .await?;
    Ok(Json(note))
}

async fn delete_note(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.notes.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
