//! Chart of accounts routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ledgerline_db::repositories::{AccountFilter, AccountInput};
use ledgerline_shared::types::pagination::LARGE_PAGE_SIZE;
use uuid::Uuid;

use super::UpdateRequest;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, Ctx, PageParams},
};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts).post(create_account))
        .route(
            "/accounts/{id}",
            get(get_account).put(update_account).delete(delete_account),
        )
}

/// GET `/accounts` - List accounts ordered by code.
async fn list_accounts(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(filter): ApiQuery<AccountFilter>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(LARGE_PAGE_SIZE)?;
    let accounts = state.services.accounts.list(&ctx, &filter, page).await?;
    Ok(Json(accounts))
}

/// POST `/accounts` - Create an account.
async fn create_account(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<AccountInput>,
) -> ApiResult<impl IntoResponse> {
    let account = state.services.accounts.create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET `/accounts/{id}` - Fetch an account.
async fn get_account(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.accounts.get(&ctx, id).await?))
}

/// PUT `/accounts/{id}` - Rewrite an account at a known revision.
async fn update_account(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateRequest<AccountInput>>,
) -> ApiResult<impl IntoResponse> {
    let account = state
        .services
        .accounts
        .update(&ctx, id, body.revision, body.data)
        .await?;
    Ok(Json(account))
}

/// DELETE `/accounts/{id}` - Delete an account.
async fn delete_account(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.accounts.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
