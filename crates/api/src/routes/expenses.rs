//! Expense routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use ledgerline_db::repositories::{ExpenseFilter, ExpenseInput};
use ledgerline_shared::types::pagination::DEFAULT_PAGE_SIZE;
use uuid::Uuid;

use super::UpdateRequest;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, Ctx, PageParams},
};

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route(
            "/expenses/{id}",
            get(get_expense).put(update_expense).delete(delete_expense),
        )
}

async fn list_expenses(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(filter): ApiQuery<ExpenseFilter>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(state.services.expenses.list(&ctx, &filter, page).await?))
}

async fn create_expense(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<ExpenseInput>,
) -> ApiResult<impl IntoResponse> {
    let expense = state.services.expenses.create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

async fn get_expense(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.expenses.get(&ctx, id).await?))
}

async fn update_expense(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateRequest<ExpenseInput>>,
) -> ApiResult<impl IntoResponse> {
    let expense = state
        .services
        .expenses
        .update(&ctx, id, body.revision, body.data)
        .await?;
    Ok(Json(expense))
}

async fn delete_expense(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.expenses.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
