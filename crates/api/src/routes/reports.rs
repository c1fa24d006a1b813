//! Report routes.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use ledgerline_db::repositories::ExpenseFilter;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiQuery, Ctx},
};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/trial-balance", get(trial_balance))
        .route("/reports/expense-summary", get(expense_summary))
}

/// GET `/reports/trial-balance` - Debit and credit totals per account.
async fn trial_balance(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.reports.trial_balance(&ctx).await?))
}

/// GET `/reports/expense-summary` - Expense totals by category.
async fn expense_summary(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(filter): ApiQuery<ExpenseFilter>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(
        state.services.reports.expense_summary(&ctx, &filter).await?,
    ))
}
