//! API route definitions.

use axum::{Router, middleware};
use serde::Deserialize;

use crate::{AppState, middleware::request_context};

pub mod accounts;
pub mod accruals;
pub mod allocations;
pub mod audit;
pub mod budgets;
pub mod cash_flow;
pub mod consolidations;
pub mod cost_centers;
pub mod exchange_rates;
pub mod expenses;
pub mod finance_events;
pub mod gst;
pub mod health;
pub mod invoices;
pub mod journals;
pub mod notes;
pub mod payments;
pub mod reports;

/// Body of a revision-checked update: the caller's last seen `revision` plus
/// the writable fields.
#[derive(Debug, Deserialize)]
pub struct UpdateRequest<T> {
    /// Revision the caller read.
    pub revision: i64,
    /// New field values.
    #[serde(flatten)]
    pub data: T,
}

/// Creates the API router. Every domain route runs under the request context
/// middleware; the health check does not.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let domain = Router::new()
        .merge(accounts::routes())
        .merge(journals::routes())
        .merge(invoices::routes())
        .merge(payments::routes())
        .merge(notes::routes())
        .merge(gst::routes())
        .merge(budgets::routes())
        .merge(expenses::routes())
        .merge(cost_centers::routes())
        .merge(allocations::routes())
        .merge(cash_flow::routes())
        .merge(consolidations::routes())
        .merge(exchange_rates::routes())
        .merge(accruals::routes())
        .merge(audit::routes())
        .merge(finance_events::routes())
        .merge(reports::routes())
        .layer(middleware::from_fn_with_state(state, request_context));

    Router::new().merge(health::routes()).merge(domain)
}
