//! Invoice routes, including line items, taxes, discounts and the payment
//! schedule of each invoice.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use ledgerline_db::repositories::{
    InvoiceDiscountInput, InvoiceFilter, InvoiceInput, InvoiceItemInput, InvoiceTaxInput,
    PaymentInput,
};
use ledgerline_services::NewInvoice;
use ledgerline_shared::types::pagination::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use uuid::Uuid;

use super::UpdateRequest;
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery, Ctx, PageParams},
};

/// Query parameters for invoice search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Text matched against the invoice number and status note.
    #[serde(default)]
    pub q: String,
}

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/search", get(search_invoices))
        .route(
            "/invoices/{id}",
            get(get_invoice).put(update_invoice).delete(delete_invoice),
        )
        .route("/invoices/{id}/items", get(list_items).post(add_item))
        .route("/invoices/{id}/items/{child_id}", delete(delete_item))
        .route("/invoices/{id}/taxes", get(list_taxes).post(add_tax))
        .route("/invoices/{id}/taxes/{child_id}", delete(delete_tax))
        .route(
            "/invoices/{id}/discounts",
            get(list_discounts).post(add_discount),
        )
        .route("/invoices/{id}/discounts/{child_id}", delete(delete_discount))
        .route("/invoices/{id}/payments", get(list_payments).post(create_payment))
        .route("/invoices/{id}/reconcile", post(reconcile))
        .route("/invoices/{id}/credit-debit-notes", get(list_notes))
}

// ============================================================================
// Invoices
// ============================================================================

/// GET `/invoices`
async fn list_invoices(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(filter): ApiQuery<InvoiceFilter>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(state.services.invoices.list(&ctx, &filter, page).await?))
}

/// GET `/invoices/search?q=`
async fn search_invoices(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiQuery(params): ApiQuery<PageParams>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    Ok(Json(
        state.services.invoices.search(&ctx, &query.q, page).await?,
    ))
}

/// POST `/invoices` - Create an invoice with its inline children.
async fn create_invoice(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiJson(input): ApiJson<NewInvoice>,
) -> ApiResult<impl IntoResponse> {
    let invoice = state.services.invoices.create(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// GET `/invoices/{id}` - Invoice with items, taxes and discounts.
async fn get_invoice(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.invoices.get(&ctx, id).await?))
}

/// PUT `/invoices/{id}` - Rewrite the header at a known revision.
async fn update_invoice(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateRequest<InvoiceInput>>,
) -> ApiResult<impl IntoResponse> {
    let invoice = state
        .services
        .invoices
        .update(&ctx, id, body.revision, body.data)
        .await?;
    Ok(Json(invoice))
}

/// DELETE `/invoices/{id}` - Delete an invoice and everything hanging off it.
async fn delete_invoice(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.invoices.delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Items, taxes, discounts
// ============================================================================

async fn list_items(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.invoices.items(&ctx, id).await?))
}

async fn add_item(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<InvoiceItemInput>,
) -> ApiResult<impl IntoResponse> {
    let item = state.services.invoices.add_item(&ctx, id, input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn delete_item(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((id, child_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.services.invoices.delete_item(&ctx, id, child_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_taxes(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.invoices.taxes(&ctx, id).await?))
}

async fn add_tax(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<InvoiceTaxInput>,
) -> ApiResult<impl IntoResponse> {
    let tax = state.services.invoices.add_tax(&ctx, id, input).await?;
    Ok((StatusCode::CREATED, Json(tax)))
}

async fn delete_tax(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((id, child_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.services.invoices.delete_tax(&ctx, id, child_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_discounts(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.invoices.discounts(&ctx, id).await?))
}

async fn add_discount(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<InvoiceDiscountInput>,
) -> ApiResult<impl IntoResponse> {
    let discount = state.services.invoices.add_discount(&ctx, id, input).await?;
    Ok((StatusCode::CREATED, Json(discount)))
}

async fn delete_discount(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath((id, child_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state
        .services
        .invoices
        .delete_discount(&ctx, id, child_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Payments and notes of an invoice
// ============================================================================

/// GET `/invoices/{id}/payments`
async fn list_payments(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.payments.for_invoice(&ctx, id).await?))
}

/// POST `/invoices/{id}/payments` - Schedule a payment.
async fn create_payment(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<PaymentInput>,
) -> ApiResult<impl IntoResponse> {
    let payment = state.services.payments.create(&ctx, id, input).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// POST `/invoices/{id}/reconcile` - Compare paid against the grand total.
async fn reconcile(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.services.payments.reconcile(&ctx, id).await?))
}

/// GET `/invoices/{id}/credit-debit-notes`
async fn list_notes(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult<impl IntoResponse> {
    let page = params.resolve(DEFAULT_PAGE_SIZE)?;
    // Notes of a missing invoice are a 404, not an empty page.
    state.services.invoices.get(&ctx, id).await?;
    Ok(Json(state.services.notes.list(&ctx, Some(id), page).await?))
}
