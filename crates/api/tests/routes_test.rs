//! HTTP surface: status codes, error bodies, paging and the request context.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::setup;
use ledgerline_events::Topic;
use serde_json::{Value, json};
use uuid::Uuid;

fn sale(cash: &str, sales: &str, debit: &str, credit: &str) -> Value {
    json!({
        "journal_date": "2024-01-15T10:00:00Z",
        "memo": "Sale",
        "lines": [
            {"account_id": cash, "side": "DEBIT", "amount": debit},
            {"account_id": sales, "side": "CREDIT", "amount": credit},
        ],
    })
}

fn invoice(number: &str, grand_total: &str) -> Value {
    json!({
        "organization_id": Uuid::now_v7(),
        "invoice_number": number,
        "invoice_type": "SALES",
        "invoice_date": "2024-03-01T09:00:00Z",
        "status": "PENDING",
        "counterparty_name": "Acme Traders",
        "subtotal": "1000",
        "grand_total": grand_total,
        "items": [
            {"description": "Consulting", "quantity": "1", "unit_price": "1000", "line_total": "1000"},
        ],
        "taxes": [
            {"name": "GST", "rate": "18", "amount": "180"},
        ],
    })
}

#[tokio::test]
async fn test_health_reports_database_up() {
    let server = setup().await;

    let (status, body) = server.get("/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "up");
}

#[tokio::test]
async fn test_account_lifecycle_over_http() {
    let server = setup().await;
    let id = server.account("1001", "ASSET").await;

    let (status, body) = server.get(&format!("/api/v1/accounts/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "1001");
    assert_eq!(body["revision"], 1);

    let update = json!({
        "revision": 1,
        "code": "1001",
        "name": "Cash on hand",
        "account_type": "ASSET",
    });
    let (status, body) = server.put(&format!("/api/v1/accounts/{id}"), update.clone()).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["name"], "Cash on hand");
    assert_eq!(body["revision"], 2);

    // Same revision again is stale now.
    let (status, body) = server.put(&format!("/api/v1/accounts/{id}"), update).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");

    let (status, body) = server.delete(&format!("/api/v1/accounts/{id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = server.get(&format!("/api/v1/accounts/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");

    let keys = server.transport.keys(Topic::Accounts);
    assert_eq!(
        keys,
        vec!["account.created", "account.updated", "account.deleted"]
    );
}

#[tokio::test]
async fn test_duplicate_account_code_is_conflict() {
    let server = setup().await;
    server.account("2001", "LIABILITY").await;

    let (status, body) = server
        .post(
            "/api/v1/accounts",
            json!({"code": "2001", "name": "Again", "account_type": "LIABILITY"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_malformed_path_id_is_invalid_argument() {
    let server = setup().await;

    let (status, body) = server.get("/api/v1/accounts/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_malformed_body_is_invalid_argument() {
    let server = setup().await;

    let (status, body) = server
        .post("/api/v1/accounts", json!({"code": "1001"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_malformed_actor_header_is_rejected() {
    let server = setup().await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/accounts")
        .header("x-user-id", "someone")
        .body(Body::empty())
        .unwrap();
    let (status, body) = server.raw(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_requests_without_actor_are_served() {
    let server = setup().await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/accounts")
        .body(Body::empty())
        .unwrap();
    let (status, body) = server.raw(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_size"], 0);
}

#[tokio::test]
async fn test_account_pages_follow_tokens() {
    let server = setup().await;
    for code in ["1001", "1002", "1003"] {
        server.account(code, "ASSET").await;
    }

    let (status, first) = server.get("/api/v1/accounts?page_size=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["items"].as_array().unwrap().len(), 2);
    assert_eq!(first["total_size"], 3);
    assert_eq!(first["items"][0]["code"], "1001");
    let token = first["next_page_token"].as_str().unwrap();
    assert!(!token.is_empty());

    let (status, second) = server
        .get(&format!("/api/v1/accounts?page_size=2&page_token={token}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["items"].as_array().unwrap().len(), 1);
    assert_eq!(second["items"][0]["code"], "1003");
    assert_eq!(second["next_page_token"], "");

    let (status, body) = server.get("/api/v1/accounts?page_token=%25%25").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_page_token_past_the_end_is_empty() {
    let server = setup().await;
    server.account("1001", "ASSET").await;

    let (status, body) = server.get("/api/v1/accounts?page_token=500").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["next_page_token"], "");
    assert_eq!(body["total_size"], 1);

    let (status, body) = server
        .get("/api/v1/accounts?offset=18446744073709551615")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_max_revision_is_conflict_over_http() {
    let server = setup().await;
    let id = server.account("1001", "ASSET").await;

    let update = json!({
        "revision": i64::MAX,
        "code": "1001",
        "name": "Cash",
        "account_type": "ASSET",
    });
    let (status, body) = server.put(&format!("/api/v1/accounts/{id}"), update).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_journal_amounts_outside_column_are_invalid_argument() {
    let server = setup().await;
    let cash = server.account("1001", "ASSET").await;
    let sales = server.account("4001", "REVENUE").await;

    let huge = "79228162514264337593543950335";
    for (debit, credit) in [(huge, huge), ("0.00005", "0.00005")] {
        let (status, body) = server
            .post("/api/v1/journal-entries", sale(&cash, &sales, debit, credit))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["error"], "INVALID_ARGUMENT");
    }

    let (_, ledger) = server.get("/api/v1/ledger-entries").await;
    assert_eq!(ledger["total_size"], 0);
}

#[tokio::test]
async fn test_account_list_filters_by_type() {
    let server = setup().await;
    server.account("1001", "ASSET").await;
    server.account("4001", "REVENUE").await;

    let (status, body) = server.get("/api/v1/accounts?account_type=REVENUE").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_size"], 1);
    assert_eq!(body["items"][0]["code"], "4001");
}

#[tokio::test]
async fn test_journal_balance_enforced_over_http() {
    let server = setup().await;
    let cash = server.account("1001", "ASSET").await;
    let sales = server.account("4001", "REVENUE").await;

    let (status, body) = server
        .post("/api/v1/journal-entries", sale(&cash, &sales, "100", "90"))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "FAILED_PRECONDITION");

    let (status, body) = server
        .post("/api/v1/journal-entries", sale(&cash, &sales, "100", "100"))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["lines"].as_array().unwrap().len(), 2);

    let (status, ledger) = server.get("/api/v1/ledger-entries").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ledger["total_size"], 2);

    let (status, balance) = server.get("/api/v1/reports/trial-balance").await;
    assert_eq!(status, StatusCode::OK);
    assert!(balance.is_object());
}

#[tokio::test]
async fn test_invoice_total_checked_over_http() {
    let server = setup().await;

    let (status, body) = server
        .post("/api/v1/invoices", invoice("INV-1", "1200"))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "FAILED_PRECONDITION");

    let (status, body) = server
        .post("/api/v1/invoices", invoice("INV-1", "1180"))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["taxes"].as_array().unwrap().len(), 1);

    let (status, found) = server.get("/api/v1/invoices/search?q=INV").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["total_size"], 1);

    let (status, notes) = server
        .get(&format!("/api/v1/invoices/{id}/credit-debit-notes"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notes["total_size"], 0);

    let missing = Uuid::now_v7();
    let (status, _) = server
        .get(&format!("/api/v1/invoices/{missing}/credit-debit-notes"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_settles_invoice_over_http() {
    let server = setup().await;
    let (_, created) = server
        .post("/api/v1/invoices", invoice("INV-7", "1180"))
        .await;
    let invoice_id = created["id"].as_str().unwrap().to_string();

    let (status, payment) = server
        .post(
            &format!("/api/v1/invoices/{invoice_id}/payments"),
            json!({"amount": "1180", "due_date": "2024-03-31T00:00:00Z"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{payment}");
    let payment_id = payment["id"].as_str().unwrap().to_string();

    let (status, paid) = server
        .post(&format!("/api/v1/payments/{payment_id}/mark-paid"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "{paid}");
    assert_eq!(paid["payment"]["status"], "PAID");
    assert_eq!(paid["finance_event"]["event_type"], "PAYMENT_RECEIVED");

    let (status, again) = server
        .post(&format!("/api/v1/payments/{payment_id}/mark-paid"), json!({}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(again["error"], "FAILED_PRECONDITION");

    let (status, outcome) = server
        .post(
            &format!("/api/v1/invoices/{invoice_id}/reconcile"),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{outcome}");
    assert_eq!(outcome["status"], "PAID");
}

#[tokio::test]
async fn test_latest_rate_missing_pair_is_not_found() {
    let server = setup().await;

    let (status, body) = server
        .get("/api/v1/exchange-rates/latest?base=USD&quote=EUR")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_finance_events_require_organization() {
    let server = setup().await;

    let (status, body) = server.get("/api/v1/finance-events").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ARGUMENT");

    let org = Uuid::now_v7();
    let (status, event) = server
        .post(
            "/api/v1/finance-events",
            json!({"event_type": "PAYROLL_POSTED", "organization_id": org, "amount": "5000"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{event}");

    let (status, page) = server
        .get(&format!("/api/v1/finance-events?organization_id={org}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_size"], 1);
    assert_eq!(page["items"][0]["event_type"], "PAYROLL_POSTED");
}

#[tokio::test]
async fn test_budget_over_allocation_is_failed_precondition() {
    let server = setup().await;
    let (status, budget) = server
        .post(
            "/api/v1/budgets",
            json!({"name": "FY24 Ops", "fiscal_year": 2024, "total_amount": "1000"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{budget}");
    let id = budget["id"].as_str().unwrap().to_string();

    let (status, body) = server
        .post(
            &format!("/api/v1/budgets/{id}/allocations"),
            json!({"department": "Sales", "allocated_amount": "1500"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "FAILED_PRECONDITION");
}
