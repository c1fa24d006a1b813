//! Shared setup for HTTP tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use ledgerline_api::{AppState, create_router, middleware::ACTOR_HEADER};
use ledgerline_db::Gateway;
use ledgerline_db::migration::{Migrator, MigratorTrait};
use ledgerline_events::{EventPublisher, InMemoryTransport};
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

/// Router over a fresh migrated in-memory database.
pub struct TestServer {
    pub router: Router,
    pub transport: Arc<InMemoryTransport>,
    pub actor: Uuid,
}

pub async fn setup() -> TestServer {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to migrate");

    let (events, transport) = EventPublisher::in_memory();
    let state = AppState::new(Gateway::new(db), &events, None);
    TestServer {
        router: create_router(state),
        transport,
        actor: Uuid::now_v7(),
    }
}

impl TestServer {
    /// Sends a request as the test actor and returns the status and the
    /// decoded body (`Null` when empty).
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(ACTOR_HEADER, self.actor.to_string());
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.raw(request).await
    }

    /// Sends a prepared request.
    pub async fn raw(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send("PUT", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send("DELETE", uri, None).await
    }

    /// Creates an account and returns its id.
    pub async fn account(&self, code: &str, account_type: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/accounts",
                serde_json::json!({
                    "code": code,
                    "name": format!("Account {code}"),
                    "account_type": account_type,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}
