//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes under `/api/v1` over the domain services
//! - Request context middleware (`X-User-ID` actor, request deadline)
//! - Extractors that report malformed input as `INVALID_ARGUMENT`
//! - Error-to-status mapping

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use ledgerline_db::Gateway;
use ledgerline_events::EventPublisher;
use ledgerline_services::Services;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Domain services.
    pub services: Arc<Services>,
    /// Store handle, used by the health check.
    pub gateway: Gateway,
    /// Deadline applied to every request; `None` disables it.
    pub request_timeout: Option<Duration>,
}

impl AppState {
    /// Builds the state over a gateway and publisher.
    #[must_use]
    pub fn new(gateway: Gateway, events: &EventPublisher, request_timeout: Option<Duration>) -> Self {
        Self {
            services: Arc::new(Services::new(&gateway, events)),
            gateway,
            request_timeout,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
