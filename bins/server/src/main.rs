//! Ledgerline API Server
//!
//! Main entry point for the Ledgerline backend service.

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use ledgerline_api::{AppState, create_router};
use ledgerline_db::migration::{Migrator, MigratorTrait};
use ledgerline_db::{Gateway, connect};
use ledgerline_events::EventPublisher;
use ledgerline_shared::AppConfig;
use ledgerline_shared::config::LoggingConfig;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ledgerline=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    Migrator::up(&db, None).await.context("Failed to run migrations")?;
    info!("Migrations applied");

    let events = EventPublisher::from_config(&config.events)
        .context("Failed to build event transport")?;
    info!(transport = ?config.events.transport, "Event publisher ready");

    let request_timeout = match config.server.request_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let state = AppState::new(Gateway::new(db), &events, request_timeout);
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    events.shutdown().await;
    info!("Server stopped");
    Ok(())
}
