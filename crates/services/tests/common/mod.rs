//! Shared setup for service tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use ledgerline_db::Gateway;
use ledgerline_db::entities::accounts;
use ledgerline_db::entities::sea_orm_active_enums::{AccountStatus, AccountType};
use ledgerline_db::migration::{Migrator, MigratorTrait};
use ledgerline_db::repositories::AccountInput;
use ledgerline_events::{EventPublisher, InMemoryTransport};
use ledgerline_services::Services;
use ledgerline_shared::RequestContext;
use sea_orm::{ConnectOptions, Database};
use uuid::Uuid;

/// Services over a fresh migrated in-memory database, plus the transport
/// that captures their events.
pub struct TestApp {
    pub services: Services,
    pub gateway: Gateway,
    pub transport: Arc<InMemoryTransport>,
}

pub async fn setup() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("Failed to open in-memory database");
    Migrator::up(&db, None).await.expect("Failed to migrate");

    let gateway = Gateway::new(db);
    let (events, transport) = EventPublisher::in_memory();
    TestApp {
        services: Services::new(&gateway, &events),
        gateway,
        transport,
    }
}

pub fn ctx() -> RequestContext {
    RequestContext::new().with_actor(Some(Uuid::now_v7()))
}

pub fn account_input(code: &str, account_type: AccountType, manual: bool) -> AccountInput {
    AccountInput {
        code: code.to_string(),
        name: format!("Account {code}"),
        description: None,
        account_type,
        status: AccountStatus::Active,
        parent_id: None,
        allow_manual_journal: manual,
    }
}

pub async fn account(
    app: &TestApp,
    code: &str,
    account_type: AccountType,
    manual: bool,
) -> accounts::Model {
    app.services
        .accounts
        .create(&ctx(), account_input(code, account_type, manual))
        .await
        .unwrap()
}

pub fn at(year: i32, month: u32, d: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, d, hour, 0, 0).unwrap()
}
