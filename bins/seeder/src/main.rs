//! Database seeder for Ledgerline development and testing.
//!
//! Seeds a starter chart of accounts and a handful of cost centers. Records
//! that already exist are left alone, so the seeder can be re-run.
//!
//! Usage: cargo run --bin seeder

use std::collections::HashMap;

use anyhow::Context;
use ledgerline_db::entities::sea_orm_active_enums::{AccountStatus, AccountType};
use ledgerline_db::migration::{Migrator, MigratorTrait};
use ledgerline_db::repositories::{AccountInput, AccountRepository, CostCenterInput};
use ledgerline_db::{Gateway, connect};
use ledgerline_events::EventPublisher;
use ledgerline_services::Services;
use ledgerline_shared::{AppConfig, AppError, RequestContext};
use uuid::Uuid;

/// Starter chart: code, name, type, parent code, manual journals allowed.
const CHART: &[(&str, &str, AccountType, Option<&str>, bool)] = &[
    ("1000", "Assets", AccountType::Asset, None, false),
    ("1100", "Cash", AccountType::Asset, Some("1000"), true),
    ("1200", "Bank", AccountType::Asset, Some("1000"), true),
    ("1300", "Accounts Receivable", AccountType::Asset, Some("1000"), false),
    ("1400", "Inventory", AccountType::Asset, Some("1000"), false),
    ("2000", "Liabilities", AccountType::Liability, None, false),
    ("2100", "Accounts Payable", AccountType::Liability, Some("2000"), false),
    ("2200", "GST Payable", AccountType::Liability, Some("2000"), false),
    ("2300", "Accrued Expenses", AccountType::Liability, Some("2000"), true),
    ("3000", "Equity", AccountType::Equity, None, false),
    ("3100", "Owner's Capital", AccountType::Equity, Some("3000"), true),
    ("3200", "Retained Earnings", AccountType::Equity, Some("3000"), false),
    ("4000", "Revenue", AccountType::Revenue, None, false),
    ("4100", "Sales", AccountType::Revenue, Some("4000"), true),
    ("4200", "Service Income", AccountType::Revenue, Some("4000"), true),
    ("5000", "Expenses", AccountType::Expense, None, false),
    ("5100", "Cost of Goods Sold", AccountType::Expense, Some("5000"), false),
    ("5200", "Salaries", AccountType::Expense, Some("5000"), false),
    ("5300", "Rent", AccountType::Expense, Some("5000"), true),
    ("5400", "Travel", AccountType::Expense, Some("5000"), true),
];

const COST_CENTERS: &[(&str, &str)] = &[
    ("ENG", "Engineering"),
    ("SALES", "Sales"),
    ("OPS", "Operations"),
    ("ADMIN", "Administration"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;

    println!("Connecting to database...");
    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    let gateway = Gateway::new(db);
    let events = EventPublisher::from_config(&config.events)
        .context("Failed to build event transport")?;
    let services = Services::new(&gateway, &events);
    let ctx = RequestContext::background();

    println!("Seeding chart of accounts...");
    seed_accounts(&gateway, &services, &ctx).await?;

    println!("Seeding cost centers...");
    seed_cost_centers(&services, &ctx).await?;

    events.shutdown().await;
    println!("Seeding complete!");
    Ok(())
}

/// Creates every missing account in [`CHART`]. Parents precede children in
/// the table, so parent ids are always known by the time they are needed.
async fn seed_accounts(
    gateway: &Gateway,
    services: &Services,
    ctx: &RequestContext,
) -> anyhow::Result<()> {
    let mut by_code: HashMap<String, Uuid> = AccountRepository::new(gateway.connection())
        .all()
        .await?
        .into_iter()
        .map(|a| (a.code, a.id))
        .collect();

    let mut inserted = 0;
    for (code, name, account_type, parent, manual) in CHART {
        if by_code.contains_key(*code) {
            continue;
        }
        let parent_id = match parent {
            Some(parent) => Some(
                *by_code
                    .get(*parent)
                    .with_context(|| format!("parent account {parent} missing"))?,
            ),
            None => None,
        };
        let account = services
            .accounts
            .create(
                ctx,
                AccountInput {
                    code: (*code).to_string(),
                    name: (*name).to_string(),
                    description: None,
                    account_type: *account_type,
                    status: AccountStatus::Active,
                    parent_id,
                    allow_manual_journal: *manual,
                },
            )
            .await
            .with_context(|| format!("Failed to insert account {code}"))?;
        by_code.insert(account.code, account.id);
        inserted += 1;
    }

    println!("  Inserted {inserted} accounts ({} already present)", CHART.len() - inserted);
    Ok(())
}

async fn seed_cost_centers(services: &Services, ctx: &RequestContext) -> anyhow::Result<()> {
    let mut inserted = 0;
    for (code, name) in COST_CENTERS {
        let input = CostCenterInput {
            code: (*code).to_string(),
            name: (*name).to_string(),
            description: None,
            is_active: true,
        };
        match services.cost_centers.create(ctx, input).await {
            Ok(_) => inserted += 1,
            Err(AppError::Conflict(_)) => println!("  Cost center {code} already exists, skipping..."),
            Err(e) => return Err(e).with_context(|| format!("Failed to insert cost center {code}")),
        }
    }

    println!("  Inserted {inserted} cost centers");
    Ok(())
}
