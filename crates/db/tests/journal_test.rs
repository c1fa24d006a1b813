//! Integration tests for JournalRepository and the ledger view.

mod common;

use chrono::{DateTime, Utc};
use ledgerline_core::ledger::{ResolvedLine, Side};
use ledgerline_db::entities::sea_orm_active_enums::{AccountStatus, AccountType, LineSide};
use ledgerline_db::repositories::{AccountInput, AccountRepository, JournalHeader, JournalRepository};
use ledgerline_db::{Gateway, GatewayError};
use ledgerline_shared::types::Page;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

async fn account(db: &DatabaseConnection, code: &str, account_type: AccountType) -> Uuid {
    AccountRepository::new(db)
        .create(
            AccountInput {
                code: code.to_string(),
                name: format!("Account {code}"),
                description: None,
                account_type,
                status: AccountStatus::Active,
                parent_id: None,
                allow_manual_journal: true,
            },
            None,
        )
        .await
        .unwrap()
        .id
}

fn header(date: DateTime<Utc>, memo: &str) -> JournalHeader {
    JournalHeader {
        journal_date: date,
        reference: None,
        memo: Some(memo.to_string()),
        source_type: None,
        source_id: None,
    }
}

fn pair(debit: Uuid, credit: Uuid, amount: rust_decimal::Decimal) -> Vec<ResolvedLine> {
    vec![
        ResolvedLine {
            position: 0,
            account_id: debit,
            side: Side::Debit,
            amount,
            cost_center_id: None,
            description: None,
        },
        ResolvedLine {
            position: 1,
            account_id: credit,
            side: Side::Credit,
            amount,
            cost_center_id: None,
            description: Some("sale".to_string()),
        },
    ]
}

#[tokio::test]
async fn test_entry_with_lines_round_trip() {
    let db = common::setup().await;
    let cash = account(&db, "1000", AccountType::Asset).await;
    let sales = account(&db, "4000", AccountType::Revenue).await;
    let repo = JournalRepository::new(&db);

    let entry = repo
        .insert_entry(header(common::day(2024, 1, 15), "Sale"), None)
        .await
        .unwrap();
    let lines = repo
        .replace_lines(entry.id, &pair(cash, sales, dec!(100)), None)
        .await
        .unwrap();
    assert_eq!(lines.len(), 2);

    let loaded = repo.get_with_lines(entry.id).await.unwrap();
    assert_eq!(loaded.entry.memo.as_deref(), Some("Sale"));
    assert_eq!(loaded.lines.len(), 2);
    assert_eq!(loaded.lines[0].side, LineSide::Debit);
    assert_eq!(loaded.lines[0].account_id, cash);
    assert_eq!(loaded.lines[1].side, LineSide::Credit);
    assert_eq!(loaded.lines[1].amount, dec!(100));
}

#[tokio::test]
async fn test_replace_lines_rewrites_whole_set() {
    let db = common::setup().await;
    let cash = account(&db, "1000", AccountType::Asset).await;
    let sales = account(&db, "4000", AccountType::Revenue).await;
    let repo = JournalRepository::new(&db);
    let entry = repo
        .insert_entry(header(common::day(2024, 1, 15), "Sale"), None)
        .await
        .unwrap();
    repo.replace_lines(entry.id, &pair(cash, sales, dec!(100)), None)
        .await
        .unwrap();

    repo.replace_lines(entry.id, &pair(cash, sales, dec!(250)), None)
        .await
        .unwrap();
    let lines = repo.lines_for(entry.id).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.amount == dec!(250)));
}

#[tokio::test]
async fn test_ledger_orders_by_date_then_position() {
    let db = common::setup().await;
    let cash = account(&db, "1000", AccountType::Asset).await;
    let sales = account(&db, "4000", AccountType::Revenue).await;
    let repo = JournalRepository::new(&db);

    let older = repo
        .insert_entry(header(common::day(2024, 1, 10), "older"), None)
        .await
        .unwrap();
    repo.replace_lines(older.id, &pair(cash, sales, dec!(10)), None)
        .await
        .unwrap();
    let newer = repo
        .insert_entry(header(common::day(2024, 2, 1), "newer"), None)
        .await
        .unwrap();
    repo.replace_lines(newer.id, &pair(cash, sales, dec!(20)), None)
        .await
        .unwrap();

    let (rows, total) = repo.ledger(Page { limit: 100, offset: 0 }).await.unwrap();
    assert_eq!(total, 4);
    let order: Vec<(Uuid, i32)> = rows.iter().map(|r| (r.journal_entry_id, r.position)).collect();
    assert_eq!(
        order,
        vec![(newer.id, 0), (newer.id, 1), (older.id, 0), (older.id, 1)]
    );
    assert_eq!(rows[0].journal_date, common::day(2024, 2, 1));

    let (page, total) = repo.ledger(Page { limit: 1, offset: 3 }).await.unwrap();
    assert_eq!(total, 4);
    assert_eq!(page[0].journal_entry_id, older.id);
    assert_eq!(page[0].position, 1);
}

#[tokio::test]
async fn test_delete_entry_removes_lines() {
    let db = common::setup().await;
    let cash = account(&db, "1000", AccountType::Asset).await;
    let sales = account(&db, "4000", AccountType::Revenue).await;
    let repo = JournalRepository::new(&db);
    let entry = repo
        .insert_entry(header(common::day(2024, 1, 15), "Sale"), None)
        .await
        .unwrap();
    repo.replace_lines(entry.id, &pair(cash, sales, dec!(100)), None)
        .await
        .unwrap();

    assert!(repo.delete_entry(entry.id).await.unwrap());
    assert!(repo.lines_for(entry.id).await.unwrap().is_empty());
    assert!(!repo.delete_entry(entry.id).await.unwrap());
    let (rows, total) = repo.ledger(Page::default()).await.unwrap();
    assert!(rows.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_account_with_postings_cannot_be_deleted() {
    let db = common::setup().await;
    let cash = account(&db, "1000", AccountType::Asset).await;
    let sales = account(&db, "4000", AccountType::Revenue).await;
    let repo = JournalRepository::new(&db);
    let entry = repo
        .insert_entry(header(common::day(2024, 1, 15), "Sale"), None)
        .await
        .unwrap();
    repo.replace_lines(entry.id, &pair(cash, sales, dec!(100)), None)
        .await
        .unwrap();

    let err = AccountRepository::new(&db).delete(cash).await.unwrap_err();
    assert!(matches!(err, GatewayError::Referenced(_)));
}

#[tokio::test]
async fn test_failed_transaction_leaves_nothing_behind() {
    let db = common::setup().await;
    let cash = account(&db, "1000", AccountType::Asset).await;
    let gateway = Gateway::new(db.clone());

    let result: Result<(), GatewayError> = gateway
        .with_transaction(None, move |txn| {
            Box::pin(async move {
                let repo = JournalRepository::new(txn);
                let entry = repo
                    .insert_entry(header(common::day(2024, 1, 15), "broken"), None)
                    .await?;
                // Second line posts to an account that does not exist.
                repo.replace_lines(entry.id, &pair(cash, Uuid::new_v4(), dec!(5)), None)
                    .await?;
                Ok(())
            })
        })
        .await;

    assert!(matches!(result, Err(GatewayError::Referenced(_))));
    let (entries, total) = JournalRepository::new(&db)
        .list_with_lines(Page::default())
        .await
        .unwrap();
    assert!(entries.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_postings_cover_every_line() {
    let db = common::setup().await;
    let cash = account(&db, "1000", AccountType::Asset).await;
    let sales = account(&db, "4000", AccountType::Revenue).await;
    let repo = JournalRepository::new(&db);
    for amount in [dec!(10), dec!(30)] {
        let entry = repo
            .insert_entry(header(common::day(2024, 3, 1), "sale"), None)
            .await
            .unwrap();
        repo.replace_lines(entry.id, &pair(cash, sales, amount), None)
            .await
            .unwrap();
    }

    let postings = repo.postings().await.unwrap();
    assert_eq!(postings.len(), 4);
    let debit: rust_decimal::Decimal = postings
        .iter()
        .filter(|p| p.side == LineSide::Debit)
        .map(|p| p.amount)
        .sum();
    assert_eq!(debit, dec!(40));
}
