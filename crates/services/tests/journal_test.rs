//! Journal service: double-entry enforcement, atomicity and the ledger view.

mod common;

use common::{account, at, ctx, setup};
use ledgerline_core::ledger::{LineInput, Side};
use ledgerline_db::entities::sea_orm_active_enums::{AccountStatus, AccountType, LineSide};
use ledgerline_events::Topic;
use ledgerline_services::JournalInput;
use ledgerline_shared::AppError;
use ledgerline_shared::types::{Page, PageRequest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn line(account_id: Uuid, side: Side, amount: &str) -> LineInput {
    LineInput {
        account_id,
        side,
        amount: amount.to_string(),
        cost_center_id: None,
        description: None,
    }
}

fn entry(memo: &str, lines: Vec<LineInput>) -> JournalInput {
    JournalInput {
        journal_date: Some(at(2024, 1, 15, 10)),
        reference: None,
        memo: Some(memo.to_string()),
        source_type: None,
        source_id: None,
        lines,
    }
}

#[tokio::test]
async fn test_balanced_entry_appears_in_ledger() {
    let app = setup().await;
    let ctx = ctx();
    let cash = account(&app, "1001", AccountType::Asset, true).await;
    let sales = account(&app, "4001", AccountType::Revenue, true).await;

    let journal = app
        .services
        .journals
        .create(
            &ctx,
            entry(
                "Sale",
                vec![
                    line(cash.id, Side::Debit, "100.00"),
                    line(sales.id, Side::Credit, "100.00"),
                ],
            ),
        )
        .await
        .unwrap();
    assert_eq!(journal.entry.revision, 1);
    assert_eq!(journal.lines.len(), 2);

    let ledger = app
        .services
        .journals
        .ledger(&ctx, Page::new(0, 0, 100))
        .await
        .unwrap();
    assert_eq!(ledger.items.len(), 2);
    assert!(ledger.items.iter().all(|l| l.journal_date == at(2024, 1, 15, 10)));
    assert!(ledger.items.iter().all(|l| l.journal_entry_id == journal.entry.id));
    assert_eq!(ledger.items[0].side, LineSide::Debit);
    assert_eq!(ledger.items[0].amount, dec!(100.00));

    let fetched = app.services.journals.get(&ctx, journal.entry.id).await.unwrap();
    assert_eq!(fetched, journal);

    let messages = app.transport.messages();
    let journal_events: Vec<_> = messages
        .iter()
        .filter(|m| m.topic == Topic::Journals)
        .collect();
    assert_eq!(journal_events.len(), 1);
    assert_eq!(journal_events[0].key, "journal.created");
    let body = journal_events[0].json().unwrap();
    assert_eq!(body["lines"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_unbalanced_entry_rejected_without_side_effects() {
    let app = setup().await;
    let ctx = ctx();
    let cash = account(&app, "1001", AccountType::Asset, true).await;
    let sales = account(&app, "4001", AccountType::Revenue, true).await;
    app.transport.clear();

    let result = app
        .services
        .journals
        .create(
            &ctx,
            entry(
                "Sale",
                vec![
                    line(cash.id, Side::Debit, "100.00"),
                    line(sales.id, Side::Credit, "90.00"),
                ],
            ),
        )
        .await;

    assert!(matches!(result, Err(AppError::FailedPrecondition(_))));
    let listed = app
        .services
        .journals
        .list(&ctx, Page::default())
        .await
        .unwrap();
    assert_eq!(listed.total_size, 0);
    let ledger = app
        .services
        .journals
        .ledger(&ctx, Page::default())
        .await
        .unwrap();
    assert!(ledger.items.is_empty());
    assert!(app.transport.messages().is_empty());
}

#[tokio::test]
async fn test_manual_entry_blocked_on_restricted_account() {
    let app = setup().await;
    let cash = account(&app, "1001", AccountType::Asset, true).await;
    let clearing = account(&app, "1900", AccountType::Asset, false).await;

    let result = app
        .services
        .journals
        .create(
            &ctx(),
            entry(
                "Manual",
                vec![
                    line(cash.id, Side::Debit, "50"),
                    line(clearing.id, Side::Credit, "50"),
                ],
            ),
        )
        .await;
    assert!(matches!(result, Err(AppError::FailedPrecondition(_))));
}

#[tokio::test]
async fn test_system_entry_may_post_to_restricted_account() {
    let app = setup().await;
    let cash = account(&app, "1001", AccountType::Asset, true).await;
    let clearing = account(&app, "1900", AccountType::Asset, false).await;

    let mut input = entry(
        "Payroll run",
        vec![
            line(clearing.id, Side::Debit, "50"),
            line(cash.id, Side::Credit, "50"),
        ],
    );
    input.source_type = Some("PAYROLL".to_string());
    input.source_id = Some(Uuid::now_v7());

    let journal = app.services.journals.create(&ctx(), input).await.unwrap();
    assert_eq!(journal.entry.source_type.as_deref(), Some("PAYROLL"));
}

#[tokio::test]
async fn test_inactive_account_rejected() {
    let app = setup().await;
    let ctx = ctx();
    let cash = account(&app, "1001", AccountType::Asset, true).await;
    let old = account(&app, "1002", AccountType::Asset, true).await;

    let mut input = common::account_input("1002", AccountType::Asset, true);
    input.status = AccountStatus::Archived;
    app.services
        .accounts
        .update(&ctx, old.id, old.revision, input)
        .await
        .unwrap();

    let result = app
        .services
        .journals
        .create(
            &ctx,
            entry(
                "Transfer",
                vec![
                    line(cash.id, Side::Debit, "10"),
                    line(old.id, Side::Credit, "10"),
                ],
            ),
        )
        .await;
    assert!(matches!(result, Err(AppError::FailedPrecondition(_))));
}

#[tokio::test]
async fn test_unknown_account_rejected() {
    let app = setup().await;
    let cash = account(&app, "1001", AccountType::Asset, true).await;

    let result = app
        .services
        .journals
        .create(
            &ctx(),
            entry(
                "Ghost",
                vec![
                    line(cash.id, Side::Debit, "10"),
                    line(Uuid::now_v7(), Side::Credit, "10"),
                ],
            ),
        )
        .await;
    assert!(result.is_err());
    assert!(
        app.services
            .journals
            .list(&ctx(), Page::default())
            .await
            .unwrap()
            .items
            .is_empty()
    );
}

#[tokio::test]
async fn test_malformed_amount_is_invalid_argument() {
    let app = setup().await;
    let cash = account(&app, "1001", AccountType::Asset, true).await;
    let sales = account(&app, "4001", AccountType::Revenue, true).await;

    let result = app
        .services
        .journals
        .create(
            &ctx(),
            entry(
                "Typo",
                vec![
                    line(cash.id, Side::Debit, "1O0"),
                    line(sales.id, Side::Credit, "100"),
                ],
            ),
        )
        .await;
    assert!(matches!(result, Err(AppError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_update_replaces_lines_and_bumps_revision() {
    let app = setup().await;
    let ctx = ctx();
    let cash = account(&app, "1001", AccountType::Asset, true).await;
    let sales = account(&app, "4001", AccountType::Revenue, true).await;
    let tax = account(&app, "2100", AccountType::Liability, true).await;

    let journal = app
        .services
        .journals
        .create(
            &ctx,
            entry(
                "Sale",
                vec![
                    line(cash.id, Side::Debit, "100"),
                    line(sales.id, Side::Credit, "100"),
                ],
            ),
        )
        .await
        .unwrap();

    let updated = app
        .services
        .journals
        .update(
            &ctx,
            journal.entry.id,
            journal.entry.revision,
            entry(
                "Sale with tax",
                vec![
                    line(cash.id, Side::Debit, "118"),
                    line(sales.id, Side::Credit, "100"),
                    line(tax.id, Side::Credit, "18"),
                ],
            ),
        )
        .await
        .unwrap();

    assert_eq!(updated.entry.revision, 2);
    assert_eq!(updated.lines.len(), 3);
    let debit: Decimal = updated
        .lines
        .iter()
        .filter(|l| l.side == LineSide::Debit)
        .map(|l| l.amount)
        .sum();
    let credit: Decimal = updated
        .lines
        .iter()
        .filter(|l| l.side == LineSide::Credit)
        .map(|l| l.amount)
        .sum();
    assert_eq!(debit, credit);

    let ledger = app
        .services
        .journals
        .ledger(&ctx, Page::default())
        .await
        .unwrap();
    assert_eq!(ledger.items.len(), 3);
    assert_eq!(
        app.transport.keys(Topic::Journals),
        vec!["journal.created", "journal.updated"]
    );
}

#[tokio::test]
async fn test_delete_removes_entry_and_lines() {
    let app = setup().await;
    let ctx = ctx();
    let cash = account(&app, "1001", AccountType::Asset, true).await;
    let sales = account(&app, "4001", AccountType::Revenue, true).await;

    let journal = app
        .services
        .journals
        .create(
            &ctx,
            entry(
                "Sale",
                vec![
                    line(cash.id, Side::Debit, "5"),
                    line(sales.id, Side::Credit, "5"),
                ],
            ),
        )
        .await
        .unwrap();

    app.services
        .journals
        .delete(&ctx, journal.entry.id)
        .await
        .unwrap();

    assert!(matches!(
        app.services.journals.get(&ctx, journal.entry.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(
        app.services
            .journals
            .ledger(&ctx, Page::default())
            .await
            .unwrap()
            .items
            .is_empty()
    );
    assert_eq!(
        app.transport.keys(Topic::Journals),
        vec!["journal.created", "journal.deleted"]
    );
}

#[tokio::test]
async fn test_page_loop_returns_every_entry_once() {
    let app = setup().await;
    let ctx = ctx();
    let cash = account(&app, "1001", AccountType::Asset, true).await;
    let sales = account(&app, "4001", AccountType::Revenue, true).await;

    let mut created = Vec::new();
    for i in 0..7 {
        let amount = format!("{}.00", i + 1);
        let journal = app
            .services
            .journals
            .create(
                &ctx,
                entry(
                    &format!("Sale {i}"),
                    vec![
                        line(cash.id, Side::Debit, &amount),
                        line(sales.id, Side::Credit, &amount),
                    ],
                ),
            )
            .await
            .unwrap();
        created.push(journal.entry.id);
    }

    let mut seen = Vec::new();
    let mut token = String::new();
    loop {
        let page = PageRequest::new(3, token.clone()).resolve(50).unwrap();
        let response = app.services.journals.list(&ctx, page).await.unwrap();
        assert_eq!(response.total_size, 7);
        seen.extend(response.items.iter().map(|j| j.entry.id));
        if response.next_page_token.is_empty() {
            break;
        }
        token = response.next_page_token;
    }

    assert_eq!(seen.len(), 7);
    created.sort();
    seen.sort();
    assert_eq!(seen, created);
}
