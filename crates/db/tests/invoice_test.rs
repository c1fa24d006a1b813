//! Integration tests for invoices, their children, GST records and payments.

mod common;

use ledgerline_db::GatewayError;
use ledgerline_db::entities::sea_orm_active_enums::{
    GstDocState, InvoiceStatus, InvoiceType, PaymentStatus,
};
use ledgerline_db::repositories::{
    GstBreakupInput, GstDocStatusInput, GstRepository, InvoiceDiscountInput, InvoiceFilter,
    InvoiceInput, InvoiceItemInput, InvoiceRepository, InvoiceTaxInput, PaymentInput,
    PaymentRepository,
};
use ledgerline_shared::types::Page;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn invoice(org: Uuid, number: &str) -> InvoiceInput {
    InvoiceInput {
        organization_id: org,
        invoice_number: number.to_string(),
        invoice_type: InvoiceType::Sales,
        invoice_date: common::day(2024, 4, 1),
        due_date: Some(common::day(2024, 5, 1)),
        delivery_date: None,
        status: InvoiceStatus::Draft,
        status_note: None,
        counterparty_name: Some("Acme".to_string()),
        currency: "INR".to_string(),
        subtotal: dec!(1000),
        grand_total: dec!(1180),
        gst_rate: None,
        cgst: None,
        sgst: None,
        igst: None,
    }
}

#[tokio::test]
async fn test_children_are_scoped_to_invoice() {
    let db = common::setup().await;
    let repo = InvoiceRepository::new(&db);
    let org = Uuid::new_v4();
    let inv = repo.create(invoice(org, "INV-1"), None).await.unwrap();

    let item = repo
        .add_item(
            inv.id,
            InvoiceItemInput {
                description: "Widget".to_string(),
                quantity: dec!(1),
                unit_price: dec!(1000),
                line_total: dec!(1000),
            },
            None,
        )
        .await
        .unwrap();
    repo.add_tax(
        inv.id,
        InvoiceTaxInput {
            name: "GST".to_string(),
            rate: dec!(18),
            amount: dec!(180),
        },
        None,
    )
    .await
    .unwrap();

    assert_eq!(repo.items(inv.id).await.unwrap().len(), 1);
    let (taxes, discounts) = repo.adjustment_amounts(inv.id).await.unwrap();
    assert_eq!(taxes, vec![dec!(180)]);
    assert!(discounts.is_empty());

    // Deleting through another invoice id must not touch the item.
    assert!(!repo.delete_item(Uuid::new_v4(), item.id).await.unwrap());
    assert!(repo.delete_item(inv.id, item.id).await.unwrap());
    assert!(repo.items(inv.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_child_of_missing_invoice_is_rejected() {
    let db = common::setup().await;
    let repo = InvoiceRepository::new(&db);
    let err = repo
        .add_discount(
            Uuid::new_v4(),
            InvoiceDiscountInput {
                description: "loyalty".to_string(),
                amount: dec!(5),
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Referenced(_)));
}

#[tokio::test]
async fn test_delete_cascade_removes_owned_records() {
    let db = common::setup().await;
    let repo = InvoiceRepository::new(&db);
    let gst = GstRepository::new(&db);
    let payments = PaymentRepository::new(&db);
    let inv = repo.create(invoice(Uuid::new_v4(), "INV-2"), None).await.unwrap();

    repo.add_discount(
        inv.id,
        InvoiceDiscountInput {
            description: "early".to_string(),
            amount: dec!(20),
        },
        None,
    )
    .await
    .unwrap();
    gst.save_breakup(
        inv.id,
        GstBreakupInput {
            taxable_value: dec!(1000),
            cgst: dec!(90),
            sgst: dec!(90),
            igst: dec!(0),
            cess: dec!(0),
        },
        None,
    )
    .await
    .unwrap();
    payments
        .create(
            inv.id,
            PaymentInput {
                amount: dec!(500),
                due_date: common::day(2024, 5, 1),
                method: None,
                reference: None,
            },
            None,
        )
        .await
        .unwrap();

    assert!(repo.delete_cascade(inv.id).await.unwrap());
    assert!(repo.discounts(inv.id).await.unwrap().is_empty());
    assert!(gst.breakup(inv.id).await.unwrap().is_none());
    assert!(payments.for_invoice(inv.id).await.unwrap().is_empty());
    assert!(matches!(
        repo.get(inv.id).await,
        Err(GatewayError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_invoice_number_unique_per_organization() {
    let db = common::setup().await;
    let repo = InvoiceRepository::new(&db);
    let org = Uuid::new_v4();
    repo.create(invoice(org, "INV-7"), None).await.unwrap();

    let err = repo.create(invoice(org, "INV-7"), None).await.unwrap_err();
    assert!(matches!(err, GatewayError::Duplicate(_)));
    repo.create(invoice(Uuid::new_v4(), "INV-7"), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_search_matches_number_and_note() {
    let db = common::setup().await;
    let repo = InvoiceRepository::new(&db);
    let org = Uuid::new_v4();
    repo.create(invoice(org, "INV-100"), None).await.unwrap();
    let mut noted = invoice(org, "BILL-1");
    noted.status_note = Some("waiting on INV approval".to_string());
    repo.create(noted, None).await.unwrap();
    repo.create(invoice(org, "BILL-2"), None).await.unwrap();

    let (rows, total) = repo.search("INV", Page::default()).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(rows.len(), 2);

    let filter = InvoiceFilter {
        organization_id: Some(org),
        ..Default::default()
    };
    let (_, total) = repo.list(&filter, Page::default()).await.unwrap();
    assert_eq!(total, 3);
}

#[tokio::test]
async fn test_gst_save_replaces_existing_record() {
    let db = common::setup().await;
    let inv = InvoiceRepository::new(&db)
        .create(invoice(Uuid::new_v4(), "INV-3"), None)
        .await
        .unwrap();
    let gst = GstRepository::new(&db);

    let status = |irn: &str| GstDocStatusInput {
        einvoice_status: GstDocState::Generated,
        irn: Some(irn.to_string()),
        ack_number: None,
        eway_bill_status: GstDocState::NotApplicable,
        eway_bill_number: None,
    };
    let (first, created) = gst.save_doc_status(inv.id, status("IRN-1"), None).await.unwrap();
    assert!(created);
    let (second, created) = gst.save_doc_status(inv.id, status("IRN-2"), None).await.unwrap();
    assert!(!created);
    assert_eq!(second.id, first.id);
    assert_eq!(second.revision, 2);
    assert_eq!(second.irn.as_deref(), Some("IRN-2"));
}

#[tokio::test]
async fn test_mark_paid_and_paid_amounts() {
    let db = common::setup().await;
    let inv = InvoiceRepository::new(&db)
        .create(invoice(Uuid::new_v4(), "INV-4"), None)
        .await
        .unwrap();
    let repo = PaymentRepository::new(&db);
    let schedule = |amount| PaymentInput {
        amount,
        due_date: common::day(2024, 5, 1),
        method: Some("BANK_TRANSFER".to_string()),
        reference: None,
    };
    let first = repo.create(inv.id, schedule(dec!(500)), None).await.unwrap();
    repo.create(inv.id, schedule(dec!(680)), None).await.unwrap();
    assert_eq!(first.status, PaymentStatus::Pending);

    let paid = repo
        .mark_paid(first.id, first.revision, common::day(2024, 4, 20), None)
        .await
        .unwrap();
    assert_eq!(paid.status, PaymentStatus::Paid);
    assert_eq!(paid.paid_at, Some(common::day(2024, 4, 20)));
    assert_eq!(repo.paid_amounts(inv.id).await.unwrap(), vec![dec!(500)]);
}
