//! Invoices with their owned children, GST records, notes and payments.

use sea_orm_migration::prelude::*;

use super::{create_entity_table, drop_entity_table};
use crate::entities::{
    credit_debit_notes, gst_breakups, gst_doc_statuses, gst_regimes, invoice_discounts,
    invoice_items, invoice_taxes, invoices, payments,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_entity_table(manager, invoices::Entity).await?;
        create_entity_table(manager, invoice_items::Entity).await?;
        create_entity_table(manager, invoice_taxes::Entity).await?;
        create_entity_table(manager, invoice_discounts::Entity).await?;
        create_entity_table(manager, gst_breakups::Entity).await?;
        create_entity_table(manager, gst_regimes::Entity).await?;
        create_entity_table(manager, gst_doc_statuses::Entity).await?;
        create_entity_table(manager, credit_debit_notes::Entity).await?;
        create_entity_table(manager, payments::Entity).await?;

        // Invoice numbers are unique per organization.
        manager
            .create_index(
                Index::create()
                    .name("uq_invoices_org_number")
                    .table(invoices::Entity)
                    .col(invoices::Column::OrganizationId)
                    .col(invoices::Column::InvoiceNumber)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoices_date")
                    .table(invoices::Entity)
                    .col(invoices::Column::InvoiceDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_payments_invoice")
                    .table(payments::Entity)
                    .col(payments::Column::InvoiceId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_entity_table(manager, payments::Entity).await?;
        drop_entity_table(manager, credit_debit_notes::Entity).await?;
        drop_entity_table(manager, gst_doc_statuses::Entity).await?;
        drop_entity_table(manager, gst_regimes::Entity).await?;
        drop_entity_table(manager, gst_breakups::Entity).await?;
        drop_entity_table(manager, invoice_discounts::Entity).await?;
        drop_entity_table(manager, invoice_taxes::Entity).await?;
        drop_entity_table(manager, invoice_items::Entity).await?;
        drop_entity_table(manager, invoices::Entity).await
    }
}
