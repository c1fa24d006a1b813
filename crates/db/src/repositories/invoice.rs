//! Invoices and the collections they own: items, taxes and discounts.

use chrono::{DateTime, Utc};
use ledgerline_shared::types::Page;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::sea_orm_active_enums::{InvoiceStatus, InvoiceType};
use crate::entities::{
    gst_breakups, gst_doc_statuses, gst_regimes, invoice_discounts, invoice_items, invoice_taxes,
    invoices, payments,
};
use crate::error::GatewayError;

/// Writable fields of an invoice header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceInput {
    /// Issuing organization.
    pub organization_id: Uuid,
    /// Number, unique within the organization.
    pub invoice_number: String,
    /// Sales or purchase.
    pub invoice_type: InvoiceType,
    /// Issue date.
    pub invoice_date: DateTime<Utc>,
    /// Payment due date.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Delivery date.
    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,
    /// Lifecycle status; defaults to `DRAFT`.
    #[serde(default = "default_status")]
    pub status: InvoiceStatus,
    /// Free-form note on the current status.
    #[serde(default)]
    pub status_note: Option<String>,
    /// Customer or supplier name.
    #[serde(default)]
    pub counterparty_name: Option<String>,
    /// ISO currency code.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Sum of line totals, as supplied by the caller.
    pub subtotal: Decimal,
    /// Final amount, as supplied by the caller.
    pub grand_total: Decimal,
    /// GST rate in percent.
    #[serde(default)]
    pub gst_rate: Option<Decimal>,
    /// Central GST.
    #[serde(default)]
    pub cgst: Option<Decimal>,
    /// State GST.
    #[serde(default)]
    pub sgst: Option<Decimal>,
    /// Integrated GST.
    #[serde(default)]
    pub igst: Option<Decimal>,
}

const fn default_status() -> InvoiceStatus {
    InvoiceStatus::Draft
}

fn default_currency() -> String {
    "INR".to_string()
}

/// A line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItemInput {
    /// What was sold or bought.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Quantity times unit price, as supplied.
    pub line_total: Decimal,
}

/// A tax line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTaxInput {
    /// Tax name, e.g. `GST`.
    pub name: String,
    /// Rate in percent.
    pub rate: Decimal,
    /// Tax amount.
    pub amount: Decimal,
}

/// A discount line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDiscountInput {
    /// Reason for the discount.
    #[serde(default)]
    pub description: String,
    /// Discount amount.
    pub amount: Decimal,
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceFilter {
    /// Issuing organization.
    pub organization_id: Option<Uuid>,
    /// Lifecycle status.
    pub status: Option<InvoiceStatus>,
    /// Sales or purchase.
    pub invoice_type: Option<InvoiceType>,
}

/// Invoice repository.
#[derive(Debug)]
pub struct InvoiceRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> InvoiceRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn changes(input: InvoiceInput) -> invoices::ActiveModel {
        invoices::ActiveModel {
            organization_id: Set(input.organization_id),
            invoice_number: Set(input.invoice_number),
            invoice_type: Set(input.invoice_type),
            invoice_date: Set(input.invoice_date),
            due_date: Set(input.due_date),
            delivery_date: Set(input.delivery_date),
            status: Set(input.status),
            status_note: Set(input.status_note),
            counterparty_name: Set(input.counterparty_name),
            currency: Set(input.currency),
            subtotal: Set(input.subtotal),
            grand_total: Set(input.grand_total),
            gst_rate: Set(input.gst_rate),
            cgst: Set(input.cgst),
            sgst: Set(input.sgst),
            igst: Set(input.igst),
            ..Default::default()
        }
    }

    /// Inserts an invoice header.
    pub async fn create(
        &self,
        input: InvoiceInput,
        actor: Option<Uuid>,
    ) -> Result<invoices::Model, GatewayError> {
        audited::insert_new::<invoices::Entity, _, _>(self.db, Self::changes(input), actor).await
    }

    /// Fetches an invoice by id.
    pub async fn get(&self, id: Uuid) -> Result<invoices::Model, GatewayError> {
        audited::get::<invoices::Entity, _>(self.db, id).await
    }

    /// Lists invoices newest first.
    pub async fn list(
        &self,
        filter: &InvoiceFilter,
        page: Page,
    ) -> Result<(Vec<invoices::Model>, u64), GatewayError> {
        let mut query = invoices::Entity::find();
        if let Some(organization_id) = filter.organization_id {
            query = query.filter(invoices::Column::OrganizationId.eq(organization_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(invoices::Column::Status.eq(status));
        }
        if let Some(invoice_type) = filter.invoice_type {
            query = query.filter(invoices::Column::InvoiceType.eq(invoice_type));
        }
        audited::fetch_page(self.db, Self::newest_first(query), page).await
    }

    /// Substring match over invoice number and status note.
    pub async fn search(
        &self,
        needle: &str,
        page: Page,
    ) -> Result<(Vec<invoices::Model>, u64), GatewayError> {
        let query = invoices::Entity::find().filter(
            Condition::any()
                .add(invoices::Column::InvoiceNumber.contains(needle))
                .add(invoices::Column::StatusNote.contains(needle)),
        );
        audited::fetch_page(self.db, Self::newest_first(query), page).await
    }

    fn newest_first(query: sea_orm::Select<invoices::Entity>) -> sea_orm::Select<invoices::Entity> {
        query
            .order_by_desc(invoices::Column::InvoiceDate)
            .order_by_desc(invoices::Column::Id)
    }

    /// Rewrites every writable header field if `revision` still matches.
    pub async fn update(
        &self,
        id: Uuid,
        revision: i64,
        input: InvoiceInput,
        actor: Option<Uuid>,
    ) -> Result<invoices::Model, GatewayError> {
        audited::update_checked::<invoices::Entity, _, _>(
            self.db,
            id,
            revision,
            Self::changes(input),
            actor,
        )
        .await
    }

    /// Moves an invoice to `status`, bumping its revision.
    pub async fn set_status(
        &self,
        id: Uuid,
        revision: i64,
        status: InvoiceStatus,
        actor: Option<Uuid>,
    ) -> Result<invoices::Model, GatewayError> {
        let changes = invoices::ActiveModel {
            status: Set(status),
            ..Default::default()
        };
        audited::update_checked::<invoices::Entity, _, _>(self.db, id, revision, changes, actor)
            .await
    }

    /// Deletes an invoice together with everything it owns. Must run inside a
    /// transaction.
    pub async fn delete_cascade(&self, id: Uuid) -> Result<bool, GatewayError> {
        invoice_items::Entity::delete_many()
            .filter(invoice_items::Column::InvoiceId.eq(id))
            .exec(self.db)
            .await?;
        invoice_taxes::Entity::delete_many()
            .filter(invoice_taxes::Column::InvoiceId.eq(id))
            .exec(self.db)
            .await?;
        invoice_discounts::Entity::delete_many()
            .filter(invoice_discounts::Column::InvoiceId.eq(id))
            .exec(self.db)
            .await?;
        gst_breakups::Entity::delete_many()
            .filter(gst_breakups::Column::InvoiceId.eq(id))
            .exec(self.db)
            .await?;
        gst_regimes::Entity::delete_many()
            .filter(gst_regimes::Column::InvoiceId.eq(id))
            .exec(self.db)
            .await?;
        gst_doc_statuses::Entity::delete_many()
            .filter(gst_doc_statuses::Column::InvoiceId.eq(id))
            .exec(self.db)
            .await?;
        payments::Entity::delete_many()
            .filter(payments::Column::InvoiceId.eq(id))
            .exec(self.db)
            .await?;
        audited::delete::<invoices::Entity, _>(self.db, id).await
    }

    // ---- items ----

    /// Adds an item to an invoice.
    pub async fn add_item(
        &self,
        invoice_id: Uuid,
        input: InvoiceItemInput,
        actor: Option<Uuid>,
    ) -> Result<invoice_items::Model, GatewayError> {
        let active = invoice_items::ActiveModel {
            invoice_id: Set(invoice_id),
            description: Set(input.description),
            quantity: Set(input.quantity),
            unit_price: Set(input.unit_price),
            line_total: Set(input.line_total),
            ..Default::default()
        };
        audited::insert_new::<invoice_items::Entity, _, _>(self.db, active, actor).await
    }

    /// Items of an invoice in insertion order.
    pub async fn items(&self, invoice_id: Uuid) -> Result<Vec<invoice_items::Model>, GatewayError> {
        Ok(invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_items::Column::CreatedAt)
            .order_by_asc(invoice_items::Column::Id)
            .all(self.db)
            .await?)
    }

    /// Removes one item of an invoice.
    pub async fn delete_item(&self, invoice_id: Uuid, item_id: Uuid) -> Result<bool, GatewayError> {
        let result = invoice_items::Entity::delete_many()
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
            .filter(invoice_items::Column::Id.eq(item_id))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    // ---- taxes ----

    /// Adds a tax line to an invoice.
    pub async fn add_tax(
        &self,
        invoice_id: Uuid,
        input: InvoiceTaxInput,
        actor: Option<Uuid>,
    ) -> Result<invoice_taxes::Model, GatewayError> {
        let active = invoice_taxes::ActiveModel {
            invoice_id: Set(invoice_id),
            name: Set(input.name),
            rate: Set(input.rate),
            amount: Set(input.amount),
            ..Default::default()
        };
        audited::insert_new::<invoice_taxes::Entity, _, _>(self.db, active, actor).await
    }

    /// Tax lines of an invoice in insertion order.
    pub async fn taxes(&self, invoice_id: Uuid) -> Result<Vec<invoice_taxes::Model>, GatewayError> {
        Ok(invoice_taxes::Entity::find()
            .filter(invoice_taxes::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_taxes::Column::CreatedAt)
            .order_by_asc(invoice_taxes::Column::Id)
            .all(self.db)
            .await?)
    }

    /// Removes one tax line of an invoice.
    pub async fn delete_tax(&self, invoice_id: Uuid, tax_id: Uuid) -> Result<bool, GatewayError> {
        let result = invoice_taxes::Entity::delete_many()
            .filter(invoice_taxes::Column::InvoiceId.eq(invoice_id))
            .filter(invoice_taxes::Column::Id.eq(tax_id))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    // ---- discounts ----

    /// Adds a discount line to an invoice.
    pub async fn add_discount(
        &self,
        invoice_id: Uuid,
        input: InvoiceDiscountInput,
        actor: Option<Uuid>,
    ) -> Result<invoice_discounts::Model, GatewayError> {
        let active = invoice_discounts::ActiveModel {
            invoice_id: Set(invoice_id),
            description: Set(input.description),
            amount: Set(input.amount),
            ..Default::default()
        };
        audited::insert_new::<invoice_discounts::Entity, _, _>(self.db, active, actor).await
    }

    /// Discount lines of an invoice in insertion order.
    pub async fn discounts(
        &self,
        invoice_id: Uuid,
    ) -> Result<Vec<invoice_discounts::Model>, GatewayError> {
        Ok(invoice_discounts::Entity::find()
            .filter(invoice_discounts::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(invoice_discounts::Column::CreatedAt)
            .order_by_asc(invoice_discounts::Column::Id)
            .all(self.db)
            .await?)
    }

    /// Removes one discount line of an invoice.
    pub async fn delete_discount(
        &self,
        invoice_id: Uuid,
        discount_id: Uuid,
    ) -> Result<bool, GatewayError> {
        let result = invoice_discounts::Entity::delete_many()
            .filter(invoice_discounts::Column::InvoiceId.eq(invoice_id))
            .filter(invoice_discounts::Column::Id.eq(discount_id))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Stored tax and discount amounts of an invoice, for the grand total check.
    pub async fn adjustment_amounts(
        &self,
        invoice_id: Uuid,
    ) -> Result<(Vec<Decimal>, Vec<Decimal>), GatewayError> {
        let taxes: Vec<Decimal> = invoice_taxes::Entity::find()
            .select_only()
            .column(invoice_taxes::Column::Amount)
            .filter(invoice_taxes::Column::InvoiceId.eq(invoice_id))
            .into_tuple()
            .all(self.db)
            .await?;
        let discounts: Vec<Decimal> = invoice_discounts::Entity::find()
            .select_only()
            .column(invoice_discounts::Column::Amount)
            .filter(invoice_discounts::Column::InvoiceId.eq(invoice_id))
            .into_tuple()
            .all(self.db)
            .await?;
        Ok((taxes, discounts))
    }
}
