//! Invoices and the items, taxes and discounts they own.
//!
//! Callers supply the final `subtotal` and `grand_total`. When taxes or
//! discounts are present the grand total must equal
//! `subtotal + Σtaxes − Σdiscounts`; it is checked against the inline children
//! on create and against the stored children on update. Adding or removing a
//! single child does not re-check, so an invoice can be built up line by line.

use ledgerline_core::amount::{check_optional_money, require_non_negative};
use ledgerline_core::gst::GstAmounts;
use ledgerline_core::invoice::check_grand_total;
use ledgerline_db::Gateway;
use ledgerline_db::entities::{invoice_discounts, invoice_items, invoice_taxes, invoices};
use ledgerline_db::repositories::{
    InvoiceDiscountInput, InvoiceFilter, InvoiceInput, InvoiceItemInput, InvoiceRepository,
    InvoiceTaxInput,
};
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// An invoice header with optional inline children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    /// Header fields.
    #[serde(flatten)]
    pub invoice: InvoiceInput,
    /// Line items.
    #[serde(default)]
    pub items: Vec<InvoiceItemInput>,
    /// Tax lines.
    #[serde(default)]
    pub taxes: Vec<InvoiceTaxInput>,
    /// Discount lines.
    #[serde(default)]
    pub discounts: Vec<InvoiceDiscountInput>,
}

/// An invoice with everything it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDetail {
    /// Header.
    #[serde(flatten)]
    pub invoice: invoices::Model,
    /// Line items in insertion order.
    pub items: Vec<invoice_items::Model>,
    /// Tax lines in insertion order.
    pub taxes: Vec<invoice_taxes::Model>,
    /// Discount lines in insertion order.
    pub discounts: Vec<invoice_discounts::Model>,
}

fn validate_header(input: &InvoiceInput) -> AppResult<()> {
    if input.invoice_number.trim().is_empty() {
        return Err(AppError::missing_field("invoice_number"));
    }
    if input.currency.trim().is_empty() {
        return Err(AppError::missing_field("currency"));
    }
    require_non_negative("subtotal", input.subtotal)?;
    require_non_negative("grand_total", input.grand_total)?;
    check_optional_money("gst_rate", input.gst_rate)?;
    GstAmounts {
        cgst: input.cgst.unwrap_or_default(),
        sgst: input.sgst.unwrap_or_default(),
        igst: input.igst.unwrap_or_default(),
    }
    .validate()?;
    Ok(())
}

fn validate_item(input: &InvoiceItemInput) -> AppResult<()> {
    if input.description.trim().is_empty() {
        return Err(AppError::missing_field("description"));
    }
    require_non_negative("quantity", input.quantity)?;
    require_non_negative("unit_price", input.unit_price)?;
    require_non_negative("line_total", input.line_total)?;
    Ok(())
}

fn validate_tax(input: &InvoiceTaxInput) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::missing_field("name"));
    }
    require_non_negative("rate", input.rate)?;
    require_non_negative("amount", input.amount)?;
    Ok(())
}

fn validate_discount(input: &InvoiceDiscountInput) -> AppResult<()> {
    require_non_negative("amount", input.amount)?;
    Ok(())
}

/// Invoice service.
#[derive(Debug, Clone)]
pub struct InvoiceService {
    gateway: Gateway,
    events: EventPublisher,
}

impl InvoiceService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Creates an invoice and its inline children in one transaction.
    pub async fn create(&self, ctx: &RequestContext, input: NewInvoice) -> AppResult<InvoiceDetail> {
        let NewInvoice {
            invoice,
            items,
            taxes,
            discounts,
        } = input;
        validate_header(&invoice)?;
        items.iter().try_for_each(validate_item)?;
        taxes.iter().try_for_each(validate_tax)?;
        discounts.iter().try_for_each(validate_discount)?;
        let tax_amounts: Vec<Decimal> = taxes.iter().map(|t| t.amount).collect();
        let discount_amounts: Vec<Decimal> = discounts.iter().map(|d| d.amount).collect();
        check_grand_total(
            invoice.subtotal,
            &tax_amounts,
            &discount_amounts,
            invoice.grand_total,
        )?;
        let actor = ctx.actor();

        let detail = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let repo = InvoiceRepository::new(txn);
                    let invoice = repo.create(invoice, actor).await?;
                    let mut detail = InvoiceDetail {
                        items: Vec::with_capacity(items.len()),
                        taxes: Vec::with_capacity(taxes.len()),
                        discounts: Vec::with_capacity(discounts.len()),
                        invoice,
                    };
                    let id = detail.invoice.id;
                    for item in items {
                        detail.items.push(repo.add_item(id, item, actor).await?);
                    }
                    for tax in taxes {
                        detail.taxes.push(repo.add_tax(id, tax, actor).await?);
                    }
                    for discount in discounts {
                        detail.discounts.push(repo.add_discount(id, discount, actor).await?);
                    }
                    Ok::<_, AppError>(detail)
                })
            }))
            .await?;

        info!(
            invoice_id = %detail.invoice.id,
            invoice_number = %detail.invoice.invoice_number,
            items = detail.items.len(),
            "Invoice created"
        );
        self.events.invoice_created(ctx, &detail.invoice).await;
        Ok(detail)
    }

    /// Fetches an invoice with its children.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<InvoiceDetail> {
        ctx.run(async {
            let repo = InvoiceRepository::new(self.gateway.connection());
            let invoice = repo.get(id).await?;
            Ok::<_, AppError>(InvoiceDetail {
                items: repo.items(id).await?,
                taxes: repo.taxes(id).await?,
                discounts: repo.discounts(id).await?,
                invoice,
            })
        })
        .await
    }

    /// Lists invoice headers newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &InvoiceFilter,
        page: Page,
    ) -> AppResult<PageResponse<invoices::Model>> {
        ctx.run(async {
            let (items, total) = InvoiceRepository::new(self.gateway.connection())
                .list(filter, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Substring search over invoice number and status note.
    pub async fn search(
        &self,
        ctx: &RequestContext,
        query: &str,
        page: Page,
    ) -> AppResult<PageResponse<invoices::Model>> {
        let needle = query.trim();
        if needle.is_empty() {
            return Err(AppError::missing_field("query"));
        }
        ctx.run(async {
            let (items, total) = InvoiceRepository::new(self.gateway.connection())
                .search(needle, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Rewrites the header, checking the grand total against the stored
    /// taxes and discounts. Status changes go through here as well.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        revision: i64,
        input: InvoiceInput,
    ) -> AppResult<invoices::Model> {
        validate_header(&input)?;
        let actor = ctx.actor();

        let invoice = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let repo = InvoiceRepository::new(txn);
                    let (taxes, discounts) = repo.adjustment_amounts(id).await?;
                    check_grand_total(input.subtotal, &taxes, &discounts, input.grand_total)?;
                    let invoice = repo.update(id, revision, input, actor).await?;
                    Ok::<_, AppError>(invoice)
                })
            }))
            .await?;

        info!(
            invoice_id = %invoice.id,
            revision = invoice.revision,
            status = ?invoice.status,
            "Invoice updated"
        );
        self.events.invoice_updated(ctx, &invoice).await;
        Ok(invoice)
    }

    /// Deletes an invoice with its children, GST records and payments.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let removed = InvoiceRepository::new(txn).delete_cascade(id).await?;
                    Ok::<_, AppError>(removed)
                })
            }))
            .await?;

        if removed {
            info!(invoice_id = %id, "Invoice deleted");
            self.events.invoice_deleted(ctx, id).await;
        } else {
            debug!(invoice_id = %id, "Invoice already absent");
        }
        Ok(())
    }

    // ---- items ----

    /// Adds an item to an existing invoice.
    pub async fn add_item(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
        input: InvoiceItemInput,
    ) -> AppResult<invoice_items::Model> {
        validate_item(&input)?;
        let actor = ctx.actor();

        let item = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let repo = InvoiceRepository::new(txn);
                    repo.get(invoice_id).await?;
                    let item = repo.add_item(invoice_id, input, actor).await?;
                    Ok::<_, AppError>(item)
                })
            }))
            .await?;

        info!(invoice_id = %invoice_id, item_id = %item.id, "Invoice item added");
        self.events.invoice_item_created(ctx, &item).await;
        Ok(item)
    }

    /// Items of an invoice.
    pub async fn items(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
    ) -> AppResult<Vec<invoice_items::Model>> {
        ctx.run(async {
            let repo = InvoiceRepository::new(self.gateway.connection());
            repo.get(invoice_id).await?;
            Ok::<_, AppError>(repo.items(invoice_id).await?)
        })
        .await
    }

    /// Removes an item. A missing item is not an error.
    pub async fn delete_item(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<()> {
        let removed = ctx
            .run(async {
                InvoiceRepository::new(self.gateway.connection())
                    .delete_item(invoice_id, item_id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(invoice_id = %invoice_id, item_id = %item_id, "Invoice item deleted");
            self.events.invoice_item_deleted(ctx, item_id).await;
        }
        Ok(())
    }

    // ---- taxes ----

    /// Adds a tax line to an existing invoice.
    pub async fn add_tax(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
        input: InvoiceTaxInput,
    ) -> AppResult<invoice_taxes::Model> {
        validate_tax(&input)?;
        let actor = ctx.actor();

        let tax = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let repo = InvoiceRepository::new(txn);
                    repo.get(invoice_id).await?;
                    let tax = repo.add_tax(invoice_id, input, actor).await?;
                    Ok::<_, AppError>(tax)
                })
            }))
            .await?;

        info!(invoice_id = %invoice_id, tax_id = %tax.id, "Invoice tax added");
        self.events.invoice_tax_created(ctx, &tax).await;
        Ok(tax)
    }

    /// Tax lines of an invoice.
    pub async fn taxes(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
    ) -> AppResult<Vec<invoice_taxes::Model>> {
        ctx.run(async {
            let repo = InvoiceRepository::new(self.gateway.connection());
            repo.get(invoice_id).await?;
            Ok::<_, AppError>(repo.taxes(invoice_id).await?)
        })
        .await
    }

    /// Removes a tax line. A missing line is not an error.
    pub async fn delete_tax(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
        tax_id: Uuid,
    ) -> AppResult<()> {
        let removed = ctx
            .run(async {
                InvoiceRepository::new(self.gateway.connection())
                    .delete_tax(invoice_id, tax_id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(invoice_id = %invoice_id, tax_id = %tax_id, "Invoice tax deleted");
            self.events.invoice_tax_deleted(ctx, tax_id).await;
        }
        Ok(())
    }

    // ---- discounts ----

    /// Adds a discount line to an existing invoice.
    pub async fn add_discount(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
        input: InvoiceDiscountInput,
    ) -> AppResult<invoice_discounts::Model> {
        validate_discount(&input)?;
        let actor = ctx.actor();

        let discount = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let repo = InvoiceRepository::new(txn);
                    repo.get(invoice_id).await?;
                    let discount = repo.add_discount(invoice_id, input, actor).await?;
                    Ok::<_, AppError>(discount)
                })
            }))
            .await?;

        info!(invoice_id = %invoice_id, discount_id = %discount.id, "Invoice discount added");
        self.events.invoice_discount_created(ctx, &discount).await;
        Ok(discount)
    }

    /// Discount lines of an invoice.
    pub async fn discounts(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
    ) -> AppResult<Vec<invoice_discounts::Model>> {
        ctx.run(async {
            let repo = InvoiceRepository::new(self.gateway.connection());
            repo.get(invoice_id).await?;
            Ok::<_, AppError>(repo.discounts(invoice_id).await?)
        })
        .await
    }

    /// Removes a discount line. A missing line is not an error.
    pub async fn delete_discount(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
        discount_id: Uuid,
    ) -> AppResult<()> {
        let removed = ctx
            .run(async {
                InvoiceRepository::new(self.gateway.connection())
                    .delete_discount(invoice_id, discount_id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(invoice_id = %invoice_id, discount_id = %discount_id, "Invoice discount deleted");
            self.events.invoice_discount_deleted(ctx, discount_id).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ledgerline_db::entities::sea_orm_active_enums::{InvoiceStatus, InvoiceType};
    use rust_decimal_macros::dec;

    fn header() -> InvoiceInput {
        InvoiceInput {
            organization_id: Uuid::now_v7(),
            invoice_number: "INV-001".to_string(),
            invoice_type: InvoiceType::Sales,
            invoice_date: Utc::now(),
            due_date: None,
            delivery_date: None,
            status: InvoiceStatus::Draft,
            status_note: None,
            counterparty_name: None,
            currency: "INR".to_string(),
            subtotal: dec!(1000.00),
            grand_total: dec!(1180.00),
            gst_rate: None,
            cgst: None,
            sgst: None,
            igst: None,
        }
    }

    #[test]
    fn test_header_requires_number() {
        let mut input = header();
        input.invoice_number = " ".to_string();
        assert!(matches!(validate_header(&input), Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn test_header_rejects_mixed_gst() {
        let mut input = header();
        input.cgst = Some(dec!(90));
        input.igst = Some(dec!(180));
        assert!(matches!(validate_header(&input), Err(AppError::FailedPrecondition(_))));
    }

    #[test]
    fn test_negative_discount_rejected() {
        let discount = InvoiceDiscountInput {
            description: String::new(),
            amount: dec!(-5),
        };
        assert!(validate_discount(&discount).is_err());
    }

    #[test]
    fn test_inline_children_deserialize_next_to_header() {
        let body = serde_json::json!({
            "organization_id": Uuid::now_v7(),
            "invoice_number": "INV-9",
            "invoice_type": "SALES",
            "invoice_date": "2024-01-15T10:00:00Z",
            "subtotal": "1000.00",
            "grand_total": "1180.00",
            "taxes": [{"name": "GST", "rate": "18", "amount": "180.00"}]
        });
        let input: NewInvoice = serde_json::from_value(body).unwrap();
        assert_eq!(input.invoice.status, InvoiceStatus::Draft);
        assert_eq!(input.taxes.len(), 1);
        assert!(input.items.is_empty());
    }
}
