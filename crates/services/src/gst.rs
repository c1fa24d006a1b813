//! GST records of an invoice: breakup, regime and document status.
//!
//! Each is one-per-invoice. Saving when a record already exists replaces it
//! and publishes `updated`; the first save publishes `created`.

use ledgerline_core::amount::require_non_negative;
use ledgerline_core::gst::GstAmounts;
use ledgerline_db::Gateway;
use ledgerline_db::entities::{gst_breakups, gst_doc_statuses, gst_regimes};
use ledgerline_db::repositories::{
    GstBreakupInput, GstDocStatusInput, GstRegimeInput, GstRepository, InvoiceRepository,
};
use ledgerline_events::EventPublisher;
use ledgerline_shared::{AppError, AppResult, RequestContext};
use tracing::info;
use uuid::Uuid;

fn validate_breakup(input: &GstBreakupInput) -> AppResult<()> {
    require_non_negative("taxable_value", input.taxable_value)?;
    require_non_negative("cess", input.cess)?;
    GstAmounts {
        cgst: input.cgst,
        sgst: input.sgst,
        igst: input.igst,
    }
    .validate()?;
    Ok(())
}

fn validate_regime(input: &GstRegimeInput) -> AppResult<()> {
    if input.gstin.trim().is_empty() {
        return Err(AppError::missing_field("gstin"));
    }
    if input.place_of_supply.trim().is_empty() {
        return Err(AppError::missing_field("place_of_supply"));
    }
    Ok(())
}

/// GST service.
#[derive(Debug, Clone)]
pub struct GstService {
    gateway: Gateway,
    events: EventPublisher,
}

impl GstService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Adds or replaces the tax breakup of an invoice.
    pub async fn save_breakup(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
        input: GstBreakupInput,
    ) -> AppResult<gst_breakups::Model> {
        validate_breakup(&input)?;
        let actor = ctx.actor();

        let (breakup, created) = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    InvoiceRepository::new(txn).get(invoice_id).await?;
                    let saved = GstRepository::new(txn)
                        .save_breakup(invoice_id, input, actor)
                        .await?;
                    Ok::<_, AppError>(saved)
                })
            }))
            .await?;

        info!(invoice_id = %invoice_id, breakup_id = %breakup.id, created, "GST breakup saved");
        if created {
            self.events.gst_breakup_created(ctx, &breakup).await;
        } else {
            self.events.gst_breakup_updated(ctx, &breakup).await;
        }
        Ok(breakup)
    }

    /// Breakup of an invoice.
    pub async fn breakup(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
    ) -> AppResult<gst_breakups::Model> {
        ctx.run(async {
            GstRepository::new(self.gateway.connection())
                .breakup(invoice_id)
                .await?
                .ok_or_else(|| AppError::not_found("GST breakup for invoice", invoice_id))
        })
        .await
    }

    /// Removes the breakup of an invoice, if any.
    pub async fn delete_breakup(&self, ctx: &RequestContext, invoice_id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let repo = GstRepository::new(txn);
                    let existing = repo.breakup(invoice_id).await?;
                    if existing.is_some() {
                        repo.delete_breakup(invoice_id).await?;
                    }
                    Ok::<_, AppError>(existing.map(|b| b.id))
                })
            }))
            .await?;

        if let Some(id) = removed {
            info!(invoice_id = %invoice_id, breakup_id = %id, "GST breakup deleted");
            self.events.gst_breakup_deleted(ctx, id).await;
        }
        Ok(())
    }

    /// Adds or replaces the regime of an invoice.
    pub async fn save_regime(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
        input: GstRegimeInput,
    ) -> AppResult<gst_regimes::Model> {
        validate_regime(&input)?;
        let actor = ctx.actor();

        let (regime, created) = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    InvoiceRepository::new(txn).get(invoice_id).await?;
                    let saved = GstRepository::new(txn)
                        .save_regime(invoice_id, input, actor)
                        .await?;
                    Ok::<_, AppError>(saved)
                })
            }))
            .await?;

        info!(invoice_id = %invoice_id, regime_id = %regime.id, created, "GST regime saved");
        if created {
            self.events.gst_regime_created(ctx, &regime).await;
        } else {
            self.events.gst_regime_updated(ctx, &regime).await;
        }
        Ok(regime)
    }

    /// Regime of an invoice.
    pub async fn regime(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
    ) -> AppResult<gst_regimes::Model> {
        ctx.run(async {
            GstRepository::new(self.gateway.connection())
                .regime(invoice_id)
                .await?
                .ok_or_else(|| AppError::not_found("GST regime for invoice", invoice_id))
        })
        .await
    }

    /// Removes the regime of an invoice, if any.
    pub async fn delete_regime(&self, ctx: &RequestContext, invoice_id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let repo = GstRepository::new(txn);
                    let existing = repo.regime(invoice_id).await?;
                    if existing.is_some() {
                        repo.delete_regime(invoice_id).await?;
                    }
                    Ok::<_, AppError>(existing.map(|r| r.id))
                })
            }))
            .await?;

        if let Some(id) = removed {
            info!(invoice_id = %invoice_id, regime_id = %id, "GST regime deleted");
            self.events.gst_regime_deleted(ctx, id).await;
        }
        Ok(())
    }

    /// Adds or replaces the e-invoice and e-way-bill status of an invoice.
    pub async fn save_doc_status(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
        input: GstDocStatusInput,
    ) -> AppResult<gst_doc_statuses::Model> {
        let actor = ctx.actor();

        let (status, created) = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    InvoiceRepository::new(txn).get(invoice_id).await?;
                    let saved = GstRepository::new(txn)
                        .save_doc_status(invoice_id, input, actor)
                        .await?;
                    Ok::<_, AppError>(saved)
                })
            }))
            .await?;

        info!(
            invoice_id = %invoice_id,
            einvoice = ?status.einvoice_status,
            eway_bill = ?status.eway_bill_status,
            created,
            "GST document status saved"
        );
        if created {
            self.events.gst_doc_status_created(ctx, &status).await;
        } else {
            self.events.gst_doc_status_updated(ctx, &status).await;
        }
        Ok(status)
    }

    /// Document status of an invoice.
    pub async fn doc_status(
        &self,
        ctx: &RequestContext,
        invoice_id: Uuid,
    ) -> AppResult<gst_doc_statuses::Model> {
        ctx.run(async {
            GstRepository::new(self.gateway.connection())
                .doc_status(invoice_id)
                .await?
                .ok_or_else(|| AppError::not_found("GST document status for invoice", invoice_id))
        })
        .await
    }

    /// Removes the document status of an invoice, if any.
    pub async fn delete_doc_status(&self, ctx: &RequestContext, invoice_id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let repo = GstRepository::new(txn);
                    let existing = repo.doc_status(invoice_id).await?;
                    if existing.is_some() {
                        repo.delete_doc_status(invoice_id).await?;
                    }
                    Ok::<_, AppError>(existing.map(|s| s.id))
                })
            }))
            .await?;

        if let Some(id) = removed {
            info!(invoice_id = %invoice_id, doc_status_id = %id, "GST document status deleted");
            self.events.gst_doc_status_deleted(ctx, id).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn breakup(cgst: rust_decimal::Decimal, igst: rust_decimal::Decimal) -> GstBreakupInput {
        GstBreakupInput {
            taxable_value: dec!(1000),
            cgst,
            sgst: cgst,
            igst,
            cess: dec!(0),
        }
    }

    #[test]
    fn test_intra_state_breakup_is_valid() {
        assert!(validate_breakup(&breakup(dec!(90), dec!(0))).is_ok());
    }

    #[test]
    fn test_mixed_breakup_is_failed_precondition() {
        assert!(matches!(
            validate_breakup(&breakup(dec!(90), dec!(180))),
            Err(AppError::FailedPrecondition(_))
        ));
    }

    #[test]
    fn test_regime_requires_gstin() {
        let input = GstRegimeInput {
            gstin: String::new(),
            place_of_supply: "29".to_string(),
            reverse_charge: false,
        };
        assert!(matches!(validate_regime(&input), Err(AppError::InvalidArgument(_))));
    }
}
