//! GST breakup, regime and document status, one of each per invoice.
//!
//! Saving a record for an invoice that already has one replaces it in place,
//! keeping the id and bumping the revision.

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::sea_orm_active_enums::GstDocState;
use crate::entities::{gst_breakups, gst_doc_statuses, gst_regimes};
use crate::error::GatewayError;

/// Tax amounts of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstBreakupInput {
    /// Value the taxes are levied on.
    pub taxable_value: Decimal,
    /// Central GST.
    #[serde(default)]
    pub cgst: Decimal,
    /// State GST.
    #[serde(default)]
    pub sgst: Decimal,
    /// Integrated GST.
    #[serde(default)]
    pub igst: Decimal,
    /// Compensation cess.
    #[serde(default)]
    pub cess: Decimal,
}

/// Jurisdiction of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstRegimeInput {
    /// Registration number of the counterparty.
    pub gstin: String,
    /// State code of the place of supply.
    pub place_of_supply: String,
    /// Whether the recipient pays the tax.
    #[serde(default)]
    pub reverse_charge: bool,
}

/// E-invoice and e-way-bill lifecycle of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstDocStatusInput {
    /// E-invoice state.
    #[serde(default = "not_applicable")]
    pub einvoice_status: GstDocState,
    /// Invoice reference number from the portal.
    #[serde(default)]
    pub irn: Option<String>,
    /// Acknowledgement number.
    #[serde(default)]
    pub ack_number: Option<String>,
    /// E-way bill state.
    #[serde(default = "not_applicable")]
    pub eway_bill_status: GstDocState,
    /// E-way bill number.
    #[serde(default)]
    pub eway_bill_number: Option<String>,
}

const fn not_applicable() -> GstDocState {
    GstDocState::NotApplicable
}

/// GST repository.
#[derive(Debug)]
pub struct GstRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> GstRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Inserts or replaces the breakup of an invoice. The flag is true when a
    /// new row was created.
    pub async fn save_breakup(
        &self,
        invoice_id: Uuid,
        input: GstBreakupInput,
        actor: Option<Uuid>,
    ) -> Result<(gst_breakups::Model, bool), GatewayError> {
        let changes = gst_breakups::ActiveModel {
            taxable_value: Set(input.taxable_value),
            cgst: Set(input.cgst),
            sgst: Set(input.sgst),
            igst: Set(input.igst),
            cess: Set(input.cess),
            ..Default::default()
        };
        match self.breakup(invoice_id).await? {
            Some(existing) => {
                let model = audited::update_checked::<gst_breakups::Entity, _, _>(
                    self.db,
                    existing.id,
                    existing.revision,
                    changes,
                    actor,
                )
                .await?;
                Ok((model, false))
            }
            None => {
                let mut active = changes;
                active.invoice_id = Set(invoice_id);
                let model =
                    audited::insert_new::<gst_breakups::Entity, _, _>(self.db, active, actor)
                        .await?;
                Ok((model, true))
            }
        }
    }

    /// Breakup of an invoice, if any.
    pub async fn breakup(&self, invoice_id: Uuid) -> Result<Option<gst_breakups::Model>, GatewayError> {
        Ok(gst_breakups::Entity::find()
            .filter(gst_breakups::Column::InvoiceId.eq(invoice_id))
            .one(self.db)
            .await?)
    }

    /// Removes the breakup of an invoice.
    pub async fn delete_breakup(&self, invoice_id: Uuid) -> Result<bool, GatewayError> {
        let result = gst_breakups::Entity::delete_many()
            .filter(gst_breakups::Column::InvoiceId.eq(invoice_id))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Inserts or replaces the regime of an invoice.
    pub async fn save_regime(
        &self,
        invoice_id: Uuid,
        input: GstRegimeInput,
        actor: Option<Uuid>,
    ) -> Result<(gst_regimes::Model, bool), GatewayError> {
        let changes = gst_regimes::ActiveModel {
            gstin: Set(input.gstin),
            place_of_supply: Set(input.place_of_supply),
            reverse_charge: Set(input.reverse_charge),
            ..Default::default()
        };
        match self.regime(invoice_id).await? {
            Some(existing) => {
                let model = audited::update_checked::<gst_regimes::Entity, _, _>(
                    self.db,
                    existing.id,
                    existing.revision,
                    changes,
                    actor,
                )
                .await?;
                Ok((model, false))
            }
            None => {
                let mut active = changes;
                active.invoice_id = Set(invoice_id);
                let model =
                    audited::insert_new::<gst_regimes::Entity, _, _>(self.db, active, actor)
                        .await?;
                Ok((model, true))
            }
        }
    }

    /// Regime of an invoice, if any.
    pub async fn regime(&self, invoice_id: Uuid) -> Result<Option<gst_regimes::Model>, GatewayError> {
        Ok(gst_regimes::Entity::find()
            .filter(gst_regimes::Column::InvoiceId.eq(invoice_id))
            .one(self.db)
            .await?)
    }

    /// Removes the regime of an invoice.
    pub async fn delete_regime(&self, invoice_id: Uuid) -> Result<bool, GatewayError> {
        let result = gst_regimes::Entity::delete_many()
            .filter(gst_regimes::Column::InvoiceId.eq(invoice_id))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Inserts or replaces the document status of an invoice.
    pub async fn save_doc_status(
        &self,
        invoice_id: Uuid,
        input: GstDocStatusInput,
        actor: Option<Uuid>,
    ) -> Result<(gst_doc_statuses::Model, bool), GatewayError> {
        let changes = gst_doc_statuses::ActiveModel {
            einvoice_status: Set(input.einvoice_status),
            irn: Set(input.irn),
            ack_number: Set(input.ack_number),
            eway_bill_status: Set(input.eway_bill_status),
            eway_bill_number: Set(input.eway_bill_number),
            ..Default::default()
        };
        match self.doc_status(invoice_id).await? {
            Some(existing) => {
                let model = audited::update_checked::<gst_doc_statuses::Entity, _, _>(
                    self.db,
                    existing.id,
                    existing.revision,
                    changes,
                    actor,
                )
                .await?;
                Ok((model, false))
            }
            None => {
                let mut active = changes;
                active.invoice_id = Set(invoice_id);
                let model =
                    audited::insert_new::<gst_doc_statuses::Entity, _, _>(self.db, active, actor)
                        .await?;
                Ok((model, true))
            }
        }
    }

    /// Document status of an invoice, if any.
    pub async fn doc_status(
        &self,
        invoice_id: Uuid,
    ) -> Result<Option<gst_doc_statuses::Model>, GatewayError> {
        Ok(gst_doc_statuses::Entity::find()
            .filter(gst_doc_statuses::Column::InvoiceId.eq(invoice_id))
            .one(self.db)
            .await?)
    }

    /// Removes the document status of an invoice.
    pub async fn delete_doc_status(&self, invoice_id: Uuid) -> Result<bool, GatewayError> {
        let result = gst_doc_statuses::Entity::delete_many()
            .filter(gst_doc_statuses::Column::InvoiceId.eq(invoice_id))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
