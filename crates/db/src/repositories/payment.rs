//! Scheduled payments against an invoice.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::payments;
use crate::entities::sea_orm_active_enums::PaymentStatus;
use crate::error::GatewayError;

/// Writable fields of a scheduled payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInput {
    /// Amount due; must be positive.
    pub amount: Decimal,
    /// When the payment is due.
    pub due_date: DateTime<Utc>,
    /// Payment method, e.g. `BANK_TRANSFER`.
    #[serde(default)]
    pub method: Option<String>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
}

/// Payment repository.
#[derive(Debug)]
pub struct PaymentRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> PaymentRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Schedules a pending payment.
    pub async fn create(
        &self,
        invoice_id: Uuid,
        input: PaymentInput,
        actor: Option<Uuid>,
    ) -> Result<payments::Model, GatewayError> {
        let active = payments::ActiveModel {
            invoice_id: Set(invoice_id),
            amount: Set(input.amount),
            due_date: Set(input.due_date),
            status: Set(PaymentStatus::Pending),
            paid_at: Set(None),
            method: Set(input.method),
            reference: Set(input.reference),
            ..Default::default()
        };
        audited::insert_new::<payments::Entity, _, _>(self.db, active, actor).await
    }

    /// Fetches a payment by id.
    pub async fn get(&self, id: Uuid) -> Result<payments::Model, GatewayError> {
        audited::get::<payments::Entity, _>(self.db, id).await
    }

    /// Payments of an invoice ordered by due date.
    pub async fn for_invoice(&self, invoice_id: Uuid) -> Result<Vec<payments::Model>, GatewayError> {
        Ok(payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(payments::Column::DueDate)
            .order_by_asc(payments::Column::Id)
            .all(self.db)
            .await?)
    }

    /// Marks a payment as paid at `paid_at` if `revision` still matches.
    pub async fn mark_paid(
        &self,
        id: Uuid,
        revision: i64,
        paid_at: DateTime<Utc>,
        actor: Option<Uuid>,
    ) -> Result<payments::Model, GatewayError> {
        let changes = payments::ActiveModel {
            status: Set(PaymentStatus::Paid),
            paid_at: Set(Some(paid_at)),
            ..Default::default()
        };
        audited::update_checked::<payments::Entity, _, _>(self.db, id, revision, changes, actor).await
    }

    /// Amounts of the paid payments of an invoice.
    pub async fn paid_amounts(&self, invoice_id: Uuid) -> Result<Vec<Decimal>, GatewayError> {
        Ok(payments::Entity::find()
            .select_only()
            .column(payments::Column::Amount)
            .filter(payments::Column::InvoiceId.eq(invoice_id))
            .filter(payments::Column::Status.eq(PaymentStatus::Paid))
            .into_tuple()
            .all(self.db)
            .await?)
    }

    /// Deletes a payment.
    pub async fn delete(&self, id: Uuid) -> Result<bool, GatewayError> {
        audited::delete::<payments::Entity, _>(self.db, id).await
    }
}
