//! Credit and debit notes raised against invoices.

use chrono::{DateTime, Utc};
use ledgerline_shared::types::Page;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::audited;
use crate::entities::credit_debit_notes;
use crate::entities::sea_orm_active_enums::NoteType;
use crate::error::GatewayError;

/// Writable fields of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditDebitNoteInput {
    /// Invoice the note adjusts.
    pub invoice_id: Uuid,
    /// Credit or debit.
    pub note_type: NoteType,
    /// Document number.
    #[serde(default)]
    pub note_number: Option<String>,
    /// Adjustment amount; must be positive.
    pub amount: Decimal,
    /// Why the note was raised.
    pub reason: String,
    /// Issue date.
    pub note_date: DateTime<Utc>,
}

/// Credit/debit note repository.
#[derive(Debug)]
pub struct CreditDebitNoteRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> CreditDebitNoteRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn changes(input: CreditDebitNoteInput) -> credit_debit_notes::ActiveModel {
        credit_debit_notes::ActiveModel {
            invoice_id: Set(input.invoice_id),
            note_type: Set(input.note_type),
            note_number: Set(input.note_number),
            amount: Set(input.amount),
            reason: Set(input.reason),
            note_date: Set(input.note_date),
            ..Default::default()
        }
    }

    /// Inserts a note.
    pub async fn create(
        &self,
        input: CreditDebitNoteInput,
        actor: Option<Uuid>,
    ) -> Result<credit_debit_notes::Model, GatewayError> {
        audited::insert_new::<credit_debit_notes::Entity, _, _>(self.db, Self::changes(input), actor)
            .await
    }

    /// Fetches a note by id.
    pub async fn get(&self, id: Uuid) -> Result<credit_debit_notes::Model, GatewayError> {
        audited::get::<credit_debit_notes::Entity, _>(self.db, id).await
    }

    /// Lists notes newest first, optionally for one invoice.
    pub async fn list(
        &self,
        invoice_id: Option<Uuid>,
        page: Page,
    ) -> Result<(Vec<credit_debit_notes::Model>, u64), GatewayError> {
        let mut query = credit_debit_notes::Entity::find();
        if let Some(invoice_id) = invoice_id {
            query = query.filter(credit_debit_notes::Column::InvoiceId.eq(invoice_id));
        }
        let query = query
            .order_by_desc(credit_debit_notes::Column::CreatedAt)
            .order_by_desc(credit_debit_notes::Column::Id);
        audited::fetch_page(self.db, query, page).await
    }

    /// Rewrites every writable field if `revision` still matches.
    pub async fn update(
        &self,
        id: Uuid,
        revision: i64,
        input: CreditDebitNoteInput,
        actor: Option<Uuid>,
    ) -> Result<credit_debit_notes::Model, GatewayError> {
        audited::update_checked::<credit_debit_notes::Entity, _, _>(
            self.db,
            id,
            revision,
            Self::changes(input),
            actor,
        )
        .await
    }

    /// Deletes a note.
    pub async fn delete(&self, id: Uuid) -> Result<bool, GatewayError> {
        audited::delete::<credit_debit_notes::Entity, _>(self.db, id).await
    }
}
