//! Credit and debit notes.

use ledgerline_core::amount::require_positive;
use ledgerline_db::Gateway;
use ledgerline_db::entities::credit_debit_notes;
use ledgerline_db::repositories::{CreditDebitNoteInput, CreditDebitNoteRepository, InvoiceRepository};
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use tracing::{debug, info};
use uuid::Uuid;

fn validate(input: &CreditDebitNoteInput) -> AppResult<()> {
    require_positive("amount", input.amount)?;
    if input.reason.trim().is_empty() {
        return Err(AppError::missing_field("reason"));
    }
    Ok(())
}

/// Credit/debit note service.
#[derive(Debug, Clone)]
pub struct CreditDebitNoteService {
    gateway: Gateway,
    events: EventPublisher,
}

impl CreditDebitNoteService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Raises a note against an existing invoice.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreditDebitNoteInput,
    ) -> AppResult<credit_debit_notes::Model> {
        validate(&input)?;
        let actor = ctx.actor();

        let note = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    InvoiceRepository::new(txn).get(input.invoice_id).await?;
                    let note = CreditDebitNoteRepository::new(txn)
                        .create(input, actor)
                        .await?;
                    Ok::<_, AppError>(note)
                })
            }))
            .await?;

        info!(
            note_id = %note.id,
            invoice_id = %note.invoice_id,
            note_type = ?note.note_type,
            "Credit/debit note created"
        );
        self.events.credit_debit_note_created(ctx, &note).await;
        Ok(note)
    }

    /// Fetches a note.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<credit_debit_notes::Model> {
        ctx.run(async {
            CreditDebitNoteRepository::new(self.gateway.connection())
                .get(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Lists notes, optionally for one invoice.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        invoice_id: Option<Uuid>,
        page: Page,
    ) -> AppResult<PageResponse<credit_debit_notes::Model>> {
        ctx.run(async {
            let (items, total) = CreditDebitNoteRepository::new(self.gateway.connection())
                .list(invoice_id, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Rewrites a note.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        revision: i64,
        input: CreditDebitNoteInput,
    ) -> AppResult<credit_debit_notes::Model> {
        validate(&input)?;
        let actor = ctx.actor();

        let note = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    InvoiceRepository::new(txn).get(input.invoice_id).await?;
                    let note = CreditDebitNoteRepository::new(txn)
                        .update(id, revision, input, actor)
                        .await?;
                    Ok::<_, AppError>(note)
                })
            }))
            .await?;

        info!(note_id = %note.id, revision = note.revision, "Credit/debit note updated");
        self.events.credit_debit_note_updated(ctx, &note).await;
        Ok(note)
    }

    /// Deletes a note. A missing id is not an error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(async {
                CreditDebitNoteRepository::new(self.gateway.connection())
                    .delete(id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(note_id = %id, "Credit/debit note deleted");
            self.events.credit_debit_note_deleted(ctx, id).await;
        } else {
            debug!(note_id = %id, "Credit/debit note already absent");
        }
        Ok(())
    }
}
