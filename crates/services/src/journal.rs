//! Journal entries and the ledger view.
//!
//! This is where the double-entry invariant is enforced. Shape checks
//! (dates, line count, amounts, balance) run before any transaction is opened.
//! Account checks need stored state, so they run inside the same serializable
//! transaction that writes the header and its lines; a concurrent status
//! change on a referenced account therefore either precedes the check or
//! aborts the write.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ledgerline_core::ledger::{
    AccountInfo, JournalHeaderInput, JournalTotals, LedgerValidator, LineInput, ResolvedLine,
};
use ledgerline_db::Gateway;
use ledgerline_db::repositories::{
    AccountRepository, JournalEntryWithLines, JournalHeader, JournalRepository, LedgerEntry,
};
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use sea_orm::{ConnectionTrait, IsolationLevel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// A journal entry as submitted for create or full replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalInput {
    /// Transaction date; required.
    #[serde(default)]
    pub journal_date: Option<DateTime<Utc>>,
    /// External reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Free-form memo.
    #[serde(default)]
    pub memo: Option<String>,
    /// Originating document type; absent for manual entries.
    #[serde(default)]
    pub source_type: Option<String>,
    /// Originating document id; present exactly when `source_type` is.
    #[serde(default)]
    pub source_id: Option<Uuid>,
    /// Ordered lines, at least two.
    #[serde(default)]
    pub lines: Vec<LineInput>,
}

/// Output of the pre-transaction checks.
struct Checked {
    header: JournalHeader,
    lines: Vec<ResolvedLine>,
    totals: JournalTotals,
    manual: bool,
}

impl JournalInput {
    fn check(self) -> AppResult<Checked> {
        let header = JournalHeaderInput {
            journal_date: self.journal_date,
            source_type: self.source_type.clone(),
            source_id: self.source_id,
        };
        let (journal_date, lines, totals) = LedgerValidator::validate_input(&header, &self.lines)?;
        let manual = header.is_manual();
        Ok(Checked {
            header: JournalHeader {
                journal_date,
                reference: self.reference,
                memo: self.memo,
                source_type: self.source_type.filter(|s| !s.trim().is_empty()),
                source_id: self.source_id,
            },
            lines,
            totals,
            manual,
        })
    }
}

/// Every referenced account must exist, be active and, for manual entries,
/// accept manual journals.
async fn check_accounts<C>(db: &C, lines: &[ResolvedLine], manual: bool) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let ids = LedgerValidator::account_ids(lines);
    let accounts: HashMap<Uuid, AccountInfo> = AccountRepository::new(db)
        .find_many(&ids)
        .await?
        .into_iter()
        .map(|a| {
            (
                a.id,
                AccountInfo {
                    id: a.id,
                    status: a.status.as_str().to_string(),
                    allow_manual_journal: a.allow_manual_journal,
                },
            )
        })
        .collect();
    LedgerValidator::check_accounts(lines, manual, &accounts)?;
    Ok(())
}

/// Journal service.
#[derive(Debug, Clone)]
pub struct JournalService {
    gateway: Gateway,
    events: EventPublisher,
}

impl JournalService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Validates and persists a balanced entry with its lines.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: JournalInput,
    ) -> AppResult<JournalEntryWithLines> {
        let Checked {
            header,
            lines,
            totals,
            manual,
        } = input.check()?;
        let actor = ctx.actor();

        let journal = ctx
            .run(self.gateway.with_transaction(
                Some(IsolationLevel::Serializable),
                move |txn| {
                    Box::pin(async move {
                        check_accounts(txn, &lines, manual).await?;
                        let repo = JournalRepository::new(txn);
                        let entry = repo.insert_entry(header, actor).await?;
                        let lines = repo.replace_lines(entry.id, &lines, actor).await?;
                        Ok::<_, AppError>(JournalEntryWithLines { entry, lines })
                    })
                },
            ))
            .await?;

        info!(
            journal_id = %journal.entry.id,
            lines = journal.lines.len(),
            total = %totals.debit,
            manual,
            "Journal entry created"
        );
        self.events.journal_created(ctx, &journal).await;
        Ok(journal)
    }

    /// Fetches an entry with its lines.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<JournalEntryWithLines> {
        ctx.run(async {
            JournalRepository::new(self.gateway.connection())
                .get_with_lines(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Lists entries newest first, lines included.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: Page,
    ) -> AppResult<PageResponse<JournalEntryWithLines>> {
        ctx.run(async {
            let (items, total) = JournalRepository::new(self.gateway.connection())
                .list_with_lines(page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Replaces the header and the whole line set of an entry.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        revision: i64,
        input: JournalInput,
    ) -> AppResult<JournalEntryWithLines> {
        let Checked {
            header,
            lines,
            manual,
            ..
        } = input.check()?;
        let actor = ctx.actor();

        let journal = ctx
            .run(self.gateway.with_transaction(
                Some(IsolationLevel::Serializable),
                move |txn| {
                    Box::pin(async move {
                        check_accounts(txn, &lines, manual).await?;
                        let repo = JournalRepository::new(txn);
                        let entry = repo.update_entry(id, revision, header, actor).await?;
                        let lines = repo.replace_lines(id, &lines, actor).await?;
                        Ok::<_, AppError>(JournalEntryWithLines { entry, lines })
                    })
                },
            ))
            .await?;

        info!(
            journal_id = %id,
            revision = journal.entry.revision,
            lines = journal.lines.len(),
            "Journal entry updated"
        );
        self.events.journal_updated(ctx, &journal).await;
        Ok(journal)
    }

    /// Deletes the lines and then the header. A missing id is not an error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let removed = JournalRepository::new(txn).delete_entry(id).await?;
                    Ok::<_, AppError>(removed)
                })
            }))
            .await?;

        if removed {
            info!(journal_id = %id, "Journal entry deleted");
            self.events.journal_deleted(ctx, id).await;
        } else {
            debug!(journal_id = %id, "Journal entry already absent");
        }
        Ok(())
    }

    /// Pages through the read-only ledger projection.
    pub async fn ledger(
        &self,
        ctx: &RequestContext,
        page: Page,
    ) -> AppResult<PageResponse<LedgerEntry>> {
        ctx.run(async {
            let (items, total) = JournalRepository::new(self.gateway.connection())
                .ledger(page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerline_core::ledger::Side;

    fn line(side: Side, amount: &str) -> LineInput {
        LineInput {
            account_id: Uuid::now_v7(),
            side,
            amount: amount.to_string(),
            cost_center_id: None,
            description: None,
        }
    }

    #[test]
    fn test_blank_source_type_counts_as_manual() {
        let input = JournalInput {
            journal_date: Some(Utc::now()),
            reference: None,
            memo: None,
            source_type: Some("  ".to_string()),
            source_id: None,
            lines: vec![line(Side::Debit, "5"), line(Side::Credit, "5")],
        };
        let checked = input.check().unwrap();
        assert!(checked.manual);
        assert!(checked.header.source_type.is_none());
    }

    #[test]
    fn test_missing_date_is_invalid_argument() {
        let input = JournalInput {
            journal_date: None,
            reference: None,
            memo: None,
            source_type: None,
            source_id: None,
            lines: vec![line(Side::Debit, "5"), line(Side::Credit, "5")],
        };
        assert!(matches!(input.check(), Err(AppError::InvalidArgument(_))));
    }
}
