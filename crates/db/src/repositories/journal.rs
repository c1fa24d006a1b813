//! Journal entries, their lines and the derived ledger view.
//!
//! An entry and its lines are always written together by the caller inside
//! one transaction; the repository itself never opens one.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ledgerline_core::ledger::{ResolvedLine, Side};
use ledgerline_shared::types::Page;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Serialize;
use uuid::Uuid;

use super::audited;
use crate::entities::sea_orm_active_enums::LineSide;
use crate::entities::{journal_entries, journal_lines};
use crate::error::GatewayError;

/// Validated header fields of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalHeader {
    /// Transaction date.
    pub journal_date: DateTime<Utc>,
    /// External reference.
    pub reference: Option<String>,
    /// Free-form memo.
    pub memo: Option<String>,
    /// Originating document type; absent for manual entries.
    pub source_type: Option<String>,
    /// Originating document id.
    pub source_id: Option<Uuid>,
}

/// An entry header together with its ordered lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntryWithLines {
    /// Header row.
    #[serde(flatten)]
    pub entry: journal_entries::Model,
    /// Lines in position order.
    pub lines: Vec<journal_lines::Model>,
}

/// One row of the read-only ledger projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct LedgerEntry {
    /// Owning journal entry.
    pub journal_entry_id: Uuid,
    /// Line position within the entry.
    pub position: i32,
    /// Account posted against.
    pub account_id: Uuid,
    /// Debit or credit.
    pub side: LineSide,
    /// Line amount.
    pub amount: Decimal,
    /// Transaction date of the entry.
    pub journal_date: DateTime<Utc>,
}

/// Amount posted to an account on one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Account posted against.
    pub account_id: Uuid,
    /// Debit or credit.
    pub side: LineSide,
    /// Line amount.
    pub amount: Decimal,
}

impl From<Side> for LineSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Debit => Self::Debit,
            Side::Credit => Self::Credit,
        }
    }
}

/// Journal repository.
#[derive(Debug)]
pub struct JournalRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> JournalRepository<'a, C> {
    /// Creates a repository over `db`, which may be a pool or a transaction.
    #[must_use]
    pub const fn new(db: &'a C) -> Self {
        Self { db }
    }

    fn changes(header: JournalHeader) -> journal_entries::ActiveModel {
        journal_entries::ActiveModel {
            journal_date: Set(header.journal_date),
            reference: Set(header.reference),
            memo: Set(header.memo),
            source_type: Set(header.source_type),
            source_id: Set(header.source_id),
            ..Default::default()
        }
    }

    /// Inserts a header with a fresh id and revision 1.
    pub async fn insert_entry(
        &self,
        header: JournalHeader,
        actor: Option<Uuid>,
    ) -> Result<journal_entries::Model, GatewayError> {
        audited::insert_new::<journal_entries::Entity, _, _>(self.db, Self::changes(header), actor)
            .await
    }

    /// Rewrites the header if `revision` still matches.
    pub async fn update_entry(
        &self,
        id: Uuid,
        revision: i64,
        header: JournalHeader,
        actor: Option<Uuid>,
    ) -> Result<journal_entries::Model, GatewayError> {
        audited::update_checked::<journal_entries::Entity, _, _>(
            self.db,
            id,
            revision,
            Self::changes(header),
            actor,
        )
        .await
    }

    /// Fetches a header by id.
    pub async fn get_entry(&self, id: Uuid) -> Result<journal_entries::Model, GatewayError> {
        audited::get::<journal_entries::Entity, _>(self.db, id).await
    }

    /// Fetches a header with its lines.
    pub async fn get_with_lines(&self, id: Uuid) -> Result<JournalEntryWithLines, GatewayError> {
        let entry = self.get_entry(id).await?;
        let lines = self.lines_for(id).await?;
        Ok(JournalEntryWithLines { entry, lines })
    }

    /// Lists headers newest first, each with its lines.
    pub async fn list_with_lines(
        &self,
        page: Page,
    ) -> Result<(Vec<JournalEntryWithLines>, u64), GatewayError> {
        let query = journal_entries::Entity::find()
            .order_by_desc(journal_entries::Column::JournalDate)
            .order_by_desc(journal_entries::Column::Id);
        let (entries, total) = audited::fetch_page(self.db, query, page).await?;

        let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        let mut grouped = self.lines_for_entries(&ids).await?;
        let items = entries
            .into_iter()
            .map(|entry| {
                let lines = grouped.remove(&entry.id).unwrap_or_default();
                JournalEntryWithLines { entry, lines }
            })
            .collect();
        Ok((items, total))
    }

    /// Removes every line of an entry, returning how many were removed.
    pub async fn delete_lines(&self, entry_id: Uuid) -> Result<u64, GatewayError> {
        let result = journal_lines::Entity::delete_many()
            .filter(journal_lines::Column::JournalEntryId.eq(entry_id))
            .exec(self.db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Replaces the line set of an entry with `lines`, in order.
    pub async fn replace_lines(
        &self,
        entry_id: Uuid,
        lines: &[ResolvedLine],
        actor: Option<Uuid>,
    ) -> Result<Vec<journal_lines::Model>, GatewayError> {
        self.delete_lines(entry_id).await?;

        let now = Utc::now();
        let mut stored = Vec::with_capacity(lines.len());
        for line in lines {
            let row = journal_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                journal_entry_id: Set(entry_id),
                position: Set(line.position),
                account_id: Set(line.account_id),
                side: Set(line.side.into()),
                amount: Set(line.amount),
                cost_center_id: Set(line.cost_center_id),
                description: Set(line.description.clone()),
                created_at: Set(now),
                created_by: Set(actor),
            };
            stored.push(row.insert(self.db).await?);
        }
        Ok(stored)
    }

    /// Lines of one entry in position order.
    pub async fn lines_for(&self, entry_id: Uuid) -> Result<Vec<journal_lines::Model>, GatewayError> {
        Ok(journal_lines::Entity::find()
            .filter(journal_lines::Column::JournalEntryId.eq(entry_id))
            .order_by_asc(journal_lines::Column::Position)
            .all(self.db)
            .await?)
    }

    /// Lines of several entries, grouped by entry id, each group in position order.
    pub async fn lines_for_entries(
        &self,
        entry_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<journal_lines::Model>>, GatewayError> {
        if entry_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let lines = journal_lines::Entity::find()
            .filter(journal_lines::Column::JournalEntryId.is_in(entry_ids.iter().copied()))
            .order_by_asc(journal_lines::Column::JournalEntryId)
            .order_by_asc(journal_lines::Column::Position)
            .all(self.db)
            .await?;

        let mut grouped: HashMap<Uuid, Vec<journal_lines::Model>> = HashMap::new();
        for line in lines {
            grouped.entry(line.journal_entry_id).or_default().push(line);
        }
        Ok(grouped)
    }

    /// Deletes the lines and then the header. Returns false when the entry did
    /// not exist.
    pub async fn delete_entry(&self, id: Uuid) -> Result<bool, GatewayError> {
        self.delete_lines(id).await?;
        audited::delete::<journal_entries::Entity, _>(self.db, id).await
    }

    /// Pages through committed lines joined with their entry dates.
    pub async fn ledger(&self, page: Page) -> Result<(Vec<LedgerEntry>, u64), GatewayError> {
        let base = journal_lines::Entity::find().join(
            JoinType::InnerJoin,
            journal_lines::Relation::JournalEntries.def(),
        );
        let total = base.clone().count(self.db).await?;

        let rows = base
            .select_only()
            .column(journal_lines::Column::JournalEntryId)
            .column(journal_lines::Column::Position)
            .column(journal_lines::Column::AccountId)
            .column(journal_lines::Column::Side)
            .column(journal_lines::Column::Amount)
            .column(journal_entries::Column::JournalDate)
            .order_by_desc(journal_entries::Column::JournalDate)
            .order_by_desc(journal_entries::Column::Id)
            .order_by_asc(journal_lines::Column::Position)
            .offset(page.offset)
            .limit(page.limit)
            .into_model::<LedgerEntry>()
            .all(self.db)
            .await?;
        Ok((rows, total))
    }

    /// Every committed posting, for trial balance aggregation.
    pub async fn postings(&self) -> Result<Vec<Posting>, GatewayError> {
        let rows: Vec<(Uuid, LineSide, Decimal)> = journal_lines::Entity::find()
            .select_only()
            .column(journal_lines::Column::AccountId)
            .column(journal_lines::Column::Side)
            .column(journal_lines::Column::Amount)
            .into_tuple()
            .all(self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(account_id, side, amount)| Posting {
                account_id,
                side,
                amount,
            })
            .collect())
    }
}
