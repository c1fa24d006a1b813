//! Generic operations shared by every audited entity.
//!
//! An audited entity carries `id`, `created_*`, `updated_*` and `revision`
//! columns. Updates are optimistic: the row is rewritten only when the stored
//! revision equals the one the caller read.

use chrono::Utc;
use ledgerline_shared::types::Page;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QuerySelect, Select, Value,
};
use uuid::Uuid;

use crate::entities;
use crate::error::GatewayError;

/// Column accessors for entities with audit columns.
pub trait Audited: EntityTrait {
    /// Entity name used in error messages.
    const NAME: &'static str;

    /// Primary key column.
    fn id_column() -> Self::Column;

    /// Creation timestamp.
    fn created_at_column() -> Self::Column;

    /// Creating actor.
    fn created_by_column() -> Self::Column;

    /// Optimistic concurrency counter.
    fn revision_column() -> Self::Column;

    /// Last update timestamp.
    fn updated_at_column() -> Self::Column;

    /// Last updating actor.
    fn updated_by_column() -> Self::Column;
}

macro_rules! audited {
    ($($module:ident => $name:literal),+ $(,)?) => {
        $(
            impl Audited for entities::$module::Entity {
                const NAME: &'static str = $name;

                fn id_column() -> Self::Column {
                    entities::$module::Column::Id
                }

                fn created_at_column() -> Self::Column {
                    entities::$module::Column::CreatedAt
                }

                fn created_by_column() -> Self::Column {
                    entities::$module::Column::CreatedBy
                }

                fn revision_column() -> Self::Column {
                    entities::$module::Column::Revision
                }

                fn updated_at_column() -> Self::Column {
                    entities::$module::Column::UpdatedAt
                }

                fn updated_by_column() -> Self::Column {
                    entities::$module::Column::UpdatedBy
                }
            }
        )+
    };
}

audited! {
    accounts => "account",
    journal_entries => "journal entry",
    invoices => "invoice",
    invoice_items => "invoice item",
    invoice_taxes => "invoice tax",
    invoice_discounts => "invoice discount",
    gst_breakups => "gst breakup",
    gst_regimes => "gst regime",
    gst_doc_statuses => "gst doc status",
    credit_debit_notes => "credit/debit note",
    payments => "payment",
    budgets => "budget",
    budget_allocations => "budget allocation",
    expenses => "expense",
    cost_centers => "cost center",
    cost_allocations => "cost allocation",
    allocation_rules => "allocation rule",
    accruals => "accrual",
    cash_flow_forecasts => "cash-flow forecast",
    consolidations => "consolidation",
    exchange_rates => "exchange rate",
}

/// Fetches a row by id.
///
/// # Errors
///
/// Returns `NotFound` when absent.
pub async fn get<E, C>(db: &C, id: Uuid) -> Result<E::Model, GatewayError>
where
    E: Audited,
    C: ConnectionTrait,
{
    E::find()
        .filter(E::id_column().eq(id))
        .one(db)
        .await?
        .ok_or_else(|| GatewayError::not_found(E::NAME, id))
}

/// Inserts a new row with a fresh time-ordered id, creation and update stamps
/// set to now and `actor`, and revision 1.
///
/// # Errors
///
/// Returns `Duplicate` on a unique key clash, or a database error.
pub async fn insert_new<E, C, A>(db: &C, mut active: A, actor: Option<Uuid>) -> Result<E::Model, GatewayError>
where
    E: Audited,
    C: ConnectionTrait,
    A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    E::Model: IntoActiveModel<A>,
{
    let now = Value::from(Utc::now());
    active.set(E::id_column(), Value::from(Uuid::now_v7()));
    active.set(E::created_at_column(), now.clone());
    active.set(E::created_by_column(), Value::from(actor));
    active.set(E::updated_at_column(), now);
    active.set(E::updated_by_column(), Value::from(actor));
    active.set(E::revision_column(), Value::from(1_i64));
    Ok(active.insert(db).await?)
}

/// Fetches one page of `select` plus the total row count of the query.
///
/// # Errors
///
/// Returns a database error if either query fails.
pub async fn fetch_page<E, C>(
    db: &C,
    select: Select<E>,
    page: Page,
) -> Result<(Vec<E::Model>, u64), GatewayError>
where
    E: EntityTrait,
    E::Model: Sync,
    C: ConnectionTrait,
{
    let total = select.clone().count(db).await?;
    let rows = select.offset(page.offset).limit(page.limit).all(db).await?;
    Ok((rows, total))
}

/// Rewrites the mutable fields of a row if its revision still matches.
///
/// `changes` should carry only the fields to overwrite; identity and
/// `created_*` are never touched. On success `revision` becomes
/// `expected + 1` and `updated_at`/`updated_by` are stamped.
///
/// # Errors
///
/// Returns `NotFound` when the row is gone and `Conflict` when the stored
/// revision differs from `expected`.
pub async fn update_checked<E, C, A>(
    db: &C,
    id: Uuid,
    expected: i64,
    mut changes: A,
    actor: Option<Uuid>,
) -> Result<E::Model, GatewayError>
where
    E: Audited,
    C: ConnectionTrait,
    A: ActiveModelTrait<Entity = E> + Send,
{
    // A revision that cannot advance never matches a stored one.
    let Some(next) = expected.checked_add(1) else {
        let current = get::<E, C>(db, id).await?;
        return Err(GatewayError::Conflict {
            entity: E::NAME,
            id: id.to_string(),
            expected,
            actual: revision_of::<E>(&current),
        });
    };

    changes.set(E::updated_at_column(), Value::from(Utc::now()));
    changes.set(E::updated_by_column(), Value::from(actor));

    let result = E::update_many()
        .set(changes)
        .col_expr(E::revision_column(), Expr::value(next))
        .filter(E::id_column().eq(id))
        .filter(E::revision_column().eq(expected))
        .exec(db)
        .await?;

    let current = get::<E, C>(db, id).await?;
    if result.rows_affected == 0 {
        return Err(GatewayError::Conflict {
            entity: E::NAME,
            id: id.to_string(),
            expected,
            actual: revision_of::<E>(&current),
        });
    }
    Ok(current)
}

/// Deletes a row by id; returns whether a row was removed.
///
/// # Errors
///
/// Returns a database error if the statement fails.
pub async fn delete<E, C>(db: &C, id: Uuid) -> Result<bool, GatewayError>
where
    E: Audited,
    C: ConnectionTrait,
{
    let result = E::delete_many()
        .filter(E::id_column().eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Stored revision of a model.
pub fn revision_of<E: Audited>(model: &E::Model) -> i64 {
    match model.get(E::revision_column()) {
        Value::BigInt(Some(r)) => r,
        Value::Int(Some(r)) => i64::from(r),
        _ => 0,
    }
}
