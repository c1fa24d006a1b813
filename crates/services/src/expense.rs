//! Expenses.

use ledgerline_core::amount::require_positive;
use ledgerline_core::currency::normalize_code;
use ledgerline_db::Gateway;
use ledgerline_db::entities::expenses;
use ledgerline_db::repositories::{CostCenterRepository, ExpenseFilter, ExpenseInput, ExpenseRepository};
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use sea_orm::ConnectionTrait;
use tracing::{debug, info};
use uuid::Uuid;

fn validate(mut input: ExpenseInput) -> AppResult<ExpenseInput> {
    if input.description.trim().is_empty() {
        return Err(AppError::missing_field("description"));
    }
    require_positive("amount", input.amount)?;
    input.currency = normalize_code("currency", &input.currency)?;
    Ok(input)
}

async fn ensure_cost_center<C: ConnectionTrait>(db: &C, id: Option<Uuid>) -> AppResult<()> {
    let Some(id) = id else {
        return Ok(());
    };
    if CostCenterRepository::new(db).existing_ids(&[id]).await?.is_empty() {
        return Err(AppError::FailedPrecondition(format!(
            "cost center {id} does not exist"
        )));
    }
    Ok(())
}

/// Expense service.
#[derive(Debug, Clone)]
pub struct ExpenseService {
    gateway: Gateway,
    events: EventPublisher,
}

impl ExpenseService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Records an expense.
    pub async fn create(&self, ctx: &RequestContext, input: ExpenseInput) -> AppResult<expenses::Model> {
        let input = validate(input)?;
        let actor = ctx.actor();

        let expense = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    ensure_cost_center(txn, input.cost_center_id).await?;
                    let expense = ExpenseRepository::new(txn).create(input, actor).await?;
                    Ok::<_, AppError>(expense)
                })
            }))
            .await?;

        info!(expense_id = %expense.id, amount = %expense.amount, "Expense created");
        self.events.expense_created(ctx, &expense).await;
        Ok(expense)
    }

    /// Fetches an expense.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<expenses::Model> {
        ctx.run(async {
            ExpenseRepository::new(self.gateway.connection())
                .get(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Lists expenses matching `filter`.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &ExpenseFilter,
        page: Page,
    ) -> AppResult<PageResponse<expenses::Model>> {
        ledgerline_core::period::validate_open_range("from", filter.from, "to", filter.to)?;
        ctx.run(async {
            let (items, total) = ExpenseRepository::new(self.gateway.connection())
                .list(filter, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Rewrites an expense.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        revision: i64,
        input: ExpenseInput,
    ) -> AppResult<expenses::Model> {
        let input = validate(input)?;
        let actor = ctx.actor();

        let expense = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    ensure_cost_center(txn, input.cost_center_id).await?;
                    let expense = ExpenseRepository::new(txn)
                        .update(id, revision, input, actor)
                        .await?;
                    Ok::<_, AppError>(expense)
                })
            }))
            .await?;

        info!(expense_id = %expense.id, revision = expense.revision, "Expense updated");
        self.events.expense_updated(ctx, &expense).await;
        Ok(expense)
    }

    /// Deletes an expense. A missing id is not an error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(async {
                ExpenseRepository::new(self.gateway.connection())
                    .delete(id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(expense_id = %id, "Expense deleted");
            self.events.expense_deleted(ctx, id).await;
        } else {
            debug!(expense_id = %id, "Expense already absent");
        }
        Ok(())
    }
}
