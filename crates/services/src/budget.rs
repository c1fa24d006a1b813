//! Budgets, their department allocations and the comparison report.

use ledgerline_core::amount::{require_non_negative, require_positive};
use ledgerline_core::budget::{BudgetComparison, check_allocation};
use ledgerline_db::Gateway;
use ledgerline_db::entities::{budget_allocations, budgets};
use ledgerline_db::repositories::{BudgetAllocationInput, BudgetInput, BudgetRepository};
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use rust_decimal::Decimal;
use sea_orm::IsolationLevel;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

/// Comparison report of one budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetComparisonReport {
    /// Budget the figures belong to.
    pub budget_id: Uuid,
    /// Budget name.
    pub name: String,
    /// Totals and the per-department breakdown.
    #[serde(flatten)]
    pub comparison: BudgetComparison,
}

fn validate_budget(input: &BudgetInput) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::missing_field("name"));
    }
    require_non_negative("total_amount", input.total_amount)?;
    Ok(())
}

fn validate_allocation(input: &BudgetAllocationInput) -> AppResult<()> {
    if input.department.trim().is_empty() {
        return Err(AppError::missing_field("department"));
    }
    require_positive("allocated_amount", input.allocated_amount)?;
    require_non_negative("spent_amount", input.spent_amount)?;
    Ok(())
}

/// Budget service.
#[derive(Debug, Clone)]
pub struct BudgetService {
    gateway: Gateway,
    events: EventPublisher,
}

impl BudgetService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Creates a budget.
    pub async fn create(&self, ctx: &RequestContext, input: BudgetInput) -> AppResult<budgets::Model> {
        validate_budget(&input)?;
        let actor = ctx.actor();

        let budget = ctx
            .run(async {
                BudgetRepository::new(self.gateway.connection())
                    .create(input, actor)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        info!(budget_id = %budget.id, fiscal_year = budget.fiscal_year, "Budget created");
        self.events.budget_created(ctx, &budget).await;
        Ok(budget)
    }

    /// Fetches a budget.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<budgets::Model> {
        ctx.run(async {
            BudgetRepository::new(self.gateway.connection())
                .get(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Lists budgets, optionally for one fiscal year.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        fiscal_year: Option<i32>,
        page: Page,
    ) -> AppResult<PageResponse<budgets::Model>> {
        ctx.run(async {
            let (items, total) = BudgetRepository::new(self.gateway.connection())
                .list(fiscal_year, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Rewrites a budget. The new total must still cover the existing
    /// allocations.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        revision: i64,
        input: BudgetInput,
    ) -> AppResult<budgets::Model> {
        validate_budget(&input)?;
        let actor = ctx.actor();

        let budget = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let repo = BudgetRepository::new(txn);
                    repo.get_for_update(id).await?;
                    let existing = repo.allocated_amounts(id).await?;
                    check_allocation(input.total_amount, existing, Decimal::ZERO)?;
                    let budget = repo.update(id, revision, input, actor).await?;
                    Ok::<_, AppError>(budget)
                })
            }))
            .await?;

        info!(budget_id = %budget.id, revision = budget.revision, "Budget updated");
        self.events.budget_updated(ctx, &budget).await;
        Ok(budget)
    }

    /// Deletes a budget and its allocations. A missing id is not an error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let removed = BudgetRepository::new(txn).delete_cascade(id).await?;
                    Ok::<_, AppError>(removed)
                })
            }))
            .await?;

        if removed {
            info!(budget_id = %id, "Budget deleted");
            self.events.budget_deleted(ctx, id).await;
        } else {
            debug!(budget_id = %id, "Budget already absent");
        }
        Ok(())
    }

    /// Adds a department allocation, refusing to exceed the budget total. The
    /// budget row stays locked from the sum to the insert.
    pub async fn allocate(
        &self,
        ctx: &RequestContext,
        budget_id: Uuid,
        input: BudgetAllocationInput,
    ) -> AppResult<budget_allocations::Model> {
        validate_allocation(&input)?;
        let actor = ctx.actor();

        let (allocation, total_allocated) = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let repo = BudgetRepository::new(txn);
                    let budget = repo.get_for_update(budget_id).await?;
                    let existing = repo.allocated_amounts(budget_id).await?;
                    let total_allocated =
                        check_allocation(budget.total_amount, existing, input.allocated_amount)?;
                    let allocation = repo.add_allocation(budget_id, input, actor).await?;
                    Ok::<_, AppError>((allocation, total_allocated))
                })
            }))
            .await?;

        info!(
            budget_id = %budget_id,
            allocation_id = %allocation.id,
            department = %allocation.department,
            total_allocated = %total_allocated,
            "Budget allocation created"
        );
        self.events.budget_allocation_created(ctx, &allocation).await;
        Ok(allocation)
    }

    /// Allocations of a budget.
    pub async fn allocations(
        &self,
        ctx: &RequestContext,
        budget_id: Uuid,
    ) -> AppResult<Vec<budget_allocations::Model>> {
        ctx.run(async {
            let repo = BudgetRepository::new(self.gateway.connection());
            repo.get(budget_id).await?;
            Ok::<_, AppError>(repo.allocations(budget_id).await?)
        })
        .await
    }

    /// Budget versus allocated versus spent, overall and per department. The
    /// budget and its allocations are read from one snapshot.
    pub async fn comparison(
        &self,
        ctx: &RequestContext,
        budget_id: Uuid,
    ) -> AppResult<BudgetComparisonReport> {
        ctx.run(self.gateway.with_transaction(
            Some(IsolationLevel::RepeatableRead),
            move |txn| {
                Box::pin(async move {
                    let repo = BudgetRepository::new(txn);
                    let budget = repo.get(budget_id).await?;
                    let rows = repo.allocation_figures(budget_id).await?;
                    Ok::<_, AppError>(BudgetComparisonReport {
                        budget_id,
                        name: budget.name,
                        comparison: BudgetComparison::compute(budget.total_amount, &rows)?,
                    })
                })
            },
        ))
        .await
    }
}
