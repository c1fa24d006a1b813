//! Cost allocations and the rules that generate them.

use chrono::{DateTime, Utc};
use ledgerline_core::allocation::rule::validate_targets;
use ledgerline_core::allocation::{AllocationBasis, RuleTarget, apply_rule};
use ledgerline_core::amount::require_positive;
use ledgerline_db::Gateway;
use ledgerline_db::entities::sea_orm_active_enums::AllocationBasis as StoredBasis;
use ledgerline_db::entities::{allocation_rules, cost_allocations};
use ledgerline_db::repositories::{
    AllocationRuleInput, AllocationRuleRepository, CostAllocationFilter, CostAllocationInput,
    CostAllocationRepository, CostCenterRepository, targets_of,
};
use ledgerline_events::EventPublisher;
use ledgerline_shared::types::{Page, PageResponse};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

const fn basis(stored: StoredBasis) -> AllocationBasis {
    match stored {
        StoredBasis::Equal => AllocationBasis::Equal,
        StoredBasis::Percentage => AllocationBasis::Percentage,
        StoredBasis::Weighted => AllocationBasis::Weighted,
    }
}

/// Fails unless every id names a stored cost center.
async fn ensure_cost_centers<C: ConnectionTrait>(db: &C, ids: &[Uuid]) -> AppResult<()> {
    let found = CostCenterRepository::new(db).existing_ids(ids).await?;
    if let Some(missing) = ids.iter().find(|id| !found.contains(id)) {
        return Err(AppError::FailedPrecondition(format!(
            "cost center {missing} does not exist"
        )));
    }
    Ok(())
}

/// Request to spread an amount with a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyRuleRequest {
    /// Amount to spread; must be positive.
    pub amount: Decimal,
    /// Source document kind, e.g. `EXPENSE`.
    pub reference_type: String,
    /// Source document id.
    pub reference_id: Uuid,
    /// Allocation date; defaults to now.
    #[serde(default)]
    pub allocation_date: Option<DateTime<Utc>>,
}

fn validate_allocation(input: &CostAllocationInput) -> AppResult<()> {
    if input.reference_type.trim().is_empty() {
        return Err(AppError::missing_field("reference_type"));
    }
    require_positive("amount", input.amount)?;
    Ok(())
}

fn validate_rule(input: &AllocationRuleInput) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::missing_field("name"));
    }
    validate_targets(basis(input.basis), &input.targets)?;
    Ok(())
}

fn target_ids(targets: &[RuleTarget]) -> Vec<Uuid> {
    targets.iter().map(|t| t.cost_center_id).collect()
}

/// Cost allocation service.
#[derive(Debug, Clone)]
pub struct CostAllocationService {
    gateway: Gateway,
    events: EventPublisher,
}

impl CostAllocationService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Attributes an amount to a cost center.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CostAllocationInput,
    ) -> AppResult<cost_allocations::Model> {
        validate_allocation(&input)?;
        let actor = ctx.actor();

        let allocation = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    ensure_cost_centers(txn, &[input.cost_center_id]).await?;
                    let allocation = CostAllocationRepository::new(txn)
                        .create(input, actor)
                        .await?;
                    Ok::<_, AppError>(allocation)
                })
            }))
            .await?;

        info!(
            allocation_id = %allocation.id,
            cost_center_id = %allocation.cost_center_id,
            amount = %allocation.amount,
            "Cost allocation created"
        );
        self.events.cost_allocation_created(ctx, &allocation).await;
        Ok(allocation)
    }

    /// Fetches a cost allocation.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<cost_allocations::Model> {
        ctx.run(async {
            CostAllocationRepository::new(self.gateway.connection())
                .get(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Lists cost allocations matching `filter`.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &CostAllocationFilter,
        page: Page,
    ) -> AppResult<PageResponse<cost_allocations::Model>> {
        ctx.run(async {
            let (items, total) = CostAllocationRepository::new(self.gateway.connection())
                .list(filter, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Rewrites a cost allocation.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        revision: i64,
        input: CostAllocationInput,
    ) -> AppResult<cost_allocations::Model> {
        validate_allocation(&input)?;
        let actor = ctx.actor();

        let allocation = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    ensure_cost_centers(txn, &[input.cost_center_id]).await?;
                    let allocation = CostAllocationRepository::new(txn)
                        .update(id, revision, input, actor)
                        .await?;
                    Ok::<_, AppError>(allocation)
                })
            }))
            .await?;

        info!(allocation_id = %allocation.id, revision = allocation.revision, "Cost allocation updated");
        self.events.cost_allocation_updated(ctx, &allocation).await;
        Ok(allocation)
    }

    /// Deletes a cost allocation. A missing id is not an error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(async {
                CostAllocationRepository::new(self.gateway.connection())
                    .delete(id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(allocation_id = %id, "Cost allocation deleted");
            self.events.cost_allocation_deleted(ctx, id).await;
        } else {
            debug!(allocation_id = %id, "Cost allocation already absent");
        }
        Ok(())
    }
}

/// Allocation rule service.
#[derive(Debug, Clone)]
pub struct AllocationRuleService {
    gateway: Gateway,
    events: EventPublisher,
}

impl AllocationRuleService {
    /// Creates the service.
    #[must_use]
    pub fn new(gateway: Gateway, events: EventPublisher) -> Self {
        Self { gateway, events }
    }

    /// Creates a rule whose targets are all existing cost centers.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: AllocationRuleInput,
    ) -> AppResult<allocation_rules::Model> {
        validate_rule(&input)?;
        let actor = ctx.actor();

        let rule = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    ensure_cost_centers(txn, &target_ids(&input.targets)).await?;
                    let rule = AllocationRuleRepository::new(txn).create(input, actor).await?;
                    Ok::<_, AppError>(rule)
                })
            }))
            .await?;

        info!(rule_id = %rule.id, basis = ?rule.basis, "Allocation rule created");
        self.events.allocation_rule_created(ctx, &rule).await;
        Ok(rule)
    }

    /// Fetches a rule.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> AppResult<allocation_rules::Model> {
        ctx.run(async {
            AllocationRuleRepository::new(self.gateway.connection())
                .get(id)
                .await
                .map_err(AppError::from)
        })
        .await
    }

    /// Lists rules, optionally only active ones.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        active_only: bool,
        page: Page,
    ) -> AppResult<PageResponse<allocation_rules::Model>> {
        ctx.run(async {
            let (items, total) = AllocationRuleRepository::new(self.gateway.connection())
                .list(active_only, page)
                .await?;
            Ok::<_, AppError>(PageResponse::new(items, page, total))
        })
        .await
    }

    /// Rewrites a rule.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        revision: i64,
        input: AllocationRuleInput,
    ) -> AppResult<allocation_rules::Model> {
        validate_rule(&input)?;
        let actor = ctx.actor();

        let rule = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    ensure_cost_centers(txn, &target_ids(&input.targets)).await?;
                    let rule = AllocationRuleRepository::new(txn)
                        .update(id, revision, input, actor)
                        .await?;
                    Ok::<_, AppError>(rule)
                })
            }))
            .await?;

        info!(rule_id = %rule.id, revision = rule.revision, "Allocation rule updated");
        self.events.allocation_rule_updated(ctx, &rule).await;
        Ok(rule)
    }

    /// Deletes a rule. A missing id is not an error.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let removed = ctx
            .run(async {
                AllocationRuleRepository::new(self.gateway.connection())
                    .delete(id)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        if removed {
            info!(rule_id = %id, "Allocation rule deleted");
            self.events.allocation_rule_deleted(ctx, id).await;
        } else {
            debug!(rule_id = %id, "Allocation rule already absent");
        }
        Ok(())
    }

    /// Splits an amount across the rule's targets with the largest remainder
    /// method and stores one cost allocation per target.
    pub async fn apply(
        &self,
        ctx: &RequestContext,
        rule_id: Uuid,
        request: ApplyRuleRequest,
    ) -> AppResult<Vec<cost_allocations::Model>> {
        require_positive("amount", request.amount)?;
        if request.reference_type.trim().is_empty() {
            return Err(AppError::missing_field("reference_type"));
        }
        let allocation_date = request.allocation_date.unwrap_or_else(Utc::now);
        let reference_id = request.reference_id;
        let actor = ctx.actor();

        let allocations = ctx
            .run(self.gateway.with_transaction(None, move |txn| {
                Box::pin(async move {
                    let rule = AllocationRuleRepository::new(txn).get(rule_id).await?;
                    if !rule.is_active {
                        return Err(AppError::FailedPrecondition(format!(
                            "allocation rule {rule_id} is inactive"
                        )));
                    }
                    let targets = targets_of(&rule)?;
                    ensure_cost_centers(txn, &target_ids(&targets)).await?;
                    let parts = apply_rule(basis(rule.basis), request.amount, &targets)?;
                    let inputs = parts
                        .into_iter()
                        .map(|(cost_center_id, amount)| CostAllocationInput {
                            cost_center_id,
                            reference_type: request.reference_type.clone(),
                            reference_id,
                            amount,
                            allocation_date,
                            rule_id: Some(rule_id),
                        })
                        .collect();
                    let stored = CostAllocationRepository::new(txn)
                        .create_many(inputs, actor)
                        .await?;
                    Ok::<_, AppError>(stored)
                })
            }))
            .await?;

        info!(
            rule_id = %rule_id,
            reference_id = %reference_id,
            targets = allocations.len(),
            "Allocation rule applied"
        );
        for allocation in &allocations {
            self.events.cost_allocation_created(ctx, allocation).await;
        }
        Ok(allocations)
    }
}
