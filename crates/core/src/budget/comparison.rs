//! Budget comparison figures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount::{AmountError, checked_add, checked_sub, checked_sum};

/// One allocation's figures as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationFigures {
    /// Department the allocation belongs to.
    pub department: String,
    /// Allocated amount.
    pub allocated: Decimal,
    /// Amount spent so far.
    pub spent: Decimal,
}

/// Per-department totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentComparison {
    /// Department name.
    pub department: String,
    /// Sum of allocated amounts.
    pub allocated: Decimal,
    /// Sum of spent amounts.
    pub spent: Decimal,
    /// `allocated - spent`.
    pub remaining: Decimal,
}

/// Budget versus allocations versus spending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetComparison {
    /// Budget total.
    pub total_budget: Decimal,
    /// Sum of all allocations.
    pub total_allocated: Decimal,
    /// Sum of all spending.
    pub total_spent: Decimal,
    /// `total_allocated - total_spent`.
    pub remaining_budget: Decimal,
    /// Spent share of the budget total, as a percentage with 2 decimals.
    pub utilization_percentage: Decimal,
    /// Breakdown sorted by department name.
    pub departments: Vec<DepartmentComparison>,
}

impl BudgetComparison {
    /// Aggregates allocation rows read in a single query.
    ///
    /// # Errors
    ///
    /// Returns `Overflow` when a total leaves the decimal range.
    pub fn compute(total_budget: Decimal, rows: &[AllocationFigures]) -> Result<Self, AmountError> {
        let mut departments: Vec<DepartmentComparison> = Vec::new();
        for row in rows {
            if let Some(dept) = departments.iter_mut().find(|d| d.department == row.department) {
                dept.allocated = checked_add("allocated", dept.allocated, row.allocated)?;
                dept.spent = checked_add("spent", dept.spent, row.spent)?;
            } else {
                departments.push(DepartmentComparison {
                    department: row.department.clone(),
                    allocated: row.allocated,
                    spent: row.spent,
                    remaining: Decimal::ZERO,
                });
            }
        }
        for dept in &mut departments {
            dept.remaining = checked_sub("remaining", dept.allocated, dept.spent)?;
        }
        departments.sort_by(|a, b| a.department.cmp(&b.department));

        let total_allocated = checked_sum("total_allocated", rows.iter().map(|r| r.allocated))?;
        let total_spent = checked_sum("total_spent", rows.iter().map(|r| r.spent))?;
        let utilization_percentage = if total_budget.is_zero() {
            Decimal::ZERO
        } else {
            total_spent
                .checked_div(total_budget)
                .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
                .ok_or_else(|| AmountError::Overflow {
                    field: "utilization_percentage".to_string(),
                })?
                .round_dp(2)
        };

        Ok(Self {
            total_budget,
            total_allocated,
            total_spent,
            remaining_budget: checked_sub("remaining_budget", total_allocated, total_spent)?,
            utilization_percentage,
            departments,
        })
    }
}
