//! Budget allocation limits and comparison reporting.

pub mod comparison;
pub mod error;

pub use comparison::{AllocationFigures, BudgetComparison, DepartmentComparison};
pub use error::BudgetError;

use rust_decimal::Decimal;

use crate::amount::{checked_add, checked_sum};

/// Checks that the allocations, including the one being added, fit inside
/// the budget total.
///
/// # Errors
///
/// Returns `OverAllocated` when `Σallocated > total_amount` and `Amount` when
/// the sum overflows.
pub fn check_allocation(
    total_amount: Decimal,
    existing: impl IntoIterator<Item = Decimal>,
    additional: Decimal,
) -> Result<Decimal, BudgetError> {
    let total_allocated = checked_add(
        "total_allocated",
        checked_sum("total_allocated", existing)?,
        additional,
    )?;
    if total_allocated > total_amount {
        return Err(BudgetError::OverAllocated {
            total_allocated,
            total_amount,
        });
    }
    Ok(total_allocated)
}
