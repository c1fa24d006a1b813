//! Budget error types.

use ledgerline_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::amount::AmountError;

/// Errors raised by budget rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BudgetError {
    /// Allocations would exceed the budget.
    #[error("total_allocated > total_amount ({total_allocated} > {total_amount})")]
    OverAllocated {
        /// Sum of allocations after the insert.
        total_allocated: Decimal,
        /// Budget total.
        total_amount: Decimal,
    },

    /// A total overflowed.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::OverAllocated { .. } => Self::FailedPrecondition(err.to_string()),
            BudgetError::Amount(_) => Self::InvalidArgument(err.to_string()),
        }
    }
}
