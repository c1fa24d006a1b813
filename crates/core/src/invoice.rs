//! Invoice arithmetic: grand total check and payment reconciliation.
//!
//! The invoice service never prices anything itself; callers supply the final
//! totals and these functions only verify them.

use ledgerline_shared::AppError;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::amount::{AmountError, checked_add, checked_sub, checked_sum};

/// Errors raised by invoice checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvoiceError {
    /// Supplied grand total does not match subtotal plus taxes minus discounts.
    #[error(
        "grand_total {actual} != subtotal + taxes - discounts ({expected})"
    )]
    GrandTotalMismatch {
        /// Computed total.
        expected: Decimal,
        /// Supplied total.
        actual: Decimal,
    },

    /// A total overflowed.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

impl From<InvoiceError> for AppError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::GrandTotalMismatch { .. } => Self::FailedPrecondition(err.to_string()),
            InvoiceError::Amount(_) => Self::InvalidArgument(err.to_string()),
        }
    }
}

/// Checks `grand_total == subtotal + Σtaxes − Σdiscounts`.
///
/// The check only applies when at least one tax or discount is present; an
/// invoice with neither is taken as supplied.
///
/// # Errors
///
/// Returns `GrandTotalMismatch` when the totals disagree and `Amount` when a
/// sum overflows.
pub fn check_grand_total(
    subtotal: Decimal,
    taxes: &[Decimal],
    discounts: &[Decimal],
    grand_total: Decimal,
) -> Result<(), InvoiceError> {
    if taxes.is_empty() && discounts.is_empty() {
        return Ok(());
    }
    let taxes = checked_sum("taxes", taxes.iter().copied())?;
    let discounts = checked_sum("discounts", discounts.iter().copied())?;
    let expected = checked_sub(
        "expected grand_total",
        checked_add("expected grand_total", subtotal, taxes)?,
        discounts,
    )?;
    if expected == grand_total {
        Ok(())
    } else {
        Err(InvoiceError::GrandTotalMismatch {
            expected,
            actual: grand_total,
        })
    }
}

/// Outcome of comparing payments against an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    /// Invoice grand total.
    pub grand_total: Decimal,
    /// Sum of paid payments.
    pub paid: Decimal,
    /// `grand_total - paid`, floored at zero.
    pub outstanding: Decimal,
    /// Whether the invoice is fully settled.
    pub fully_paid: bool,
}

/// Compares the paid amounts with the grand total.
///
/// # Errors
///
/// Returns `Overflow` when the paid total leaves the decimal range.
pub fn reconcile(grand_total: Decimal, paid: &[Decimal]) -> Result<Reconciliation, AmountError> {
    let paid = checked_sum("paid", paid.iter().copied())?;
    let outstanding = checked_sub("outstanding", grand_total, paid)?.max(Decimal::ZERO);
    Ok(Reconciliation {
        grand_total,
        paid,
        outstanding,
        fully_paid: paid >= grand_total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_grand_total_with_tax() {
        assert!(check_grand_total(dec!(1000.00), &[dec!(180.00)], &[], dec!(1180.00)).is_ok());
    }

    #[test]
    fn test_grand_total_mismatch() {
        assert_eq!(
            check_grand_total(dec!(1000.00), &[dec!(180.00)], &[], dec!(1200.00)),
            Err(InvoiceError::GrandTotalMismatch {
                expected: dec!(1180.00),
                actual: dec!(1200.00)
            })
        );
    }

    #[test]
    fn test_grand_total_with_discount() {
        assert!(
            check_grand_total(dec!(500), &[dec!(90)], &[dec!(50), dec!(40)], dec!(500)).is_ok()
        );
    }

    #[test]
    fn test_no_children_is_unchecked() {
        assert!(check_grand_total(dec!(10), &[], &[], dec!(99)).is_ok());
    }

    #[test]
    fn test_reconcile() {
        let partial = reconcile(dec!(1180.00), &[dec!(500.00)]).unwrap();
        assert_eq!(partial.outstanding, dec!(680.00));
        assert!(!partial.fully_paid);

        let full = reconcile(dec!(1180.00), &[dec!(500.00), dec!(680.00)]).unwrap();
        assert_eq!(full.paid, dec!(1180.00));
        assert_eq!(full.outstanding, Decimal::ZERO);
        assert!(full.fully_paid);

        let over = reconcile(dec!(100), &[dec!(150)]).unwrap();
        assert_eq!(over.outstanding, Decimal::ZERO);
        assert!(over.fully_paid);
    }

    #[test]
    fn test_overflowing_taxes_are_invalid_argument() {
        let err = check_grand_total(dec!(1), &[Decimal::MAX, Decimal::MAX], &[], dec!(1)).unwrap_err();
        assert!(matches!(err, InvoiceError::Amount(AmountError::Overflow { .. })));
        assert!(matches!(AppError::from(err), AppError::InvalidArgument(_)));
        assert!(reconcile(dec!(1), &[Decimal::MAX, Decimal::MAX]).is_err());
    }
}
