//! GST breakup rules.

use ledgerline_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::amount::{AmountError, check_money, checked_add};

/// Errors raised by GST validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GstError {
    /// Intra-state (CGST+SGST) and inter-state (IGST) amounts were both set.
    #[error("both intra-state (CGST+SGST) and inter-state (IGST) amounts are non-zero")]
    MixedJurisdiction,

    /// A tax amount is negative.
    #[error("{0} must not be negative")]
    Negative(&'static str),

    /// A tax amount does not fit a money column.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

impl From<GstError> for AppError {
    fn from(err: GstError) -> Self {
        match err {
            GstError::MixedJurisdiction => Self::FailedPrecondition(err.to_string()),
            GstError::Negative(_) | GstError::Amount(_) => Self::InvalidArgument(err.to_string()),
        }
    }
}

/// Tax split of a single invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GstAmounts {
    /// Central GST.
    pub cgst: Decimal,
    /// State GST.
    pub sgst: Decimal,
    /// Integrated GST.
    pub igst: Decimal,
}

impl GstAmounts {
    /// Validates the split.
    ///
    /// # Errors
    ///
    /// Returns `Amount` for a component a money column cannot hold, `Negative`
    /// for a negative component and `MixedJurisdiction` when CGST+SGST and IGST
    /// are both non-zero.
    pub fn validate(&self) -> Result<(), GstError> {
        for (name, value) in [("cgst", self.cgst), ("sgst", self.sgst), ("igst", self.igst)] {
            check_money(name, value)?;
            if value < Decimal::ZERO {
                return Err(GstError::Negative(name));
            }
        }
        let intra = checked_add("cgst + sgst", self.cgst, self.sgst)?;
        if !intra.is_zero() && !self.igst.is_zero() {
            return Err(GstError::MixedJurisdiction);
        }
        Ok(())
    }
}
