//! Ledger error types for journal validation.

use ledgerline_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::amount::AmountError;

/// Errors that can occur while validating a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Header Errors ==========
    /// Journal date is required.
    #[error("journal_date is required")]
    MissingDate,

    /// Source type and source id must be supplied together.
    #[error("source_type and source_id must both be present or both be absent")]
    SourceMismatch,

    // ========== Line Errors ==========
    /// Entry must have at least 2 lines.
    #[error("journal entry must have at least 2 lines, got {0}")]
    InsufficientLines(usize),

    /// Line amount is not a decimal number.
    #[error("line {position}: amount '{value}' is not a valid decimal")]
    InvalidAmount {
        /// Zero-based line position.
        position: usize,
        /// Raw amount.
        value: String,
    },

    /// Line amount must be greater than zero.
    #[error("line {position}: amount must be greater than zero, got {value}")]
    NonPositiveAmount {
        /// Zero-based line position.
        position: usize,
        /// Parsed amount.
        value: Decimal,
    },

    /// Line amount does not fit the stored precision or range.
    #[error("line {position}: {source}")]
    AmountOutOfBounds {
        /// Zero-based line position.
        position: usize,
        /// Bound that failed.
        source: AmountError,
    },

    /// Debit or credit total overflowed.
    #[error(transparent)]
    Totals(#[from] AmountError),

    /// Entry is not balanced.
    #[error("journal entry is not balanced: debit total {debit} != credit total {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("account {0} not found")]
    AccountNotFound(Uuid),

    /// Account is not active and cannot be posted to.
    #[error("account {id} is {status}; only ACTIVE accounts accept journal lines")]
    AccountNotActive {
        /// The account ID.
        id: Uuid,
        /// Current status.
        status: String,
    },

    /// Account refuses manual journal entries.
    #[error("account {0} does not allow manual journal entries (allow_manual_journal=false)")]
    ManualJournalBlocked(Uuid),
}

impl LedgerError {
    /// Returns true for malformed input, as opposed to a violated invariant.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Self::MissingDate
                | Self::SourceMismatch
                | Self::InsufficientLines(_)
                | Self::InvalidAmount { .. }
                | Self::NonPositiveAmount { .. }
                | Self::AmountOutOfBounds { .. }
                | Self::Totals(_)
        )
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(_) => Self::NotFound(err.to_string()),
            LedgerError::Unbalanced { .. }
            | LedgerError::AccountNotActive { .. }
            | LedgerError::ManualJournalBlocked(_) => Self::FailedPrecondition(err.to_string()),
            _ => Self::InvalidArgument(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_taxonomy_mapping() {
        let err: AppError = LedgerError::InsufficientLines(1).into();
        assert!(matches!(err, AppError::InvalidArgument(_)));

        let err: AppError = LedgerError::Unbalanced {
            debit: dec!(100.00),
            credit: dec!(90.00),
        }
        .into();
        assert_eq!(
            err,
            AppError::FailedPrecondition(
                "journal entry is not balanced: debit total 100.00 != credit total 90.00".into()
            )
        );

        let err: AppError = LedgerError::AccountNotFound(Uuid::nil()).into();
        assert!(matches!(err, AppError::NotFound(_)));

        let err: AppError = LedgerError::ManualJournalBlocked(Uuid::nil()).into();
        assert!(matches!(err, AppError::FailedPrecondition(msg) if msg.contains("allow_manual_journal")));
    }

    #[test]
    fn test_is_invalid_argument() {
        assert!(LedgerError::MissingDate.is_invalid_argument());
        assert!(!LedgerError::AccountNotFound(Uuid::nil()).is_invalid_argument());
    }
}
