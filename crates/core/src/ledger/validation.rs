//! Business rule validation for journal entries.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{AccountInfo, JournalHeaderInput, JournalTotals, LineInput, ResolvedLine};
use crate::amount::check_money;

/// Journal validation with no database dependencies.
///
/// The checks split in two phases. [`LedgerValidator::validate_input`] needs
/// nothing but the request and runs before any transaction is opened;
/// [`LedgerValidator::check_accounts`] needs the referenced accounts and runs
/// inside the transaction that writes the entry.
pub struct LedgerValidator;

impl LedgerValidator {
    /// Validates the header and resolves the lines.
    ///
    /// Steps, in order:
    /// 1. Journal date present
    /// 2. Source type and source id both present or both absent
    /// 3. At least two lines
    /// 4. Every amount parses as a decimal greater than zero that a money
    ///    column stores exactly
    /// 5. Debits equal credits exactly
    ///
    /// # Errors
    ///
    /// Returns the first rule that fails.
    pub fn validate_input(
        header: &JournalHeaderInput,
        lines: &[LineInput],
    ) -> Result<(DateTime<Utc>, Vec<ResolvedLine>, JournalTotals), LedgerError> {
        let date = Self::validate_header(header)?;
        let resolved = Self::resolve_lines(lines)?;
        let totals = JournalTotals::of(&resolved)?;
        if !totals.is_balanced() {
            return Err(LedgerError::Unbalanced {
                debit: totals.debit,
                credit: totals.credit,
            });
        }
        Ok((date, resolved, totals))
    }

    /// Checks the header fields.
    ///
    /// # Errors
    ///
    /// Returns `MissingDate` or `SourceMismatch`.
    pub fn validate_header(header: &JournalHeaderInput) -> Result<DateTime<Utc>, LedgerError> {
        let date = header.journal_date.ok_or(LedgerError::MissingDate)?;
        let has_type = !header.is_manual();
        if has_type != header.source_id.is_some() {
            return Err(LedgerError::SourceMismatch);
        }
        Ok(date)
    }

    /// Parses every line amount, keeping input order as the position.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientLines`, `InvalidAmount`, `NonPositiveAmount` or
    /// `AmountOutOfBounds`.
    pub fn resolve_lines(lines: &[LineInput]) -> Result<Vec<ResolvedLine>, LedgerError> {
        if lines.len() < 2 {
            return Err(LedgerError::InsufficientLines(lines.len()));
        }

        lines
            .iter()
            .enumerate()
            .map(|(position, line)| {
                let raw = line.amount.trim();
                let amount = Decimal::from_str(raw).map_err(|_| LedgerError::InvalidAmount {
                    position,
                    value: line.amount.clone(),
                })?;
                if amount <= Decimal::ZERO {
                    return Err(LedgerError::NonPositiveAmount {
                        position,
                        value: amount,
                    });
                }
                let amount = check_money("amount", amount)
                    .map_err(|source| LedgerError::AmountOutOfBounds { position, source })?;
                Ok(ResolvedLine {
                    position: i32::try_from(position).map_err(|_| {
                        LedgerError::InvalidAmount {
                            position,
                            value: line.amount.clone(),
                        }
                    })?,
                    account_id: line.account_id,
                    side: line.side,
                    amount,
                    cost_center_id: line.cost_center_id,
                    description: line.description.clone(),
                })
            })
            .collect()
    }

    /// Checks that every referenced account exists, is active and, for manual
    /// entries, accepts manual journals.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, `AccountNotActive` or `ManualJournalBlocked`
    /// for the first offending line.
    pub fn check_accounts(
        lines: &[ResolvedLine],
        manual: bool,
        accounts: &HashMap<Uuid, AccountInfo>,
    ) -> Result<(), LedgerError> {
        for line in lines {
            let account = accounts
                .get(&line.account_id)
                .ok_or(LedgerError::AccountNotFound(line.account_id))?;
            if !account.is_active() {
                return Err(LedgerError::AccountNotActive {
                    id: account.id,
                    status: account.status.clone(),
                });
            }
            if manual && !account.allow_manual_journal {
                return Err(LedgerError::ManualJournalBlocked(account.id));
            }
        }
        Ok(())
    }

    /// Distinct account ids referenced by `lines`, in first-seen order.
    #[must_use]
    pub fn account_ids(lines: &[ResolvedLine]) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = Vec::with_capacity(lines.len());
        for line in lines {
            if !ids.contains(&line.account_id) {
                ids.push(line.account_id);
            }
        }
        ids
    }
}
