//! Double-entry bookkeeping rules.
//!
//! This module implements the journal invariants checked before anything is
//! written:
//! - Header consistency (date, source type and id pairing)
//! - Line amounts (decimal strings, strictly positive)
//! - Balance (sum of debits equals sum of credits, exactly)
//! - Account eligibility (exists, active, open to manual journals)

pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use types::{AccountInfo, JournalHeaderInput, JournalTotals, LineInput, ResolvedLine, Side};
pub use validation::LedgerValidator;
