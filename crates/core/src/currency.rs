//! Exchange rate rules.

use ledgerline_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by exchange rate validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// Currency code is not three ASCII letters.
    #[error("{field} '{code}' is not a 3-letter currency code")]
    InvalidCode {
        /// Field name.
        field: &'static str,
        /// Supplied code.
        code: String,
    },

    /// Base and quote are the same currency.
    #[error("base and quote currencies must differ, both are {0}")]
    SameCurrency(String),

    /// Rate must be positive.
    #[error("rate must be greater than zero, got {0}")]
    NonPositiveRate(Decimal),
}

impl From<CurrencyError> for AppError {
    fn from(err: CurrencyError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Normalizes a currency code to upper case.
///
/// # Errors
///
/// Returns `InvalidCode` unless the trimmed input is three ASCII letters.
pub fn normalize_code(field: &'static str, code: &str) -> Result<String, CurrencyError> {
    let trimmed = code.trim();
    if trimmed.len() == 3 && trimmed.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(CurrencyError::InvalidCode {
            field,
            code: code.to_string(),
        })
    }
}

/// Validates a quote and returns the normalized pair.
///
/// # Errors
///
/// Returns `InvalidCode`, `SameCurrency` or `NonPositiveRate`.
pub fn validate_quote(
    base: &str,
    quote: &str,
    rate: Decimal,
) -> Result<(String, String), CurrencyError> {
    let base = normalize_code("base_currency", base)?;
    let quote = normalize_code("quote_currency", quote)?;
    if base == quote {
        return Err(CurrencyError::SameCurrency(base));
    }
    if rate <= Decimal::ZERO {
        return Err(CurrencyError::NonPositiveRate(rate));
    }
    Ok((base, quote))
}
