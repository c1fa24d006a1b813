//! Parsing and checking of decimal amounts received as strings.
//!
//! Amounts travel as decimal strings and are never converted through binary
//! floating point. Money columns are `NUMERIC(16, 4)` and exchange rates
//! `NUMERIC(16, 8)`; values that would be rounded or rejected by the store are
//! refused here instead.

use std::str::FromStr;

use ledgerline_shared::AppError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Fractional digits kept for money.
pub const MONEY_SCALE: u32 = 4;

/// Integer digits kept for money.
pub const MONEY_INTEGER_DIGITS: u32 = 12;

/// Fractional digits kept for exchange rates.
pub const RATE_SCALE: u32 = 8;

/// Integer digits kept for exchange rates.
pub const RATE_INTEGER_DIGITS: u32 = 8;

/// Errors raised while reading an amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// The field was empty.
    #[error("{field} is required")]
    Missing {
        /// Field name.
        field: String,
    },

    /// The field is not a decimal number.
    #[error("{field} '{value}' is not a valid decimal amount")]
    Unparseable {
        /// Field name.
        field: String,
        /// Raw input.
        value: String,
    },

    /// The amount must be strictly positive.
    #[error("{field} must be greater than zero, got {value}")]
    NotPositive {
        /// Field name.
        field: String,
        /// Parsed amount.
        value: Decimal,
    },

    /// The amount must not be negative.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Field name.
        field: String,
        /// Parsed amount.
        value: Decimal,
    },

    /// More fractional digits than the store keeps.
    #[error("{field} {value} has more than {max_scale} decimal places")]
    TooPrecise {
        /// Field name.
        field: String,
        /// Parsed amount.
        value: Decimal,
        /// Allowed fractional digits.
        max_scale: u32,
    },

    /// Magnitude beyond what the store keeps.
    #[error("{field} {value} is out of range (absolute value must be below {limit})")]
    OutOfRange {
        /// Field name.
        field: String,
        /// Parsed amount.
        value: Decimal,
        /// Exclusive bound on the absolute value.
        limit: Decimal,
    },

    /// A sum or difference left the representable range.
    #[error("{field} overflowed")]
    Overflow {
        /// Name of the computed figure.
        field: String,
    },
}

impl From<AmountError> for AppError {
    fn from(err: AmountError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Parses a decimal string such as `"100.00"` and checks it fits a money
/// column.
///
/// # Errors
///
/// Returns `Missing` for blank input, `Unparseable` for anything that is not a
/// plain decimal literal, and the errors of [`check_money`].
pub fn parse_amount(field: &str, raw: &str) -> Result<Decimal, AmountError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AmountError::Missing {
            field: field.to_string(),
        });
    }
    let value = Decimal::from_str(raw).map_err(|_| AmountError::Unparseable {
        field: field.to_string(),
        value: raw.to_string(),
    })?;
    check_money(field, value)
}

fn check_bounds(
    field: &str,
    value: Decimal,
    max_scale: u32,
    integer_digits: u32,
) -> Result<Decimal, AmountError> {
    if value.normalize().scale() > max_scale {
        return Err(AmountError::TooPrecise {
            field: field.to_string(),
            value,
            max_scale,
        });
    }
    let limit = Decimal::from(10_i64.pow(integer_digits));
    if value.abs() >= limit {
        return Err(AmountError::OutOfRange {
            field: field.to_string(),
            value,
            limit,
        });
    }
    Ok(value)
}

/// Checks that `value` is stored exactly by a money column.
///
/// # Errors
///
/// Returns `TooPrecise` beyond [`MONEY_SCALE`] decimals and `OutOfRange` at or
/// above 10^[`MONEY_INTEGER_DIGITS`].
pub fn check_money(field: &str, value: Decimal) -> Result<Decimal, AmountError> {
    check_bounds(field, value, MONEY_SCALE, MONEY_INTEGER_DIGITS)
}

/// Checks that `value` is stored exactly by an exchange-rate column.
///
/// # Errors
///
/// Returns `TooPrecise` beyond [`RATE_SCALE`] decimals and `OutOfRange` at or
/// above 10^[`RATE_INTEGER_DIGITS`].
pub fn check_rate(field: &str, value: Decimal) -> Result<Decimal, AmountError> {
    check_bounds(field, value, RATE_SCALE, RATE_INTEGER_DIGITS)
}

/// Checks an optional money value.
///
/// # Errors
///
/// See [`check_money`].
pub fn check_optional_money(
    field: &str,
    value: Option<Decimal>,
) -> Result<Option<Decimal>, AmountError> {
    value.map(|v| check_money(field, v)).transpose()
}

/// `a + b`, failing instead of panicking on overflow.
///
/// # Errors
///
/// Returns `Overflow` naming `field`.
pub fn checked_add(field: &str, a: Decimal, b: Decimal) -> Result<Decimal, AmountError> {
    a.checked_add(b).ok_or_else(|| AmountError::Overflow {
        field: field.to_string(),
    })
}

/// `a - b`, failing instead of panicking on overflow.
///
/// # Errors
///
/// Returns `Overflow` naming `field`.
pub fn checked_sub(field: &str, a: Decimal, b: Decimal) -> Result<Decimal, AmountError> {
    a.checked_sub(b).ok_or_else(|| AmountError::Overflow {
        field: field.to_string(),
    })
}

/// Sums `values`, failing instead of panicking on overflow.
///
/// # Errors
///
/// Returns `Overflow` naming `field`.
pub fn checked_sum(
    field: &str,
    values: impl IntoIterator<Item = Decimal>,
) -> Result<Decimal, AmountError> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| checked_add(field, acc, v))
}

/// Checks that an already-typed amount fits a money column and is greater
/// than zero.
///
/// # Errors
///
/// See [`check_money`]; `NotPositive` otherwise.
pub fn require_positive(field: &str, value: Decimal) -> Result<Decimal, AmountError> {
    let value = check_money(field, value)?;
    if value > Decimal::ZERO {
        Ok(value)
    } else {
        Err(AmountError::NotPositive {
            field: field.to_string(),
            value,
        })
    }
}

/// Checks that an already-typed amount fits a money column and is zero or
/// greater.
///
/// # Errors
///
/// See [`check_money`]; `Negative` otherwise.
pub fn require_non_negative(field: &str, value: Decimal) -> Result<Decimal, AmountError> {
    let value = check_money(field, value)?;
    if value.is_sign_negative() && !value.is_zero() {
        Err(AmountError::Negative {
            field: field.to_string(),
            value,
        })
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("100.00", dec!(100.00))]
    #[case(" 0.5 ", dec!(0.5))]
    #[case("-12", dec!(-12))]
    #[case("1000000.0001", dec!(1000000.0001))]
    fn test_parse_amount(#[case] raw: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount("amount", raw), Ok(expected));
    }

    #[rstest]
    #[case("abc")]
    #[case("1,000.00")]
    #[case("12.5.1")]
    #[case("NaN")]
    fn test_parse_amount_rejects_garbage(#[case] raw: &str) {
        assert!(matches!(
            parse_amount("amount", raw),
            Err(AmountError::Unparseable { .. })
        ));
    }

    #[test]
    fn test_blank_is_missing() {
        assert_eq!(
            parse_amount("amount", "  "),
            Err(AmountError::Missing {
                field: "amount".into()
            })
        );
    }

    #[test]
    fn test_positive_and_non_negative() {
        assert!(require_positive("amount", Decimal::ZERO).is_err());
        assert!(require_positive("amount", dec!(-1)).is_err());
        assert_eq!(require_positive("amount", dec!(0.01)), Ok(dec!(0.01)));
        assert_eq!(require_non_negative("spent", Decimal::ZERO), Ok(Decimal::ZERO));
        assert!(require_non_negative("spent", dec!(-0.01)).is_err());
    }

    #[rstest]
    #[case("0.0001")]
    #[case("100.10000")]
    #[case("999999999999.9999")]
    #[case("-999999999999.9999")]
    fn test_money_within_column(#[case] raw: &str) {
        assert!(parse_amount("amount", raw).is_ok());
    }

    #[test]
    fn test_money_scale_beyond_column() {
        assert_eq!(
            parse_amount("amount", "0.00005"),
            Err(AmountError::TooPrecise {
                field: "amount".into(),
                value: dec!(0.00005),
                max_scale: MONEY_SCALE,
            })
        );
        assert!(matches!(
            require_positive("amount", dec!(1.23456)),
            Err(AmountError::TooPrecise { .. })
        ));
    }

    #[rstest]
    #[case("1000000000000")]
    #[case("-1000000000000")]
    #[case("79228162514264337593543950335")]
    fn test_money_magnitude_beyond_column(#[case] raw: &str) {
        assert!(matches!(
            parse_amount("amount", raw),
            Err(AmountError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_rate_bounds() {
        assert_eq!(check_rate("rate", dec!(83.12345678)), Ok(dec!(83.12345678)));
        assert!(matches!(
            check_rate("rate", dec!(0.000000001)),
            Err(AmountError::TooPrecise { max_scale: RATE_SCALE, .. })
        ));
        assert!(matches!(
            check_rate("rate", dec!(100000000)),
            Err(AmountError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_optional_money() {
        assert_eq!(check_optional_money("cgst", None), Ok(None));
        assert_eq!(check_optional_money("cgst", Some(dec!(9))), Ok(Some(dec!(9))));
        assert!(check_optional_money("cgst", Some(dec!(0.12345))).is_err());
    }

    #[test]
    fn test_checked_arithmetic_reports_overflow() {
        let max = Decimal::MAX;
        assert_eq!(
            checked_sum("debit total", [max, max]),
            Err(AmountError::Overflow {
                field: "debit total".into()
            })
        );
        assert_eq!(checked_sum("total", [dec!(1.5), dec!(2.5)]), Ok(dec!(4.0)));
        assert!(checked_sub("remaining", Decimal::MIN, Decimal::ONE).is_err());
        assert_eq!(checked_add("total", dec!(1), dec!(2)), Ok(dec!(3)));
    }

    #[test]
    fn test_maps_to_invalid_argument() {
        let err: AppError = parse_amount("amount", "x").unwrap_err().into();
        assert!(matches!(err, AppError::InvalidArgument(msg) if msg.contains("amount 'x'")));
    }
}
