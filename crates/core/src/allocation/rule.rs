//! Allocation rules: split an amount across target cost centers.

use ledgerline_shared::AppError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::split::AllocationUtil;
use crate::amount::{AmountError, check_money, checked_add};

/// Scale of allocated amounts.
pub const ALLOCATION_DECIMAL_PLACES: u32 = 2;

/// How a rule weighs its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationBasis {
    /// Every target gets the same share; weights are ignored.
    Equal,
    /// Weights are percentages adding up to exactly 100.
    Percentage,
    /// Weights are arbitrary positive drivers (headcount, floor area).
    Weighted,
}

impl AllocationBasis {
    /// Upper-case name as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::Percentage => "PERCENTAGE",
            Self::Weighted => "WEIGHTED",
        }
    }
}

impl std::str::FromStr for AllocationBasis {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQUAL" => Ok(Self::Equal),
            "PERCENTAGE" => Ok(Self::Percentage),
            "WEIGHTED" => Ok(Self::Weighted),
            _ => Err(AllocationError::UnknownBasis(s.to_string())),
        }
    }
}

/// One target of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTarget {
    /// Cost center receiving a share.
    pub cost_center_id: Uuid,
    /// Share driver; required unless the basis is `EQUAL`.
    #[serde(default)]
    pub weight: Option<Decimal>,
}

/// Errors raised while validating or applying a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// Basis name is not recognised.
    #[error("unknown allocation basis '{0}'")]
    UnknownBasis(String),

    /// Rule has no targets.
    #[error("allocation rule must have at least one target")]
    NoTargets,

    /// The same cost center appears twice.
    #[error("cost center {0} appears more than once in targets")]
    DuplicateTarget(Uuid),

    /// A target lacks a weight or has a non-positive one.
    #[error("target {0} needs a weight greater than zero")]
    InvalidWeight(Uuid),

    /// Percentages do not add up to 100.
    #[error("percentage weights must sum to 100, got {0}")]
    PercentageSum(Decimal),

    /// A weight or amount is out of the stored range.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

/// Validates the shape of a rule's targets for its basis.
///
/// # Errors
///
/// Returns the first violated rule.
pub fn validate_targets(basis: AllocationBasis, targets: &[RuleTarget]) -> Result<(), AllocationError> {
    if targets.is_empty() {
        return Err(AllocationError::NoTargets);
    }
    for (i, target) in targets.iter().enumerate() {
        if targets[..i]
            .iter()
            .any(|t| t.cost_center_id == target.cost_center_id)
        {
            return Err(AllocationError::DuplicateTarget(target.cost_center_id));
        }
    }
    if basis == AllocationBasis::Equal {
        return Ok(());
    }
    let mut sum = Decimal::ZERO;
    for target in targets {
        match target.weight {
            Some(w) if w > Decimal::ZERO => {
                check_money("weight", w)?;
                sum = checked_add("weight total", sum, w)?;
            }
            _ => return Err(AllocationError::InvalidWeight(target.cost_center_id)),
        }
    }
    if basis == AllocationBasis::Percentage && sum != Decimal::ONE_HUNDRED {
        return Err(AllocationError::PercentageSum(sum));
    }
    Ok(())
}

/// Splits `amount` across the targets. Deterministic for identical inputs;
/// the parts add up to `amount` rounded to two decimals.
///
/// # Errors
///
/// Returns the validation error of [`validate_targets`], or `Amount` when
/// `amount` does not fit a money column.
pub fn apply_rule(
    basis: AllocationBasis,
    amount: Decimal,
    targets: &[RuleTarget],
) -> Result<Vec<(Uuid, Decimal)>, AllocationError> {
    validate_targets(basis, targets)?;
    check_money("amount", amount)?;
    let parts = match basis {
        AllocationBasis::Equal => {
            AllocationUtil::allocate_equal(amount, targets.len(), ALLOCATION_DECIMAL_PLACES)
        }
        AllocationBasis::Percentage | AllocationBasis::Weighted => {
            let weights: Vec<Decimal> = targets
                .iter()
                .map(|t| t.weight.unwrap_or(Decimal::ZERO))
                .collect();
            AllocationUtil::allocate_by_weights(amount, &weights, ALLOCATION_DECIMAL_PLACES)
        }
    };
    Ok(targets
        .iter()
        .map(|t| t.cost_center_id)
        .zip(parts)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn target(weight: Option<Decimal>) -> RuleTarget {
        RuleTarget {
            cost_center_id: Uuid::now_v7(),
            weight,
        }
    }

    #[test]
    fn test_equal_rule() {
        let targets = [target(None), target(None), target(None)];
        let parts = apply_rule(AllocationBasis::Equal, dec!(1000), &targets).unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].0, targets[0].cost_center_id);
        assert_eq!(parts[0].1, dec!(333.34));
        assert_eq!(parts.iter().map(|p| p.1).sum::<Decimal>(), dec!(1000));
    }

    #[test]
    fn test_percentage_rule() {
        let targets = [target(Some(dec!(60))), target(Some(dec!(40)))];
        let parts = apply_rule(AllocationBasis::Percentage, dec!(250.55), &targets).unwrap();
        assert_eq!(parts[0].1 + parts[1].1, dec!(250.55));
        assert_eq!(parts[0].1, dec!(150.33));
    }

    #[test]
    fn test_percentage_must_sum_to_hundred() {
        let targets = [target(Some(dec!(60))), target(Some(dec!(30)))];
        assert_eq!(
            apply_rule(AllocationBasis::Percentage, dec!(1), &targets),
            Err(AllocationError::PercentageSum(dec!(90)))
        );
    }

    #[test]
    fn test_weighted_rule_needs_weights() {
        let targets = [target(Some(dec!(3))), target(None)];
        assert!(matches!(
            apply_rule(AllocationBasis::Weighted, dec!(1), &targets),
            Err(AllocationError::InvalidWeight(_))
        ));
    }

    #[test]
    fn test_duplicate_and_empty_targets() {
        assert_eq!(
            apply_rule(AllocationBasis::Equal, dec!(1), &[]),
            Err(AllocationError::NoTargets)
        );
        let t = target(None);
        assert!(matches!(
            apply_rule(AllocationBasis::Equal, dec!(1), &[t.clone(), t]),
            Err(AllocationError::DuplicateTarget(_))
        ));
    }

    #[test]
    fn test_basis_parse() {
        assert_eq!("equal".parse::<AllocationBasis>(), Ok(AllocationBasis::Equal));
        assert!("HEADCOUNT".parse::<AllocationBasis>().is_err());
    }

    #[test]
    fn test_weights_beyond_column_rejected() {
        let targets = [target(Some(Decimal::MAX)), target(Some(Decimal::MAX))];
        assert!(matches!(
            apply_rule(AllocationBasis::Weighted, dec!(100), &targets),
            Err(AllocationError::Amount(AmountError::OutOfRange { .. }))
        ));
        let targets = [target(Some(dec!(1))), target(Some(dec!(1)))];
        assert!(matches!(
            apply_rule(AllocationBasis::Weighted, Decimal::MAX, &targets),
            Err(AllocationError::Amount(_))
        ));
    }
}
