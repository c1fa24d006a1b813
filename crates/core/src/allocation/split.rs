//! Largest Remainder splitting.
//!
//! 1. Calculate exact shares
//! 2. Round each share toward zero
//! 3. Hand the leftover units to the shares with the largest fractional parts,
//!    earlier positions winning ties

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Allocation utility for distributing amounts.
pub struct AllocationUtil;

impl AllocationUtil {
    /// Splits `total` equally across `count` recipients.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use ledgerline_core::allocation::AllocationUtil;
    ///
    /// // 100 / 3 = [33.34, 33.33, 33.33]
    /// let parts = AllocationUtil::allocate_equal(dec!(100), 3, 2);
    /// assert_eq!(parts, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
    /// ```
    #[must_use]
    pub fn allocate_equal(total: Decimal, count: usize, decimal_places: u32) -> Vec<Decimal> {
        Self::allocate_by_weights(total, &vec![Decimal::ONE; count], decimal_places)
    }

    /// Splits `total` by percentages that should add up to 100.
    #[must_use]
    pub fn allocate_by_percentages(
        total: Decimal,
        percentages: &[Decimal],
        decimal_places: u32,
    ) -> Vec<Decimal> {
        Self::allocate_by_weights(total, percentages, decimal_places)
    }

    /// Splits `total` proportionally to arbitrary non-negative weights.
    ///
    /// Returns an empty vector for no weights and all zeros when the weights
    /// sum to zero.
    #[must_use]
    pub fn allocate_by_weights(
        total: Decimal,
        weights: &[Decimal],
        decimal_places: u32,
    ) -> Vec<Decimal> {
        if weights.is_empty() {
            return vec![];
        }
        let weight_sum: Decimal = weights.iter().copied().sum();
        if weight_sum.is_zero() {
            return vec![Decimal::ZERO; weights.len()];
        }

        let unit = Decimal::new(1, decimal_places);
        let total_rounded =
            total.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven);

        let exact: Vec<Decimal> = weights
            .iter()
            .map(|w| total_rounded * *w / weight_sum)
            .collect();

        let mut rounded: Vec<Decimal> = exact
            .iter()
            .map(|a| a.round_dp_with_strategy(decimal_places, RoundingStrategy::ToZero))
            .collect();

        let sum_rounded: Decimal = rounded.iter().copied().sum();
        let remainder = total_rounded - sum_rounded;
        let units_to_distribute = (remainder / unit)
            .round_dp_with_strategy(0, RoundingStrategy::ToZero)
            .abs()
            .to_usize()
            .unwrap_or(0);
        if units_to_distribute == 0 {
            return rounded;
        }
        // Negative totals hand out negative units.
        let step = if remainder.is_sign_negative() { -unit } else { unit };

        let mut remainders: Vec<(usize, Decimal)> = exact
            .iter()
            .zip(rounded.iter())
            .enumerate()
            .map(|(i, (e, r))| (i, (*e - *r).abs()))
            .collect();
        // Stable: equal remainders keep input order.
        remainders.sort_by(|a, b| b.1.cmp(&a.1));

        for (idx, _) in remainders.iter().cycle().take(units_to_distribute) {
            rounded[*idx] += step;
        }

        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_allocate_equal_empty() {
        assert!(AllocationUtil::allocate_equal(dec!(100), 0, 2).is_empty());
    }

    #[test]
    fn test_allocate_equal_thirds() {
        let result = AllocationUtil::allocate_equal(dec!(100), 3, 2);
        assert_eq!(result, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
    }

    #[test]
    fn test_allocate_equal_sum_invariant() {
        let test_cases = [
            (dec!(100), 3),
            (dec!(100), 7),
            (dec!(1), 3),
            (dec!(0.01), 3),
            (dec!(999.99), 7),
        ];
        for (total, count) in test_cases {
            let result = AllocationUtil::allocate_equal(total, count, 2);
            assert_eq!(
                result.iter().sum::<Decimal>(),
                total,
                "Sum invariant failed for total={total}, count={count}"
            );
        }
    }

    #[test]
    fn test_allocate_by_percentages_uneven() {
        let percentages = vec![dec!(50), dec!(30), dec!(20)];
        let result = AllocationUtil::allocate_by_percentages(dec!(100), &percentages, 2);
        assert_eq!(result, vec![dec!(50), dec!(30), dec!(20)]);
    }

    #[test]
    fn test_allocate_by_weights_largest_remainder() {
        // 10.00 by 1:1:1:3 -> exact 1.666.., 1.666.., 1.666.., 5.00
        let weights = [dec!(1), dec!(1), dec!(1), dec!(3)];
        let result = AllocationUtil::allocate_by_weights(dec!(10), &weights, 2);
        assert_eq!(result, vec![dec!(1.67), dec!(1.67), dec!(1.66), dec!(5.00)]);
    }

    #[test]
    fn test_negative_total() {
        let result = AllocationUtil::allocate_equal(dec!(-100), 3, 2);
        assert_eq!(result.iter().sum::<Decimal>(), dec!(-100));
        assert_eq!(result[0], dec!(-33.34));
    }

    #[test]
    fn test_zero_weights() {
        let result = AllocationUtil::allocate_by_weights(dec!(10), &[dec!(0), dec!(0)], 2);
        assert_eq!(result, vec![Decimal::ZERO, Decimal::ZERO]);
    }
}
