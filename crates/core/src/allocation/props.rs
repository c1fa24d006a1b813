//! Property-based tests for allocation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::rule::{AllocationBasis, RuleTarget, apply_rule};
use super::split::AllocationUtil;

/// Strategy to generate positive decimal amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive integer weights.
fn weights() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(1u32..1000, 1..12)
        .prop_map(|values| values.into_iter().map(Decimal::from).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The parts of an equal split always add back to the total.
    #[test]
    fn prop_equal_sum_invariant(total in positive_amount(), count in 1usize..50) {
        let parts = AllocationUtil::allocate_equal(total, count, 2);
        prop_assert_eq!(parts.len(), count);
        prop_assert_eq!(parts.iter().copied().sum::<Decimal>(), total);
    }

    /// The parts of a weighted split always add back to the total.
    #[test]
    fn prop_weighted_sum_invariant(total in positive_amount(), weights in weights()) {
        let parts = AllocationUtil::allocate_by_weights(total, &weights, 2);
        prop_assert_eq!(parts.len(), weights.len());
        prop_assert_eq!(parts.iter().copied().sum::<Decimal>(), total);
    }

    /// No part differs from its exact share by a cent or more.
    #[test]
    fn prop_parts_close_to_exact(total in positive_amount(), weights in weights()) {
        let sum: Decimal = weights.iter().copied().sum();
        let parts = AllocationUtil::allocate_by_weights(total, &weights, 2);
        for (part, weight) in parts.iter().zip(&weights) {
            let exact = total * *weight / sum;
            prop_assert!((*part - exact).abs() < Decimal::new(1, 2));
        }
    }

    /// Applying a rule twice gives the same split.
    #[test]
    fn prop_rule_is_deterministic(total in positive_amount(), weights in weights()) {
        let targets: Vec<RuleTarget> = weights
            .iter()
            .map(|w| RuleTarget { cost_center_id: Uuid::now_v7(), weight: Some(*w) })
            .collect();
        let first = apply_rule(AllocationBasis::Weighted, total, &targets).unwrap();
        let second = apply_rule(AllocationBasis::Weighted, total, &targets).unwrap();
        prop_assert_eq!(first, second);
    }
}
