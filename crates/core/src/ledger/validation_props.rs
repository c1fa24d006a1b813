//! Property-based tests for journal balancing.

use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::LedgerError;
use super::types::{JournalHeaderInput, LineInput, Side};
use super::validation::LedgerValidator;

/// Strategy to generate a valid positive amount in cents (0.01 to 1,000,000.00).
fn positive_cents() -> impl Strategy<Value = i64> {
    1i64..100_000_000i64
}

fn header() -> JournalHeaderInput {
    JournalHeaderInput {
        journal_date: Some(chrono::Utc::now()),
        ..Default::default()
    }
}

fn line(side: Side, cents: i64) -> LineInput {
    LineInput {
        account_id: Uuid::now_v7(),
        side,
        amount: Decimal::new(cents, 2).to_string(),
        cost_center_id: None,
        description: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Debits split across several lines against one matching credit always balance.
    #[test]
    fn prop_split_debits_balance(parts in prop::collection::vec(positive_cents(), 1..8)) {
        let total: i64 = parts.iter().sum();
        let mut lines: Vec<LineInput> = parts.iter().map(|c| line(Side::Debit, *c)).collect();
        lines.push(line(Side::Credit, total));

        let (_, resolved, totals) = LedgerValidator::validate_input(&header(), &lines).unwrap();
        prop_assert_eq!(resolved.len(), lines.len());
        prop_assert_eq!(totals.debit, Decimal::new(total, 2));
        prop_assert_eq!(totals.debit, totals.credit);
    }

    /// Any nonzero difference between sides is rejected with both totals reported.
    #[test]
    fn prop_any_difference_rejected(debit in positive_cents(), delta in 1i64..10_000i64) {
        let lines = vec![line(Side::Debit, debit), line(Side::Credit, debit + delta)];
        let err = LedgerValidator::validate_input(&header(), &lines).unwrap_err();
        prop_assert_eq!(
            err,
            LedgerError::Unbalanced {
                debit: Decimal::new(debit, 2),
                credit: Decimal::new(debit + delta, 2),
            }
        );
    }

    /// Positions follow input order.
    #[test]
    fn prop_positions_follow_input(parts in prop::collection::vec(positive_cents(), 2..10)) {
        let lines: Vec<LineInput> = parts.iter().map(|c| line(Side::Debit, *c)).collect();
        let resolved = LedgerValidator::resolve_lines(&lines).unwrap();
        for (i, line) in resolved.iter().enumerate() {
            prop_assert_eq!(usize::try_from(line.position).unwrap(), i);
            prop_assert_eq!(line.account_id, lines[i].account_id);
        }
    }

    /// Amounts with more decimals than a money column keeps never pass.
    #[test]
    fn prop_excess_scale_rejected(units in 1i64..1_000_000_000i64, other in positive_cents()) {
        prop_assume!(units % 10 != 0);
        let mut first = line(Side::Debit, 1);
        first.amount = Decimal::new(units, 5).to_string();
        let lines = vec![first, line(Side::Credit, other)];
        let rejected = matches!(
            LedgerValidator::resolve_lines(&lines),
            Err(LedgerError::AmountOutOfBounds { position: 0, .. })
        );
        prop_assert!(rejected);
    }

    /// Non-positive amounts never pass.
    #[test]
    fn prop_non_positive_rejected(cents in 0i64..100_000i64, other in positive_cents()) {
        let lines = vec![line(Side::Debit, -cents), line(Side::Credit, other)];
        let is_non_positive = matches!(
            LedgerValidator::resolve_lines(&lines),
            Err(LedgerError::NonPositiveAmount { position: 0, .. })
        );
        prop_assert!(is_non_positive);
    }
}
