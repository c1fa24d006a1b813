//! Report generation service.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::types::{
    AccountTotals, CategoryTotal, ExpenseRow, ExpenseSummaryReport, TrialBalanceLine,
    TrialBalanceReport, TrialBalanceTotals,
};

/// Label used for expenses without a category.
pub const UNCATEGORIZED: &str = "UNCATEGORIZED";

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Generates a trial balance from per-account posting totals.
    ///
    /// Asset and expense balances are debit minus credit; the other types are
    /// credit minus debit.
    #[must_use]
    pub fn generate_trial_balance(mut accounts: Vec<AccountTotals>) -> TrialBalanceReport {
        accounts.sort_by(|a, b| a.code.cmp(&b.code).then(a.account_id.cmp(&b.account_id)));

        let total_debit: Decimal = accounts.iter().map(|a| a.total_debit).sum();
        let total_credit: Decimal = accounts.iter().map(|a| a.total_credit).sum();

        let lines = accounts
            .into_iter()
            .map(|a| {
                let balance = match a.account_type.as_str() {
                    "ASSET" | "EXPENSE" => a.total_debit - a.total_credit,
                    _ => a.total_credit - a.total_debit,
                };
                TrialBalanceLine {
                    account_id: a.account_id,
                    code: a.code,
                    name: a.name,
                    account_type: a.account_type,
                    total_debit: a.total_debit,
                    total_credit: a.total_credit,
                    balance,
                    balance_approx: approx(balance),
                }
            })
            .collect();

        TrialBalanceReport {
            report_type: "trial_balance".to_string(),
            accounts: lines,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced: total_debit == total_credit,
                total_debit_approx: approx(total_debit),
                total_credit_approx: approx(total_credit),
            },
        }
    }

    /// Generates the expense summary from per-category totals.
    #[must_use]
    pub fn generate_expense_summary(rows: Vec<ExpenseRow>) -> ExpenseSummaryReport {
        let mut categories: Vec<CategoryTotal> = Vec::new();
        for row in rows {
            let name = if row.category.trim().is_empty() {
                UNCATEGORIZED.to_string()
            } else {
                row.category
            };
            if let Some(existing) = categories.iter_mut().find(|c| c.category == name) {
                existing.count += row.count;
                existing.total += row.total;
            } else {
                categories.push(CategoryTotal {
                    category: name,
                    count: row.count,
                    total: row.total,
                    total_approx: 0.0,
                });
            }
        }
        categories.sort_by(|a, b| a.category.cmp(&b.category));
        for category in &mut categories {
            category.total_approx = approx(category.total);
        }

        let grand_total: Decimal = categories.iter().map(|c| c.total).sum();
        ExpenseSummaryReport {
            report_type: "expense_summary".to_string(),
            expense_count: categories.iter().map(|c| c.count).sum(),
            categories,
            grand_total,
            grand_total_approx: approx(grand_total),
        }
    }
}

fn approx(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
