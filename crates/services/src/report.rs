//! Read-only reports over committed data.

use std::collections::HashMap;

use ledgerline_core::period::validate_open_range;
use ledgerline_core::reports::{AccountTotals, ExpenseSummaryReport, ReportService, TrialBalanceReport};
use ledgerline_db::Gateway;
use ledgerline_db::entities::sea_orm_active_enums::LineSide;
use ledgerline_db::repositories::{AccountRepository, ExpenseFilter, ExpenseRepository, JournalRepository};
use ledgerline_shared::{AppError, AppResult, RequestContext};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

/// Report queries.
#[derive(Debug, Clone)]
pub struct ReportQueries {
    gateway: Gateway,
}

impl ReportQueries {
    /// Creates the query service.
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Debit, credit and balance per account over every committed journal
    /// line. Accounts without postings are listed with zero totals.
    pub async fn trial_balance(&self, ctx: &RequestContext) -> AppResult<TrialBalanceReport> {
        let (accounts, postings) = ctx
            .run(self.gateway.with_transaction(None, |txn| {
                Box::pin(async move {
                    let accounts = AccountRepository::new(txn).all().await?;
                    let postings = JournalRepository::new(txn).postings().await?;
                    Ok::<_, AppError>((accounts, postings))
                })
            }))
            .await?;

        let mut sums: HashMap<Uuid, (Decimal, Decimal)> = HashMap::with_capacity(accounts.len());
        for posting in &postings {
            let slot = sums.entry(posting.account_id).or_default();
            match posting.side {
                LineSide::Debit => slot.0 += posting.amount,
                LineSide::Credit => slot.1 += posting.amount,
            }
        }

        let totals = accounts
            .into_iter()
            .map(|account| {
                let (total_debit, total_credit) =
                    sums.get(&account.id).copied().unwrap_or_default();
                AccountTotals {
                    account_id: account.id,
                    code: account.code,
                    name: account.name,
                    account_type: account.account_type.as_str().to_string(),
                    total_debit,
                    total_credit,
                }
            })
            .collect();

        let report = ReportService::generate_trial_balance(totals);
        debug!(
            accounts = report.accounts.len(),
            postings = postings.len(),
            balanced = report.totals.is_balanced,
            "Trial balance generated"
        );
        Ok(report)
    }

    /// Count and total per category over the filtered expenses.
    pub async fn expense_summary(
        &self,
        ctx: &RequestContext,
        filter: &ExpenseFilter,
    ) -> AppResult<ExpenseSummaryReport> {
        validate_open_range("from", filter.from, "to", filter.to)?;
        let rows = ctx
            .run(async {
                ExpenseRepository::new(self.gateway.connection())
                    .totals_by_category(filter)
                    .await
                    .map_err(AppError::from)
            })
            .await?;

        let report = ReportService::generate_expense_summary(rows);
        debug!(
            categories = report.categories.len(),
            expenses = report.expense_count,
            "Expense summary generated"
        );
        Ok(report)
    }
}
