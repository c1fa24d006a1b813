//! Budgets, expenses, cost allocation, FX, accruals, logs and reports.

mod common;

use common::{account, at, ctx, setup, TestApp};
use ledgerline_core::allocation::RuleTarget;
use ledgerline_core::ledger::{LineInput, Side};
use ledgerline_db::entities::cost_centers;
use ledgerline_db::entities::sea_orm_active_enums::{
    AccrualStatus, AccountType, AllocationBasis, BudgetStatus, FinanceEventType,
};
use ledgerline_db::repositories::{
    AccrualInput, AllocationRuleInput, AuditEventInput, AuditFilter, BudgetAllocationInput,
    BudgetInput, CashFlowForecastInput, ConsolidationInput, CostAllocationFilter,
    CostCenterInput, ExchangeRateFilter, ExchangeRateInput, ExpenseFilter, ExpenseInput,
    FinanceEventInput,
};
use ledgerline_events::Topic;
use ledgerline_services::{ApplyRuleRequest, JournalInput};
use ledgerline_shared::AppError;
use ledgerline_shared::types::Page;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

fn budget_input(total: Decimal) -> BudgetInput {
    BudgetInput {
        name: "FY24 Operations".to_string(),
        fiscal_year: 2024,
        currency: "INR".to_string(),
        total_amount: total,
        status: BudgetStatus::Active,
        description: None,
    }
}

fn department(name: &str, allocated: Decimal, spent: Decimal) -> BudgetAllocationInput {
    BudgetAllocationInput {
        department: name.to_string(),
        allocated_amount: allocated,
        spent_amount: spent,
    }
}

async fn cost_center(app: &TestApp, code: &str) -> cost_centers::Model {
    app.services
        .cost_centers
        .create(
            &ctx(),
            CostCenterInput {
                code: code.to_string(),
                name: format!("Center {code}"),
                description: None,
                is_active: true,
            },
        )
        .await
        .unwrap()
}

fn expense(description: &str, category: Option<&str>, amount: Decimal) -> ExpenseInput {
    ExpenseInput {
        description: description.to_string(),
        category: category.map(str::to_string),
        amount,
        currency: "inr".to_string(),
        expense_date: at(2024, 2, 10, 9),
        cost_center_id: None,
        account_id: None,
    }
}

fn rate(base: &str, quote: &str, value: Decimal, day: u32) -> ExchangeRateInput {
    ExchangeRateInput {
        base_currency: base.to_string(),
        quote_currency: quote.to_string(),
        rate: value,
        as_of: at(2024, 4, day, 0),
        source: Some("RBI".to_string()),
    }
}

#[tokio::test]
async fn test_over_allocation_is_rejected_with_message() {
    let app = setup().await;
    let budget = app
        .services
        .budgets
        .create(&ctx(), budget_input(dec!(10000)))
        .await
        .unwrap();
    app.services
        .budgets
        .allocate(&ctx(), budget.id, department("Engineering", dec!(6000), dec!(0)))
        .await
        .unwrap();

    let result = app
        .services
        .budgets
        .allocate(&ctx(), budget.id, department("Sales", dec!(5000), dec!(0)))
        .await;

    match result {
        Err(AppError::FailedPrecondition(message)) => {
            assert!(message.contains("total_allocated > total_amount"), "{message}");
        }
        other => panic!("expected FailedPrecondition, got {other:?}"),
    }
    let allocations = app
        .services
        .budgets
        .allocations(&ctx(), budget.id)
        .await
        .unwrap();
    assert_eq!(allocations.len(), 1);
    assert_eq!(
        app.transport.keys(Topic::Budgets),
        vec!["budget.created", "budget_allocation.created"]
    );
}

#[tokio::test]
async fn test_allocation_up_to_total_is_accepted() {
    let app = setup().await;
    let budget = app
        .services
        .budgets
        .create(&ctx(), budget_input(dec!(10000)))
        .await
        .unwrap();
    app.services
        .budgets
        .allocate(&ctx(), budget.id, department("Engineering", dec!(6000), dec!(0)))
        .await
        .unwrap();
    app.services
        .budgets
        .allocate(&ctx(), budget.id, department("Sales", dec!(4000), dec!(0)))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_budget_total_cannot_drop_below_allocations() {
    let app = setup().await;
    let budget = app
        .services
        .budgets
        .create(&ctx(), budget_input(dec!(10000)))
        .await
        .unwrap();
    app.services
        .budgets
        .allocate(&ctx(), budget.id, department("Engineering", dec!(6000), dec!(0)))
        .await
        .unwrap();

    let result = app
        .services
        .budgets
        .update(&ctx(), budget.id, budget.revision, budget_input(dec!(5000)))
        .await;
    assert!(matches!(result, Err(AppError::FailedPrecondition(_))));

    let raised = app
        .services
        .budgets
        .update(&ctx(), budget.id, budget.revision, budget_input(dec!(12000)))
        .await
        .unwrap();
    assert_eq!(raised.revision, 2);
}

#[tokio::test]
async fn test_budget_comparison_breaks_down_departments() {
    let app = setup().await;
    let budget = app
        .services
        .budgets
        .create(&ctx(), budget_input(dec!(10000)))
        .await
        .unwrap();
    for (name, allocated, spent) in [
        ("Sales", dec!(3000), dec!(1000)),
        ("Engineering", dec!(4000), dec!(2000)),
        ("Sales", dec!(1000), dec!(500)),
    ] {
        app.services
            .budgets
            .allocate(&ctx(), budget.id, department(name, allocated, spent))
            .await
            .unwrap();
    }

    let report = app
        .services
        .budgets
        .comparison(&ctx(), budget.id)
        .await
        .unwrap();
    assert_eq!(report.budget_id, budget.id);
    assert_eq!(report.comparison.total_budget, dec!(10000));
    assert_eq!(report.comparison.total_allocated, dec!(8000));
    assert_eq!(report.comparison.total_spent, dec!(3500));
    assert_eq!(report.comparison.remaining_budget, dec!(4500));
    assert_eq!(report.comparison.utilization_percentage, dec!(35.00));

    let names: Vec<_> = report
        .comparison
        .departments
        .iter()
        .map(|d| d.department.as_str())
        .collect();
    assert_eq!(names, vec!["Engineering", "Sales"]);
    assert_eq!(report.comparison.departments[1].allocated, dec!(4000));
    assert_eq!(report.comparison.departments[1].remaining, dec!(2500));
}

#[tokio::test]
async fn test_concurrent_allocations_never_exceed_total() {
    let app = setup().await;
    let budget = app
        .services
        .budgets
        .create(&ctx(), budget_input(dec!(10000)))
        .await
        .unwrap();

    let (first_ctx, second_ctx) = (ctx(), ctx());
    let (first, second) = tokio::join!(
        app.services
            .budgets
            .allocate(&first_ctx, budget.id, department("Engineering", dec!(6000), dec!(0))),
        app.services
            .budgets
            .allocate(&second_ctx, budget.id, department("Sales", dec!(6000), dec!(0))),
    );
    assert_eq!(
        [first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(),
        1
    );
    let rejected = if first.is_err() { first } else { second };
    assert!(matches!(rejected, Err(AppError::FailedPrecondition(_))));

    let report = app
        .services
        .budgets
        .comparison(&ctx(), budget.id)
        .await
        .unwrap();
    assert_eq!(report.comparison.total_allocated, dec!(6000));
    assert_eq!(report.comparison.remaining_budget, dec!(6000));
    assert_eq!(report.comparison.departments.len(), 1);
}

#[tokio::test]
async fn test_budget_delete_removes_allocations() {
    let app = setup().await;
    let budget = app
        .services
        .budgets
        .create(&ctx(), budget_input(dec!(100)))
        .await
        .unwrap();
    app.services
        .budgets
        .allocate(&ctx(), budget.id, department("Ops", dec!(50), dec!(0)))
        .await
        .unwrap();

    app.services.budgets.delete(&ctx(), budget.id).await.unwrap();
    assert!(matches!(
        app.services.budgets.allocations(&ctx(), budget.id).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_equal_rule_splits_amount_across_targets() {
    let app = setup().await;
    let rent = account(&app, "5200", AccountType::Expense, true).await;
    let centers = [
        cost_center(&app, "CC-A").await,
        cost_center(&app, "CC-B").await,
        cost_center(&app, "CC-C").await,
    ];

    let rule = app
        .services
        .allocation_rules
        .create(
            &ctx(),
            AllocationRuleInput {
                name: "Rent split".to_string(),
                basis: AllocationBasis::Equal,
                source_account_id: rent.id,
                targets: centers
                    .iter()
                    .map(|c| RuleTarget {
                        cost_center_id: c.id,
                        weight: None,
                    })
                    .collect(),
                is_active: true,
            },
        )
        .await
        .unwrap();

    let reference_id = Uuid::now_v7();
    let stored = app
        .services
        .allocation_rules
        .apply(
            &ctx(),
            rule.id,
            ApplyRuleRequest {
                amount: dec!(900),
                reference_type: "EXPENSE".to_string(),
                reference_id,
                allocation_date: Some(at(2024, 2, 1, 0)),
            },
        )
        .await
        .unwrap();

    assert_eq!(stored.len(), 3);
    assert_eq!(stored.iter().map(|a| a.amount).sum::<Decimal>(), dec!(900));
    assert!(stored.iter().all(|a| a.rule_id == Some(rule.id)));

    let listed = app
        .services
        .cost_allocations
        .list(
            &ctx(),
            &CostAllocationFilter {
                reference_id: Some(reference_id),
                ..CostAllocationFilter::default()
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(listed.total_size, 3);
    assert_eq!(
        app.transport
            .keys(Topic::Allocations)
            .iter()
            .filter(|k| *k == "cost_allocation.created")
            .count(),
        3
    );
}

#[tokio::test]
async fn test_percentage_rule_must_sum_to_hundred() {
    let app = setup().await;
    let rent = account(&app, "5200", AccountType::Expense, true).await;
    let a = cost_center(&app, "CC-A").await;
    let b = cost_center(&app, "CC-B").await;

    let input = |first: Decimal, second: Decimal| AllocationRuleInput {
        name: "Utilities".to_string(),
        basis: AllocationBasis::Percentage,
        source_account_id: rent.id,
        targets: vec![
            RuleTarget {
                cost_center_id: a.id,
                weight: Some(first),
            },
            RuleTarget {
                cost_center_id: b.id,
                weight: Some(second),
            },
        ],
        is_active: true,
    };

    let bad = app
        .services
        .allocation_rules
        .create(&ctx(), input(dec!(60), dec!(30)))
        .await;
    assert!(matches!(bad, Err(AppError::InvalidArgument(_))));

    let rule = app
        .services
        .allocation_rules
        .create(&ctx(), input(dec!(60), dec!(40)))
        .await
        .unwrap();
    let stored = app
        .services
        .allocation_rules
        .apply(
            &ctx(),
            rule.id,
            ApplyRuleRequest {
                amount: dec!(1000),
                reference_type: "EXPENSE".to_string(),
                reference_id: Uuid::now_v7(),
                allocation_date: None,
            },
        )
        .await
        .unwrap();
    let by_center: Vec<_> = stored.iter().map(|s| (s.cost_center_id, s.amount)).collect();
    assert!(by_center.contains(&(a.id, dec!(600))));
    assert!(by_center.contains(&(b.id, dec!(400))));
}

#[tokio::test]
async fn test_rule_with_unknown_cost_center_is_rejected() {
    let app = setup().await;
    let rent = account(&app, "5200", AccountType::Expense, true).await;

    let result = app
        .services
        .allocation_rules
        .create(
            &ctx(),
            AllocationRuleInput {
                name: "Ghost".to_string(),
                basis: AllocationBasis::Equal,
                source_account_id: rent.id,
                targets: vec![RuleTarget {
                    cost_center_id: Uuid::now_v7(),
                    weight: None,
                }],
                is_active: true,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::FailedPrecondition(_))));
}

#[tokio::test]
async fn test_inactive_rule_cannot_be_applied() {
    let app = setup().await;
    let rent = account(&app, "5200", AccountType::Expense, true).await;
    let a = cost_center(&app, "CC-A").await;
    let rule = app
        .services
        .allocation_rules
        .create(
            &ctx(),
            AllocationRuleInput {
                name: "Paused".to_string(),
                basis: AllocationBasis::Equal,
                source_account_id: rent.id,
                targets: vec![RuleTarget {
                    cost_center_id: a.id,
                    weight: None,
                }],
                is_active: false,
            },
        )
        .await
        .unwrap();

    let result = app
        .services
        .allocation_rules
        .apply(
            &ctx(),
            rule.id,
            ApplyRuleRequest {
                amount: dec!(10),
                reference_type: "EXPENSE".to_string(),
                reference_id: Uuid::now_v7(),
                allocation_date: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::FailedPrecondition(_))));
}

#[tokio::test]
async fn test_latest_rate_respects_as_of() {
    let app = setup().await;
    app.services
        .exchange_rates
        .create(&ctx(), rate("usd", "inr", dec!(83.10), 1))
        .await
        .unwrap();
    app.services
        .exchange_rates
        .create(&ctx(), rate("USD", "INR", dec!(83.40), 5))
        .await
        .unwrap();

    let latest = app
        .services
        .exchange_rates
        .latest(&ctx(), "USD", "INR", None)
        .await
        .unwrap();
    assert_eq!(latest.rate, dec!(83.40));
    assert_eq!(latest.base_currency, "USD");

    let earlier = app
        .services
        .exchange_rates
        .latest(&ctx(), "usd", "inr", Some(at(2024, 4, 3, 0)))
        .await
        .unwrap();
    assert_eq!(earlier.rate, dec!(83.10));

    let none = app
        .services
        .exchange_rates
        .latest(&ctx(), "EUR", "INR", None)
        .await;
    assert!(matches!(none, Err(AppError::NotFound(_))));

    let filtered = app
        .services
        .exchange_rates
        .list(
            &ctx(),
            ExchangeRateFilter {
                base_currency: Some("usd".to_string()),
                quote_currency: None,
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(filtered.total_size, 2);
}

#[tokio::test]
async fn test_duplicate_quote_is_conflict() {
    let app = setup().await;
    app.services
        .exchange_rates
        .create(&ctx(), rate("USD", "INR", dec!(83), 1))
        .await
        .unwrap();

    let again = app
        .services
        .exchange_rates
        .create(&ctx(), rate("USD", "INR", dec!(84), 1))
        .await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let same_pair = app
        .services
        .exchange_rates
        .create(&ctx(), rate("USD", "USD", dec!(1), 2))
        .await;
    assert!(matches!(same_pair, Err(AppError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_audit_list_is_newest_first_and_filterable() {
    let app = setup().await;
    let user = Uuid::now_v7();
    for (action, day) in [("account.create", 1), ("invoice.update", 3), ("account.update", 2)] {
        app.services
            .audit
            .record(
                &ctx(),
                AuditEventInput {
                    user_id: user,
                    action: action.to_string(),
                    resource_type: Some(action.split('.').next().unwrap_or_default().to_string()),
                    resource_id: None,
                    details: Some(json!({ "day": day })),
                    occurred_at: Some(at(2024, 5, day, 8)),
                },
            )
            .await
            .unwrap();
    }

    let all = app.services.audit.list(&ctx(), Page::default()).await.unwrap();
    assert_eq!(all.total_size, 3);
    let stamps: Vec<_> = all.items.iter().map(|e| e.occurred_at).collect();
    let mut sorted = stamps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(stamps, sorted);
    assert_eq!(all.items[0].action, "invoice.update");

    let accounts_only = app
        .services
        .audit
        .filter(
            &ctx(),
            &AuditFilter {
                resource_type: Some("account".to_string()),
                ..AuditFilter::default()
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(accounts_only.total_size, 2);

    let window = app
        .services
        .audit
        .filter(
            &ctx(),
            &AuditFilter {
                from: Some(at(2024, 5, 2, 0)),
                to: Some(at(2024, 5, 2, 23)),
                ..AuditFilter::default()
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(window.items.len(), 1);
    assert_eq!(window.items[0].action, "account.update");

    let inverted = app
        .services
        .audit
        .filter(
            &ctx(),
            &AuditFilter {
                from: Some(at(2024, 5, 3, 0)),
                to: Some(at(2024, 5, 1, 0)),
                ..AuditFilter::default()
            },
            Page::default(),
        )
        .await;
    assert!(matches!(inverted, Err(AppError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_audit_requires_user_and_action() {
    let app = setup().await;
    let result = app
        .services
        .audit
        .record(
            &ctx(),
            AuditEventInput {
                user_id: Uuid::nil(),
                action: "login".to_string(),
                resource_type: None,
                resource_id: None,
                details: None,
                occurred_at: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_finance_events_listed_per_organization() {
    let app = setup().await;
    let org = Uuid::now_v7();
    let input = |amount: Decimal| FinanceEventInput {
        organization_id: org,
        reference_id: None,
        amount: Some(amount),
        currency: Some("INR".to_string()),
        payload: json!({ "source": "payroll-run" }),
        occurred_at: None,
    };

    app.services
        .finance_events
        .record_payroll_posted(&ctx(), input(dec!(250000)))
        .await
        .unwrap();
    app.services
        .finance_events
        .record_vendor_bill_approved(&ctx(), input(dec!(12000)))
        .await
        .unwrap();
    app.services
        .finance_events
        .record_inventory_cost_posted(
            &ctx(),
            FinanceEventInput {
                organization_id: Uuid::now_v7(),
                ..input(dec!(1))
            },
        )
        .await
        .unwrap();

    let all = app
        .services
        .finance_events
        .list_by_organization(&ctx(), org, None, Page::default())
        .await
        .unwrap();
    assert_eq!(all.total_size, 2);

    let payroll = app
        .services
        .finance_events
        .list_by_organization(&ctx(), org, Some(FinanceEventType::PayrollPosted), Page::default())
        .await
        .unwrap();
    assert_eq!(payroll.items.len(), 1);
    assert_eq!(payroll.items[0].amount, Some(dec!(250000)));

    assert_eq!(
        app.transport.keys(Topic::FinanceEvents),
        vec!["payroll.posted", "vendor_bill.approved", "inventory_cost.posted"]
    );

    let nil_org = app
        .services
        .finance_events
        .record_payroll_posted(
            &ctx(),
            FinanceEventInput {
                organization_id: Uuid::nil(),
                ..input(dec!(1))
            },
        )
        .await;
    assert!(matches!(nil_org, Err(AppError::InvalidArgument(_))));
}

#[tokio::test]
async fn test_trial_balance_over_posted_journals() {
    let app = setup().await;
    let cash = account(&app, "1001", AccountType::Asset, true).await;
    let sales = account(&app, "4001", AccountType::Revenue, true).await;
    account(&app, "5001", AccountType::Expense, true).await;

    for amount in ["300", "200"] {
        app.services
            .journals
            .create(
                &ctx(),
                JournalInput {
                    journal_date: Some(at(2024, 1, 20, 10)),
                    reference: None,
                    memo: Some("Sale".to_string()),
                    source_type: None,
                    source_id: None,
                    lines: vec![
                        LineInput {
                            account_id: cash.id,
                            side: Side::Debit,
                            amount: amount.to_string(),
                            cost_center_id: None,
                            description: None,
                        },
                        LineInput {
                            account_id: sales.id,
                            side: Side::Credit,
                            amount: amount.to_string(),
                            cost_center_id: None,
                            description: None,
                        },
                    ],
                },
            )
            .await
            .unwrap();
    }

    let report = app.services.reports.trial_balance(&ctx()).await.unwrap();
    assert!(report.totals.is_balanced);
    assert_eq!(report.totals.total_debit, dec!(500));
    let codes: Vec<_> = report.accounts.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, vec!["1001", "4001", "5001"]);
    assert_eq!(report.accounts[0].balance, dec!(500));
    assert_eq!(report.accounts[1].balance, dec!(500));
    assert_eq!(report.accounts[2].balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_expense_summary_groups_by_category() {
    let app = setup().await;
    let center = cost_center(&app, "CC-OPS").await;
    let mut travel = expense("Flight", Some("Travel"), dec!(1200));
    travel.cost_center_id = Some(center.id);
    let stored = app.services.expenses.create(&ctx(), travel).await.unwrap();
    assert_eq!(stored.currency, "INR");

    app.services
        .expenses
        .create(&ctx(), expense("Hotel", Some("Travel"), dec!(800)))
        .await
        .unwrap();
    app.services
        .expenses
        .create(&ctx(), expense("Pens", None, dec!(50)))
        .await
        .unwrap();

    let report = app
        .services
        .reports
        .expense_summary(&ctx(), &ExpenseFilter::default())
        .await
        .unwrap();
    assert_eq!(report.expense_count, 3);
    assert_eq!(report.grand_total, dec!(2050));
    let travel_total = report
        .categories
        .iter()
        .find(|c| c.category == "Travel")
        .unwrap();
    assert_eq!(travel_total.count, 2);
    assert_eq!(travel_total.total, dec!(2000));

    let by_center = app
        .services
        .expenses
        .list(
            &ctx(),
            &ExpenseFilter {
                cost_center_id: Some(center.id),
                ..ExpenseFilter::default()
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_center.total_size, 1);
}

#[tokio::test]
async fn test_expense_with_unknown_cost_center_is_rejected() {
    let app = setup().await;
    let mut input = expense("Taxi", Some("Travel"), dec!(20));
    input.cost_center_id = Some(Uuid::now_v7());

    let result = app.services.expenses.create(&ctx(), input).await;
    assert!(matches!(result, Err(AppError::FailedPrecondition(_))));
}

#[tokio::test]
async fn test_accrual_requires_existing_account_and_ordered_dates() {
    let app = setup().await;
    let payable = account(&app, "2200", AccountType::Liability, true).await;
    let input = AccrualInput {
        description: "March utilities".to_string(),
        account_id: payable.id,
        amount: dec!(4500),
        accrual_date: at(2024, 3, 31, 0),
        reversal_date: Some(at(2024, 4, 1, 0)),
        status: AccrualStatus::Open,
    };

    let accrual = app.services.accruals.create(&ctx(), input.clone()).await.unwrap();
    let reversed = app
        .services
        .accruals
        .update(
            &ctx(),
            accrual.id,
            accrual.revision,
            AccrualInput {
                status: AccrualStatus::Reversed,
                ..input.clone()
            },
        )
        .await
        .unwrap();
    assert_eq!(reversed.status, AccrualStatus::Reversed);

    let open = app
        .services
        .accruals
        .list(&ctx(), Some(AccrualStatus::Open), Page::default())
        .await
        .unwrap();
    assert_eq!(open.total_size, 0);

    let backwards = app
        .services
        .accruals
        .create(
            &ctx(),
            AccrualInput {
                reversal_date: Some(at(2024, 3, 1, 0)),
                ..input.clone()
            },
        )
        .await;
    assert!(matches!(backwards, Err(AppError::InvalidArgument(_))));

    let orphan = app
        .services
        .accruals
        .create(
            &ctx(),
            AccrualInput {
                account_id: Uuid::now_v7(),
                ..input
            },
        )
        .await;
    assert!(matches!(orphan, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_cash_flow_and_consolidation_validate_periods() {
    let app = setup().await;
    let org = Uuid::now_v7();
    let forecast = app
        .services
        .cash_flow
        .create(
            &ctx(),
            CashFlowForecastInput {
                organization_id: org,
                period_start: at(2024, 4, 1, 0),
                period_end: at(2024, 6, 30, 0),
                currency: "inr".to_string(),
                opening_balance: dec!(100000),
                projected_inflow: dec!(50000),
                projected_outflow: dec!(30000),
                detail: json!({ "weeks": 13 }),
            },
        )
        .await
        .unwrap();
    assert_eq!(forecast.currency, "INR");

    let listed = app
        .services
        .cash_flow
        .list(&ctx(), Some(org), Page::default())
        .await
        .unwrap();
    assert_eq!(listed.total_size, 1);

    let inverted = app
        .services
        .consolidations
        .create(
            &ctx(),
            ConsolidationInput {
                name: "Group Q1".to_string(),
                entity_ids: vec![Uuid::now_v7(), Uuid::now_v7()],
                period_start: at(2024, 3, 31, 0),
                period_end: at(2024, 1, 1, 0),
                report: json!({}),
            },
        )
        .await;
    assert!(matches!(inverted, Err(AppError::InvalidArgument(_))));

    let consolidation = app
        .services
        .consolidations
        .create(
            &ctx(),
            ConsolidationInput {
                name: "Group Q1".to_string(),
                entity_ids: vec![Uuid::now_v7(), Uuid::now_v7()],
                period_start: at(2024, 1, 1, 0),
                period_end: at(2024, 3, 31, 0),
                report: json!({ "revenue": "1000" }),
            },
        )
        .await
        .unwrap();
    assert_eq!(consolidation.revision, 1);
    assert_eq!(
        app.transport.keys(Topic::Consolidations),
        vec!["consolidation.created"]
    );
}
