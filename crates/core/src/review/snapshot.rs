use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::data::{BalanceSheet, FinancialData, MonthlyFlow};
use crate::money::Money;
use crate::period::WeekRange;
use crate::transaction::{total_in_range, Transaction, TransactionType};

/// Financial position captured for one week. Never recomputed once stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySnapshot {
    pub net_worth: Money,
    pub total_assets: Money,
    pub total_liabilities: Money,
    pub monthly_income: Money,
    pub monthly_expenses: Money,
    pub cash_flow: Money,
    pub credit_utilization_pct: Decimal,
    pub savings_balance: Money,
    pub weekly_spending: Money,
    pub weekly_income: Money,
}

/// Aggregates `data` for `week`. Month-to-date figures are taken as of `as_of`.
pub fn compute_snapshot(week: WeekRange, as_of: NaiveDate, data: &FinancialData) -> WeeklySnapshot {
    let sheet = BalanceSheet::from_data(data);
    let flow = MonthlyFlow::month_to_date(as_of, data);
    let range = week.as_range();

    WeeklySnapshot {
        net_worth: sheet.net_worth(),
        total_assets: sheet.total_assets,
        total_liabilities: sheet.total_liabilities,
        monthly_income: flow.income,
        monthly_expenses: flow.expenses,
        cash_flow: flow.cash_flow(),
        credit_utilization_pct: sheet.credit_utilization_pct,
        savings_balance: sheet.savings_balance,
        weekly_spending: total_in_range(&data.transactions, TransactionType::Debit, range),
        weekly_income: total_in_range(&data.transactions, TransactionType::Credit, range),
    }
}

/// Category with the largest debit total inside `week`; ties go to the
/// alphabetically first category.
pub fn top_spending_category(transactions: &[Transaction], week: WeekRange) -> Option<String> {
    let mut totals: BTreeMap<&str, Money> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.is_debit() && week.contains(t.date)) {
        *totals.entry(tx.category_or_default()).or_default() += tx.amount;
    }

    let mut best: Option<(&str, Money)> = None;
    for (category, total) in totals {
        match best {
            Some((_, top)) if total <= top => {}
            _ => best = Some((category, total)),
        }
    }
    best.map(|(category, _)| category.to_string())
}
