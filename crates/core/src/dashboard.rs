use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::data::{BalanceSheet, FinancialData, MonthlyFlow};
use crate::goal::{Goal, GoalForecast};
use crate::money::Money;
use crate::transaction::Transaction;

const RECENT_TRANSACTIONS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpcomingBill {
    pub category: String,
    pub description: Option<String>,
    pub amount: Money,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSummary {
    pub id: Option<i64>,
    pub title: String,
    pub goal_type: String,
    pub target_amount: Money,
    pub current_amount: Money,
    pub progress_pct: Decimal,
    pub target_date: Option<NaiveDate>,
    pub forecast: Option<GoalForecast>,
}

impl GoalSummary {
    pub fn new(goal: &Goal, as_of: NaiveDate, pace_tolerance: Decimal) -> Self {
        GoalSummary {
            id: goal.id,
            title: goal.title.clone(),
            goal_type: goal.goal_type.clone(),
            target_amount: goal.target_amount,
            current_amount: goal.current_amount,
            progress_pct: goal.progress_pct(),
            target_date: goal.target_date,
            forecast: goal.forecast(as_of, pace_tolerance),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub as_of: NaiveDate,
    pub net_worth: Money,
    pub total_assets: Money,
    pub total_liabilities: Money,
    pub monthly_income: Money,
    pub monthly_expenses: Money,
    pub cash_flow: Money,
    pub credit_utilization_pct: Decimal,
    pub savings_balance: Money,
    pub upcoming_bills: Vec<UpcomingBill>,
    pub goals_summary: Vec<GoalSummary>,
    pub recent_transactions: Vec<Transaction>,
}

pub fn build_dashboard(
    as_of: NaiveDate,
    data: &FinancialData,
    upcoming_bill_days: u32,
    pace_tolerance: Decimal,
) -> DashboardSummary {
    let sheet = BalanceSheet::from_data(data);
    let flow = MonthlyFlow::month_to_date(as_of, data);

    let horizon = as_of + Days::new(u64::from(upcoming_bill_days));
    let mut upcoming_bills: Vec<UpcomingBill> = data
        .expenses
        .iter()
        .filter(|e| e.is_recurring)
        .filter_map(|e| {
            let due = e.next_due_date?;
            (due >= as_of && due <= horizon).then(|| UpcomingBill {
                category: e.category.clone(),
                description: e.description.clone(),
                amount: e.amount,
                due_date: due,
            })
        })
        .collect();
    upcoming_bills.sort_by_key(|b| b.due_date);

    let goals_summary = data
        .goals
        .iter()
        .map(|g| GoalSummary::new(g, as_of, pace_tolerance))
        .collect();

    let mut recent_transactions = data.transactions.clone();
    recent_transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    recent_transactions.truncate(RECENT_TRANSACTIONS);

    DashboardSummary {
        as_of,
        net_worth: sheet.net_worth(),
        total_assets: sheet.total_assets,
        total_liabilities: sheet.total_liabilities,
        monthly_income: flow.income,
        monthly_expenses: flow.expenses,
        cash_flow: flow.cash_flow(),
        credit_utilization_pct: sheet.credit_utilization_pct,
        savings_balance: sheet.savings_balance,
        upcoming_bills,
        goals_summary,
        recent_transactions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountId;
    use crate::expense::{Expense, Frequency};
    use crate::transaction::TransactionType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bill(category: &str, due: Option<NaiveDate>, recurring: bool) -> Expense {
        Expense {
            id: None,
            category: category.to_string(),
            description: None,
            amount: Money::from_cents(5000),
            is_recurring: recurring,
            frequency: Some(Frequency::Monthly),
            next_due_date: due,
            created_at: None,
        }
    }

    #[test]
    fn upcoming_bills_within_window_sorted() {
        let data = FinancialData {
            expenses: vec![
                bill("Internet", Some(date(2026, 11, 10)), true),
                bill("Phone", Some(date(2026, 10, 20)), true),
                bill("Insurance", Some(date(2026, 12, 1)), true),
                bill("Overdue", Some(date(2026, 10, 1)), true),
                bill("One-off", Some(date(2026, 10, 25)), false),
                bill("Undated", None, true),
            ],
            ..FinancialData::default()
        };
        let dash = build_dashboard(date(2026, 10, 17), &data, 30, Decimal::new(8, 1));
        let names: Vec<&str> = dash.upcoming_bills.iter().map(|b| b.category.as_str()).collect();
        assert_eq!(names, ["Phone", "Internet"]);
    }

    #[test]
    fn recent_transactions_newest_first_capped() {
        let transactions = (1..=15)
            .map(|day| Transaction {
                id: Some(i64::from(day)),
                account_id: AccountId(1),
                amount: Money::from_cents(100),
                transaction_type: TransactionType::Debit,
                category: None,
                description: None,
                date: date(2026, 10, day),
                created_at: None,
            })
            .collect();
        let data = FinancialData {
            transactions,
            ..FinancialData::default()
        };
        let dash = build_dashboard(date(2026, 10, 17), &data, 30, Decimal::new(8, 1));
        assert_eq!(dash.recent_transactions.len(), 10);
        assert_eq!(dash.recent_transactions[0].date, date(2026, 10, 15));
        assert_eq!(dash.recent_transactions[9].date, date(2026, 10, 6));
    }
}
