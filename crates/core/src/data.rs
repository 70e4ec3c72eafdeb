use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::{Account, AccountType};
use crate::credit_card::{aggregate_utilization, CreditCard};
use crate::expense::{recurring_monthly_total, Expense};
use crate::goal::Goal;
use crate::investment::{InstallmentPlan, Investment};
use crate::money::Money;
use crate::period::DateRange;
use crate::transaction::{total_in_range, Transaction, TransactionType};

/// Everything the user has recorded, loaded up front for aggregation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialData {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub credit_cards: Vec<CreditCard>,
    pub investments: Vec<Investment>,
    pub expenses: Vec<Expense>,
    pub installment_plans: Vec<InstallmentPlan>,
    pub goals: Vec<Goal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub total_assets: Money,
    pub total_liabilities: Money,
    pub savings_balance: Money,
    pub credit_utilization_pct: Decimal,
}

impl BalanceSheet {
    pub fn from_data(data: &FinancialData) -> Self {
        let account_assets: Money = data
            .accounts
            .iter()
            .filter(|a| a.account_type.is_asset())
            .map(|a| a.balance)
            .sum();
        let account_debts: Money = data
            .accounts
            .iter()
            .filter(|a| a.account_type.is_liability())
            .map(|a| a.balance.abs())
            .sum();
        let investments: Money = data.investments.iter().map(|i| i.current_value).sum();
        let card_balances: Money = data.credit_cards.iter().map(|c| c.current_balance).sum();
        let installments: Money = data
            .installment_plans
            .iter()
            .map(InstallmentPlan::remaining_amount)
            .sum();

        BalanceSheet {
            total_assets: account_assets + investments,
            total_liabilities: account_debts + card_balances + installments,
            savings_balance: data
                .accounts
                .iter()
                .filter(|a| a.account_type == AccountType::Savings)
                .map(|a| a.balance)
                .sum(),
            credit_utilization_pct: aggregate_utilization(&data.credit_cards),
        }
    }

    pub fn net_worth(&self) -> Money {
        self.total_assets - self.total_liabilities
    }
}

/// Income and spending for the month containing `as_of`, up to `as_of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyFlow {
    pub income: Money,
    pub expenses: Money,
}

impl MonthlyFlow {
    pub fn month_to_date(as_of: NaiveDate, data: &FinancialData) -> Self {
        let month = DateRange::month_to_date(as_of);
        let income = total_in_range(&data.transactions, TransactionType::Credit, month);
        let spent = total_in_range(&data.transactions, TransactionType::Debit, month);
        MonthlyFlow {
            income,
            expenses: recurring_monthly_total(&data.expenses) + spent,
        }
    }

    pub fn cash_flow(&self) -> Money {
        self.income - self.expenses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountId;
    use crate::expense::Frequency;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dollars(n: i64) -> Money {
        Money::from_cents(n * 100)
    }

    fn tx(amount: i64, kind: TransactionType, d: NaiveDate) -> Transaction {
        Transaction {
            id: None,
            account_id: AccountId(1),
            amount: dollars(amount),
            transaction_type: kind,
            category: None,
            description: None,
            date: d,
            created_at: None,
        }
    }

    #[test]
    fn empty_data_is_all_zero() {
        let sheet = BalanceSheet::from_data(&FinancialData::default());
        assert_eq!(sheet.net_worth(), Money::zero());
        assert_eq!(sheet.credit_utilization_pct, Decimal::ZERO);

        let flow = MonthlyFlow::month_to_date(date(2026, 10, 17), &FinancialData::default());
        assert_eq!(flow.cash_flow(), Money::zero());
    }

    #[test]
    fn balance_sheet_classifies_accounts() {
        let data = FinancialData {
            accounts: vec![
                Account::new("Chequing", AccountType::Chequing, dollars(2000)),
                Account::new("Savings", AccountType::Savings, dollars(5000)),
                Account::new("Car loan", AccountType::Loan, dollars(8000)),
                Account::new("Gift cards", AccountType::Other, dollars(300)),
            ],
            credit_cards: vec![CreditCard::new("Visa", dollars(1000), dollars(400))],
            investments: vec![Investment {
                id: None,
                investment_type: "RRSP".to_string(),
                institution: None,
                current_value: dollars(10000),
                book_value: dollars(9000),
                monthly_contribution: Money::zero(),
                created_at: None,
            }],
            installment_plans: vec![InstallmentPlan {
                id: None,
                description: "Phone".to_string(),
                monthly_payment: dollars(50),
                remaining_payments: 6,
                created_at: None,
            }],
            ..FinancialData::default()
        };
        let sheet = BalanceSheet::from_data(&data);
        assert_eq!(sheet.total_assets, dollars(17000));
        assert_eq!(sheet.total_liabilities, dollars(8700));
        assert_eq!(sheet.savings_balance, dollars(5000));
        assert_eq!(sheet.net_worth(), dollars(8300));
        assert_eq!(sheet.credit_utilization_pct, Decimal::from(40));
    }

    #[test]
    fn monthly_flow_uses_month_to_date_and_recurring() {
        let data = FinancialData {
            transactions: vec![
                tx(3000, TransactionType::Credit, date(2026, 10, 1)),
                tx(200, TransactionType::Debit, date(2026, 10, 5)),
                tx(999, TransactionType::Debit, date(2026, 9, 30)),
                tx(50, TransactionType::Debit, date(2026, 10, 20)),
            ],
            expenses: vec![Expense {
                id: None,
                category: "Rent".to_string(),
                description: None,
                amount: dollars(1500),
                is_recurring: true,
                frequency: Some(Frequency::Monthly),
                next_due_date: None,
                created_at: None,
            }],
            ..FinancialData::default()
        };
        let flow = MonthlyFlow::month_to_date(date(2026, 10, 17), &data);
        assert_eq!(flow.income, dollars(3000));
        assert_eq!(flow.expenses, dollars(1700));
        assert_eq!(flow.cash_flow(), dollars(1300));
    }
}
