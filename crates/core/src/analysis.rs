//! Rule-based insights over a full financial snapshot: three insights, two
//! warnings and two recommendations, always in that shape.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::ReviewThresholds;
use crate::credit_card::CreditCard;
use crate::data::{BalanceSheet, FinancialData};
use crate::expense::recurring_monthly_total;
use crate::goal::Goal;
use crate::money::{percent_of, Money};

/// A goal this close to its date with less than half saved is flagged.
const GOAL_WARNING_DAYS: i64 = 180;
const GOAL_WARNING_PROGRESS_PCT: i64 = 50;
const GOALS_NAMED_IN_WARNING: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub priority: u8,
    pub category: String,
    pub message: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub severity: Level,
    pub category: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub action: String,
    pub impact: Level,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialInsights {
    pub snapshot_date: NaiveDate,
    pub insights: Vec<Insight>,
    pub warnings: Vec<Warning>,
    pub recommendations: Vec<Advice>,
    pub summary: String,
}

/// Figures shared by the individual rules.
struct Position {
    cash: Money,
    invested: Money,
    card_balance: Money,
    net_worth: Money,
    utilization_pct: Decimal,
    monthly_expenses: Money,
}

impl Position {
    fn new(data: &FinancialData) -> Self {
        let sheet = BalanceSheet::from_data(data);
        let invested: Money = data.investments.iter().map(|i| i.current_value).sum();
        Position {
            cash: sheet.total_assets - invested,
            invested,
            card_balance: data.credit_cards.iter().map(|c| c.current_balance).sum(),
            net_worth: sheet.net_worth(),
            utilization_pct: sheet.credit_utilization_pct,
            monthly_expenses: recurring_monthly_total(&data.expenses),
        }
    }

    /// Months the cash covers recurring expenses, at one decimal place.
    fn runway_months(&self) -> Option<Decimal> {
        if !self.monthly_expenses.is_positive() {
            return None;
        }
        Some(
            (self.cash.amount() / self.monthly_expenses.amount())
                .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

pub fn generate_insights(
    as_of: NaiveDate,
    data: &FinancialData,
    thresholds: &ReviewThresholds,
) -> FinancialInsights {
    let position = Position::new(data);
    let off_track = off_track_goals(&data.goals, as_of);

    FinancialInsights {
        snapshot_date: as_of,
        insights: vec![
            net_worth_insight(&position),
            runway_insight(&position),
            allocation_insight(&position),
        ],
        warnings: vec![
            utilization_warning(&position, thresholds),
            goal_warning(&data.goals, &off_track),
        ],
        recommendations: vec![
            credit_or_investing_advice(&position, data, thresholds),
            emergency_fund_advice(&position, thresholds),
        ],
        summary: summary(&position, data, &off_track, thresholds),
    }
}

fn net_worth_insight(position: &Position) -> Insight {
    Insight {
        priority: 1,
        category: "net_worth".to_string(),
        message: format!("Your current net worth is {}", position.net_worth),
        detail: format!(
            "Assets: {} | Card balances: {}",
            position.cash + position.invested,
            position.card_balance
        ),
    }
}

fn runway_insight(position: &Position) -> Insight {
    let (message, detail) = match position.runway_months() {
        Some(months) if position.cash.is_positive() => (
            format!("You have {months:.1} months of expense runway"),
            format!(
                "Based on {} in accounts and {}/mo in recurring expenses",
                position.cash, position.monthly_expenses
            ),
        ),
        _ => (
            "Add recurring expenses to track your savings runway".to_string(),
            "Expense data is needed to estimate how long savings will last".to_string(),
        ),
    };
    Insight {
        priority: 2,
        category: "savings".to_string(),
        message,
        detail,
    }
}

fn allocation_insight(position: &Position) -> Insight {
    let assets = position.cash + position.invested;
    let invested_pct =
        percent_of(position.invested.amount(), assets.amount()).unwrap_or(Decimal::ZERO);
    Insight {
        priority: 3,
        category: "investments".to_string(),
        message: format!("{invested_pct:.0}% of your assets are invested"),
        detail: format!(
            "{} in investments out of {} total assets",
            position.invested, assets
        ),
    }
}

fn utilization_warning(position: &Position, thresholds: &ReviewThresholds) -> Warning {
    let pct = position.utilization_pct;
    let (severity, message) = if pct > thresholds.card_utilization_alert_pct {
        (Level::High, format!("Credit utilization is {pct:.0}%, critically high"))
    } else if pct > thresholds.card_utilization_target_pct {
        (
            Level::Medium,
            format!(
                "Credit utilization is {pct:.0}%, above the recommended {:.0}%",
                thresholds.card_utilization_target_pct
            ),
        )
    } else {
        (Level::Low, format!("Credit utilization is healthy at {pct:.0}%"))
    };
    Warning {
        severity,
        category: "credit_utilization".to_string(),
        message,
    }
}

/// Dated goals under half funded with less than six months to go.
fn off_track_goals(goals: &[Goal], as_of: NaiveDate) -> Vec<&str> {
    goals
        .iter()
        .filter(|g| g.target_amount.is_positive())
        .filter(|g| {
            g.target_date.is_some_and(|date| {
                let days_left = (date - as_of).num_days();
                days_left > 0
                    && days_left < GOAL_WARNING_DAYS
                    && g.progress_pct() < Decimal::from(GOAL_WARNING_PROGRESS_PCT)
            })
        })
        .map(|g| g.title.as_str())
        .collect()
}

fn goal_warning(goals: &[Goal], off_track: &[&str]) -> Warning {
    let (severity, message) = if !off_track.is_empty() {
        let named: Vec<&str> = off_track.iter().take(GOALS_NAMED_IN_WARNING).copied().collect();
        (
            Level::Medium,
            format!(
                "{} goal(s) may be off track: {}",
                off_track.len(),
                named.join(", ")
            ),
        )
    } else if goals.is_empty() {
        (Level::Low, "No financial goals set yet".to_string())
    } else {
        (Level::Low, "All goals are on track".to_string())
    };
    Warning {
        severity,
        category: "goals".to_string(),
        message,
    }
}

fn credit_or_investing_advice(
    position: &Position,
    data: &FinancialData,
    thresholds: &ReviewThresholds,
) -> Advice {
    if position.utilization_pct > thresholds.card_utilization_target_pct {
        let card = data
            .credit_cards
            .iter()
            .max_by_key(|c| c.utilization_pct())
            .map_or("credit card", |c: &CreditCard| c.name.as_str());
        return Advice {
            action: format!("Pay down {card} balance"),
            impact: Level::High,
            detail: format!(
                "Reducing utilization from {:.0}% to under {:.0}% lowers interest and helps your credit score",
                position.utilization_pct, thresholds.card_utilization_target_pct
            ),
        };
    }
    if data.investments.is_empty() {
        return Advice {
            action: "Start investing in a TFSA or RRSP".to_string(),
            impact: Level::High,
            detail: "With low card utilization you are in a good position to start investing"
                .to_string(),
        };
    }
    Advice {
        action: "Increase monthly investment contributions".to_string(),
        impact: Level::Medium,
        detail: "Consider raising contributions to use your tax-advantaged room".to_string(),
    }
}

fn emergency_fund_advice(position: &Position, thresholds: &ReviewThresholds) -> Advice {
    let Some(months) = position.runway_months() else {
        return Advice {
            action: "Track your recurring expenses".to_string(),
            impact: Level::Medium,
            detail: "Expense data enables savings and investment recommendations".to_string(),
        };
    };
    if months < thresholds.emergency_fund_months {
        let target = position.monthly_expenses.scale(thresholds.emergency_fund_months);
        Advice {
            action: format!(
                "Build an emergency fund of {:.0} months of expenses",
                thresholds.emergency_fund_months
            ),
            impact: Level::High,
            detail: format!("You currently have {months:.1} months. Target: {target} minimum"),
        }
    } else {
        Advice {
            action: "Review expense categories for savings".to_string(),
            impact: Level::Medium,
            detail: "Your emergency fund is solid. Look for subscriptions you can cut".to_string(),
        }
    }
}

fn summary(
    position: &Position,
    data: &FinancialData,
    off_track: &[&str],
    thresholds: &ReviewThresholds,
) -> String {
    let mut parts = vec![format!("Net worth: {}.", position.net_worth)];
    if position.utilization_pct > thresholds.card_utilization_target_pct {
        parts.push(format!(
            "Credit utilization at {:.0}% needs attention.",
            position.utilization_pct
        ));
    }
    if !off_track.is_empty() {
        parts.push(format!("{} goal(s) may need adjustment.", off_track.len()));
    }
    parts.push(format!(
        "You have {} invested across {} account(s).",
        position.invested,
        data.investments.len()
    ));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, AccountType};
    use crate::expense::{Expense, Frequency};
    use crate::investment::Investment;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dollars(amount: i64) -> Money {
        Money::from_cents(amount * 100)
    }

    fn rent(amount: i64) -> Expense {
        Expense {
            id: None,
            category: "Rent".to_string(),
            description: None,
            amount: dollars(amount),
            is_recurring: true,
            frequency: Some(Frequency::Monthly),
            next_due_date: None,
            created_at: None,
        }
    }

    fn goal(title: &str, target: i64, saved: i64, target_date: NaiveDate) -> Goal {
        Goal {
            id: None,
            title: title.to_string(),
            goal_type: "savings".to_string(),
            target_amount: dollars(target),
            current_amount: dollars(saved),
            target_date: Some(target_date),
            created_on: date(2026, 1, 1),
            created_at: None,
        }
    }

    fn tfsa(value: i64) -> Investment {
        Investment {
            id: None,
            investment_type: "TFSA".to_string(),
            institution: None,
            current_value: dollars(value),
            book_value: dollars(value),
            monthly_contribution: Money::zero(),
            created_at: None,
        }
    }

    #[test]
    fn empty_data_still_yields_full_shape() {
        let data = FinancialData::default();
        let report = generate_insights(date(2026, 10, 14), &data, &ReviewThresholds::default());
        assert_eq!(report.insights.len(), 3);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.recommendations.len(), 2);
        assert_eq!(report.insights[1].message, "Add recurring expenses to track your savings runway");
        assert_eq!(report.warnings[0].severity, Level::Low);
        assert_eq!(report.warnings[1].message, "No financial goals set yet");
        assert_eq!(report.recommendations[0].action, "Start investing in a TFSA or RRSP");
        assert_eq!(report.recommendations[1].action, "Track your recurring expenses");
        assert_eq!(
            report.summary,
            "Net worth: $0.00. You have $0.00 invested across 0 account(s)."
        );
    }

    #[test]
    fn high_utilization_names_the_worst_card() {
        let data = FinancialData {
            credit_cards: vec![
                CreditCard::new("Amex", dollars(5000), dollars(1100)),
                CreditCard::new("Visa", dollars(1000), dollars(950)),
            ],
            ..FinancialData::default()
        };
        let report = generate_insights(date(2026, 10, 14), &data, &ReviewThresholds::default());

        assert_eq!(report.warnings[0].severity, Level::Medium);
        assert!(report.warnings[0].message.contains("34%"));
        assert_eq!(report.recommendations[0].action, "Pay down Visa balance");
        assert_eq!(report.recommendations[0].impact, Level::High);
        assert!(report.summary.contains("needs attention"));

        let maxed = FinancialData {
            credit_cards: vec![CreditCard::new("Visa", dollars(1000), dollars(900))],
            ..FinancialData::default()
        };
        let report = generate_insights(date(2026, 10, 14), &maxed, &ReviewThresholds::default());
        assert_eq!(report.warnings[0].severity, Level::High);
    }

    #[test]
    fn runway_and_allocation_use_cash_and_investments() {
        let data = FinancialData {
            accounts: vec![Account::new("Everyday", AccountType::Chequing, dollars(3000))],
            expenses: vec![rent(2000)],
            investments: vec![tfsa(1000)],
            ..FinancialData::default()
        };
        let report = generate_insights(date(2026, 10, 14), &data, &ReviewThresholds::default());

        assert_eq!(report.insights[0].message, "Your current net worth is $4000.00");
        assert_eq!(report.insights[1].message, "You have 1.5 months of expense runway");
        assert_eq!(report.insights[2].message, "25% of your assets are invested");
        assert_eq!(report.recommendations[0].action, "Increase monthly investment contributions");
        assert_eq!(report.recommendations[1].impact, Level::High);
        assert!(report.recommendations[1].detail.contains("$6000.00"));
    }

    #[test]
    fn goals_close_to_date_and_under_half_are_off_track() {
        let as_of = date(2026, 10, 14);
        let data = FinancialData {
            goals: vec![
                goal("Trip", 2000, 400, date(2027, 1, 14)),
                goal("Car", 10000, 9000, date(2027, 1, 14)),
                goal("House", 50000, 1000, date(2030, 1, 1)),
                goal("Missed", 1000, 0, date(2026, 9, 1)),
            ],
            ..FinancialData::default()
        };
        let report = generate_insights(as_of, &data, &ReviewThresholds::default());

        assert_eq!(report.warnings[1].severity, Level::Medium);
        assert_eq!(report.warnings[1].message, "1 goal(s) may be off track: Trip");
        assert!(report.summary.contains("1 goal(s) may need adjustment."));
    }

    #[test]
    fn solid_emergency_fund_suggests_trimming_expenses() {
        let data = FinancialData {
            accounts: vec![Account::new("Savings", AccountType::Savings, dollars(12000))],
            expenses: vec![rent(2000)],
            goals: vec![goal("Car", 10000, 9000, date(2027, 1, 14))],
            ..FinancialData::default()
        };
        let report = generate_insights(date(2026, 10, 14), &data, &ReviewThresholds::default());
        assert_eq!(report.recommendations[1].action, "Review expense categories for savings");
        assert_eq!(report.warnings[1].message, "All goals are on track");
    }
}
