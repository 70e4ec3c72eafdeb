use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::snapshot::WeeklySnapshot;
use super::ReviewError;
use crate::config::ReviewThresholds;
use crate::credit_card::CreditCard;
use crate::goal::{is_behind_pace, Goal};
use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PayCreditCard,
    FundGoal,
    ReduceSpending,
    BuildEmergencyFund,
    ReviewTransactions,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::PayCreditCard => "pay_credit_card",
            ActionKind::FundGoal => "fund_goal",
            ActionKind::ReduceSpending => "reduce_spending",
            ActionKind::BuildEmergencyFund => "build_emergency_fund",
            ActionKind::ReviewTransactions => "review_transactions",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pay_credit_card" => Ok(ActionKind::PayCreditCard),
            "fund_goal" => Ok(ActionKind::FundGoal),
            "reduce_spending" => Ok(ActionKind::ReduceSpending),
            "build_emergency_fund" => Ok(ActionKind::BuildEmergencyFund),
            "review_transactions" => Ok(ActionKind::ReviewTransactions),
            other => Err(ReviewError::UnknownValue {
                kind: "action type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Completed,
    Skipped,
}

impl ActionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Completed => "completed",
            ActionStatus::Skipped => "skipped",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ActionStatus::Pending)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionStatus {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ActionStatus::Pending),
            "completed" => Ok(ActionStatus::Completed),
            "skipped" => Ok(ActionStatus::Skipped),
            other => Err(ReviewError::UnknownValue {
                kind: "action status",
                value: other.to_string(),
            }),
        }
    }
}

/// The one thing the user is asked to do this week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub title: String,
    pub detail: Option<String>,
    pub target_amount: Option<Money>,
    pub target_name: Option<String>,
    pub status: ActionStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl WeeklyAction {
    /// Moves a pending action to `status`. Completed and skipped are final.
    pub fn resolve(&mut self, status: ActionStatus, at: DateTime<Utc>) -> Result<(), ReviewError> {
        if self.status.is_terminal() {
            return Err(ReviewError::AlreadyResolved(self.status));
        }
        if !status.is_terminal() {
            return Err(ReviewError::InvalidTransition);
        }
        self.status = status;
        self.completed_at = Some(at);
        Ok(())
    }
}

/// Outcome of the rule chain, one variant per action kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recommendation {
    PayCreditCard {
        card: String,
        utilization_pct: Decimal,
        target_pct: Decimal,
        amount: Money,
    },
    FundGoal {
        goal: String,
        monthly_needed: Money,
        remaining: Money,
        days_left: i64,
    },
    ReduceSpending {
        category: Option<String>,
        spent: Money,
        baseline: Money,
        amount: Money,
    },
    BuildEmergencyFund {
        months_covered: Decimal,
        target_months: Decimal,
        amount: Money,
    },
    ReviewTransactions,
}

impl Recommendation {
    pub fn kind(&self) -> ActionKind {
        match self {
            Recommendation::PayCreditCard { .. } => ActionKind::PayCreditCard,
            Recommendation::FundGoal { .. } => ActionKind::FundGoal,
            Recommendation::ReduceSpending { .. } => ActionKind::ReduceSpending,
            Recommendation::BuildEmergencyFund { .. } => ActionKind::BuildEmergencyFund,
            Recommendation::ReviewTransactions => ActionKind::ReviewTransactions,
        }
    }

    pub fn target_amount(&self) -> Option<Money> {
        match self {
            Recommendation::PayCreditCard { amount, .. }
            | Recommendation::ReduceSpending { amount, .. }
            | Recommendation::BuildEmergencyFund { amount, .. } => Some(*amount),
            Recommendation::FundGoal { monthly_needed, .. } => Some(*monthly_needed),
            Recommendation::ReviewTransactions => None,
        }
    }

    /// Renders the recommendation as a pending action.
    pub fn into_action(self) -> WeeklyAction {
        let kind = self.kind();
        let target_amount = self.target_amount();
        let (title, detail, target_name) = match self {
            Recommendation::PayCreditCard {
                card,
                utilization_pct,
                target_pct,
                amount,
            } => (
                format!("Pay down {} on {card}", amount.to_whole_dollars()),
                format!(
                    "Utilization on {card} is {}%, above the recommended {}%. \
                     Paying it down will improve your credit score.",
                    whole(utilization_pct),
                    whole(target_pct),
                ),
                Some(card),
            ),
            Recommendation::FundGoal {
                goal,
                monthly_needed,
                remaining,
                days_left,
            } => (
                format!("Add {} to {goal}", monthly_needed.to_whole_dollars()),
                format!(
                    "{goal} is behind pace with {days_left} days left. You need {} more; \
                     {} a month gets you there.",
                    remaining.to_whole_dollars(),
                    monthly_needed.to_whole_dollars(),
                ),
                Some(goal),
            ),
            Recommendation::ReduceSpending {
                category,
                spent,
                baseline,
                amount,
            } => {
                let title = match &category {
                    Some(c) => format!("Cut back on {c} by {}", amount.to_whole_dollars()),
                    None => format!("Cut back spending by {}", amount.to_whole_dollars()),
                };
                let mut detail = format!(
                    "You spent {} this week against a recent average of {}.",
                    spent.to_whole_dollars(),
                    baseline.to_whole_dollars(),
                );
                if let Some(c) = &category {
                    detail.push_str(&format!(" {c} was your top category."));
                }
                (title, detail, category)
            }
            Recommendation::BuildEmergencyFund {
                months_covered,
                target_months,
                amount,
            } => (
                format!("Transfer {} to savings", amount.to_whole_dollars()),
                format!(
                    "Your savings cover {months_covered} months of expenses. \
                     Aim for at least {} months.",
                    whole(target_months),
                ),
                Some("Savings".to_string()),
            ),
            Recommendation::ReviewTransactions => (
                "Review this week's transactions".to_string(),
                "Take 5 minutes to review your spending and make sure everything looks right."
                    .to_string(),
                None,
            ),
        };

        WeeklyAction {
            kind,
            title,
            detail: Some(detail),
            target_amount,
            target_name,
            status: ActionStatus::Pending,
            completed_at: None,
        }
    }
}

/// Inputs beyond the snapshot that the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub as_of: NaiveDate,
    pub cards: &'a [CreditCard],
    pub goals: &'a [Goal],
    /// Weekly spending of earlier reviews, most recent first.
    pub recent_weekly_spending: &'a [Money],
    pub top_category: Option<&'a str>,
}

/// Picks exactly one recommendation. Rules are tried in priority order and
/// the first that applies wins; reviewing transactions is the fallback.
pub fn select_action(
    snapshot: &WeeklySnapshot,
    ctx: &ActionContext<'_>,
    thresholds: &ReviewThresholds,
) -> Recommendation {
    pay_down_card(ctx, thresholds)
        .or_else(|| fund_goal(ctx, thresholds))
        .or_else(|| reduce_spending(snapshot, ctx, thresholds))
        .or_else(|| build_emergency_fund(snapshot, thresholds))
        .unwrap_or(Recommendation::ReviewTransactions)
}

fn pay_down_card(ctx: &ActionContext<'_>, t: &ReviewThresholds) -> Option<Recommendation> {
    // First card wins ties.
    let worst = ctx.cards.iter().fold(None::<&CreditCard>, |best, card| match best {
        Some(b) if b.utilization_pct() >= card.utilization_pct() => Some(b),
        _ => Some(card),
    })?;

    let utilization_pct = worst.utilization_pct();
    if utilization_pct <= t.card_utilization_alert_pct {
        return None;
    }

    Some(Recommendation::PayCreditCard {
        card: worst.name.clone(),
        utilization_pct,
        target_pct: t.card_utilization_target_pct,
        amount: worst.paydown_to(t.card_utilization_target_pct),
    })
}

fn fund_goal(ctx: &ActionContext<'_>, t: &ReviewThresholds) -> Option<Recommendation> {
    ctx.goals
        .iter()
        .filter_map(|goal| {
            let forecast = goal.forecast(ctx.as_of, t.goal_pace_tolerance)?;
            is_behind_pace(goal, &forecast).then_some((goal, forecast))
        })
        .min_by_key(|(goal, _)| goal.target_date)
        .map(|(goal, forecast)| Recommendation::FundGoal {
            goal: goal.title.clone(),
            monthly_needed: forecast.monthly_needed,
            remaining: goal.remaining(),
            days_left: forecast.days_remaining,
        })
}

fn reduce_spending(
    snapshot: &WeeklySnapshot,
    ctx: &ActionContext<'_>,
    t: &ReviewThresholds,
) -> Option<Recommendation> {
    let window = ctx.recent_weekly_spending.len().min(t.spending_window_weeks);
    let baseline = Money::average(&ctx.recent_weekly_spending[..window])?;
    if !baseline.is_positive() {
        return None;
    }

    let ceiling = baseline.scale(Decimal::ONE + t.spending_spike_pct / Decimal::ONE_HUNDRED);
    if snapshot.weekly_spending <= ceiling {
        return None;
    }

    Some(Recommendation::ReduceSpending {
        category: ctx.top_category.map(str::to_string),
        spent: snapshot.weekly_spending,
        baseline,
        amount: snapshot.weekly_spending - baseline,
    })
}

fn build_emergency_fund(snapshot: &WeeklySnapshot, t: &ReviewThresholds) -> Option<Recommendation> {
    let monthly = snapshot.monthly_expenses;
    if !monthly.is_positive() {
        return None;
    }

    let cushion = monthly.scale(t.emergency_fund_months);
    if snapshot.savings_balance >= cushion {
        return None;
    }

    let shortfall = cushion - snapshot.savings_balance;
    let transfer = monthly.scale(t.emergency_transfer_pct / Decimal::ONE_HUNDRED);
    let months_covered = (snapshot.savings_balance.amount() / monthly.amount())
        .max(Decimal::ZERO)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

    Some(Recommendation::BuildEmergencyFund {
        months_covered,
        target_months: t.emergency_fund_months,
        amount: transfer.min(shortfall),
    })
}

fn whole(pct: Decimal) -> Decimal {
    pct.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
