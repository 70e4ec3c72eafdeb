use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::account::{require_name, require_non_negative, LedgerError};
use super::money::{percent_of, Money};

const DAYS_PER_MONTH: i64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: Option<i64>,
    pub title: String,
    pub goal_type: String,
    pub target_amount: Money,
    pub current_amount: Money,
    pub target_date: Option<NaiveDate>,
    /// Start of the pace calculation.
    pub created_on: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
}

impl Goal {
    pub fn progress_pct(&self) -> Decimal {
        percent_of(self.current_amount.amount(), self.target_amount.amount())
            .unwrap_or(Decimal::ZERO)
    }

    pub fn is_funded(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    pub fn remaining(&self) -> Money {
        let remaining = self.target_amount - self.current_amount;
        if remaining.is_negative() {
            Money::zero()
        } else {
            remaining
        }
    }

    pub fn forecast(&self, as_of: NaiveDate, pace_tolerance: Decimal) -> Option<GoalForecast> {
        GoalForecast::compute(self, as_of, pace_tolerance)
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        require_name("goal title", &self.title)?;
        require_non_negative(self.target_amount)?;
        require_non_negative(self.current_amount)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalForecast {
    pub on_track: bool,
    pub progress_pct: Decimal,
    pub expected_progress_pct: Decimal,
    pub monthly_needed: Money,
    pub days_remaining: i64,
}

impl GoalForecast {
    /// `None` for goals without a target date or with a zero target.
    ///
    /// A goal is on track when its progress is at least `pace_tolerance` times
    /// the progress expected from a straight line between `created_on` and the
    /// target date.
    pub fn compute(goal: &Goal, as_of: NaiveDate, pace_tolerance: Decimal) -> Option<Self> {
        let target_date = goal.target_date?;
        if goal.target_amount.is_zero() {
            return None;
        }

        let days_left = (target_date - as_of).num_days();
        let months_left =
            (Decimal::from(days_left) / Decimal::from(DAYS_PER_MONTH)).max(Decimal::ONE);
        let monthly_needed = Money::from_decimal(goal.remaining().amount() / months_left);

        let total_days = (target_date - goal.created_on).num_days();
        let expected_progress_pct = if total_days > 0 {
            (Decimal::from(total_days - days_left) / Decimal::from(total_days)
                * Decimal::ONE_HUNDRED)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        } else {
            Decimal::ZERO
        };

        let progress_pct = goal.progress_pct();
        Some(GoalForecast {
            on_track: progress_pct >= expected_progress_pct * pace_tolerance,
            progress_pct,
            expected_progress_pct,
            monthly_needed,
            days_remaining: days_left,
        })
    }
}

/// Still unfunded, not yet due, and progressing slower than its pace allows.
pub fn is_behind_pace(goal: &Goal, forecast: &GoalForecast) -> bool {
    !goal.is_funded() && forecast.days_remaining > 0 && !forecast.on_track
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal(target: i64, current: i64, target_date: Option<NaiveDate>) -> Goal {
        Goal {
            id: None,
            title: "Vacation".to_string(),
            goal_type: "savings".to_string(),
            target_amount: Money::from_cents(target * 100),
            current_amount: Money::from_cents(current * 100),
            target_date,
            created_on: date(2026, 1, 1),
            created_at: None,
        }
    }

    fn tolerance() -> Decimal {
        Decimal::from_str("0.8").unwrap()
    }

    #[test]
    fn no_forecast_without_target_date() {
        assert_eq!(goal(1000, 0, None).forecast(date(2026, 7, 1), tolerance()), None);
    }

    #[test]
    fn no_forecast_for_zero_target() {
        let g = goal(0, 0, Some(date(2026, 12, 31)));
        assert_eq!(g.forecast(date(2026, 7, 1), tolerance()), None);
    }

    #[test]
    fn behind_pace_goal() {
        let g = goal(12000, 1000, Some(date(2026, 12, 31)));
        let f = g.forecast(date(2026, 7, 1), tolerance()).unwrap();
        assert_eq!(f.days_remaining, 183);
        // 11000 remaining over 183 / 30 = 6.1 months.
        assert_eq!(f.monthly_needed, Money::from_cents(180328));
        assert!(!f.on_track);
        assert!(is_behind_pace(&g, &f));
    }

    #[test]
    fn on_pace_goal() {
        let g = goal(12000, 6000, Some(date(2026, 12, 31)));
        let f = g.forecast(date(2026, 7, 1), tolerance()).unwrap();
        assert!(f.on_track);
        assert!(!is_behind_pace(&g, &f));
    }

    #[test]
    fn overdue_goal_is_not_behind_pace() {
        let g = goal(12000, 1000, Some(date(2026, 6, 30)));
        let f = g.forecast(date(2026, 7, 1), tolerance()).unwrap();
        assert!(f.days_remaining < 0);
        assert!(!is_behind_pace(&g, &f));
        // At least one month is assumed, so the whole remainder is due now.
        assert_eq!(f.monthly_needed, Money::from_cents(1_100_000));
    }

    #[test]
    fn funded_goal_needs_nothing() {
        let g = goal(1000, 1500, Some(date(2026, 12, 31)));
        let f = g.forecast(date(2026, 7, 1), tolerance()).unwrap();
        assert_eq!(f.monthly_needed, Money::zero());
        assert!(!is_behind_pace(&g, &f));
        assert_eq!(g.progress_pct(), Decimal::from(150));
    }
}
