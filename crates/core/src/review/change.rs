use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::snapshot::WeeklySnapshot;
use crate::money::{percent_of, Money};

/// A positive `absolute` always means the metric went up, whether or not
/// that is good news.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricChange {
    pub absolute: Decimal,
    /// `None` when the previous value was zero.
    pub pct: Option<Decimal>,
}

impl MetricChange {
    pub fn between(current: Decimal, previous: Decimal) -> Self {
        let absolute = current - previous;
        MetricChange {
            absolute: absolute.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            pct: percent_of(absolute, previous.abs()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyChanges {
    pub net_worth_change: MetricChange,
    pub spending_change: MetricChange,
    pub income_change: MetricChange,
    pub savings_change: MetricChange,
    pub cash_flow_change: MetricChange,
    /// In percentage points.
    pub utilization_change: MetricChange,
}

/// Week-over-week deltas; `None` when there is no previous snapshot.
pub fn compute_changes(
    current: &WeeklySnapshot,
    previous: Option<&WeeklySnapshot>,
) -> Option<WeeklyChanges> {
    let previous = previous?;
    let money = |c: Money, p: Money| MetricChange::between(c.amount(), p.amount());

    Some(WeeklyChanges {
        net_worth_change: money(current.net_worth, previous.net_worth),
        spending_change: money(current.weekly_spending, previous.weekly_spending),
        income_change: money(current.weekly_income, previous.weekly_income),
        savings_change: money(current.savings_balance, previous.savings_balance),
        cash_flow_change: money(current.cash_flow, previous.cash_flow),
        utilization_change: MetricChange::between(
            current.credit_utilization_pct,
            previous.credit_utilization_pct,
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn snapshot(net_worth: i64, spending: i64, savings: i64) -> WeeklySnapshot {
        WeeklySnapshot {
            net_worth: Money::from_cents(net_worth * 100),
            total_assets: Money::zero(),
            total_liabilities: Money::zero(),
            monthly_income: Money::zero(),
            monthly_expenses: Money::zero(),
            cash_flow: Money::zero(),
            credit_utilization_pct: Decimal::ZERO,
            savings_balance: Money::from_cents(savings * 100),
            weekly_spending: Money::from_cents(spending * 100),
            weekly_income: Money::zero(),
        }
    }

    #[test]
    fn first_review_has_no_changes() {
        assert_eq!(compute_changes(&snapshot(1, 1, 1), None), None);
    }

    #[test]
    fn net_worth_growth() {
        let changes =
            compute_changes(&snapshot(100_000, 0, 0), Some(&snapshot(95_000, 0, 0))).unwrap();
        assert_eq!(changes.net_worth_change.absolute, dec("5000"));
        assert_eq!(changes.net_worth_change.pct, Some(dec("5.26")));
    }

    #[test]
    fn pct_is_none_exactly_when_previous_is_zero() {
        let changes = compute_changes(&snapshot(10, 250, 0), Some(&snapshot(0, 200, 0))).unwrap();
        assert_eq!(changes.net_worth_change.pct, None);
        assert_eq!(changes.net_worth_change.absolute, dec("10"));
        assert_eq!(changes.spending_change.pct, Some(dec("25")));
        assert_eq!(changes.savings_change.pct, None);
        assert_eq!(changes.utilization_change.pct, None);
    }

    #[test]
    fn negative_base_uses_magnitude() {
        // -1000 -> -500 is an increase of 50% of the magnitude.
        let change = MetricChange::between(dec("-500"), dec("-1000"));
        assert_eq!(change.absolute, dec("500"));
        assert_eq!(change.pct, Some(dec("50")));
    }

    #[test]
    fn decrease_is_negative() {
        let change = MetricChange::between(dec("150"), dec("200"));
        assert_eq!(change.absolute, dec("-50"));
        assert_eq!(change.pct, Some(dec("-25")));
    }
}
