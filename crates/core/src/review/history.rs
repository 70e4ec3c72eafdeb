use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::action::ActionStatus;
use super::WeeklyReview;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyReviewHistory {
    /// Newest first.
    pub reviews: Vec<WeeklyReview>,
    /// Weekly action completion rate, in percent.
    pub wacr: Decimal,
    pub current_streak: usize,
    pub total_completed: usize,
    pub total_reviews: usize,
}

pub fn aggregate_history(mut reviews: Vec<WeeklyReview>) -> WeeklyReviewHistory {
    reviews.sort_by(|a, b| b.week_start.cmp(&a.week_start));

    let total_reviews = reviews.len();
    let total_completed = reviews
        .iter()
        .filter(|r| r.action.status == ActionStatus::Completed)
        .count();
    let current_streak = reviews
        .iter()
        .take_while(|r| r.action.status == ActionStatus::Completed)
        .count();

    let wacr = if total_reviews == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(total_completed as u64) / Decimal::from(total_reviews as u64)
            * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
    };

    WeeklyReviewHistory {
        reviews,
        wacr,
        current_streak,
        total_completed,
        total_reviews,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::WeekRange;
    use crate::review::action::Recommendation;
    use crate::review::snapshot::compute_snapshot;
    use crate::FinancialData;
    use chrono::{Days, NaiveDate};
    use std::str::FromStr;

    fn review(weeks_ago: u64, status: ActionStatus) -> WeeklyReview {
        let today = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let week = WeekRange::containing(today - Days::new(7 * weeks_ago));
        let mut action = Recommendation::ReviewTransactions.into_action();
        action.status = status;
        WeeklyReview {
            id: None,
            week_start: week.start,
            week_end: week.end,
            snapshot: compute_snapshot(week, week.end, &FinancialData::default()),
            changes: None,
            action,
            created_at: None,
        }
    }

    #[test]
    fn empty_history() {
        let h = aggregate_history(vec![]);
        assert_eq!(h.wacr, Decimal::ZERO);
        assert_eq!(h.current_streak, 0);
        assert_eq!(h.total_completed, 0);
        assert_eq!(h.total_reviews, 0);
        assert!(h.reviews.is_empty());
    }

    #[test]
    fn orders_newest_first_and_counts_streak() {
        // Supplied oldest first.
        let h = aggregate_history(vec![
            review(3, ActionStatus::Skipped),
            review(2, ActionStatus::Completed),
            review(1, ActionStatus::Completed),
            review(0, ActionStatus::Completed),
        ]);
        assert!(h.reviews[0].week_start > h.reviews[1].week_start);
        assert_eq!(h.current_streak, 3);
        assert_eq!(h.total_completed, 3);
        assert_eq!(h.total_reviews, 4);
        assert_eq!(h.wacr, Decimal::from(75));
    }

    #[test]
    fn pending_latest_review_breaks_streak() {
        let h = aggregate_history(vec![
            review(0, ActionStatus::Pending),
            review(1, ActionStatus::Completed),
            review(2, ActionStatus::Completed),
        ]);
        assert_eq!(h.current_streak, 0);
        assert_eq!(h.total_completed, 2);
    }

    #[test]
    fn skipped_latest_review_breaks_streak() {
        let h = aggregate_history(vec![
            review(1, ActionStatus::Completed),
            review(0, ActionStatus::Skipped),
        ]);
        assert_eq!(h.current_streak, 0);
    }

    #[test]
    fn wacr_rounds_to_one_decimal() {
        let h = aggregate_history(vec![
            review(0, ActionStatus::Completed),
            review(1, ActionStatus::Skipped),
            review(2, ActionStatus::Pending),
        ]);
        assert_eq!(h.wacr, Decimal::from_str("33.3").unwrap());
    }
}
