//! Weekly review derivation: snapshot, week-over-week change, one recommended
//! action, and completion history.

pub mod action;
pub mod change;
pub mod history;
pub mod snapshot;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ReviewThresholds;
use crate::data::FinancialData;
use crate::money::Money;
use crate::period::WeekRange;

use action::{select_action, ActionContext, ActionStatus, WeeklyAction};
use change::{compute_changes, WeeklyChanges};
use snapshot::{compute_snapshot, top_spending_category, WeeklySnapshot};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReviewError {
    #[error("Action already {0}")]
    AlreadyResolved(ActionStatus),
    #[error("An action can only be completed or skipped")]
    InvalidTransition,
    #[error("Unknown {kind}: '{value}'")]
    UnknownValue { kind: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyReview {
    pub id: Option<i64>,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub snapshot: WeeklySnapshot,
    /// `None` for the first review ever generated.
    pub changes: Option<WeeklyChanges>,
    pub action: WeeklyAction,
    pub created_at: Option<DateTime<Utc>>,
}

impl WeeklyReview {
    pub fn week(&self) -> WeekRange {
        WeekRange {
            start: self.week_start,
            end: self.week_end,
        }
    }
}

/// Builds the review for `week` from the user's data and earlier reviews.
///
/// Only reviews that start before `week` are considered; the most recent of
/// them is the baseline for the changes, and the last few feed the spending
/// baseline of the action rules.
pub fn prepare_review(
    week: WeekRange,
    as_of: NaiveDate,
    data: &FinancialData,
    prior_reviews: &[WeeklyReview],
    thresholds: &ReviewThresholds,
) -> WeeklyReview {
    let mut prior: Vec<&WeeklyReview> = prior_reviews
        .iter()
        .filter(|r| r.week_start < week.start)
        .collect();
    prior.sort_by(|a, b| b.week_start.cmp(&a.week_start));

    let snapshot = compute_snapshot(week, as_of, data);
    let changes = compute_changes(&snapshot, prior.first().map(|r| &r.snapshot));

    let recent_weekly_spending: Vec<Money> = prior
        .iter()
        .take(thresholds.spending_window_weeks)
        .map(|r| r.snapshot.weekly_spending)
        .collect();
    let top_category = top_spending_category(&data.transactions, week);

    let ctx = ActionContext {
        as_of,
        cards: &data.credit_cards,
        goals: &data.goals,
        recent_weekly_spending: &recent_weekly_spending,
        top_category: top_category.as_deref(),
    };
    let action = select_action(&snapshot, &ctx, thresholds).into_action();

    WeeklyReview {
        id: None,
        week_start: week.start,
        week_end: week.end,
        snapshot,
        changes,
        action,
        created_at: None,
    }
}
