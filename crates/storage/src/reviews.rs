use chrono::{DateTime, NaiveDate, Utc};
use finpulse_core::{ActionStatus, Money, ReviewError, WeeklyAction, WeeklyReview};
use sqlx::FromRow;

use crate::db::{parse_column, DbPool, StorageError};

#[derive(FromRow)]
struct ReviewRow {
    id: i64,
    week_start: NaiveDate,
    week_end: NaiveDate,
    snapshot: String,
    changes: Option<String>,
    action_type: String,
    action_title: String,
    action_detail: Option<String>,
    action_target_cents: Option<i64>,
    action_target_name: Option<String>,
    action_status: String,
    action_completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for WeeklyReview {
    type Error = StorageError;

    fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
        let changes = match row.changes {
            Some(json) => Some(serde_json::from_str(&json)?),
            None => None,
        };
        Ok(WeeklyReview {
            id: Some(row.id),
            week_start: row.week_start,
            week_end: row.week_end,
            snapshot: serde_json::from_str(&row.snapshot)?,
            changes,
            action: WeeklyAction {
                kind: parse_column("action_type", &row.action_type)?,
                title: row.action_title,
                detail: row.action_detail,
                target_amount: row.action_target_cents.map(Money::from_cents),
                target_name: row.action_target_name,
                status: parse_column("action_status", &row.action_status)?,
                completed_at: row.action_completed_at,
            },
            created_at: Some(row.created_at),
        })
    }
}

const REVIEW_COLUMNS: &str = "id, week_start, week_end, snapshot, changes, action_type, \
     action_title, action_detail, action_target_cents, action_target_name, action_status, \
     action_completed_at, created_at";

pub async fn get_review(pool: &DbPool, id: i64) -> Result<WeeklyReview, StorageError> {
    let row: Option<ReviewRow> =
        sqlx::query_as(&format!("SELECT {REVIEW_COLUMNS} FROM weekly_reviews WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.ok_or(StorageError::NotFound {
        entity: "weekly review",
        id,
    })?
    .try_into()
}

pub async fn get_review_for_week(
    pool: &DbPool,
    week_start: NaiveDate,
) -> Result<Option<WeeklyReview>, StorageError> {
    let row: Option<ReviewRow> = sqlx::query_as(&format!(
        "SELECT {REVIEW_COLUMNS} FROM weekly_reviews WHERE week_start = ?"
    ))
    .bind(week_start)
    .fetch_optional(pool)
    .await?;

    row.map(WeeklyReview::try_from).transpose()
}

/// Stores `review` unless its week already has one, and returns whichever
/// review the week ends up with. Two callers racing on the same week both get
/// the winner's row.
pub async fn insert_review(pool: &DbPool, review: &WeeklyReview) -> Result<WeeklyReview, StorageError> {
    let snapshot = serde_json::to_string(&review.snapshot)?;
    let changes = review
        .changes
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let action = &review.action;

    let result = sqlx::query(
        "INSERT INTO weekly_reviews
         (week_start, week_end, snapshot, changes, action_type, action_title, action_detail,
          action_target_cents, action_target_name, action_status, action_completed_at, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(week_start) DO NOTHING",
    )
    .bind(review.week_start)
    .bind(review.week_end)
    .bind(snapshot)
    .bind(changes)
    .bind(action.kind.as_str())
    .bind(&action.title)
    .bind(&action.detail)
    .bind(action.target_amount.map(Money::to_cents))
    .bind(&action.target_name)
    .bind(action.status.as_str())
    .bind(action.completed_at)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        tracing::debug!(week_start = %review.week_start, "Review already stored for week");
    }

    get_review_for_week(pool, review.week_start)
        .await?
        .ok_or(StorageError::ReviewMissing {
            week_start: review.week_start,
        })
}

/// Most recent `limit` reviews, newest first.
pub async fn list_reviews(pool: &DbPool, limit: u32) -> Result<Vec<WeeklyReview>, StorageError> {
    let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
        "SELECT {REVIEW_COLUMNS} FROM weekly_reviews ORDER BY week_start DESC LIMIT ?"
    ))
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(WeeklyReview::try_from).collect()
}

/// Up to `limit` reviews for weeks starting before `week_start`, newest first.
pub async fn list_reviews_before(
    pool: &DbPool,
    week_start: NaiveDate,
    limit: u32,
) -> Result<Vec<WeeklyReview>, StorageError> {
    let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
        "SELECT {REVIEW_COLUMNS} FROM weekly_reviews
         WHERE week_start < ?
         ORDER BY week_start DESC LIMIT ?"
    ))
    .bind(week_start)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(WeeklyReview::try_from).collect()
}

/// Completes or skips the action of review `id`.
///
/// The update only matches a pending row, so of two concurrent calls exactly
/// one succeeds and the other sees `AlreadyResolved`.
pub async fn resolve_action(
    pool: &DbPool,
    id: i64,
    status: ActionStatus,
    at: DateTime<Utc>,
) -> Result<WeeklyReview, StorageError> {
    let mut review = get_review(pool, id).await?;
    review.action.resolve(status, at)?;

    let result = sqlx::query(
        "UPDATE weekly_reviews
         SET action_status = ?, action_completed_at = ?
         WHERE id = ? AND action_status = 'pending'",
    )
    .bind(status.as_str())
    .bind(at)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        let current = get_review(pool, id).await?;
        return Err(ReviewError::AlreadyResolved(current.action.status).into());
    }

    get_review(pool, id).await
}
