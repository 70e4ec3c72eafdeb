use axum::extract::State;
use axum::Json;
use chrono::{NaiveDate, Utc};
use finpulse_core::{
    aggregate_history, build_dashboard, generate_insights, prepare_review, ActionStatus,
    DashboardSummary, FinancialInsights, WeekRange, WeeklyReview, WeeklyReviewHistory,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

const MAX_HISTORY: u32 = 52;

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardSummary>> {
    let data = finpulse_storage::load_financial_data(&state.pool).await?;
    let thresholds = &state.config.thresholds;
    Ok(Json(build_dashboard(
        state.today(),
        &data,
        thresholds.upcoming_bill_days,
        thresholds.goal_pace_tolerance,
    )))
}

pub async fn insights(State(state): State<AppState>) -> ApiResult<Json<FinancialInsights>> {
    let data = finpulse_storage::load_financial_data(&state.pool).await?;
    Ok(Json(generate_insights(
        state.today(),
        &data,
        &state.config.thresholds,
    )))
}

/// Returns this week's review, generating it on the first request of the week.
pub async fn current_review(State(state): State<AppState>) -> ApiResult<Json<WeeklyReview>> {
    let today = state.today();
    let week = WeekRange::containing(today);
    if let Some(review) = finpulse_storage::get_review_for_week(&state.pool, week.start).await? {
        return Ok(Json(review));
    }

    let review = create_review(&state, week, today).await?;
    Ok(Json(review))
}

async fn create_review(
    state: &AppState,
    week: WeekRange,
    today: NaiveDate,
) -> ApiResult<WeeklyReview> {
    let pool = &state.pool;
    let thresholds = &state.config.thresholds;
    let data = finpulse_storage::load_financial_data(pool).await?;
    let window = u32::try_from(thresholds.spending_window_weeks).unwrap_or(MAX_HISTORY);
    let prior = finpulse_storage::list_reviews_before(pool, week.start, window.max(1)).await?;

    let draft = prepare_review(week, today, &data, &prior, thresholds);
    let stored = finpulse_storage::insert_review(pool, &draft).await?;
    tracing::info!(
        review_id = stored.id,
        %week,
        action = stored.action.kind.as_str(),
        "Created weekly review"
    );
    Ok(stored)
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

pub async fn history(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Json<WeeklyReviewHistory>> {
    let limit = query.limit.unwrap_or(state.config.history_limit);
    if !(1..=MAX_HISTORY).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_HISTORY}"
        )));
    }

    let reviews = finpulse_storage::list_reviews(&state.pool, limit).await?;
    Ok(Json(aggregate_history(reviews)))
}

#[derive(Debug, Deserialize)]
pub struct ResolveAction {
    pub status: ActionStatus,
}

pub async fn resolve_action(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<ResolveAction>,
) -> ApiResult<Json<WeeklyReview>> {
    let review = finpulse_storage::resolve_action(&state.pool, id, req.status, Utc::now()).await?;
    tracing::info!(
        review_id = id,
        status = review.action.status.as_str(),
        "Resolved weekly action"
    );
    Ok(Json(review))
}
