use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use finpulse_core::{Expense, Frequency, Goal, GoalSummary, Money};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

fn default_goal_type() -> String {
    "savings".to_string()
}

#[derive(Debug, Deserialize)]
pub struct NewGoal {
    pub title: String,
    #[serde(default = "default_goal_type")]
    pub goal_type: String,
    pub target_amount: Money,
    #[serde(default)]
    pub current_amount: Money,
    pub target_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub target_amount: Option<Money>,
    pub current_amount: Option<Money>,
    pub target_date: Option<NaiveDate>,
}

/// Goals with their pace forecast as of today.
pub async fn list_goals(State(state): State<AppState>) -> ApiResult<Json<Vec<GoalSummary>>> {
    let today = state.today();
    let tolerance = state.config.thresholds.goal_pace_tolerance;
    let goals = finpulse_storage::list_goals(&state.pool).await?;
    Ok(Json(
        goals
            .iter()
            .map(|g| GoalSummary::new(g, today, tolerance))
            .collect(),
    ))
}

pub async fn create_goal(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewGoal>,
) -> ApiResult<(StatusCode, Json<Goal>)> {
    let goal = Goal {
        id: None,
        title: req.title,
        goal_type: req.goal_type,
        target_amount: req.target_amount,
        current_amount: req.current_amount,
        target_date: req.target_date,
        created_on: state.today(),
        created_at: None,
    };
    goal.validate()?;

    let stored = finpulse_storage::insert_goal(&state.pool, &goal).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn update_goal(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<GoalPatch>,
) -> ApiResult<Json<Goal>> {
    let mut goal = finpulse_storage::get_goal(&state.pool, id).await?;
    if let Some(title) = patch.title {
        goal.title = title;
    }
    if let Some(target) = patch.target_amount {
        goal.target_amount = target;
    }
    if let Some(current) = patch.current_amount {
        goal.current_amount = current;
    }
    if let Some(date) = patch.target_date {
        goal.target_date = Some(date);
    }
    goal.validate()?;

    Ok(Json(finpulse_storage::update_goal(&state.pool, id, &goal).await?))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    finpulse_storage::delete_goal(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct NewExpense {
    pub category: String,
    pub description: Option<String>,
    pub amount: Money,
    #[serde(default)]
    pub is_recurring: bool,
    pub frequency: Option<Frequency>,
    pub next_due_date: Option<NaiveDate>,
}

pub async fn list_expenses(State(state): State<AppState>) -> ApiResult<Json<Vec<Expense>>> {
    Ok(Json(finpulse_storage::list_expenses(&state.pool).await?))
}

pub async fn create_expense(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewExpense>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    let expense = Expense {
        id: None,
        category: req.category,
        description: req.description,
        amount: req.amount,
        is_recurring: req.is_recurring,
        frequency: req.frequency,
        next_due_date: req.next_due_date,
        created_at: None,
    };
    expense.validate()?;

    let stored = finpulse_storage::insert_expense(&state.pool, &expense).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    finpulse_storage::delete_expense(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
