use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use finpulse_core::{CreditCard, InstallmentPlan, Investment, InvestmentSummary, Money};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewCreditCard {
    pub name: String,
    pub issuer: Option<String>,
    pub credit_limit: Money,
    #[serde(default)]
    pub current_balance: Money,
    pub statement_day: Option<u8>,
    pub due_day: Option<u8>,
    pub apr: Option<Decimal>,
    pub min_payment_pct: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreditCardPatch {
    pub current_balance: Option<Money>,
    pub credit_limit: Option<Money>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvestmentPatch {
    pub investment_type: Option<String>,
    pub institution: Option<String>,
    pub current_value: Option<Money>,
    pub book_value: Option<Money>,
    pub monthly_contribution: Option<Money>,
}

pub async fn list_credit_cards(State(state): State<AppState>) -> ApiResult<Json<Vec<CreditCard>>> {
    Ok(Json(finpulse_storage::list_credit_cards(&state.pool).await?))
}

pub async fn create_credit_card(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewCreditCard>,
) -> ApiResult<(StatusCode, Json<CreditCard>)> {
    let mut card = CreditCard::new(&req.name, req.credit_limit, req.current_balance);
    card.issuer = req.issuer;
    card.apr = req.apr;
    if let Some(day) = req.statement_day {
        card.statement_day = day;
    }
    if let Some(day) = req.due_day {
        card.due_day = day;
    }
    if let Some(pct) = req.min_payment_pct {
        card.min_payment_pct = pct;
    }
    card.validate()?;

    let stored = finpulse_storage::insert_credit_card(&state.pool, &card).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn update_credit_card(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<CreditCardPatch>,
) -> ApiResult<Json<CreditCard>> {
    let mut card = finpulse_storage::get_credit_card(&state.pool, id).await?;
    if let Some(balance) = patch.current_balance {
        card.current_balance = balance;
    }
    if let Some(limit) = patch.credit_limit {
        card.credit_limit = limit;
    }
    card.validate()?;

    Ok(Json(finpulse_storage::update_credit_card(&state.pool, id, &card).await?))
}

pub async fn delete_credit_card(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    finpulse_storage::delete_credit_card(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_investments(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<InvestmentSummary>>> {
    let investments = finpulse_storage::list_investments(&state.pool).await?;
    Ok(Json(investments.into_iter().map(InvestmentSummary::from).collect()))
}

pub async fn create_investment(
    State(state): State<AppState>,
    ApiJson(mut investment): ApiJson<Investment>,
) -> ApiResult<(StatusCode, Json<InvestmentSummary>)> {
    investment.id = None;
    investment.validate()?;
    let stored = finpulse_storage::insert_investment(&state.pool, &investment).await?;
    Ok((StatusCode::CREATED, Json(stored.into())))
}

pub async fn update_investment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<InvestmentPatch>,
) -> ApiResult<Json<InvestmentSummary>> {
    let mut investment = finpulse_storage::get_investment(&state.pool, id).await?;
    if let Some(investment_type) = patch.investment_type {
        investment.investment_type = investment_type;
    }
    if let Some(institution) = patch.institution {
        investment.institution = Some(institution);
    }
    if let Some(value) = patch.current_value {
        investment.current_value = value;
    }
    if let Some(value) = patch.book_value {
        investment.book_value = value;
    }
    if let Some(contribution) = patch.monthly_contribution {
        investment.monthly_contribution = contribution;
    }
    investment.validate()?;

    let stored = finpulse_storage::update_investment(&state.pool, id, &investment).await?;
    Ok(Json(stored.into()))
}

pub async fn delete_investment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    finpulse_storage::delete_investment(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_installments(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<InstallmentPlan>>> {
    Ok(Json(finpulse_storage::list_installment_plans(&state.pool).await?))
}

pub async fn create_installment(
    State(state): State<AppState>,
    ApiJson(mut plan): ApiJson<InstallmentPlan>,
) -> ApiResult<(StatusCode, Json<InstallmentPlan>)> {
    plan.id = None;
    plan.validate()?;
    let stored = finpulse_storage::insert_installment_plan(&state.pool, &plan).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn delete_installment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    finpulse_storage::delete_installment_plan(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
