use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use finpulse_core::{
    Account, AccountId, AccountType, DateRange, Money, Transaction, UnvalidatedTransaction,
    DEFAULT_CURRENCY,
};
use finpulse_import::{parse_transactions, ImportReport};
use finpulse_storage::TransactionFilter;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub account_type: AccountType,
    pub institution: Option<String>,
    #[serde(default)]
    pub balance: Money,
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub institution: Option<String>,
    pub balance: Option<Money>,
    pub currency: Option<String>,
}

pub async fn list_accounts(State(state): State<AppState>) -> ApiResult<Json<Vec<Account>>> {
    Ok(Json(finpulse_storage::list_accounts(&state.pool).await?))
}

pub async fn create_account(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewAccount>,
) -> ApiResult<(StatusCode, Json<Account>)> {
    let mut account = Account::new(&req.name, req.account_type, req.balance);
    account.institution = req.institution;
    account.currency = req
        .currency
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
        .to_uppercase();
    account.validate()?;

    let stored = finpulse_storage::insert_account(&state.pool, &account).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn get_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Account>> {
    Ok(Json(finpulse_storage::get_account(&state.pool, id).await?))
}

pub async fn update_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<AccountPatch>,
) -> ApiResult<Json<Account>> {
    let mut account = finpulse_storage::get_account(&state.pool, id).await?;
    if let Some(name) = patch.name {
        account.name = name;
    }
    if let Some(account_type) = patch.account_type {
        account.account_type = account_type;
    }
    if let Some(institution) = patch.institution {
        account.institution = Some(institution);
    }
    if let Some(balance) = patch.balance {
        account.balance = balance;
    }
    if let Some(currency) = patch.currency {
        account.currency = currency.to_uppercase();
    }
    account.validate()?;

    Ok(Json(finpulse_storage::update_account(&state.pool, id, &account).await?))
}

pub async fn delete_account(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    finpulse_storage::delete_account(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

const DEFAULT_PAGE: u32 = 50;
const MAX_PAGE: u32 = 200;

#[derive(Debug, Deserialize)]
pub struct TransactionQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub category: Option<String>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

impl TransactionQuery {
    fn filter(self) -> ApiResult<TransactionFilter> {
        let range = self.range()?;
        let limit = self.limit.unwrap_or(DEFAULT_PAGE);
        if !(1..=MAX_PAGE).contains(&limit) {
            return Err(ApiError::BadRequest(format!(
                "limit must be between 1 and {MAX_PAGE}"
            )));
        }
        Ok(TransactionFilter {
            range,
            category: self.category.filter(|c| !c.trim().is_empty()),
            limit: Some(limit),
            offset: self.offset,
        })
    }

    fn range(&self) -> ApiResult<Option<DateRange>> {
        let (start, end) = match (self.start, self.end) {
            (None, None) => return Ok(None),
            (start, end) => (
                start.unwrap_or(NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default()),
                end.unwrap_or(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or_default()),
            ),
        };
        if start > end {
            return Err(ApiError::BadRequest("start must not be after end".to_string()));
        }
        Ok(Some(DateRange::new(start, end)))
    }
}

pub async fn list_transactions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<TransactionQuery>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let filter = query.filter()?;
    Ok(Json(finpulse_storage::list_transactions(&state.pool, &filter).await?))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UnvalidatedTransaction>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let transaction = Transaction::validate(req)?;
    let stored = finpulse_storage::insert_transaction(&state.pool, &transaction).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    finpulse_storage::delete_transaction(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub account_id: i64,
}

/// Imports a CSV bank export into one account, skipping rows seen before.
pub async fn import_transactions(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ImportQuery>,
    body: Bytes,
) -> ApiResult<Json<ImportReport>> {
    let account_id = AccountId(query.account_id);
    let parsed = parse_transactions(&body, account_id)?;

    let outcome =
        finpulse_storage::import_transactions(&state.pool, account_id, &parsed.rows).await?;

    let report = ImportReport {
        parsed: parsed.rows.len(),
        inserted: outcome.inserted,
        duplicates: outcome.duplicates,
        skipped: parsed.skipped,
    };
    tracing::info!(
        account_id = account_id.0,
        parsed = report.parsed,
        inserted = report.inserted,
        duplicates = report.duplicates,
        skipped = report.skipped,
        "Imported CSV transactions"
    );
    Ok(Json(report))
}
