//! Credit cards, investments and installment plans.

use chrono::{DateTime, Utc};
use finpulse_core::{CreditCard, InstallmentPlan, Investment, Money};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::db::{delete_row, parse_column, DbPool, StorageError};

#[derive(FromRow)]
struct CreditCardRow {
    id: i64,
    name: String,
    issuer: Option<String>,
    credit_limit_cents: i64,
    current_balance_cents: i64,
    statement_day: i64,
    due_day: i64,
    apr: Option<String>,
    min_payment_pct: String,
    created_at: DateTime<Utc>,
}

fn day_column(column: &'static str, value: i64) -> Result<u8, StorageError> {
    u8::try_from(value).map_err(|_| StorageError::Corrupt {
        column,
        value: value.to_string(),
    })
}

impl TryFrom<CreditCardRow> for CreditCard {
    type Error = StorageError;

    fn try_from(row: CreditCardRow) -> Result<Self, Self::Error> {
        let apr = match row.apr {
            Some(apr) => Some(parse_column::<Decimal>("apr", &apr)?),
            None => None,
        };
        Ok(CreditCard {
            id: Some(row.id),
            name: row.name,
            issuer: row.issuer,
            credit_limit: Money::from_cents(row.credit_limit_cents),
            current_balance: Money::from_cents(row.current_balance_cents),
            statement_day: day_column("statement_day", row.statement_day)?,
            due_day: day_column("due_day", row.due_day)?,
            apr,
            min_payment_pct: parse_column("min_payment_pct", &row.min_payment_pct)?,
            created_at: Some(row.created_at),
        })
    }
}

const CARD_COLUMNS: &str = "id, name, issuer, credit_limit_cents, current_balance_cents, \
     statement_day, due_day, apr, min_payment_pct, created_at";

pub async fn insert_credit_card(pool: &DbPool, card: &CreditCard) -> Result<CreditCard, StorageError> {
    let result = sqlx::query(
        "INSERT INTO credit_cards
         (name, issuer, credit_limit_cents, current_balance_cents, statement_day, due_day, apr, min_payment_pct, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&card.name)
    .bind(&card.issuer)
    .bind(card.credit_limit.to_cents())
    .bind(card.current_balance.to_cents())
    .bind(i64::from(card.statement_day))
    .bind(i64::from(card.due_day))
    .bind(card.apr.map(|apr| apr.to_string()))
    .bind(card.min_payment_pct.to_string())
    .bind(Utc::now())
    .execute(pool)
    .await?;

    get_credit_card(pool, result.last_insert_rowid()).await
}

pub async fn get_credit_card(pool: &DbPool, id: i64) -> Result<CreditCard, StorageError> {
    let row: Option<CreditCardRow> =
        sqlx::query_as(&format!("SELECT {CARD_COLUMNS} FROM credit_cards WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.ok_or(StorageError::NotFound {
        entity: "credit card",
        id,
    })?
    .try_into()
}

pub async fn list_credit_cards(pool: &DbPool) -> Result<Vec<CreditCard>, StorageError> {
    let rows: Vec<CreditCardRow> =
        sqlx::query_as(&format!("SELECT {CARD_COLUMNS} FROM credit_cards ORDER BY id"))
            .fetch_all(pool)
            .await?;

    rows.into_iter().map(CreditCard::try_from).collect()
}

/// Writes every mutable column of card `id`; `card.id` is ignored.
pub async fn update_credit_card(
    pool: &DbPool,
    id: i64,
    card: &CreditCard,
) -> Result<CreditCard, StorageError> {
    let result = sqlx::query(
        "UPDATE credit_cards
         SET name = ?, issuer = ?, credit_limit_cents = ?, current_balance_cents = ?,
             statement_day = ?, due_day = ?, apr = ?, min_payment_pct = ?
         WHERE id = ?",
    )
    .bind(&card.name)
    .bind(&card.issuer)
    .bind(card.credit_limit.to_cents())
    .bind(card.current_balance.to_cents())
    .bind(i64::from(card.statement_day))
    .bind(i64::from(card.due_day))
    .bind(card.apr.map(|apr| apr.to_string()))
    .bind(card.min_payment_pct.to_string())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::NotFound {
            entity: "credit card",
            id,
        });
    }
    get_credit_card(pool, id).await
}

pub async fn delete_credit_card(pool: &DbPool, id: i64) -> Result<(), StorageError> {
    delete_row(pool, "credit_cards", "credit card", id).await
}

#[derive(FromRow)]
struct InvestmentRow {
    id: i64,
    investment_type: String,
    institution: Option<String>,
    current_value_cents: i64,
    book_value_cents: i64,
    monthly_contribution_cents: i64,
    created_at: DateTime<Utc>,
}

impl From<InvestmentRow> for Investment {
    fn from(row: InvestmentRow) -> Self {
        Investment {
            id: Some(row.id),
            investment_type: row.investment_type,
            institution: row.institution,
            current_value: Money::from_cents(row.current_value_cents),
            book_value: Money::from_cents(row.book_value_cents),
            monthly_contribution: Money::from_cents(row.monthly_contribution_cents),
            created_at: Some(row.created_at),
        }
    }
}

pub async fn insert_investment(pool: &DbPool, investment: &Investment) -> Result<Investment, StorageError> {
    let result = sqlx::query(
        "INSERT INTO investments
         (investment_type, institution, current_value_cents, book_value_cents, monthly_contribution_cents, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&investment.investment_type)
    .bind(&investment.institution)
    .bind(investment.current_value.to_cents())
    .bind(investment.book_value.to_cents())
    .bind(investment.monthly_contribution.to_cents())
    .bind(Utc::now())
    .execute(pool)
    .await?;

    get_investment(pool, result.last_insert_rowid()).await
}

const INVESTMENT_COLUMNS: &str = "id, investment_type, institution, current_value_cents, \
     book_value_cents, monthly_contribution_cents, created_at";

pub async fn get_investment(pool: &DbPool, id: i64) -> Result<Investment, StorageError> {
    let row: Option<InvestmentRow> =
        sqlx::query_as(&format!("SELECT {INVESTMENT_COLUMNS} FROM investments WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.map(Investment::from).ok_or(StorageError::NotFound {
        entity: "investment",
        id,
    })
}

pub async fn list_investments(pool: &DbPool) -> Result<Vec<Investment>, StorageError> {
    let rows: Vec<InvestmentRow> =
        sqlx::query_as(&format!("SELECT {INVESTMENT_COLUMNS} FROM investments ORDER BY id"))
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(Investment::from).collect())
}

pub async fn update_investment(
    pool: &DbPool,
    id: i64,
    investment: &Investment,
) -> Result<Investment, StorageError> {
    let result = sqlx::query(
        "UPDATE investments
         SET investment_type = ?, institution = ?, current_value_cents = ?, book_value_cents = ?,
             monthly_contribution_cents = ?
         WHERE id = ?",
    )
    .bind(&investment.investment_type)
    .bind(&investment.institution)
    .bind(investment.current_value.to_cents())
    .bind(investment.book_value.to_cents())
    .bind(investment.monthly_contribution.to_cents())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::NotFound {
            entity: "investment",
            id,
        });
    }
    get_investment(pool, id).await
}

pub async fn delete_investment(pool: &DbPool, id: i64) -> Result<(), StorageError> {
    delete_row(pool, "investments", "investment", id).await
}

#[derive(FromRow)]
struct InstallmentRow {
    id: i64,
    description: String,
    monthly_payment_cents: i64,
    remaining_payments: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<InstallmentRow> for InstallmentPlan {
    type Error = StorageError;

    fn try_from(row: InstallmentRow) -> Result<Self, Self::Error> {
        let remaining_payments =
            u32::try_from(row.remaining_payments).map_err(|_| StorageError::Corrupt {
                column: "remaining_payments",
                value: row.remaining_payments.to_string(),
            })?;
        Ok(InstallmentPlan {
            id: Some(row.id),
            description: row.description,
            monthly_payment: Money::from_cents(row.monthly_payment_cents),
            remaining_payments,
            created_at: Some(row.created_at),
        })
    }
}

pub async fn insert_installment_plan(
    pool: &DbPool,
    plan: &InstallmentPlan,
) -> Result<InstallmentPlan, StorageError> {
    let result = sqlx::query(
        "INSERT INTO installment_plans (description, monthly_payment_cents, remaining_payments, created_at)
         VALUES (?, ?, ?, ?)",
    )
    .bind(&plan.description)
    .bind(plan.monthly_payment.to_cents())
    .bind(i64::from(plan.remaining_payments))
    .bind(Utc::now())
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    let row: Option<InstallmentRow> = sqlx::query_as(
        "SELECT id, description, monthly_payment_cents, remaining_payments, created_at
         FROM installment_plans WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.ok_or(StorageError::NotFound {
        entity: "installment plan",
        id,
    })?
    .try_into()
}

pub async fn list_installment_plans(pool: &DbPool) -> Result<Vec<InstallmentPlan>, StorageError> {
    let rows: Vec<InstallmentRow> = sqlx::query_as(
        "SELECT id, description, monthly_payment_cents, remaining_payments, created_at
         FROM installment_plans ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(InstallmentPlan::try_from).collect()
}

pub async fn delete_installment_plan(pool: &DbPool, id: i64) -> Result<(), StorageError> {
    delete_row(pool, "installment_plans", "installment plan", id).await
}
