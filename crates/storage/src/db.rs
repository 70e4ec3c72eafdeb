use chrono::NaiveDate;
use finpulse_core::ReviewError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub type DbPool = Pool<Sqlite>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("Weekly review for week starting {week_start} is missing after insert")]
    ReviewMissing { week_start: NaiveDate },
    #[error("Corrupt {column} value: '{value}'")]
    Corrupt { column: &'static str, value: String },
    #[error(transparent)]
    Review(#[from] ReviewError),
}

pub async fn create_db(path: &Path) -> Result<DbPool, StorageError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(5000))
        .pragma("cache_size", "-32000");

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            account_type TEXT NOT NULL,
            institution TEXT,
            balance_cents INTEGER NOT NULL DEFAULT 0,
            currency TEXT NOT NULL DEFAULT 'CAD',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id INTEGER NOT NULL,
            amount_cents INTEGER NOT NULL CHECK (amount_cents > 0),
            transaction_type TEXT NOT NULL,
            category TEXT,
            description TEXT,
            date TEXT NOT NULL,
            fingerprint TEXT,
            created_at TEXT NOT NULL,
            FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transactions_fingerprint
         ON transactions(account_id, fingerprint)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS credit_cards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            issuer TEXT,
            credit_limit_cents INTEGER NOT NULL,
            current_balance_cents INTEGER NOT NULL DEFAULT 0,
            statement_day INTEGER NOT NULL,
            due_day INTEGER NOT NULL,
            apr TEXT,
            min_payment_pct TEXT NOT NULL DEFAULT '2',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            goal_type TEXT NOT NULL,
            target_amount_cents INTEGER NOT NULL,
            current_amount_cents INTEGER NOT NULL DEFAULT 0,
            target_date TEXT,
            created_on TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL,
            description TEXT,
            amount_cents INTEGER NOT NULL,
            is_recurring INTEGER NOT NULL DEFAULT 0,
            frequency TEXT,
            next_due_date TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS investments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            investment_type TEXT NOT NULL,
            institution TEXT,
            current_value_cents INTEGER NOT NULL DEFAULT 0,
            book_value_cents INTEGER NOT NULL DEFAULT 0,
            monthly_contribution_cents INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS installment_plans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL,
            monthly_payment_cents INTEGER NOT NULL,
            remaining_payments INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS weekly_reviews (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            week_start TEXT NOT NULL UNIQUE,
            week_end TEXT NOT NULL,
            snapshot TEXT NOT NULL,
            changes TEXT,
            action_type TEXT NOT NULL,
            action_title TEXT NOT NULL,
            action_detail TEXT,
            action_target_cents INTEGER,
            action_target_name TEXT,
            action_status TEXT NOT NULL DEFAULT 'pending',
            action_completed_at TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Deletes row `id` from one of the entity tables.
pub(crate) async fn delete_row(
    pool: &DbPool,
    table: &'static str,
    entity: &'static str,
    id: i64,
) -> Result<(), StorageError> {
    let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = ?"))
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(StorageError::NotFound { entity, id });
    }
    Ok(())
}

pub(crate) fn parse_column<T: FromStr>(column: &'static str, value: &str) -> Result<T, StorageError> {
    value.parse().map_err(|_| StorageError::Corrupt {
        column,
        value: value.to_string(),
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::test_db;
    use super::*;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = test_db().await;
        run_migrations(&db.pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&db.pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(
            names,
            [
                "accounts",
                "credit_cards",
                "expenses",
                "goals",
                "installment_plans",
                "investments",
                "transactions",
                "weekly_reviews",
            ]
        );
    }

    #[test]
    fn missing_review_names_its_week() {
        let err = StorageError::ReviewMissing {
            week_start: NaiveDate::from_ymd_opt(2026, 10, 12).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Weekly review for week starting 2026-10-12 is missing after insert"
        );
    }

    #[tokio::test]
    async fn delete_missing_row_is_not_found() {
        let db = test_db().await;
        let err = delete_row(&db.pool, "goals", "goal", 42).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "goal", id: 42 }));
    }
}
