use chrono::{DateTime, NaiveDate, Utc};
use finpulse_core::{Account, AccountId, DateRange, Money, Transaction};
use sqlx::{FromRow, QueryBuilder, Sqlite};
use std::collections::HashSet;

use crate::db::{delete_row, parse_column, DbPool, StorageError};

#[derive(FromRow)]
struct AccountRow {
    id: i64,
    name: String,
    account_type: String,
    institution: Option<String>,
    balance_cents: i64,
    currency: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StorageError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: Some(AccountId(row.id)),
            name: row.name,
            account_type: parse_column("account_type", &row.account_type)?,
            institution: row.institution,
            balance: Money::from_cents(row.balance_cents),
            currency: row.currency,
            created_at: Some(row.created_at),
        })
    }
}

#[derive(FromRow)]
struct TransactionRow {
    id: i64,
    account_id: i64,
    amount_cents: i64,
    transaction_type: String,
    category: Option<String>,
    description: Option<String>,
    date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StorageError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: Some(row.id),
            account_id: AccountId(row.account_id),
            amount: Money::from_cents(row.amount_cents),
            transaction_type: parse_column("transaction_type", &row.transaction_type)?,
            category: row.category,
            description: row.description,
            date: row.date,
            created_at: Some(row.created_at),
        })
    }
}

const TRANSACTION_COLUMNS: &str =
    "id, account_id, amount_cents, transaction_type, category, description, date, created_at";

/// Narrows a transaction listing. The default lists everything.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Inclusive bounds.
    pub range: Option<DateRange>,
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Counts from one imported batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub inserted: usize,
    pub duplicates: usize,
}

pub async fn insert_account(pool: &DbPool, account: &Account) -> Result<Account, StorageError> {
    let result = sqlx::query(
        "INSERT INTO accounts (name, account_type, institution, balance_cents, currency, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&account.name)
    .bind(account.account_type.as_str())
    .bind(&account.institution)
    .bind(account.balance.to_cents())
    .bind(&account.currency)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    get_account(pool, result.last_insert_rowid()).await
}

pub async fn get_account(pool: &DbPool, id: i64) -> Result<Account, StorageError> {
    let row: Option<AccountRow> = sqlx::query_as(
        "SELECT id, name, account_type, institution, balance_cents, currency, created_at
         FROM accounts WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.ok_or(StorageError::NotFound {
        entity: "account",
        id,
    })?
    .try_into()
}

pub async fn list_accounts(pool: &DbPool) -> Result<Vec<Account>, StorageError> {
    let rows: Vec<AccountRow> = sqlx::query_as(
        "SELECT id, name, account_type, institution, balance_cents, currency, created_at
         FROM accounts ORDER BY name, id",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Account::try_from).collect()
}

/// Writes the editable columns of account `id`.
pub async fn update_account(pool: &DbPool, id: i64, account: &Account) -> Result<Account, StorageError> {
    let result = sqlx::query(
        "UPDATE accounts
         SET name = ?, account_type = ?, institution = ?, balance_cents = ?, currency = ?
         WHERE id = ?",
    )
    .bind(&account.name)
    .bind(account.account_type.as_str())
    .bind(&account.institution)
    .bind(account.balance.to_cents())
    .bind(&account.currency)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::NotFound {
            entity: "account",
            id,
        });
    }
    get_account(pool, id).await
}

/// Removes the account together with its transactions.
pub async fn delete_account(pool: &DbPool, id: i64) -> Result<(), StorageError> {
    delete_row(pool, "accounts", "account", id).await
}

pub async fn insert_transaction(
    pool: &DbPool,
    transaction: &Transaction,
) -> Result<Transaction, StorageError> {
    get_account(pool, transaction.account_id.0).await?;

    let id = insert_transaction_row(pool, transaction, Utc::now()).await?;
    get_transaction(pool, id).await
}

async fn insert_transaction_row<'e, E>(
    executor: E,
    transaction: &Transaction,
    created_at: DateTime<Utc>,
) -> Result<i64, StorageError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO transactions
         (account_id, amount_cents, transaction_type, category, description, date, fingerprint, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(transaction.account_id.0)
    .bind(transaction.amount.to_cents())
    .bind(transaction.transaction_type.as_str())
    .bind(&transaction.category)
    .bind(&transaction.description)
    .bind(transaction.date)
    .bind(transaction.fingerprint())
    .bind(created_at)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Inserts imported rows for one account in a single database transaction.
/// A row whose fingerprint was already stored before the batch started is
/// counted as a duplicate; repeats inside the batch are real and all kept.
pub async fn import_transactions(
    pool: &DbPool,
    account_id: AccountId,
    rows: &[Transaction],
) -> Result<BatchOutcome, StorageError> {
    get_account(pool, account_id.0).await?;

    let mut tx = pool.begin().await?;
    let existing: HashSet<String> = sqlx::query_scalar(
        "SELECT fingerprint FROM transactions
         WHERE account_id = ? AND fingerprint IS NOT NULL",
    )
    .bind(account_id.0)
    .fetch_all(&mut *tx)
    .await?
    .into_iter()
    .collect();

    let mut outcome = BatchOutcome::default();
    let now = Utc::now();
    for transaction in rows {
        let row = Transaction {
            account_id,
            ..transaction.clone()
        };
        if existing.contains(&row.fingerprint()) {
            outcome.duplicates += 1;
            continue;
        }
        insert_transaction_row(&mut *tx, &row, now).await?;
        outcome.inserted += 1;
    }

    tx.commit().await?;
    Ok(outcome)
}

pub async fn get_transaction(pool: &DbPool, id: i64) -> Result<Transaction, StorageError> {
    let row: Option<TransactionRow> =
        sqlx::query_as(&format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.ok_or(StorageError::NotFound {
        entity: "transaction",
        id,
    })?
    .try_into()
}

/// Newest first.
pub async fn list_transactions(
    pool: &DbPool,
    filter: &TransactionFilter,
) -> Result<Vec<Transaction>, StorageError> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE 1 = 1"));
    if let Some(range) = filter.range {
        query.push(" AND date >= ").push_bind(range.start);
        query.push(" AND date <= ").push_bind(range.end);
    }
    if let Some(category) = &filter.category {
        query.push(" AND category = ").push_bind(category.clone());
    }
    query.push(" ORDER BY date DESC, id DESC");
    // SQLite needs a LIMIT before it accepts an OFFSET; -1 means unbounded.
    let limit = filter.limit.map_or(-1, i64::from);
    query.push(" LIMIT ").push_bind(limit);
    query.push(" OFFSET ").push_bind(i64::from(filter.offset));

    let rows: Vec<TransactionRow> = query.build_query_as().fetch_all(pool).await?;
    rows.into_iter().map(Transaction::try_from).collect()
}

pub async fn delete_transaction(pool: &DbPool, id: i64) -> Result<(), StorageError> {
    delete_row(pool, "transactions", "transaction", id).await
}
