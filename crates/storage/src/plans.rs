//! Goals and expenses.

use chrono::{DateTime, NaiveDate, Utc};
use finpulse_core::{Expense, Frequency, Goal, Money};
use sqlx::FromRow;

use crate::db::{delete_row, parse_column, DbPool, StorageError};

#[derive(FromRow)]
struct GoalRow {
    id: i64,
    title: String,
    goal_type: String,
    target_amount_cents: i64,
    current_amount_cents: i64,
    target_date: Option<NaiveDate>,
    created_on: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<GoalRow> for Goal {
    fn from(row: GoalRow) -> Self {
        Goal {
            id: Some(row.id),
            title: row.title,
            goal_type: row.goal_type,
            target_amount: Money::from_cents(row.target_amount_cents),
            current_amount: Money::from_cents(row.current_amount_cents),
            target_date: row.target_date,
            created_on: row.created_on,
            created_at: Some(row.created_at),
        }
    }
}

const GOAL_COLUMNS: &str = "id, title, goal_type, target_amount_cents, current_amount_cents, \
     target_date, created_on, created_at";

pub async fn insert_goal(pool: &DbPool, goal: &Goal) -> Result<Goal, StorageError> {
    let result = sqlx::query(
        "INSERT INTO goals
         (title, goal_type, target_amount_cents, current_amount_cents, target_date, created_on, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&goal.title)
    .bind(&goal.goal_type)
    .bind(goal.target_amount.to_cents())
    .bind(goal.current_amount.to_cents())
    .bind(goal.target_date)
    .bind(goal.created_on)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    get_goal(pool, result.last_insert_rowid()).await
}

pub async fn get_goal(pool: &DbPool, id: i64) -> Result<Goal, StorageError> {
    let row: Option<GoalRow> = sqlx::query_as(&format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(Goal::from)
        .ok_or(StorageError::NotFound { entity: "goal", id })
}

/// Ordered by target date, undated goals last.
pub async fn list_goals(pool: &DbPool) -> Result<Vec<Goal>, StorageError> {
    let rows: Vec<GoalRow> = sqlx::query_as(&format!(
        "SELECT {GOAL_COLUMNS} FROM goals ORDER BY target_date IS NULL, target_date, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Goal::from).collect())
}

/// Writes the editable columns of goal `id`; `created_on` is never rewritten.
pub async fn update_goal(pool: &DbPool, id: i64, goal: &Goal) -> Result<Goal, StorageError> {
    let result = sqlx::query(
        "UPDATE goals
         SET title = ?, goal_type = ?, target_amount_cents = ?, current_amount_cents = ?, target_date = ?
         WHERE id = ?",
    )
    .bind(&goal.title)
    .bind(&goal.goal_type)
    .bind(goal.target_amount.to_cents())
    .bind(goal.current_amount.to_cents())
    .bind(goal.target_date)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::NotFound { entity: "goal", id });
    }
    get_goal(pool, id).await
}

pub async fn delete_goal(pool: &DbPool, id: i64) -> Result<(), StorageError> {
    delete_row(pool, "goals", "goal", id).await
}

#[derive(FromRow)]
struct ExpenseRow {
    id: i64,
    category: String,
    description: Option<String>,
    amount_cents: i64,
    is_recurring: bool,
    frequency: Option<String>,
    next_due_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = StorageError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        let frequency = match row.frequency {
            Some(f) => Some(parse_column::<Frequency>("frequency", &f)?),
            None => None,
        };
        Ok(Expense {
            id: Some(row.id),
            category: row.category,
            description: row.description,
            amount: Money::from_cents(row.amount_cents),
            is_recurring: row.is_recurring,
            frequency,
            next_due_date: row.next_due_date,
            created_at: Some(row.created_at),
        })
    }
}

const EXPENSE_COLUMNS: &str = "id, category, description, amount_cents, is_recurring, \
     frequency, next_due_date, created_at";

pub async fn insert_expense(pool: &DbPool, expense: &Expense) -> Result<Expense, StorageError> {
    let result = sqlx::query(
        "INSERT INTO expenses
         (category, description, amount_cents, is_recurring, frequency, next_due_date, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&expense.category)
    .bind(&expense.description)
    .bind(expense.amount.to_cents())
    .bind(expense.is_recurring)
    .bind(expense.frequency.map(Frequency::as_str))
    .bind(expense.next_due_date)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();
    let row: Option<ExpenseRow> =
        sqlx::query_as(&format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    row.ok_or(StorageError::NotFound {
        entity: "expense",
        id,
    })?
    .try_into()
}

pub async fn list_expenses(pool: &DbPool) -> Result<Vec<Expense>, StorageError> {
    let rows: Vec<ExpenseRow> =
        sqlx::query_as(&format!("SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY category, id"))
            .fetch_all(pool)
            .await?;

    rows.into_iter().map(Expense::try_from).collect()
}

pub async fn delete_expense(pool: &DbPool, id: i64) -> Result<(), StorageError> {
    delete_row(pool, "expenses", "expense", id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_db;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal(title: &str, target_date: Option<NaiveDate>) -> Goal {
        Goal {
            id: None,
            title: title.to_string(),
            goal_type: "savings".to_string(),
            target_amount: Money::from_cents(1_200_000),
            current_amount: Money::from_cents(100_000),
            target_date,
            created_on: date(2026, 1, 1),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn goals_sort_by_target_date_with_undated_last() {
        let db = test_db().await;
        insert_goal(&db.pool, &goal("Someday", None)).await.unwrap();
        insert_goal(&db.pool, &goal("Car", Some(date(2027, 6, 1)))).await.unwrap();
        insert_goal(&db.pool, &goal("Trip", Some(date(2026, 12, 31)))).await.unwrap();

        let titles: Vec<String> = list_goals(&db.pool)
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.title)
            .collect();
        assert_eq!(titles, ["Trip", "Car", "Someday"]);
    }

    #[tokio::test]
    async fn goal_update_keeps_created_on() {
        let db = test_db().await;
        let mut stored = insert_goal(&db.pool, &goal("Trip", Some(date(2026, 12, 31))))
            .await
            .unwrap();
        stored.current_amount = Money::from_cents(600_000);
        stored.created_on = date(2026, 9, 1);

        let updated = update_goal(&db.pool, stored.id.unwrap(), &stored).await.unwrap();
        assert_eq!(updated.current_amount, Money::from_cents(600_000));
        assert_eq!(updated.created_on, date(2026, 1, 1));
    }

    #[tokio::test]
    async fn updating_missing_goal_names_its_id() {
        let db = test_db().await;
        let err = update_goal(&db.pool, 31, &goal("Trip", None)).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "goal", id: 31 }));
    }

    #[tokio::test]
    async fn expense_frequency_round_trips() {
        let db = test_db().await;
        let expense = Expense {
            id: None,
            category: "Insurance".to_string(),
            description: Some("Home".to_string()),
            amount: Money::from_cents(120_000),
            is_recurring: true,
            frequency: Some(Frequency::Yearly),
            next_due_date: Some(date(2026, 11, 1)),
            created_at: None,
        };
        let stored = insert_expense(&db.pool, &expense).await.unwrap();
        assert_eq!(stored.frequency, Some(Frequency::Yearly));
        assert_eq!(stored.monthly_equivalent(), Money::from_cents(10_000));

        delete_expense(&db.pool, stored.id.unwrap()).await.unwrap();
        assert!(list_expenses(&db.pool).await.unwrap().is_empty());
    }
}
