pub mod db;
pub mod holdings;
pub mod ledger;
pub mod plans;
pub mod reviews;

pub use db::{create_db, DbPool, StorageError};
pub use holdings::{
    delete_credit_card, delete_installment_plan, delete_investment, get_credit_card,
    get_investment, insert_credit_card, insert_installment_plan, insert_investment, list_credit_cards,
    list_installment_plans, list_investments, update_credit_card, update_investment,
};
pub use ledger::{
    delete_account, delete_transaction, get_account, get_transaction, insert_account,
    import_transactions, insert_transaction, list_accounts, list_transactions, update_account,
    BatchOutcome, TransactionFilter,
};
pub use plans::{
    delete_expense, delete_goal, get_goal, insert_expense, insert_goal, list_expenses,
    list_goals, update_goal,
};
pub use reviews::{
    get_review, get_review_for_week, insert_review, list_reviews, list_reviews_before,
    resolve_action,
};

pub use sqlx::Error as SqlxError;

use finpulse_core::FinancialData;

/// Reads everything the snapshot and dashboard calculations need.
pub async fn load_financial_data(pool: &DbPool) -> Result<FinancialData, StorageError> {
    Ok(FinancialData {
        accounts: list_accounts(pool).await?,
        transactions: list_transactions(pool, &TransactionFilter::default()).await?,
        credit_cards: list_credit_cards(pool).await?,
        investments: list_investments(pool).await?,
        expenses: list_expenses(pool).await?,
        installment_plans: list_installment_plans(pool).await?,
        goals: list_goals(pool).await?,
    })
}
