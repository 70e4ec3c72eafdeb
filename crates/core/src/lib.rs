pub mod account;
pub mod analysis;
pub mod config;
pub mod credit_card;
pub mod dashboard;
pub mod data;
pub mod expense;
pub mod goal;
pub mod investment;
pub mod money;
pub mod period;
pub mod review;
pub mod transaction;

pub use account::{Account, AccountId, AccountType, LedgerError, DEFAULT_CURRENCY};
pub use analysis::{generate_insights, Advice, FinancialInsights, Insight, Level, Warning};
pub use config::{ConfigError, ReviewThresholds};
pub use credit_card::{aggregate_utilization, CreditCard};
pub use dashboard::{build_dashboard, DashboardSummary, GoalSummary, UpcomingBill};
pub use data::{BalanceSheet, FinancialData, MonthlyFlow};
pub use expense::{Expense, Frequency};
pub use goal::{Goal, GoalForecast};
pub use investment::{InstallmentPlan, Investment, InvestmentSummary};
pub use money::Money;
pub use period::{DateRange, WeekRange};
pub use review::action::{
    select_action, ActionContext, ActionKind, ActionStatus, Recommendation, WeeklyAction,
};
pub use review::change::{compute_changes, MetricChange, WeeklyChanges};
pub use review::history::{aggregate_history, WeeklyReviewHistory};
pub use review::snapshot::{compute_snapshot, top_spending_category, WeeklySnapshot};
pub use review::{prepare_review, ReviewError, WeeklyReview};
pub use transaction::{Transaction, TransactionType, UnvalidatedTransaction};
