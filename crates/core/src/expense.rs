use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::account::{require_name, LedgerError};
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Occurrences per month as a (numerator, denominator) pair.
    fn per_month(self) -> (i64, i64) {
        match self {
            Frequency::Weekly => (52, 12),
            Frequency::Biweekly => (26, 12),
            Frequency::Monthly => (1, 1),
            Frequency::Yearly => (1, 12),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" | "annual" => Ok(Frequency::Yearly),
            other => Err(LedgerError::UnknownKind {
                kind: "frequency",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: Option<i64>,
    pub category: String,
    pub description: Option<String>,
    pub amount: Money,
    pub is_recurring: bool,
    pub frequency: Option<Frequency>,
    pub next_due_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Expense {
    /// Monthly cost of a recurring expense; a missing frequency counts as monthly.
    pub fn monthly_equivalent(&self) -> Money {
        let (num, den) = self.frequency.map_or((1, 1), Frequency::per_month);
        Money::from_decimal(self.amount.amount() * Decimal::from(num) / Decimal::from(den))
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        require_name("expense category", &self.category)?;
        if !self.amount.is_positive() {
            return Err(LedgerError::NonPositiveAmount(self.amount));
        }
        Ok(())
    }
}

/// Sum of the monthly equivalents of every recurring expense.
pub fn recurring_monthly_total(expenses: &[Expense]) -> Money {
    expenses
        .iter()
        .filter(|e| e.is_recurring)
        .map(Expense::monthly_equivalent)
        .sum()
}
