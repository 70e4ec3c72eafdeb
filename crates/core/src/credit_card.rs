use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::account::{require_name, require_non_negative, LedgerError};
use super::money::{percent_of, Money};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: Option<i64>,
    pub name: String,
    pub issuer: Option<String>,
    pub credit_limit: Money,
    pub current_balance: Money,
    pub statement_day: u8,
    pub due_day: u8,
    pub apr: Option<Decimal>,
    pub min_payment_pct: Decimal,
    pub created_at: Option<DateTime<Utc>>,
}

impl CreditCard {
    pub fn new(name: &str, credit_limit: Money, current_balance: Money) -> Self {
        CreditCard {
            id: None,
            name: name.to_string(),
            issuer: None,
            credit_limit,
            current_balance,
            statement_day: 1,
            due_day: 21,
            apr: None,
            min_payment_pct: Decimal::TWO,
            created_at: None,
        }
    }

    /// Balance as a percentage of the limit; 0 for a zero limit.
    pub fn utilization_pct(&self) -> Decimal {
        percent_of(self.current_balance.amount(), self.credit_limit.amount())
            .unwrap_or(Decimal::ZERO)
    }

    /// Payment needed to bring utilization down to `target_pct`, never negative.
    pub fn paydown_to(&self, target_pct: Decimal) -> Money {
        let allowed = self.credit_limit.scale(target_pct / Decimal::ONE_HUNDRED);
        let needed = self.current_balance - allowed;
        if needed.is_positive() {
            needed
        } else {
            Money::zero()
        }
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        require_name("card name", &self.name)?;
        require_non_negative(self.credit_limit)?;
        require_non_negative(self.current_balance)?;
        for (field, value) in [("statement_day", self.statement_day), ("due_day", self.due_day)] {
            if !(1..=31).contains(&value) {
                return Err(LedgerError::InvalidDay { field, value });
            }
        }
        Ok(())
    }
}

/// Combined balance over combined limit across all cards; 0 without cards.
pub fn aggregate_utilization(cards: &[CreditCard]) -> Decimal {
    let balance: Money = cards.iter().map(|c| c.current_balance).sum();
    let limit: Money = cards.iter().map(|c| c.credit_limit).sum();
    percent_of(balance.amount(), limit.amount()).unwrap_or(Decimal::ZERO)
}
