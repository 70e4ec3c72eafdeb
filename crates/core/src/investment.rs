use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::{require_name, require_non_negative, LedgerError};
use super::money::Money;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    pub id: Option<i64>,
    pub investment_type: String,
    pub institution: Option<String>,
    pub current_value: Money,
    pub book_value: Money,
    pub monthly_contribution: Money,
    pub created_at: Option<DateTime<Utc>>,
}

impl Investment {
    pub fn gain_loss(&self) -> Money {
        self.current_value - self.book_value
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        require_name("investment type", &self.investment_type)?;
        require_non_negative(self.current_value)?;
        require_non_negative(self.book_value)?;
        require_non_negative(self.monthly_contribution)
    }
}

/// An investment as the API reports it, with its unrealized gain.
#[derive(Debug, Clone, Serialize)]
pub struct InvestmentSummary {
    #[serde(flatten)]
    pub investment: Investment,
    pub gain_loss: Money,
}

impl From<Investment> for InvestmentSummary {
    fn from(investment: Investment) -> Self {
        let gain_loss = investment.gain_loss();
        InvestmentSummary {
            investment,
            gain_loss,
        }
    }
}

/// Purchases paid off in fixed monthly instalments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub id: Option<i64>,
    pub description: String,
    pub monthly_payment: Money,
    pub remaining_payments: u32,
    pub created_at: Option<DateTime<Utc>>,
}

impl InstallmentPlan {
    pub fn remaining_amount(&self) -> Money {
        self.monthly_payment
            .scale(rust_decimal::Decimal::from(self.remaining_payments))
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        require_name("installment description", &self.description)?;
        require_non_negative(self.monthly_payment)
    }
}
