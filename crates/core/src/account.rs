use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::money::Money;

pub const DEFAULT_CURRENCY: &str = "CAD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Chequing,
    Savings,
    Cash,
    Loan,
    LineOfCredit,
    Other,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::Chequing => "chequing",
            AccountType::Savings => "savings",
            AccountType::Cash => "cash",
            AccountType::Loan => "loan",
            AccountType::LineOfCredit => "line_of_credit",
            AccountType::Other => "other",
        }
    }

    pub fn is_asset(self) -> bool {
        matches!(
            self,
            AccountType::Chequing | AccountType::Savings | AccountType::Cash
        )
    }

    /// Balances of these accounts are amounts owed.
    pub fn is_liability(self) -> bool {
        matches!(self, AccountType::Loan | AccountType::LineOfCredit)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chequing" | "checking" => Ok(AccountType::Chequing),
            "savings" => Ok(AccountType::Savings),
            "cash" => Ok(AccountType::Cash),
            "loan" => Ok(AccountType::Loan),
            "line_of_credit" => Ok(AccountType::LineOfCredit),
            "other" => Ok(AccountType::Other),
            other => Err(LedgerError::UnknownKind {
                kind: "account type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Option<AccountId>,
    pub name: String,
    pub account_type: AccountType,
    pub institution: Option<String>,
    pub balance: Money,
    pub currency: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn new(name: &str, account_type: AccountType, balance: Money) -> Self {
        Account {
            id: None,
            name: name.to_string(),
            account_type,
            institution: None,
            balance,
            currency: DEFAULT_CURRENCY.to_string(),
            created_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        require_name("account name", &self.name)?;
        if self.currency.trim().len() != 3 {
            return Err(LedgerError::InvalidCurrency(self.currency.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Money),
    #[error("Amount must not be negative, got {0}")]
    NegativeAmount(Money),
    #[error("{0} must not be empty")]
    EmptyName(&'static str),
    #[error("{field} must be between 1 and 31, got {value}")]
    InvalidDay { field: &'static str, value: u8 },
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),
    #[error("Unknown {kind}: '{value}'")]
    UnknownKind { kind: &'static str, value: String },
}

pub(crate) fn require_name(field: &'static str, value: &str) -> Result<(), LedgerError> {
    if value.trim().is_empty() {
        return Err(LedgerError::EmptyName(field));
    }
    Ok(())
}

pub(crate) fn require_non_negative(amount: Money) -> Result<(), LedgerError> {
    if amount.is_negative() {
        return Err(LedgerError::NegativeAmount(amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_and_liability_types_are_disjoint() {
        for t in [
            AccountType::Chequing,
            AccountType::Savings,
            AccountType::Cash,
            AccountType::Loan,
            AccountType::LineOfCredit,
            AccountType::Other,
        ] {
            assert!(!(t.is_asset() && t.is_liability()), "{t}");
        }
        assert!(!AccountType::Other.is_asset());
        assert!(!AccountType::Other.is_liability());
    }

    #[test]
    fn account_type_parses_aliases() {
        assert_eq!("Checking".parse::<AccountType>().unwrap(), AccountType::Chequing);
        assert_eq!(
            "line_of_credit".parse::<AccountType>().unwrap(),
            AccountType::LineOfCredit
        );
        assert!(matches!(
            "brokerage".parse::<AccountType>(),
            Err(LedgerError::UnknownKind { .. })
        ));
    }

    #[test]
    fn account_type_serializes_snake_case() {
        let json = serde_json::to_string(&AccountType::LineOfCredit).unwrap();
        assert_eq!(json, "\"line_of_credit\"");
    }

    #[test]
    fn validate_rejects_blank_name_and_bad_currency() {
        let mut account = Account::new("  ", AccountType::Chequing, Money::zero());
        assert_eq!(account.validate(), Err(LedgerError::EmptyName("account name")));

        account.name = "Everyday".to_string();
        account.currency = "DOLLARS".to_string();
        assert!(matches!(account.validate(), Err(LedgerError::InvalidCurrency(_))));

        account.currency = "CAD".to_string();
        assert!(account.validate().is_ok());
    }
}
