use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use super::account::{AccountId, LedgerError};
use super::money::Money;
use super::period::DateRange;

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Debits leave the user's hands, credits arrive in them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl TransactionType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Debit => "debit",
            TransactionType::Credit => "credit",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debit" => Ok(TransactionType::Debit),
            "credit" => Ok(TransactionType::Credit),
            other => Err(LedgerError::UnknownKind {
                kind: "transaction type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnvalidatedTransaction {
    pub account_id: AccountId,
    pub amount: Money,
    pub transaction_type: TransactionType,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Option<i64>,
    pub account_id: AccountId,
    pub amount: Money,
    pub transaction_type: TransactionType,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub created_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn validate(tx: UnvalidatedTransaction) -> Result<Transaction, LedgerError> {
        if !tx.amount.is_positive() {
            return Err(LedgerError::NonPositiveAmount(tx.amount));
        }

        Ok(Transaction {
            id: None,
            account_id: tx.account_id,
            amount: tx.amount,
            transaction_type: tx.transaction_type,
            category: normalize(tx.category),
            description: normalize(tx.description),
            date: tx.date,
            created_at: None,
        })
    }

    pub fn is_debit(&self) -> bool {
        self.transaction_type == TransactionType::Debit
    }

    /// Negative for debits.
    pub fn signed_amount(&self) -> Money {
        match self.transaction_type {
            TransactionType::Debit => -self.amount,
            TransactionType::Credit => self.amount,
        }
    }

    /// SHA-256 over `account|date|signed cents|description`, hex encoded.
    /// Equal for the same bank line whether typed in or imported.
    pub fn fingerprint(&self) -> String {
        let description = self.description.as_deref().unwrap_or_default().trim();
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}|{}",
            self.account_id.0,
            self.date,
            self.signed_amount().to_cents(),
            description
        ));
        hex::encode(hasher.finalize())
    }

    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }
}

/// Total of the `kind` transactions dated inside `range`.
pub fn total_in_range<'a, I>(transactions: I, kind: TransactionType, range: DateRange) -> Money
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|t| t.transaction_type == kind && range.contains(t.date))
        .map(|t| t.amount)
        .sum()
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn unvalidated(cents: i64, kind: TransactionType) -> UnvalidatedTransaction {
        UnvalidatedTransaction {
            account_id: AccountId(1),
            amount: Money::from_cents(cents),
            transaction_type: kind,
            category: Some("  Groceries ".to_string()),
            description: Some(String::new()),
            date: date(2026, 10, 14),
        }
    }

    #[test]
    fn validate_accepts_positive_amount() {
        let tx = Transaction::validate(unvalidated(4599, TransactionType::Debit)).unwrap();
        assert_eq!(tx.amount.to_cents(), 4599);
        assert!(tx.is_debit());
        assert_eq!(tx.category.as_deref(), Some("Groceries"));
        assert_eq!(tx.description, None);
    }

    #[test]
    fn validate_rejects_zero_and_negative() {
        assert!(matches!(
            Transaction::validate(unvalidated(0, TransactionType::Credit)),
            Err(LedgerError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            Transaction::validate(unvalidated(-100, TransactionType::Debit)),
            Err(LedgerError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn fingerprint_is_signed_and_account_scoped() {
        let mut coffee = Transaction::validate(unvalidated(450, TransactionType::Debit)).unwrap();
        coffee.description = Some("Coffee".to_string());
        assert_eq!(coffee.signed_amount(), Money::from_cents(-450));
        assert_eq!(coffee.fingerprint().len(), 64);

        let padded = Transaction {
            description: Some(" Coffee ".to_string()),
            ..coffee.clone()
        };
        assert_eq!(padded.fingerprint(), coffee.fingerprint());

        let refund = Transaction {
            transaction_type: TransactionType::Credit,
            ..coffee.clone()
        };
        assert_ne!(refund.fingerprint(), coffee.fingerprint());

        let elsewhere = Transaction {
            account_id: AccountId(2),
            ..coffee.clone()
        };
        assert_ne!(elsewhere.fingerprint(), coffee.fingerprint());
    }

    #[test]
    fn category_defaults_to_uncategorized() {
        let mut tx = Transaction::validate(unvalidated(100, TransactionType::Debit)).unwrap();
        tx.category = None;
        assert_eq!(tx.category_or_default(), UNCATEGORIZED);
    }

    #[test]
    fn total_in_range_filters_kind_and_dates() {
        let mk = |cents, kind, d| Transaction {
            date: d,
            ..Transaction::validate(unvalidated(cents, kind)).unwrap()
        };
        let txs = vec![
            mk(1000, TransactionType::Debit, date(2026, 10, 12)),
            mk(2000, TransactionType::Debit, date(2026, 10, 18)),
            mk(4000, TransactionType::Debit, date(2026, 10, 19)),
            mk(8000, TransactionType::Credit, date(2026, 10, 13)),
        ];
        let week = DateRange::new(date(2026, 10, 12), date(2026, 10, 18));
        assert_eq!(
            total_in_range(&txs, TransactionType::Debit, week),
            Money::from_cents(3000)
        );
        assert_eq!(
            total_in_range(&txs, TransactionType::Credit, week),
            Money::from_cents(8000)
        );
    }

    #[test]
    fn transaction_type_round_trips_through_str() {
        assert_eq!("DEBIT".parse::<TransactionType>().unwrap(), TransactionType::Debit);
        assert_eq!(TransactionType::Credit.to_string(), "credit");
        assert!("transfer".parse::<TransactionType>().is_err());
    }
}
