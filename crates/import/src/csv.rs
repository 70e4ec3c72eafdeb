use chrono::NaiveDate;
use finpulse_core::{AccountId, Money, Transaction, TransactionType, UnvalidatedTransaction};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const REQUIRED_COLUMNS: [&str; 3] = ["date", "description", "amount"];

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("CSV file has no header row")]
    NoHeaders,
    #[error("CSV file is not valid UTF-8")]
    InvalidUtf8,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub rows: Vec<Transaction>,
    /// Rows dropped for a bad date or amount, or a zero amount.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub parsed: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
}

struct Columns {
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, ImportError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| find(name).is_none())
            .map(|name| name.to_string())
            .collect();

        match (find("date"), find("description"), find("amount")) {
            (Some(date), Some(description), Some(amount)) => Ok(Columns {
                date,
                description,
                amount,
                category: find("category"),
            }),
            _ => Err(ImportError::MissingColumns(missing)),
        }
    }
}

/// Parses a bank export for `account_id`.
///
/// Positive amounts become credits and negative amounts debits. Rows that
/// cannot be read are skipped with a warning instead of failing the file.
pub fn parse_transactions(data: &[u8], account_id: AccountId) -> Result<ParsedCsv, ImportError> {
    let text = std::str::from_utf8(data).map_err(|_| ImportError::InvalidUtf8)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ImportError::NoHeaders);
    }
    let columns = Columns::locate(&headers)?;

    let mut parsed = ParsedCsv::default();
    for (index, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(line, error = %e, "Skipping unreadable CSV row");
                parsed.skipped += 1;
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }

        match parse_row(&record, &columns, account_id) {
            Ok(Some(row)) => parsed.rows.push(row),
            Ok(None) => parsed.skipped += 1,
            Err(reason) => {
                tracing::warn!(line, %reason, "Skipping CSV row");
                parsed.skipped += 1;
            }
        }
    }

    Ok(parsed)
}

fn parse_row(
    record: &csv::StringRecord,
    columns: &Columns,
    account_id: AccountId,
) -> Result<Option<Transaction>, String> {
    let field = |i: usize| record.get(i).unwrap_or_default();

    let date = parse_date(field(columns.date))?;
    let signed = parse_amount(field(columns.amount))?;
    if signed.is_zero() {
        return Ok(None);
    }
    let description = field(columns.description).to_string();
    let category = columns.category.map(|i| field(i).to_string());

    let transaction_type = if signed.is_negative() {
        TransactionType::Debit
    } else {
        TransactionType::Credit
    };

    Transaction::validate(UnvalidatedTransaction {
        account_id,
        amount: signed.abs(),
        transaction_type,
        category,
        description: Some(description),
        date,
    })
    .map(Some)
    .map_err(|e| e.to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("invalid date '{s}'"))
}

fn parse_amount(s: &str) -> Result<Money, String> {
    let s = s.trim();
    let (negative, inner) = match s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, s),
    };
    let cleaned = inner.replace([',', '$', ' '], "");
    let value = Decimal::from_str(&cleaned).map_err(|_| format!("invalid amount '{s}'"))?;
    let money = Money::from_decimal(value);
    Ok(if negative { -money } else { money })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: AccountId = AccountId(1);

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_amount_formats() {
        assert_eq!(parse_amount("123.45").unwrap(), Money::from_cents(12345));
        assert_eq!(parse_amount("$1,234.56").unwrap(), Money::from_cents(123456));
        assert_eq!(parse_amount("-50.00").unwrap(), Money::from_cents(-5000));
        assert_eq!(parse_amount("(75.25)").unwrap(), Money::from_cents(-7525));
        assert_eq!(parse_amount("100").unwrap(), Money::from_cents(10000));
        assert!(parse_amount("not_a_number").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(parse_date("2026-10-02").unwrap(), date(2026, 10, 2));
        assert_eq!(parse_date("10/02/2026").unwrap(), date(2026, 10, 2));
        assert!(parse_date("02.10.2026").is_err());
    }

    #[test]
    fn signs_map_to_debit_and_credit() {
        let data = b"Date,Description,Amount,Category\n\
2026-10-02,Coffee,-4.50,Dining\n\
2026-10-03,Payroll,\"2,000.00\",Income\n";
        let parsed = parse_transactions(data, ACCOUNT).unwrap();
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.rows.len(), 2);

        let coffee = &parsed.rows[0];
        assert_eq!(coffee.transaction_type, TransactionType::Debit);
        assert_eq!(coffee.amount, Money::from_cents(450));
        assert_eq!(coffee.category.as_deref(), Some("Dining"));

        let pay = &parsed.rows[1];
        assert_eq!(pay.transaction_type, TransactionType::Credit);
        assert_eq!(pay.amount, Money::from_cents(200_000));
    }

    #[test]
    fn headers_match_case_insensitively_in_any_order() {
        let data = b" AMOUNT ,date,DESCRIPTION\n-12.00,2026-10-05,Lunch\n";
        let parsed = parse_transactions(data, ACCOUNT).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].category, None);
        assert_eq!(parsed.rows[0].date, date(2026, 10, 5));
    }

    #[test]
    fn missing_columns_are_listed() {
        let err = parse_transactions(b"date,memo\n2026-10-05,x\n", ACCOUNT).unwrap_err();
        match err {
            ImportError::MissingColumns(cols) => assert_eq!(cols, ["description", "amount"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_file_has_no_headers() {
        assert!(matches!(
            parse_transactions(b"", ACCOUNT),
            Err(ImportError::NoHeaders)
        ));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(matches!(
            parse_transactions(b"date,description,amount\n\xff\xfe,x,1\n", ACCOUNT),
            Err(ImportError::InvalidUtf8)
        ));
    }

    #[test]
    fn bad_and_zero_rows_are_skipped() {
        let data = b"date,description,amount\n\
yesterday,Mystery,-5.00\n\
2026-10-06,Refund,abc\n\
2026-10-06,Nothing,0.00\n\
2026-10-07,Groceries,-82.10\n";
        let parsed = parse_transactions(data, ACCOUNT).unwrap();
        assert_eq!(parsed.skipped, 3);
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].description.as_deref(), Some("Groceries"));
    }
}
