//! Bank CSV exports into ledger transactions.

pub mod csv;

pub use csv::{parse_transactions, ImportError, ImportReport, ParsedCsv};
