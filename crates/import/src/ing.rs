//! ING bank statement parser.
//!
//! Parses the CSV account statements ING exports. The column order is the
//! same in the Dutch and English exports, so rows are read by position and
//! only the canonical (English) field names matter to preset conditions.

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::Decimal;

use moneta_core::{BankTransaction, Direction, Money};

use crate::statement::{
    select_most_recent, Statement, StatementError, StatementFile, StatementParser,
};

const COL_DATE: (usize, &str) = (0, "date");
const COL_NAME: (usize, &str) = (1, "name");
const COL_COUNTERPARTY: (usize, &str) = (3, "counterparty");
const COL_DIRECTION: (usize, &str) = (5, "debit/credit");
const COL_AMOUNT: (usize, &str) = (6, "amount");
const COL_NOTIFICATIONS: (usize, &str) = (8, "notifications");

/// Dates in the statement body are compact: `20240305`.
const BODY_DATE_FORMAT: &str = "%Y%m%d";

pub struct IngParser;

impl StatementParser for IngParser {
    fn locate(&self, dir: &Path) -> Result<StatementFile, StatementError> {
        select_most_recent(dir, "csv", chrono::Local::now().date_naive())
    }

    fn parse(&self, file: &StatementFile) -> Result<Statement, StatementError> {
        let mut reader = csv::Reader::from_path(&file.path)?;
        let mut transactions = Vec::new();

        for (row, result) in reader.records().enumerate() {
            let record = result?;
            transactions.push(parse_row(&record, row)?);
        }

        Ok(Statement {
            transactions,
            range: file.range,
        })
    }
}

fn parse_row(record: &StringRecord, row: usize) -> Result<BankTransaction, StatementError> {
    let date = field(record, row, COL_DATE)?;
    let date = NaiveDate::parse_from_str(date.trim(), BODY_DATE_FORMAT).map_err(|_| {
        StatementError::InvalidDate {
            row,
            value: date.to_string(),
        }
    })?;

    let direction = field(record, row, COL_DIRECTION)?;
    let direction =
        Direction::from_str(direction).map_err(|_| StatementError::InvalidDirection {
            row,
            value: direction.to_string(),
        })?;

    let amount = field(record, row, COL_AMOUNT)?;
    let amount = parse_amount(amount).ok_or_else(|| StatementError::InvalidAmount {
        row,
        value: amount.to_string(),
    })?;

    Ok(BankTransaction {
        date,
        name: field(record, row, COL_NAME)?.to_string(),
        counterparty: field(record, row, COL_COUNTERPARTY)?.to_string(),
        amount,
        direction,
        notifications: field(record, row, COL_NOTIFICATIONS)?.to_string(),
    })
}

fn field<'r>(
    record: &'r StringRecord,
    row: usize,
    column: (usize, &'static str),
) -> Result<&'r str, StatementError> {
    record.get(column.0).ok_or(StatementError::MissingColumn {
        row,
        column: column.1,
    })
}

/// ING writes amounts with a comma decimal separator.
fn parse_amount(s: &str) -> Option<Money> {
    let normalized = s.trim().replace(',', ".");
    Decimal::from_str(&normalized).ok().map(Money::from_decimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moneta_core::DateRange;
    use std::fs;

    const HEADER: &str = "\"Date\",\"Name / Description\",\"Account\",\"Counterparty\",\"Code\",\"Debit/credit\",\"Amount (EUR)\",\"Transaction type\",\"Notifications\"\n";

    fn write_statement(dir: &Path, name: &str, body: &str) -> StatementFile {
        let path = dir.join(name);
        fs::write(&path, format!("{HEADER}{body}")).unwrap();
        StatementFile {
            path,
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 30).unwrap(),
            ),
        }
    }

    #[test]
    fn parses_rows_with_comma_amounts() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_statement(
            dir.path(),
            "acct_01-03-2024_30-03-2024.csv",
            "20240305,Albert Heijn 1342,NL12ABCD0001,NL99EFGH0002,BA,Debit,\"12,50\",Payment terminal,Pasvolgnr: 001\n\
             20240307,Salary March,NL12ABCD0001,NL55WXYZ0009,GT,Credit,\"2500,00\",Online banking,Salary payment\n",
        );

        let statement = IngParser.parse(&file).unwrap();
        assert_eq!(statement.transactions.len(), 2);

        let first = &statement.transactions[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(first.name, "Albert Heijn 1342");
        assert_eq!(first.counterparty, "NL99EFGH0002");
        assert_eq!(first.amount, Money::from_cents(1250));
        assert_eq!(first.direction, Direction::Debit);
        assert_eq!(first.notifications, "Pasvolgnr: 001");

        let second = &statement.transactions[1];
        assert_eq!(second.amount, Money::from_cents(250000));
        assert_eq!(second.direction, Direction::Credit);
    }

    #[test]
    fn statement_keeps_the_file_range() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_statement(
            dir.path(),
            "acct_01-03-2024_30-03-2024.csv",
            "20240305,Shop,NL12ABCD0001,,BA,Debit,\"1,00\",Payment terminal,\n",
        );

        let statement = IngParser.parse(&file).unwrap();
        assert_eq!(statement.range, file.range);
    }

    #[test]
    fn bad_date_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_statement(
            dir.path(),
            "acct_01-03-2024_30-03-2024.csv",
            "05-03-2024,Shop,NL12ABCD0001,,BA,Debit,\"1,00\",Payment terminal,\n",
        );

        let err = IngParser.parse(&file).unwrap_err();
        assert!(matches!(err, StatementError::InvalidDate { row: 0, .. }));
    }

    #[test]
    fn bad_amount_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_statement(
            dir.path(),
            "acct_01-03-2024_30-03-2024.csv",
            "20240305,Shop,NL12ABCD0001,,BA,Debit,twelve,Payment terminal,\n",
        );

        let err = IngParser.parse(&file).unwrap_err();
        assert!(matches!(err, StatementError::InvalidAmount { row: 0, .. }));
    }

    #[test]
    fn bad_direction_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_statement(
            dir.path(),
            "acct_01-03-2024_30-03-2024.csv",
            "20240305,Shop,NL12ABCD0001,,BA,Sideways,\"1,00\",Payment terminal,\n",
        );

        let err = IngParser.parse(&file).unwrap_err();
        assert!(matches!(err, StatementError::InvalidDirection { row: 0, .. }));
    }

    #[test]
    fn locate_and_parse_via_the_trait() {
        let dir = tempfile::tempdir().unwrap();
        write_statement(
            dir.path(),
            "acct_01-03-2024_30-03-2024.csv",
            "20240305,Shop,NL12ABCD0001,,BA,Debit,\"3,20\",Payment terminal,\n",
        );

        let statement = IngParser.load(dir.path()).unwrap();
        assert_eq!(statement.transactions.len(), 1);
        assert_eq!(
            statement.range.end,
            NaiveDate::from_ymd_opt(2024, 3, 30).unwrap()
        );
    }
}
