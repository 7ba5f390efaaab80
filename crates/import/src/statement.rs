use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use moneta_core::{BankTransaction, DateRange};

/// Statement file names encode the account and the covered period:
/// `{account}_{DD-MM-YYYY}_{DD-MM-YYYY}.{ext}`.
const NAME_PATTERN: &str = r"^(.+)_(\d{2}-\d{2}-\d{4})_(\d{2}-\d{2}-\d{4})";
const NAME_DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("no statement file found in {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: invalid date {value:?}")]
    InvalidDate { row: usize, value: String },
    #[error("row {row}: invalid amount {value:?}")]
    InvalidAmount { row: usize, value: String },
    #[error("row {row}: invalid direction {value:?}")]
    InvalidDirection { row: usize, value: String },
    #[error("row {row}: missing column {column}")]
    MissingColumn { row: usize, column: &'static str },
}

/// A located statement file and the period its name declares.
#[derive(Debug, Clone)]
pub struct StatementFile {
    pub path: PathBuf,
    pub range: DateRange,
}

/// A parsed statement: its rows plus the period from the file name. The
/// period drives which ledger entries the reconciliation fetches.
#[derive(Debug, Clone)]
pub struct Statement {
    pub transactions: Vec<BankTransaction>,
    pub range: DateRange,
}

/// One bank's statement format. `locate` finds the file to ingest,
/// `parse` turns it into rows; other banks plug in by implementing the
/// same pair.
pub trait StatementParser {
    fn locate(&self, dir: &Path) -> Result<StatementFile, StatementError>;
    fn parse(&self, file: &StatementFile) -> Result<Statement, StatementError>;

    fn load(&self, dir: &Path) -> Result<Statement, StatementError> {
        let file = self.locate(dir)?;
        self.parse(&file)
    }
}

/// Scans `dir` for statement files with the given extension and picks the
/// one whose end date minimizes the signed distance `today - end`.
///
/// A later end date always wins, so a file dated in the future beats any
/// past file. The improvement is strict; ties keep the first candidate in
/// directory order, which callers must not rely on.
pub fn select_most_recent(
    dir: &Path,
    extension: &str,
    today: NaiveDate,
) -> Result<StatementFile, StatementError> {
    let pattern = Regex::new(NAME_PATTERN).unwrap();
    let mut best: Option<(i64, StatementFile)> = None;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if !name.ends_with(&format!(".{extension}")) {
            continue;
        }
        let Some(caps) = pattern.captures(name) else {
            continue;
        };
        let (Ok(start), Ok(end)) = (
            NaiveDate::parse_from_str(&caps[2], NAME_DATE_FORMAT),
            NaiveDate::parse_from_str(&caps[3], NAME_DATE_FORMAT),
        ) else {
            debug!(name, "skipping statement with unparseable dates");
            continue;
        };

        let days_diff = (today - end).num_days();
        if best.as_ref().is_none_or(|(closest, _)| days_diff < *closest) {
            best = Some((
                days_diff,
                StatementFile {
                    path: entry.path(),
                    range: DateRange::new(start, end),
                },
            ));
        }
    }

    best.map(|(_, file)| file)
        .ok_or_else(|| StatementError::NotFound(dir.to_path_buf()))
}
