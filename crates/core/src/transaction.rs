use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::money::Money;

/// Whether a statement row took money out of the account or brought it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    /// Sign prefix used when rendering the row's amount.
    pub fn sign(self) -> char {
        match self {
            Direction::Debit => '-',
            Direction::Credit => '+',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Debit => write!(f, "Debit"),
            Direction::Credit => write!(f, "Credit"),
        }
    }
}

#[derive(Error, Debug)]
#[error("unknown direction: {0:?}")]
pub struct ParseDirectionError(String);

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debit" => Ok(Direction::Debit),
            "credit" => Ok(Direction::Credit),
            other => Err(ParseDirectionError(other.to_string())),
        }
    }
}

/// One row of a parsed bank statement. Immutable once loaded for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransaction {
    pub date: NaiveDate,
    pub name: String,
    pub counterparty: String,
    /// Magnitude only; [`Direction`] carries the sign.
    pub amount: Money,
    pub direction: Direction,
    pub notifications: String,
}

impl BankTransaction {
    /// String form of a named field, as preset conditions see it.
    /// Unknown fields read as empty text.
    pub fn field_text(&self, field: &str) -> String {
        match field {
            "date" => self.date.to_string(),
            "name" => self.name.clone(),
            "counterparty" => self.counterparty.clone(),
            "amount" => self.amount.to_string(),
            "direction" | "debit/credit" => self.direction.to_string(),
            "notifications" => self.notifications.clone(),
            _ => String::new(),
        }
    }
}

/// An entry already recorded in the remote wallet. Read-only reference
/// data for the dedup pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub note: Option<String>,
    pub amount: Money,
    pub date: NaiveDate,
    pub category: Option<String>,
}
