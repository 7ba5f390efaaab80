use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

/// A named account in the remote ledger service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub name: String,
    pub balance: Money,
    pub currency: String,
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.name, self.balance, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_balance_and_currency() {
        let wallet = Wallet {
            id: "w1".to_string(),
            name: "Daily".to_string(),
            balance: Money::from_cents(123456),
            currency: "EUR".to_string(),
        };
        assert_eq!(wallet.to_string(), "Daily (1234.56 EUR)");
    }
}
