use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A monetary amount held to two decimal places.
///
/// Statement rows carry the magnitude here and the sign in
/// [`Direction`](crate::transaction::Direction); ledger entries carry the
/// amount exactly as the wallet service reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::from(cents) / Decimal::from(100))
    }

    pub fn to_cents(self) -> i64 {
        (self.0 * Decimal::from(100)).to_i64().unwrap()
    }

    /// Rounds to two decimal places.
    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// The amount as a float, for wire formats that want a JSON number.
    /// Safe at two decimal places.
    pub fn to_f64(self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::str::FromStr;

    #[test]
    fn cents_round_trip() {
        assert_eq!(Money::from_cents(1250).to_cents(), 1250);
        assert_eq!(Money::from_cents(-1).to_cents(), -1);
    }

    #[test]
    fn from_decimal_rounds_to_two_places() {
        let m = Money::from_decimal(Decimal::from_str("12.345").unwrap());
        assert_eq!(m.to_string(), "12.35");
    }

    #[test]
    fn display_pads_to_two_places() {
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-75).to_string(), "-0.75");
    }

    #[test]
    fn equal_amounts_hash_equal_regardless_of_scale() {
        // "12.50" and "12.5" must land in the same set bucket.
        let a = Money::from_decimal(Decimal::from_str("12.50").unwrap());
        let b = Money::from_decimal(Decimal::from_str("12.5").unwrap());
        assert_eq!(a, b);
        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn arithmetic() {
        let sum = Money::from_cents(150) + Money::from_cents(250);
        assert_eq!(sum.to_cents(), 400);
        let diff = Money::from_cents(150) - Money::from_cents(250);
        assert_eq!(diff.to_cents(), -100);
    }
}
