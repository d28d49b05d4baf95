//! Currency amounts backed by fixed-point decimals.
//!
//! Arithmetic keeps the full precision of `rust_decimal` so that the
//! settlement algorithm never compounds rounding error. Rounding to cents
//! happens only when a value is displayed, or serialized through
//! [`serialize_cents`].
//!
//! Addition and subtraction saturate at the bounds of `Decimal` instead of
//! panicking. Ingestion rejects anything above [`Money::MAX_EXPENSE`], so
//! saturation is never reached from validated input.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// A currency amount.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use trip_settlement::Money;
///
/// let amount = Money::from_str("100").unwrap();
/// assert_eq!(amount.split(3).to_string(), "33.33");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    /// Number of decimal places shown at presentation time.
    pub const DISPLAY_SCALE: u32 = 2;

    /// Zero value.
    pub const ZERO: Self = Money(Decimal::ZERO);

    /// One cent, the default settlement tolerance.
    pub const CENT: Self = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// Largest single expense accepted at ingestion (10^15).
    pub const MAX_EXPENSE: Self =
        Money(Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0));

    /// Builds an amount from an integer number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    /// Divides the amount evenly among `parts` people.
    ///
    /// Returns zero when `parts` is zero instead of dividing by zero.
    pub fn split(self, parts: usize) -> Self {
        if parts == 0 {
            return Money::ZERO;
        }
        Money(self.0 / Decimal::from(parts))
    }

    /// Rounds to cents, midpoint away from zero.
    pub fn rounded(self) -> Self {
        Money(self.0.round_dp_with_strategy(
            Self::DISPLAY_SCALE,
            RoundingStrategy::MidpointAwayFromZero,
        ))
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shown = self.rounded().0;
        // -0.00 reads badly in reports
        if shown.is_zero() {
            shown = Decimal::ZERO;
        }
        write!(f, "{:.2}", shown)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

/// Serializes an amount rounded to cents, for presentation types.
pub fn serialize_cents<S>(value: &Money, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    #[test]
    fn test_display_uses_two_places() {
        assert_eq!(money("1").to_string(), "1.00");
        assert_eq!(money("1.5").to_string(), "1.50");
        assert_eq!(money("  2.345  ").to_string(), "2.35");
        assert_eq!(money("-2.345").to_string(), "-2.35");
    }

    #[test]
    fn test_arithmetic_keeps_full_precision() {
        let third = money("100").split(3);
        assert_ne!(third, third.rounded());
        assert_eq!(third.rounded(), money("33.33"));

        let sum = third + third + third;
        assert!((sum - money("100")).abs() < Money::CENT);
    }

    #[test]
    fn test_split_by_zero_is_zero() {
        assert_eq!(money("42").split(0), Money::ZERO);
    }

    #[test]
    fn test_cent_constant() {
        assert_eq!(Money::CENT, money("0.01"));
        assert_eq!(Money::from_cents(1), Money::CENT);
    }

    #[test]
    fn test_negative_zero_displays_as_zero() {
        assert_eq!(money("-0.001").to_string(), "0.00");
        assert!(!money("-0").is_negative());
        assert!(money("-0.5").is_negative());
    }

    #[test]
    fn test_sum() {
        let values = [money("1.10"), money("2.20"), money("3.30")];
        assert_eq!(values.iter().sum::<Money>(), money("6.60"));
    }

    #[test]
    fn test_serde_keeps_full_precision() {
        let json = serde_json::to_string(&money("12.345")).unwrap();
        assert_eq!(json, "\"12.345\"");

        let third = money("100").split(3);
        let back: Money = serde_json::from_str(&serde_json::to_string(&third).unwrap()).unwrap();
        assert_eq!(back, third);

        let parsed: Money = serde_json::from_str("\" 7.5 \"").unwrap();
        assert_eq!(parsed, money("7.5"));
    }

    #[test]
    fn test_serialize_cents_rounds() {
        #[derive(Serialize)]
        struct Shown {
            #[serde(serialize_with = "serialize_cents")]
            amount: Money,
        }

        let json = serde_json::to_string(&Shown {
            amount: money("12.345"),
        })
        .unwrap();
        assert_eq!(json, r#"{"amount":"12.35"}"#);
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_panicking() {
        let huge = money("50000000000000000000000000000");
        let sum = huge + huge;
        assert_eq!(sum, Money(Decimal::MAX));

        let mut acc = Money::ZERO;
        acc -= huge;
        acc -= huge;
        assert_eq!(acc, Money(Decimal::MIN));

        let total: Money = [huge, huge, huge].iter().sum();
        assert_eq!(total, Money(Decimal::MAX));
    }

    #[test]
    fn test_max_expense_constant() {
        assert_eq!(Money::MAX_EXPENSE, money("1000000000000000"));
    }
}
