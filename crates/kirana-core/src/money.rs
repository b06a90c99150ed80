//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    ₹10.50 is stored as 1050 paise; every total is exact                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! On the JSON boundary an amount is a decimal number of rupees (`10.5`).
//! Incoming amounts may also be decimal strings (`"10.50"`), which is how
//! form posts usually arrive. More than two fractional digits is rejected
//! rather than rounded.
//!
//! ## Usage
//! ```rust
//! use kirana_core::money::Money;
//!
//! let price = Money::from_paise(1099); // ₹10.99
//! let total = price * 2 + Money::from_paise(500);
//! assert_eq!(total.paise(), 2698);
//!
//! assert_eq!(Money::parse_decimal("10.5"), Some(Money::from_paise(1050)));
//! assert_eq!(Money::parse_decimal("10.555"), None);
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

/// A rupee amount stored as integer paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates money from paise (1/100 rupee).
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates money from whole rupees.
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Returns the amount in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee part (truncated toward zero).
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise part (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    pub fn checked_mul_quantity(&self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two amounts, returning `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Parses a decimal rupee string such as `"10"`, `"10.5"` or `"-3.25"`.
    ///
    /// Returns `None` for anything that is not a plain decimal with at most
    /// two fractional digits.
    pub fn parse_decimal(input: &str) -> Option<Money> {
        let s = input.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if frac.len() > 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let rupees: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let paise_part: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().ok()? * 10,
            _ => frac.parse().ok()?,
        };

        let total = rupees.checked_mul(100)?.checked_add(paise_part)?;
        Some(Money(if negative { -total } else { total }))
    }

    /// Converts a rupee float, rejecting sub-paisa precision.
    pub fn from_rupees_f64(value: f64) -> Option<Money> {
        if !value.is_finite() {
            return None;
        }
        let scaled = value * 100.0;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-6 || rounded.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Money(rounded as i64))
    }

    /// Interprets a JSON value (number of rupees or decimal string).
    pub fn from_json(value: &serde_json::Value) -> Option<Money> {
        match value {
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(rupees) => rupees.checked_mul(100).map(Money),
                None => n.as_f64().and_then(Money::from_rupees_f64),
            },
            serde_json::Value::String(s) => Money::parse_decimal(s),
            _ => None,
        }
    }

    /// Rupee value as a float, for the JSON boundary only.
    pub fn as_rupees_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_rupees_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Money::from_json(&value).ok_or_else(|| {
            D::Error::custom(format!("invalid rupee amount: {}", value))
        })
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
        assert_eq!(Money::from_rupees(10).paise(), 1000);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(1099).to_string(), "₹10.99");
        assert_eq!(Money::from_paise(500).to_string(), "₹5.00");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
        assert_eq!(Money::zero().to_string(), "₹0.00");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("10"), Some(Money::from_paise(1000)));
        assert_eq!(Money::parse_decimal(" 10.5 "), Some(Money::from_paise(1050)));
        assert_eq!(Money::parse_decimal("0.07"), Some(Money::from_paise(7)));
        assert_eq!(Money::parse_decimal(".5"), Some(Money::from_paise(50)));
        assert_eq!(Money::parse_decimal("-3.25"), Some(Money::from_paise(-325)));

        assert_eq!(Money::parse_decimal(""), None);
        assert_eq!(Money::parse_decimal("."), None);
        assert_eq!(Money::parse_decimal("abc"), None);
        assert_eq!(Money::parse_decimal("1.234"), None);
        assert_eq!(Money::parse_decimal("1,000"), None);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Money::from_json(&json!(10)), Some(Money::from_paise(1000)));
        assert_eq!(Money::from_json(&json!(10.99)), Some(Money::from_paise(1099)));
        assert_eq!(Money::from_json(&json!("2.50")), Some(Money::from_paise(250)));
        assert_eq!(Money::from_json(&json!(0.001)), None);
        assert_eq!(Money::from_json(&json!(null)), None);
        assert_eq!(Money::from_json(&json!(true)), None);
    }

    #[test]
    fn test_serde_uses_rupees() {
        let json = serde_json::to_value(Money::from_paise(3050)).unwrap();
        assert_eq!(json, json!(30.5));

        let parsed: Money = serde_json::from_value(json!("12.25")).unwrap();
        assert_eq!(parsed.paise(), 1225);

        assert!(serde_json::from_value::<Money>(json!("twelve")).is_err());
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);
        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);
        assert_eq!((a * 3).paise(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.paise(), 2000);
    }

    #[test]
    fn test_checked_ops() {
        assert_eq!(
            Money::from_paise(299).checked_mul_quantity(3),
            Some(Money::from_paise(897))
        );
        assert_eq!(Money::from_paise(i64::MAX).checked_mul_quantity(2), None);
        assert_eq!(Money::from_paise(i64::MAX).checked_add(Money::from_paise(1)), None);
    }
}
