//! # Money Module
//!
//! Provides the `Money` type for presenting and summing rupee amounts.
//!
//! ## Where Floats Stop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Line math (qty × rate × discount) runs on f64, exactly as entered.    │
//! │  Anything that is DISPLAYED, SPOKEN or COMPARED as currency goes       │
//! │  through Money first:                                                   │
//! │                                                                         │
//! │    270.004999 ──► Money::from_amount ──► 27000 paise ──► "₹270.00"      │
//! │                                                    └──► "two hundred    │
//! │                                                         seventy ..."    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tijori_core::money::Money;
//!
//! let price = Money::from_paise(12345678);
//! assert_eq!(price.to_string(), "₹1,23,456.78");
//!
//! let total = price + Money::from_amount(0.22);
//! assert_eq!(total.paise(), 12345700);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::words;

// =============================================================================
// Money Type
// =============================================================================

/// A rupee amount held in paise (1 rupee = 100 paise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise.
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Converts a computed amount to Money, rounding to the nearest paisa.
    ///
    /// Non-finite input (NaN, infinity) becomes zero.
    ///
    /// ## Example
    /// ```rust
    /// use tijori_core::money::Money;
    ///
    /// assert_eq!(Money::from_amount(270.0).paise(), 27000);
    /// assert_eq!(Money::from_amount(0.105).paise(), 11);
    /// assert_eq!(Money::from_amount(f64::NAN).paise(), 0);
    /// ```
    pub fn from_amount(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        // Nudge by a tiny epsilon so values like 0.105 (stored as 0.10499..)
        // round the way a cashier would expect.
        let scaled = amount * 100.0;
        let nudged = scaled + scaled.signum() * 1e-7;
        Money(nudged.round() as i64)
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the amount as a float, for storage in REAL columns.
    #[inline]
    pub fn amount(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Spells the amount out in Indian-English words.
    ///
    /// Negative amounts are spoken as zero.
    pub fn to_words(&self) -> String {
        words::money_words(*self)
    }

    /// Formats the absolute amount with Indian digit grouping, no symbol.
    ///
    /// ## Example
    /// ```rust
    /// use tijori_core::money::Money;
    ///
    /// assert_eq!(Money::from_paise(1_00_00_000_00).grouped(), "1,00,00,000.00");
    /// assert_eq!(Money::from_paise(99_950).grouped(), "999.50");
    /// ```
    pub fn grouped(&self) -> String {
        let rupees = self.rupees().unsigned_abs().to_string();
        let mut out = String::with_capacity(rupees.len() + rupees.len() / 2 + 3);

        if rupees.len() <= 3 {
            out.push_str(&rupees);
        } else {
            let (head, last3) = rupees.split_at(rupees.len() - 3);
            // Lakh/crore grouping: pairs above the thousands.
            let lead = head.len() % 2;
            if lead == 1 {
                out.push_str(&head[..1]);
            }
            for (i, pair) in head.as_bytes()[lead..].chunks(2).enumerate() {
                if i > 0 || lead == 1 {
                    out.push(',');
                }
                out.push_str(std::str::from_utf8(pair).unwrap_or_default());
            }
            out.push(',');
            out.push_str(last3);
        }

        out.push('.');
        out.push_str(&format!("{:02}", self.paise_part()));
        out
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}", sign, self.grouped())
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_paise() {
        let money = Money::from_paise(1099);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);
    }

    #[test]
    fn test_from_amount_rounds_to_paisa() {
        assert_eq!(Money::from_amount(320.0).paise(), 32000);
        assert_eq!(Money::from_amount(12.345).paise(), 1235);
        assert_eq!(Money::from_amount(-5.5).paise(), -550);
        assert_eq!(Money::from_amount(f64::INFINITY).paise(), 0);
    }

    #[test]
    fn test_display_indian_grouping() {
        assert_eq!(Money::from_paise(0).to_string(), "₹0.00");
        assert_eq!(Money::from_paise(50_000).to_string(), "₹500.00");
        assert_eq!(Money::from_paise(1_234_567).to_string(), "₹12,345.67");
        assert_eq!(Money::from_paise(12_345_678).to_string(), "₹1,23,456.78");
        assert_eq!(Money::from_paise(1_234_567_800).to_string(), "₹1,23,45,678.00");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_paise(1000);
        let b = Money::from_paise(500);
        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.paise(), 2000);
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_paise(1).is_positive());
        assert!(Money::from_paise(-1).is_negative());
    }

    #[test]
    fn test_to_words() {
        assert_eq!(
            Money::from_paise(10_050).to_words(),
            "one hundred rupees and fifty paise only"
        );
    }
}
