//! Money type for representing monetary values.
//!
//! Uses an integer count of the currency's minor unit (paise) to avoid
//! floating-point precision issues that plague monetary calculations. The
//! store trades in a single currency, so no currency tag is carried.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};

/// Symbol used when formatting amounts.
pub const CURRENCY_SYMBOL: &str = "\u{20b9}";

/// Minor units per major unit.
const MINOR_PER_MAJOR: i64 = 100;

/// A monetary amount in minor units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money {
    /// Amount in minor units (paise).
    pub amount_minor: i64,
}

impl Money {
    /// Create a Money value from minor units.
    pub const fn new(amount_minor: i64) -> Self {
        Self { amount_minor }
    }

    /// Create a Money value from whole major units.
    ///
    /// ```
    /// use folio_commerce::money::Money;
    /// assert_eq!(Money::from_major(349).amount_minor, 34900);
    /// ```
    pub const fn from_major(amount: i64) -> Self {
        Self::new(amount * MINOR_PER_MAJOR)
    }

    /// Zero.
    pub const fn zero() -> Self {
        Self::new(0)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_minor == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_minor < 0
    }

    /// Add, returning `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.amount_minor.checked_add(other.amount_minor).map(Money::new)
    }

    /// Multiply by a quantity, returning `None` on overflow.
    pub fn checked_mul(&self, factor: i64) -> Option<Money> {
        self.amount_minor.checked_mul(factor).map(Money::new)
    }

    /// Sum an iterator of Money values, returning `None` on overflow.
    pub fn try_sum(iter: impl IntoIterator<Item = Money>) -> Option<Money> {
        iter.into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }

    /// Whole-percent share of this amount, rounded half away from zero to
    /// the nearest minor unit.
    ///
    /// ```
    /// use folio_commerce::money::Money;
    /// // 18% of 12.50 is 2.25
    /// assert_eq!(Money::new(1250).percentage(18), Some(Money::new(225)));
    /// // 18% of 0.03 is 0.0054, rounds to 0.01
    /// assert_eq!(Money::new(3).percentage(18), Some(Money::new(1)));
    /// ```
    pub fn percentage(&self, percent: u32) -> Option<Money> {
        let scaled = self.amount_minor.checked_mul(i64::from(percent))?;
        Some(Money::new(div_round(scaled, 100)))
    }

    /// Whole-percent share of this amount, rounded half away from zero to
    /// the nearest whole major unit.
    ///
    /// ```
    /// use folio_commerce::money::Money;
    /// // 18% of 399.00 is 71.82
    /// assert_eq!(Money::from_major(399).percentage_whole(18), Some(Money::from_major(72)));
    /// // 18% of 25.00 is 4.50
    /// assert_eq!(Money::from_major(25).percentage_whole(18), Some(Money::from_major(5)));
    /// ```
    pub fn percentage_whole(&self, percent: u32) -> Option<Money> {
        let scaled = self.amount_minor.checked_mul(i64::from(percent))?;
        let major = div_round(scaled, 100 * MINOR_PER_MAJOR);
        major.checked_mul(MINOR_PER_MAJOR).map(Money::new)
    }

    /// Format as a display string (e.g., "₹349.00").
    pub fn display(&self) -> String {
        let sign = if self.amount_minor < 0 { "-" } else { "" };
        let abs = self.amount_minor.unsigned_abs();
        let major = abs / MINOR_PER_MAJOR as u64;
        let minor = abs % MINOR_PER_MAJOR as u64;
        format!("{sign}{CURRENCY_SYMBOL}{major}.{minor:02}")
    }
}

/// Divide, rounding half away from zero.
fn div_round(value: i64, divisor: i64) -> i64 {
    let quotient = value / divisor;
    if (value % divisor).abs() * 2 >= divisor {
        quotient + value.signum()
    } else {
        quotient
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money::new(self.amount_minor + other.amount_minor)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money::new(self.amount_minor - other.amount_minor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(34900).display(), "\u{20b9}349.00");
        assert_eq!(Money::new(5).display(), "\u{20b9}0.05");
        assert_eq!(Money::new(-150).display(), "-\u{20b9}1.50");
    }

    #[test]
    fn test_percentage_rounds_half_away_from_zero() {
        // 18% of 2.50 = 0.45 exactly
        assert_eq!(Money::new(250).percentage(18), Some(Money::new(45)));
        // 18% of 0.25 = 0.045 -> 0.05
        assert_eq!(Money::new(25).percentage(18), Some(Money::new(5)));
        // 18% of 0.22 = 0.0396 -> 0.04
        assert_eq!(Money::new(22).percentage(18), Some(Money::new(4)));
    }

    #[test]
    fn test_percentage_whole_rounds_to_rupees() {
        assert_eq!(Money::from_major(399).percentage_whole(18), Some(Money::new(7200)));
        // 143.64
        assert_eq!(Money::from_major(798).percentage_whole(18), Some(Money::new(14400)));
        // 0.45 rounds down, 0.54 rounds up
        assert_eq!(Money::new(250).percentage_whole(18), Some(Money::zero()));
        assert_eq!(Money::from_major(3).percentage_whole(18), Some(Money::from_major(1)));
        assert_eq!(Money::new(-1250).percentage_whole(20), Some(Money::from_major(-3)));
        assert_eq!(Money::new(i64::MAX).percentage_whole(18), None);
    }

    #[test]
    fn test_try_sum_detects_overflow() {
        let total = Money::try_sum([Money::new(100), Money::new(250)]);
        assert_eq!(total, Some(Money::new(350)));

        let overflow = Money::try_sum([Money::new(i64::MAX), Money::new(1)]);
        assert_eq!(overflow, None);
    }

    #[test]
    fn test_checked_mul() {
        assert_eq!(Money::new(34900).checked_mul(3), Some(Money::new(104700)));
        assert_eq!(Money::new(i64::MAX).checked_mul(2), None);
    }

    #[test]
    fn test_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&Money::new(34900)).unwrap(), "34900");
    }
}
