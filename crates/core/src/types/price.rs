//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are kept in the currency's standard unit (naira, not kobo) as a
//! [`Decimal`], so line totals are exact and never drift across repeated
//! quantity changes.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store currency.
    #[must_use]
    pub const fn ngn(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::NGN)
    }

    /// A zero price in the store currency.
    #[must_use]
    pub const fn zero() -> Self {
        Self::ngn(Decimal::ZERO)
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Format for display with thousands separators (e.g. `₦5,500.00`).
    #[must_use]
    pub fn display(&self) -> String {
        let fixed = format!("{:.2}", self.amount.abs().round_dp(2));
        let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, digit) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }

        let sign = if self.is_negative() { "-" } else { "" };
        format!("{sign}{}{grouped}.{fraction}", self.currency_code.symbol())
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.amount + rhs.amount, self.currency_code)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

/// ISO 4217 currency codes accepted by the storefront.
///
/// The shop only trades in naira; the enum keeps the currency explicit on
/// every amount that crosses the payment gateway boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    NGN,
}

impl CurrencyCode {
    /// The ISO 4217 alphabetic code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NGN => "NGN",
        }
    }

    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::NGN => "₦",
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times_is_exact() {
        let price = Price::ngn(Decimal::new(1999, 2));
        assert_eq!(price.times(3).amount, Decimal::new(5997, 2));
        assert_eq!(price.times(100).amount, Decimal::new(1999, 0));
    }

    #[test]
    fn test_sum_and_add() {
        let total: Price = [Price::ngn(Decimal::from(2000)), Price::ngn(Decimal::from(3500))]
            .into_iter()
            .sum();
        assert_eq!(total, Price::ngn(Decimal::from(5500)));
        assert_eq!(total + Price::zero(), total);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Price::ngn(Decimal::ONE).is_positive());
        assert!(!Price::zero().is_positive());
        assert!(!Price::zero().is_negative());
        assert!(Price::ngn(Decimal::NEGATIVE_ONE).is_negative());
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::ngn(Decimal::from(5500)).display(), "₦5,500.00");
        assert_eq!(Price::ngn(Decimal::from(20000)).display(), "₦20,000.00");
        assert_eq!(Price::ngn(Decimal::new(95, 1)).display(), "₦9.50");
        assert_eq!(Price::zero().display(), "₦0.00");
        assert_eq!(Price::ngn(Decimal::from(1_234_567)).display(), "₦1,234,567.00");
    }
}
