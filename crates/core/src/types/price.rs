//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// Unit prices are never negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative unit price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
    amount: Decimal,
    /// ISO 4217 currency code.
    currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn new(amount: Decimal, currency_code: CurrencyCode) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self {
            amount,
            currency_code,
        })
    }

    /// Create a price in the store's default currency.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero.
    pub fn store(amount: Decimal) -> Result<Self, PriceError> {
        Self::new(amount, CurrencyCode::default())
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The currency of this price.
    #[must_use]
    pub const fn currency_code(&self) -> CurrencyCode {
        self.currency_code
    }

    /// This price multiplied by a unit count.
    #[must_use]
    pub fn times(self, units: u32) -> Self {
        Self {
            amount: self.amount * Decimal::from(units),
            currency_code: self.currency_code,
        }
    }

    /// Sum of two prices; `None` when the currencies differ.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        (self.currency_code == other.currency_code).then(|| Self {
            amount: self.amount + other.amount,
            currency_code: self.currency_code,
        })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.2}",
            self.currency_code.symbol(),
            self.amount.round_dp(2)
        )
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Display symbol for this currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD => "$",
            Self::EUR => "€",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_negative_price_rejected() {
        let result = Price::store(Decimal::from_str("-0.01").unwrap());
        assert!(matches!(result, Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_zero_price_allowed() {
        assert!(Price::store(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_times_and_add() {
        let unit = Price::store(Decimal::from_str("49.90").unwrap()).unwrap();
        let line = unit.times(3);
        assert_eq!(line.amount(), Decimal::from_str("149.70").unwrap());

        let total = line.checked_add(unit).unwrap();
        assert_eq!(total.to_string(), "R$ 199.60");

        let dollars = Price::new(Decimal::ONE, CurrencyCode::USD).unwrap();
        assert!(unit.checked_add(dollars).is_none());
    }

    #[test]
    fn test_price_display() {
        let price = Price::store(Decimal::from_str("99.9").unwrap()).unwrap();
        assert_eq!(price.to_string(), "R$ 99.90");
    }
}
