//! Type-safe price representation and order pricing.
//!
//! Prices are [`Decimal`] amounts in the store currency's standard unit
//! (dollars, not cents). Two-decimal rounding is applied only where a value
//! is charged or displayed.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from an amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), 2))
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_amount(self.0))
    }
}

/// Format an amount for display (e.g. `$19.99`).
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("${:.2}", round_cents(amount))
}

fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Fixed-rate pricing applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRates {
    /// Flat shipping charge per order.
    pub shipping: Decimal,
    /// Tax rate applied to the subtotal (0.08 = 8%).
    pub tax_rate: Decimal,
}

impl Default for PricingRates {
    fn default() -> Self {
        Self {
            shipping: Decimal::new(599, 2),
            tax_rate: Decimal::new(8, 2),
        }
    }
}

/// Price breakdown shown on the checkout page and charged on the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    /// Tax rounded to cents.
    pub tax: Decimal,
    /// `subtotal + shipping + tax`.
    pub total: Decimal,
}

impl OrderSummary {
    /// Compute the breakdown for a cart subtotal.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use shopfront_core::{OrderSummary, PricingRates};
    ///
    /// let summary = OrderSummary::for_subtotal(Decimal::new(2000, 2), &PricingRates::default());
    /// assert_eq!(summary.total, Decimal::new(2759, 2));
    /// ```
    #[must_use]
    pub fn for_subtotal(subtotal: Decimal, rates: &PricingRates) -> Self {
        let tax = round_cents(subtotal * rates.tax_rate);
        let total = round_cents(subtotal + rates.shipping + tax);
        Self {
            subtotal,
            shipping: rates.shipping,
            tax,
            total,
        }
    }
}
