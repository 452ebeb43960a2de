//! Order records handed to the external order store.
//!
//! Full card data never appears here: the only payment detail an order
//! carries is the last four digits of the card number.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::CartItem;
use super::email::Email;
use super::id::{SubmissionKey, UserId};
use super::price::OrderSummary;
use super::status::{OrderStatus, PaymentMethod};

/// The customer placing the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Signed-in user, if any.
    pub user_id: Option<UserId>,
    pub email: Email,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Where the order ships to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub zip_code: String,
}

/// Redacted payment reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReference {
    pub card_last4: String,
}

impl PaymentReference {
    /// Keep only the last four digits of a card number.
    ///
    /// Non-digit characters (group separators) are ignored.
    #[must_use]
    pub fn from_card_number(card_number: &str) -> Self {
        let digits: Vec<char> = card_number.chars().filter(char::is_ascii_digit).collect();
        let start = digits.len().saturating_sub(4);
        Self {
            card_last4: digits.get(start..).unwrap_or_default().iter().collect(),
        }
    }
}

/// A validated order request, before the store has accepted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Deduplication key shared by every retry of one checkout.
    pub submission_key: SubmissionKey,
    pub customer: Customer,
    pub shipping_address: ShippingAddress,
    /// Cart contents at the time of ordering.
    pub items: Vec<CartItem>,
    pub summary: OrderSummary,
    pub payment_method: PaymentMethod,
    pub payment: PaymentReference,
}

impl NewOrder {
    /// Amount charged for the order.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.summary.total
    }
}

/// The durable order record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(flatten)]
    pub order: NewOrder,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    /// A freshly placed order: `pending`, with both timestamps set to `now`.
    #[must_use]
    pub const fn pending(order: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            order,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
