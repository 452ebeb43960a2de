//! Catalog products and cart line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A catalog product as returned by the remote catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rating: Option<Rating>,
}

/// Aggregate customer rating for a product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u32,
}

/// A line in the shopping cart.
///
/// A cart holds at most one line per [`ProductId`] and a line always has a
/// quantity of at least one; the cart store enforces both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    /// Unit price.
    pub price: Price,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    pub quantity: u32,
}

impl CartItem {
    /// Build a single-unit line for a product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
            category: product.category.clone(),
            quantity: 1,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.times(self.quantity)
    }
}
