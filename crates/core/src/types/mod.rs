//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod status;

pub use cart::{CartItem, Product, Rating};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{Customer, NewOrder, OrderRecord, PaymentReference, ShippingAddress};
pub use price::{OrderSummary, Price, PriceError, PricingRates, format_amount};
pub use status::*;
