//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//!
//! # Include the PostgreSQL order store tests
//! SHOPFRONT_TEST_DATABASE_URL=postgres://localhost/shopfront_test \
//!     cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart survives restarts through the file slot
//! - `checkout_flow` - Cart to order, end to end, against the in-memory store
//! - `confirmation` - Dialogs answered through the confirmation channel
//! - `postgres_orders` - `PgOrderStore` (skipped without a database)
//!
//! This crate holds the shared fixtures.

use std::path::PathBuf;

use shopfront::checkout::{CheckoutField, CheckoutForm};
use shopfront_core::{Price, Product, ProductId, Rating};

/// A product priced at `cents`.
#[must_use]
pub fn product(id: i32, title: &str, cents: u32) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        price: Price::from_cents(cents),
        description: format!("{title} description"),
        category: "electronics".to_string(),
        image: format!("https://img.example.com/{id}.jpg"),
        rating: Some(Rating {
            rate: 4.1,
            count: 120,
        }),
    }
}

/// A small catalog.
#[must_use]
pub fn catalog() -> Vec<Product> {
    vec![
        product(1, "Backpack", 1000),
        product(2, "Slim Fit T-Shirt", 2230),
        product(3, "Cotton Jacket", 5599),
    ]
}

/// A cart file path in a fresh temporary directory.
#[must_use]
pub fn temp_cart_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("shopfront-it-{}", uuid::Uuid::new_v4()))
        .join("cart.json")
}

/// Fill in a valid shipping step.
pub fn fill_shipping(form: &mut CheckoutForm) {
    form.set_field(CheckoutField::FirstName, "John");
    form.set_field(CheckoutField::LastName, "Doe");
    form.set_field(CheckoutField::Email, "john@example.com");
    form.set_field(CheckoutField::Phone, "+15551234567");
    form.set_field(CheckoutField::Address, "123 Main St");
    form.set_field(CheckoutField::City, "NYC");
    form.set_field(CheckoutField::ZipCode, "10001");
}

/// Fill in a valid payment step, typed the way a shopper would.
pub fn fill_payment(form: &mut CheckoutForm) {
    form.set_field(CheckoutField::CardNumber, "4111 1111 1111 1111");
    form.set_field(CheckoutField::ExpiryDate, "12/27");
    form.set_field(CheckoutField::Cvv, "123");
}
