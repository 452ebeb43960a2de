//! Shopfront Core - Shared types library.
//!
//! This crate provides common types used across all Shopfront components:
//! - `shopfront` - Cart store, checkout controller and order submission
//! - `shopfront-cli` - Terminal storefront and database migrations
//!
//! # Architecture
//!
//! The core crate contains only types and pure calculations - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices and emails, plus the cart,
//!   product and order records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
