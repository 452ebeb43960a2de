//! Shopfront library.
//!
//! Cart state, the two-step checkout flow and order submission, plus the
//! catalog client and the configuration, logging and error plumbing shared
//! by the command-line front end.
//!
//! # Architecture
//!
//! - [`cart`] - Cart store mirrored into a durable slot after every mutation
//! - [`checkout`] - Checkout form, input normalization and validation
//! - [`orders`] - Order submission into an [`orders::OrderStore`]
//! - [`db`] - `PostgreSQL` order store and migrations
//! - [`storefront`] - Shopper-facing actions with notifications and confirmations
//! - [`catalog`] - Product catalog API client

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod confirm;
pub mod db;
pub mod error;
pub mod identity;
pub mod notify;
pub mod orders;
pub mod storefront;
pub mod telemetry;

pub use storefront::Storefront;
