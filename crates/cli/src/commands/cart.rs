//! Cart management.
//!
//! # Usage
//!
//! ```bash
//! shopfront cart show
//! shopfront cart add 3
//! shopfront cart set 3 2
//! shopfront cart remove 3
//! shopfront cart clear
//! ```
//!
//! Removing an item (or setting its quantity to 0) and clearing the cart ask
//! for confirmation unless `--yes` is given.

use shopfront::catalog::CatalogClient;
use shopfront::config::ShopfrontConfig;
use shopfront::error::{AppError, Result};
use shopfront_core::ProductId;

use super::open_storefront;
use crate::terminal;

/// A cart subcommand.
#[derive(Debug, Clone, Copy)]
pub enum CartCommand {
    Show,
    Add(ProductId),
    Set(ProductId, i64),
    Remove(ProductId),
    Clear,
}

/// Run a cart subcommand.
///
/// # Errors
///
/// Returns an error if a product cannot be fetched or is not in the cart.
pub async fn run(config: &ShopfrontConfig, command: CartCommand, assume_yes: bool) -> Result<()> {
    let mut shop = open_storefront(config, assume_yes);

    match command {
        CartCommand::Show => {}
        CartCommand::Add(id) => {
            let catalog = CatalogClient::new(&config.catalog);
            shop.add_from_catalog(&catalog, id).await?;
        }
        CartCommand::Set(id, quantity) => {
            require_in_cart(&shop, id)?;
            shop.change_quantity(id, quantity).await;
        }
        CartCommand::Remove(id) => {
            require_in_cart(&shop, id)?;
            shop.change_quantity(id, 0).await;
        }
        CartCommand::Clear => {
            if shop.cart().is_empty() {
                terminal::print_line("Your cart is empty");
                return Ok(());
            }
            shop.clear_cart().await;
        }
    }

    terminal::print_cart(shop.cart().items(), &shop.summary());
    Ok(())
}

fn require_in_cart(shop: &super::CliStorefront, id: ProductId) -> Result<()> {
    if shop.cart().get(id).is_none() {
        return Err(AppError::BadRequest(format!("Product {id} is not in your cart")));
    }
    Ok(())
}
