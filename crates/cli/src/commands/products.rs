//! Catalog browsing.
//!
//! # Usage
//!
//! ```bash
//! shopfront products           # list every product
//! shopfront products --id 3    # show one product
//! ```

use shopfront::catalog::{CatalogClient, ProductCatalog};
use shopfront::config::ShopfrontConfig;
use shopfront::error::Result;
use shopfront_core::ProductId;

use crate::terminal;

/// List the catalog, or show a single product.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read or the product does not exist.
pub async fn run(config: &ShopfrontConfig, id: Option<ProductId>) -> Result<()> {
    let catalog = CatalogClient::new(&config.catalog);

    match id {
        Some(id) => terminal::print_product(&catalog.fetch_product(id).await?),
        None => terminal::print_products(&catalog.fetch_products().await?),
    }
    Ok(())
}
