//! Cart store.
//!
//! The cart is an ordered list of [`CartItem`]s (insertion order is display
//! order). Every mutation goes through [`reduce`], a pure transition over
//! [`CartAction`]s; [`CartStore`] wraps it with persistence so the durable
//! slot always mirrors the in-memory list.
//!
//! Persistence is advisory. A failed write is logged and the in-memory cart
//! stays authoritative for the running process.

mod storage;

pub use storage::{CartStorage, FileCartStorage, MemoryCartStorage, StorageError};

use rust_decimal::Decimal;
use shopfront_core::{CartItem, Product, ProductId};
use tracing::{debug, warn};

use crate::error::add_breadcrumb;

/// A cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Replace the cart with hydrated items.
    Load(Vec<CartItem>),
    /// Add one unit of a product.
    Add(CartItem),
    /// Set a line's quantity; zero or below removes the line.
    UpdateQuantity { id: ProductId, quantity: i64 },
    /// Remove a line regardless of quantity.
    Remove(ProductId),
    /// Empty the cart.
    Clear,
}

/// Apply `action` to `items`.
///
/// Actions naming a product that is not in the cart leave it unchanged.
#[must_use]
pub fn reduce(mut items: Vec<CartItem>, action: CartAction) -> Vec<CartItem> {
    match action {
        CartAction::Load(loaded) => normalize(loaded),
        CartAction::Add(item) => {
            if let Some(existing) = items.iter_mut().find(|i| i.id == item.id) {
                existing.quantity = existing.quantity.saturating_add(1);
            } else {
                items.push(CartItem { quantity: 1, ..item });
            }
            items
        }
        CartAction::UpdateQuantity { id, quantity } => {
            if quantity <= 0 {
                items.retain(|i| i.id != id);
            } else if let Some(existing) = items.iter_mut().find(|i| i.id == id) {
                existing.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            }
            items
        }
        CartAction::Remove(id) => {
            items.retain(|i| i.id != id);
            items
        }
        CartAction::Clear => Vec::new(),
    }
}

/// Drop zero-quantity lines and merge duplicate products, keeping first-seen order.
fn normalize(loaded: Vec<CartItem>) -> Vec<CartItem> {
    let mut items: Vec<CartItem> = Vec::with_capacity(loaded.len());
    for item in loaded.into_iter().filter(|i| i.quantity > 0) {
        if let Some(existing) = items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        } else {
            items.push(item);
        }
    }
    items
}

/// The authoritative in-memory cart, mirrored into a [`CartStorage`] slot.
#[derive(Debug)]
pub struct CartStore<S> {
    items: Vec<CartItem>,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Hydrate the cart from `storage`.
    ///
    /// A missing or unreadable record yields an empty cart; read and parse
    /// failures are logged and otherwise ignored.
    pub fn load(storage: S) -> Self {
        let loaded = match storage.read_cart() {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load persisted cart, starting empty");
                Vec::new()
            }
        };

        let items = reduce(Vec::new(), CartAction::Load(loaded));
        debug!(item_count = items.len(), "Cart hydrated");
        Self { items, storage }
    }

    /// Add one unit of `product`.
    pub fn add(&mut self, product: &Product) {
        add_breadcrumb(
            "cart",
            "Added to cart",
            Some(&[("product_id", product.id.to_string().as_str())]),
        );
        self.dispatch(CartAction::Add(CartItem::from_product(product)));
    }

    /// Set the quantity of `id`; zero or below removes it.
    pub fn update_quantity(&mut self, id: ProductId, quantity: i64) {
        self.dispatch(CartAction::UpdateQuantity { id, quantity });
    }

    /// Remove `id` from the cart.
    pub fn remove(&mut self, id: ProductId) {
        add_breadcrumb(
            "cart",
            "Removed from cart",
            Some(&[("product_id", id.to_string().as_str())]),
        );
        self.dispatch(CartAction::Remove(id));
    }

    /// Empty the cart and delete the persisted record.
    pub fn clear(&mut self) {
        self.items = reduce(std::mem::take(&mut self.items), CartAction::Clear);
        if let Err(e) = self.storage.clear_cart() {
            warn!(error = %e, "Failed to clear persisted cart");
        }
    }

    /// Cart lines in display order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up the line for `id`.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// The backing storage slot.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn dispatch(&mut self, action: CartAction) {
        self.items = reduce(std::mem::take(&mut self.items), action);
        if let Err(e) = self.storage.write_cart(&self.items) {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}
