//! Shopper-facing cart and checkout actions.
//!
//! [`Storefront`] ties the cart to notifications and confirmation dialogs:
//! destructive actions ask first, and every completed action tells the
//! shopper what happened.

use shopfront_core::{OrderSummary, PricingRates, Product, ProductId};
use tracing::{debug, info};

use crate::cart::{CartStorage, CartStore};
use crate::catalog::{CatalogError, ProductCatalog};
use crate::checkout::{CheckoutError, CheckoutForm, OrderConfirmation};
use crate::confirm::{Confirm, ConfirmRequest, DialogKind};
use crate::error::add_breadcrumb;
use crate::identity::IdentityProvider;
use crate::notify::Notifier;
use crate::orders::{OrderStore, OrderSubmission};

pub const ADDED_TO_CART: &str = "Product added to cart!";
pub const ITEM_REMOVED: &str = "Item removed from cart";
pub const CART_CLEARED: &str = "Cart cleared successfully";
pub const PRODUCT_NOT_FOUND: &str = "Product not found";

/// Cart and checkout actions for one shopper.
#[derive(Debug)]
pub struct Storefront<S, N, C> {
    cart: CartStore<S>,
    notifier: N,
    confirm: C,
    rates: PricingRates,
}

impl<S, N, C> Storefront<S, N, C>
where
    S: CartStorage,
    N: Notifier,
    C: Confirm,
{
    #[must_use]
    pub const fn new(cart: CartStore<S>, notifier: N, confirm: C, rates: PricingRates) -> Self {
        Self {
            cart,
            notifier,
            confirm,
            rates,
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    #[must_use]
    pub const fn rates(&self) -> &PricingRates {
        &self.rates
    }

    /// Price breakdown of the current cart.
    #[must_use]
    pub fn summary(&self) -> OrderSummary {
        OrderSummary::for_subtotal(self.cart.total_price(), &self.rates)
    }

    /// Add one unit of `product`.
    pub fn add_to_cart(&mut self, product: &Product) {
        self.cart.add(product);
        self.notifier.success(ADDED_TO_CART);
    }

    /// Look `id` up in `catalog` and add it.
    ///
    /// # Errors
    ///
    /// Returns the [`CatalogError`] if the product cannot be fetched. The
    /// shopper is told when the product does not exist.
    pub async fn add_from_catalog(
        &mut self,
        catalog: &impl ProductCatalog,
        id: ProductId,
    ) -> Result<Product, CatalogError> {
        match catalog.fetch_product(id).await {
            Ok(product) => {
                self.add_to_cart(&product);
                Ok(product)
            }
            Err(e) => {
                if matches!(e, CatalogError::NotFound(_)) {
                    self.notifier.error(PRODUCT_NOT_FOUND);
                }
                Err(e)
            }
        }
    }

    /// Set the quantity of `id`.
    ///
    /// Zero (or less) removes the line, but only after the shopper confirms.
    /// Returns whether the cart changed.
    pub async fn change_quantity(&mut self, id: ProductId, quantity: i64) -> bool {
        if self.cart.get(id).is_none() {
            debug!(product_id = %id, "Quantity change for product not in cart");
            return false;
        }

        if quantity > 0 {
            self.cart.update_quantity(id, quantity);
            return true;
        }

        let request = ConfirmRequest::new("Are you sure you want to remove this item from cart?")
            .title("Remove Item")
            .kind(DialogKind::Warning)
            .confirm_text("Remove")
            .cancel_text("Keep");

        if !self.confirm.confirm(request).await {
            return false;
        }

        self.cart.remove(id);
        self.notifier.success(ITEM_REMOVED);
        true
    }

    /// Empty the cart after the shopper confirms. Returns whether it was cleared.
    pub async fn clear_cart(&mut self) -> bool {
        let request = ConfirmRequest::new(
            "Are you sure you want to clear all items from cart? This action cannot be undone.",
        )
        .title("Clear Cart")
        .kind(DialogKind::Danger)
        .confirm_text("Clear All")
        .cancel_text("Cancel");

        if !self.confirm.confirm(request).await {
            return false;
        }

        add_breadcrumb("cart", "Cleared cart", None);
        self.cart.clear();
        self.notifier.success(CART_CLEARED);
        true
    }

    /// Start a checkout for the current shopper.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if there is nothing to check out.
    pub fn begin_checkout(
        &self,
        identity: &impl IdentityProvider,
    ) -> Result<CheckoutForm, CheckoutError> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let user = identity.current_user();
        add_breadcrumb("checkout", "Started checkout", None);
        Ok(CheckoutForm::new(user.as_ref(), self.rates))
    }

    /// Submit `form` against the current cart.
    ///
    /// Store failures are reported to the shopper as an error notification;
    /// validation failures are left on the form.
    ///
    /// # Errors
    ///
    /// See [`CheckoutForm::submit`].
    pub async fn place_order<O: OrderStore>(
        &mut self,
        form: &mut CheckoutForm,
        submission: &OrderSubmission<O>,
    ) -> Result<OrderConfirmation, CheckoutError> {
        match form.submit(&mut self.cart, submission).await {
            Ok(confirmation) => {
                info!(order_id = %confirmation.order_id, "Order placed");
                Ok(confirmation)
            }
            Err(e) => {
                if matches!(e, CheckoutError::Submission(_) | CheckoutError::EmptyCart) {
                    self.notifier.error(&e.user_message());
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::Price;

    use super::*;
    use crate::cart::MemoryCartStorage;
    use crate::confirm::AutoConfirm;
    use crate::identity::StaticIdentity;
    use crate::notify::{NotificationKind, RecordingNotifier};

    fn product(id: i32) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: Price::from_cents(1000),
            description: String::new(),
            category: "electronics".to_string(),
            image: String::new(),
            rating: None,
        }
    }

    fn storefront(confirm: bool) -> Storefront<MemoryCartStorage, RecordingNotifier, AutoConfirm> {
        Storefront::new(
            CartStore::load(MemoryCartStorage::new()),
            RecordingNotifier::new(),
            AutoConfirm(confirm),
            PricingRates::default(),
        )
    }

    #[test]
    fn test_add_to_cart_notifies() {
        let mut shop = storefront(true);
        shop.add_to_cart(&product(1));

        assert_eq!(shop.cart().total_item_count(), 1);
        let last = shop.notifier().last().unwrap();
        assert_eq!(last.kind, NotificationKind::Success);
        assert_eq!(last.message, ADDED_TO_CART);
    }

    #[tokio::test]
    async fn test_zero_quantity_confirmed_removes() {
        let mut shop = storefront(true);
        shop.add_to_cart(&product(1));

        assert!(shop.change_quantity(ProductId::new(1), 0).await);
        assert!(shop.cart().is_empty());
        assert_eq!(shop.notifier().last().unwrap().message, ITEM_REMOVED);
    }

    #[tokio::test]
    async fn test_zero_quantity_declined_keeps_item() {
        let mut shop = storefront(false);
        shop.add_to_cart(&product(1));

        assert!(!shop.change_quantity(ProductId::new(1), 0).await);
        assert_eq!(shop.cart().total_item_count(), 1);
        assert_eq!(shop.notifier().notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_positive_quantity_needs_no_confirmation() {
        let mut shop = storefront(false);
        shop.add_to_cart(&product(1));

        assert!(shop.change_quantity(ProductId::new(1), 3).await);
        assert_eq!(shop.cart().total_item_count(), 3);
    }

    #[tokio::test]
    async fn test_clear_cart_declined() {
        let mut shop = storefront(false);
        shop.add_to_cart(&product(1));

        assert!(!shop.clear_cart().await);
        assert!(!shop.cart().is_empty());
    }

    #[tokio::test]
    async fn test_clear_cart_confirmed() {
        let mut shop = storefront(true);
        shop.add_to_cart(&product(1));
        shop.add_to_cart(&product(2));

        assert!(shop.clear_cart().await);
        assert!(shop.cart().is_empty());
        assert_eq!(shop.notifier().last().unwrap().message, CART_CLEARED);
    }

    #[test]
    fn test_checkout_unreachable_with_empty_cart() {
        let shop = storefront(true);
        assert!(matches!(
            shop.begin_checkout(&StaticIdentity::guest()),
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[tokio::test]
    async fn test_add_from_catalog_not_found() {
        let mut shop = storefront(true);
        let catalog = crate::catalog::StaticCatalog::new([product(1)]);

        shop.add_from_catalog(&catalog, ProductId::new(1)).await.unwrap();
        assert!(shop.add_from_catalog(&catalog, ProductId::new(5)).await.is_err());

        assert_eq!(shop.cart().items().len(), 1);
        let last = shop.notifier().last().unwrap();
        assert_eq!(last.kind, NotificationKind::Error);
        assert_eq!(last.message, PRODUCT_NOT_FOUND);
    }
}
