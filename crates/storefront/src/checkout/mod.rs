//! Two-step checkout form.
//!
//! ```text
//!   ┌──────────┐  advance (shipping fields valid)  ┌─────────┐
//!   │ Shipping │ ─────────────────────────────────▶ │ Payment │ ── submit ──▶ order
//!   └──────────┘ ◀───────────────────────────────── └─────────┘
//!                          retreat
//! ```
//!
//! The form owns its field values and validation errors; it is never
//! persisted. Submission validates the whole payload, hands an order to
//! [`OrderSubmission`] and clears the cart only once the store has accepted
//! the order.

mod fields;
mod validation;

pub use fields::{
    CARD_NUMBER_MAX_LEN, CVV_MAX_LEN, CheckoutField, EXPIRY_MAX_LEN, card_digits,
    normalize_card_number, normalize_cvv, normalize_expiry,
};
pub use validation::{CheckoutPayload, FieldErrors, validate_checkout, validate_shipping};

use rust_decimal::Decimal;
use serde::Serialize;
use shopfront_core::{
    Customer, Email, NewOrder, OrderId, OrderSummary, PaymentMethod, PaymentReference,
    PricingRates, ShippingAddress, SubmissionKey, UserId,
};
use thiserror::Error;
use tracing::{info, instrument};

use crate::cart::{CartStorage, CartStore};
use crate::error::add_breadcrumb;
use crate::identity::CurrentUser;
use crate::orders::{OrderStore, OrderSubmission, SubmissionError};

/// Checkout step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    Shipping,
    Payment,
}

impl Step {
    /// 1-based step number for display.
    #[must_use]
    pub const fn number(&self) -> u8 {
        match self {
            Self::Shipping => 1,
            Self::Payment => 2,
        }
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Shipping => "Shipping Information",
            Self::Payment => "Payment Details",
        }
    }
}

/// Errors that stop a checkout from producing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout needs at least one item in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Submit was attempted before reaching the payment step.
    #[error("submit is only available on the payment step")]
    WrongStep,

    /// One or more fields failed validation.
    #[error("{} field(s) failed validation", .0.len())]
    Invalid(FieldErrors),

    /// The order store did not accept the order.
    #[error("order submission failed: {0}")]
    Submission(#[from] SubmissionError),
}

impl CheckoutError {
    /// Message suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCart => "Your cart is empty".to_string(),
            Self::WrongStep => "Please complete your shipping information first".to_string(),
            Self::Invalid(_) => "Please correct the highlighted fields".to_string(),
            Self::Submission(e) => e.user_message().to_string(),
        }
    }
}

/// What the shopper sees after a successful order.
///
/// `total` is the summary computed from the cart at submit time. A retry that
/// the store resolves to an earlier order with the same submission key still
/// reports this locally computed total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub total: Decimal,
}

/// Checkout form controller.
#[derive(Debug, Clone)]
pub struct CheckoutForm {
    values: CheckoutPayload,
    save_info: bool,
    step: Step,
    errors: FieldErrors,
    user_id: Option<UserId>,
    submission_key: SubmissionKey,
    rates: PricingRates,
}

impl CheckoutForm {
    /// Start a checkout on the shipping step.
    ///
    /// The email field is pre-filled from `current_user` when there is one.
    #[must_use]
    pub fn new(current_user: Option<&CurrentUser>, rates: PricingRates) -> Self {
        let values = CheckoutPayload {
            email: current_user
                .map(|user| user.email.to_string())
                .unwrap_or_default(),
            ..CheckoutPayload::default()
        };

        Self {
            values,
            save_info: false,
            step: Step::Shipping,
            errors: FieldErrors::new(),
            user_id: current_user.map(|user| user.id),
            submission_key: SubmissionKey::generate(),
            rates,
        }
    }

    #[must_use]
    pub const fn step(&self) -> Step {
        self.step
    }

    /// Stored (normalized) value of `field`.
    #[must_use]
    pub fn value(&self, field: CheckoutField) -> &str {
        self.values.get(field)
    }

    #[must_use]
    pub const fn save_info(&self) -> bool {
        self.save_info
    }

    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Key shared by every submission attempt of this checkout.
    #[must_use]
    pub const fn submission_key(&self) -> SubmissionKey {
        self.submission_key
    }

    /// Normalize and store a field value, clearing that field's error.
    pub fn set_field(&mut self, field: CheckoutField, raw: &str) {
        let value = field.normalize(raw);
        match field {
            CheckoutField::FirstName => self.values.first_name = value,
            CheckoutField::LastName => self.values.last_name = value,
            CheckoutField::Email => self.values.email = value,
            CheckoutField::Phone => self.values.phone = value,
            CheckoutField::Address => self.values.address = value,
            CheckoutField::City => self.values.city = value,
            CheckoutField::ZipCode => self.values.zip_code = value,
            CheckoutField::CardNumber => self.values.card_number = value,
            CheckoutField::ExpiryDate => self.values.expiry_date = value,
            CheckoutField::Cvv => self.values.cvv = value,
        }
        self.errors.remove(field);
    }

    pub const fn set_save_info(&mut self, save_info: bool) {
        self.save_info = save_info;
    }

    /// Move from shipping to payment if the shipping fields are filled in.
    ///
    /// On failure the errors are recorded and the form stays on the shipping
    /// step. Calling this on the payment step does nothing.
    pub fn advance(&mut self) -> Step {
        if self.step == Step::Shipping {
            let errors = validate_shipping(&self.values);
            if errors.is_empty() {
                self.errors.clear();
                self.step = Step::Payment;
            } else {
                self.errors = errors;
            }
        }
        self.step
    }

    /// Go back to the shipping step. Field values are kept.
    pub const fn retreat(&mut self) {
        self.step = Step::Shipping;
    }

    /// The form as a validation payload, with the card number's group
    /// separators removed.
    #[must_use]
    pub fn payload(&self) -> CheckoutPayload {
        CheckoutPayload {
            card_number: card_digits(&self.values.card_number),
            ..self.values.clone()
        }
    }

    /// Price breakdown for `cart`.
    #[must_use]
    pub fn summary<S: CartStorage>(&self, cart: &CartStore<S>) -> OrderSummary {
        OrderSummary::for_subtotal(cart.total_price(), &self.rates)
    }

    /// Validate the form and place the order.
    ///
    /// On success the cart is cleared and the confirmation returned. On any
    /// failure the cart and the form are left as they were so the shopper can
    /// correct or retry; retries reuse this form's submission key.
    ///
    /// While the order is being placed [`OrderSubmission::is_in_flight`] is
    /// set. Dropping the returned future releases it.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::WrongStep`] if the form is not on the payment step
    /// - [`CheckoutError::EmptyCart`] if there is nothing to order
    /// - [`CheckoutError::Invalid`] if any field fails validation
    /// - [`CheckoutError::Submission`] if the order store rejects the order
    #[instrument(skip_all, fields(submission_key = %self.submission_key))]
    pub async fn submit<S, O>(
        &mut self,
        cart: &mut CartStore<S>,
        submission: &OrderSubmission<O>,
    ) -> Result<OrderConfirmation, CheckoutError>
    where
        S: CartStorage,
        O: OrderStore,
    {
        if self.step != Step::Payment {
            return Err(CheckoutError::WrongStep);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let payload = self.payload();
        let errors = validate_checkout(&payload);
        // A valid payload always has a parseable email
        let email = Email::parse(payload.email.trim())
            .ok()
            .filter(|_| errors.is_empty());
        let Some(email) = email else {
            self.errors = errors.clone();
            return Err(CheckoutError::Invalid(errors));
        };
        self.errors.clear();

        let order = self.build_order(&payload, email, cart);
        let total = order.total();

        add_breadcrumb("checkout", "Placing order", None);
        let order_id = submission.create_order(order).await?;
        cart.clear();
        info!(order_id = %order_id, total = %total, "Checkout complete");

        Ok(OrderConfirmation { order_id, total })
    }

    fn build_order<S: CartStorage>(
        &self,
        payload: &CheckoutPayload,
        email: Email,
        cart: &CartStore<S>,
    ) -> NewOrder {
        NewOrder {
            submission_key: self.submission_key,
            customer: Customer {
                user_id: self.user_id,
                email,
                first_name: payload.first_name.trim().to_string(),
                last_name: payload.last_name.trim().to_string(),
                phone: payload.phone.trim().to_string(),
            },
            shipping_address: ShippingAddress {
                address: payload.address.trim().to_string(),
                city: payload.city.trim().to_string(),
                zip_code: payload.zip_code.trim().to_string(),
            },
            items: cart.items().to_vec(),
            summary: self.summary(cart),
            payment_method: PaymentMethod::CreditCard,
            payment: PaymentReference::from_card_number(&payload.card_number),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use shopfront_core::{Price, Product, ProductId};

    use super::*;
    use crate::cart::MemoryCartStorage;
    use crate::orders::MemoryOrderStore;

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::new(7),
            email: Email::parse("jane@example.com").unwrap(),
        }
    }

    fn cart_with_two_tens() -> CartStore<MemoryCartStorage> {
        let product = Product {
            id: ProductId::new(1),
            title: "Backpack".to_string(),
            price: Price::from_cents(1000),
            description: String::new(),
            category: "bags".to_string(),
            image: String::new(),
            rating: None,
        };
        let mut cart = CartStore::load(MemoryCartStorage::new());
        cart.add(&product);
        cart.add(&product);
        cart
    }

    fn fill_shipping(form: &mut CheckoutForm) {
        form.set_field(CheckoutField::FirstName, "John");
        form.set_field(CheckoutField::LastName, "Doe");
        form.set_field(CheckoutField::Email, "john@example.com");
        form.set_field(CheckoutField::Phone, "+15551234567");
        form.set_field(CheckoutField::Address, "123 Main St");
        form.set_field(CheckoutField::City, "NYC");
        form.set_field(CheckoutField::ZipCode, "10001");
    }

    fn fill_payment(form: &mut CheckoutForm) {
        form.set_field(CheckoutField::CardNumber, "4111111111111111");
        form.set_field(CheckoutField::ExpiryDate, "1227");
        form.set_field(CheckoutField::Cvv, "123");
    }

    #[test]
    fn test_new_prefills_email_from_user() {
        let form = CheckoutForm::new(Some(&user()), PricingRates::default());
        assert_eq!(form.value(CheckoutField::Email), "jane@example.com");
        assert_eq!(form.step(), Step::Shipping);
        assert_eq!(form.step().number(), 1);

        let anonymous = CheckoutForm::new(None, PricingRates::default());
        assert_eq!(anonymous.value(CheckoutField::Email), "");
    }

    #[test]
    fn test_set_field_normalizes_payment_fields() {
        let mut form = CheckoutForm::new(None, PricingRates::default());
        form.set_field(CheckoutField::CardNumber, "4111-1111-1111-1111");
        form.set_field(CheckoutField::ExpiryDate, "0329");
        form.set_field(CheckoutField::Cvv, "12x34");
        assert_eq!(form.value(CheckoutField::CardNumber), "4111 1111 1111 1111");
        assert_eq!(form.value(CheckoutField::ExpiryDate), "03/29");
        assert_eq!(form.value(CheckoutField::Cvv), "1234");
        assert_eq!(form.payload().card_number, "4111111111111111");
    }

    #[test]
    fn test_advance_blocked_by_missing_shipping_fields() {
        let mut form = CheckoutForm::new(None, PricingRates::default());
        form.set_field(CheckoutField::FirstName, "John");
        assert_eq!(form.advance(), Step::Shipping);
        assert!(!form.errors().contains(CheckoutField::FirstName));
        assert_eq!(
            form.errors().get(CheckoutField::LastName),
            Some("Last name is required")
        );
        assert_eq!(form.errors().len(), 6);
    }

    #[test]
    fn test_editing_clears_that_fields_error_only() {
        let mut form = CheckoutForm::new(None, PricingRates::default());
        form.advance();
        form.set_field(CheckoutField::City, "Boston");
        assert!(!form.errors().contains(CheckoutField::City));
        assert!(form.errors().contains(CheckoutField::ZipCode));
    }

    #[test]
    fn test_advance_then_retreat_keeps_values() {
        let mut form = CheckoutForm::new(None, PricingRates::default());
        fill_shipping(&mut form);
        form.set_save_info(true);
        assert_eq!(form.advance(), Step::Payment);
        assert!(form.errors().is_empty());

        fill_payment(&mut form);
        form.retreat();
        assert_eq!(form.step(), Step::Shipping);
        assert_eq!(form.value(CheckoutField::City), "NYC");
        assert_eq!(form.value(CheckoutField::Cvv), "123");
        assert!(form.save_info());

        // Advancing again from payment is a no-op
        form.advance();
        assert_eq!(form.advance(), Step::Payment);
    }

    #[test]
    fn test_summary_uses_fixed_rates() {
        let form = CheckoutForm::new(None, PricingRates::default());
        let summary = form.summary(&cart_with_two_tens());
        assert_eq!(summary.subtotal, Decimal::new(2000, 2));
        assert_eq!(summary.total, Decimal::new(2759, 2));
    }

    #[tokio::test]
    async fn test_submit_requires_payment_step() {
        let mut form = CheckoutForm::new(None, PricingRates::default());
        let mut cart = cart_with_two_tens();
        let submission = OrderSubmission::new(MemoryOrderStore::new());

        let result = form.submit(&mut cart, &submission).await;
        assert!(matches!(result, Err(CheckoutError::WrongStep)));
    }

    #[tokio::test]
    async fn test_submit_blocked_for_empty_cart() {
        let mut form = CheckoutForm::new(None, PricingRates::default());
        fill_shipping(&mut form);
        form.advance();
        fill_payment(&mut form);

        let mut cart = CartStore::load(MemoryCartStorage::new());
        let submission = OrderSubmission::new(MemoryOrderStore::new());
        let result = form.submit(&mut cart, &submission).await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert!(submission.store().records().is_empty());
    }

    #[tokio::test]
    async fn test_submit_invalid_payment_populates_errors() {
        let mut form = CheckoutForm::new(None, PricingRates::default());
        fill_shipping(&mut form);
        form.advance();
        form.set_field(CheckoutField::CardNumber, "4111 1111");
        form.set_field(CheckoutField::ExpiryDate, "1327");

        let mut cart = cart_with_two_tens();
        let submission = OrderSubmission::new(MemoryOrderStore::new());
        let result = form.submit(&mut cart, &submission).await;

        let Err(CheckoutError::Invalid(errors)) = result else {
            panic!("expected validation failure");
        };
        assert!(errors.contains(CheckoutField::CardNumber));
        assert!(errors.contains(CheckoutField::ExpiryDate));
        assert!(errors.contains(CheckoutField::Cvv));
        assert_eq!(form.errors(), &errors);
        assert_eq!(cart.total_item_count(), 2);
        assert!(submission.store().records().is_empty());
    }

    #[tokio::test]
    async fn test_submit_success_clears_cart_and_redacts_card() {
        let mut form = CheckoutForm::new(Some(&user()), PricingRates::default());
        fill_shipping(&mut form);
        form.advance();
        fill_payment(&mut form);

        let mut cart = cart_with_two_tens();
        let submission = OrderSubmission::new(MemoryOrderStore::new());
        let confirmation = form.submit(&mut cart, &submission).await.unwrap();

        assert_eq!(confirmation.total, Decimal::new(2759, 2));
        assert!(cart.is_empty());
        assert!(cart.storage().raw().is_none());
        assert!(!submission.is_in_flight());

        let records = submission.store().records();
        assert_eq!(records.len(), 1);
        let (id, record) = &records[0];
        assert_eq!(*id, confirmation.order_id);
        assert_eq!(record.order.customer.user_id, Some(UserId::new(7)));
        assert_eq!(record.order.customer.email.as_str(), "john@example.com");
        assert_eq!(record.order.payment.card_last4, "1111");
        assert_eq!(record.order.items.len(), 1);
        assert_eq!(record.order.items[0].quantity, 2);

        let json = serde_json::to_string(record).unwrap();
        assert!(!json.contains("4111111111111111"));
    }

    #[tokio::test]
    async fn test_submit_failure_preserves_cart_and_form() {
        let mut form = CheckoutForm::new(None, PricingRates::default());
        fill_shipping(&mut form);
        form.advance();
        fill_payment(&mut form);

        let mut cart = cart_with_two_tens();
        let submission = OrderSubmission::new(MemoryOrderStore::failing());
        let err = form.submit(&mut cart, &submission).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Submission(_)));
        assert_eq!(err.user_message(), "Failed to place order. Please try again.");
        assert_eq!(cart.total_item_count(), 2);
        assert_eq!(form.step(), Step::Payment);
        assert_eq!(form.value(CheckoutField::Cvv), "123");
        assert!(!submission.is_in_flight());
    }

    #[tokio::test]
    async fn test_abandoned_submit_releases_in_flight_and_form_stays_usable() {
        let mut form = CheckoutForm::new(None, PricingRates::default());
        fill_shipping(&mut form);
        form.advance();
        fill_payment(&mut form);

        let mut cart = cart_with_two_tens();
        let submission = OrderSubmission::new(
            MemoryOrderStore::new().with_latency(Duration::from_millis(200)),
        );

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            form.submit(&mut cart, &submission),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(!submission.is_in_flight());
        assert_eq!(cart.total_item_count(), 2);

        let confirmation = form.submit(&mut cart, &submission).await.unwrap();
        assert!(!submission.is_in_flight());
        assert!(cart.is_empty());

        let records = submission.store().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, confirmation.order_id);
    }

    #[tokio::test]
    async fn test_malformed_email_is_reported_as_field_error() {
        let mut form = CheckoutForm::new(None, PricingRates::default());
        fill_shipping(&mut form);
        form.advance();
        fill_payment(&mut form);
        form.set_field(CheckoutField::Email, "john@example");

        let mut cart = cart_with_two_tens();
        let submission = OrderSubmission::new(MemoryOrderStore::new());
        let err = form.submit(&mut cart, &submission).await.unwrap_err();

        let CheckoutError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(CheckoutField::Email), Some("Email is invalid"));
        assert_eq!(form.errors(), &errors);
        assert!(submission.store().records().is_empty());
    }
}
