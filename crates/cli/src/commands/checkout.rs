//! Interactive checkout.
//!
//! # Usage
//!
//! ```bash
//! shopfront checkout
//! ```
//!
//! Walks through shipping and payment on stdin, then places the order into
//! the configured order store. A failed submission can be retried; retries
//! reuse the same submission key so the order is never placed twice.

use shopfront::checkout::{CheckoutError, CheckoutField, CheckoutForm, Step};
use shopfront::config::ShopfrontConfig;
use shopfront::error::{Result, set_sentry_user};
use shopfront::identity::StaticIdentity;
use shopfront::orders::{ORDER_PLACED_MESSAGE, OrderSubmission};
use shopfront_core::format_amount;
use tracing::info;

use super::{CliOrderStore, open_storefront};
use crate::terminal::{self, Prompt};

/// Run the checkout flow.
///
/// # Errors
///
/// Returns an error if the cart is empty, stdin closes, the order store
/// cannot be reached, or the shopper gives up after a failed submission.
pub async fn run(config: &ShopfrontConfig) -> Result<()> {
    // Checkout never asks for confirmation, and stdin is needed for the form
    let mut shop = open_storefront(config, true);

    let identity = StaticIdentity::new(config.current_user.clone());
    if let Some(user) = &config.current_user {
        set_sentry_user(&user.id, Some(user.email.as_str()));
    }
    let mut form = shop.begin_checkout(&identity)?;

    terminal::print_heading("Order Summary");
    terminal::print_cart(shop.cart().items(), &form.summary(shop.cart()));

    let store = CliOrderStore::connect(config).await?;
    let submission = OrderSubmission::new(store);
    let mut prompt = Prompt::stdin();

    collect_shipping(&mut prompt, &mut form, &CheckoutField::SHIPPING).await?;
    collect(&mut prompt, &mut form, &CheckoutField::PAYMENT, Step::Payment).await?;

    loop {
        match shop.place_order(&mut form, &submission).await {
            Ok(confirmation) => {
                info!(order_id = %confirmation.order_id, "Checkout finished");
                terminal::print_heading(ORDER_PLACED_MESSAGE);
                terminal::print_line(&format!("Order ID: {}", confirmation.order_id));
                terminal::print_line(&format!("Total:    {}", format_amount(confirmation.total)));
                return Ok(());
            }
            Err(CheckoutError::Invalid(errors)) => {
                terminal::print_line("Please correct the following:");
                terminal::print_field_errors(&errors);

                let fields: Vec<CheckoutField> = errors.iter().map(|(field, _)| field).collect();
                let (shipping, payment): (Vec<_>, Vec<_>) = fields
                    .into_iter()
                    .partition(|field| CheckoutField::SHIPPING.contains(field));
                if !shipping.is_empty() {
                    form.retreat();
                    collect_shipping(&mut prompt, &mut form, &shipping).await?;
                }
                collect(&mut prompt, &mut form, &payment, Step::Payment).await?;
            }
            Err(e @ CheckoutError::Submission(_)) => {
                if !prompt.yes_no("Try again?").await? {
                    return Err(e.into());
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Prompt for `fields` on the shipping step until it validates, then ask
/// about saving the details.
async fn collect_shipping(
    prompt: &mut Prompt,
    form: &mut CheckoutForm,
    fields: &[CheckoutField],
) -> Result<()> {
    collect(prompt, form, fields, Step::Shipping).await?;

    while form.advance() == Step::Shipping {
        terminal::print_line("Please correct the following:");
        terminal::print_field_errors(form.errors());
        let missing: Vec<CheckoutField> = form.errors().iter().map(|(field, _)| field).collect();
        collect(prompt, form, &missing, Step::Shipping).await?;
    }

    let save_info = prompt
        .yes_no("Save this information for next time?")
        .await?;
    form.set_save_info(save_info);
    Ok(())
}

async fn collect(
    prompt: &mut Prompt,
    form: &mut CheckoutForm,
    fields: &[CheckoutField],
    step: Step,
) -> Result<()> {
    if fields.is_empty() {
        return Ok(());
    }
    terminal::print_heading(&format!("Step {} of 2: {}", step.number(), step.title()));
    for &field in fields {
        let value = prompt.field(field, form.value(field)).await?;
        form.set_field(field, &value);
    }
    Ok(())
}
