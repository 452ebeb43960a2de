//! Terminal input and output.
//!
//! Everything the shopper sees or types goes through this module.

#![allow(clippy::print_stdout)]

use std::io::{self, Write};

use shopfront::checkout::{CheckoutField, FieldErrors};
use shopfront::confirm::{ConfirmationReceiver, DialogKind};
use shopfront::notify::{Notification, NotificationKind, Notifier};
use shopfront_core::{CartItem, OrderSummary, Product, format_amount};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

/// Line-oriented reader over stdin.
pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `label` and read one line.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` if stdin is closed.
    pub async fn ask(&mut self, label: &str) -> io::Result<String> {
        print!("{label}");
        io::stdout().flush()?;
        self.lines
            .next_line()
            .await?
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"))
    }

    /// Ask for a field value, keeping `current` when the answer is empty.
    pub async fn field(&mut self, field: CheckoutField, current: &str) -> io::Result<String> {
        let label = if current.is_empty() {
            format!("{}: ", field.label())
        } else {
            format!("{} [{current}]: ", field.label())
        };
        let answer = self.ask(&label).await?;
        Ok(if answer.trim().is_empty() {
            current.to_string()
        } else {
            answer
        })
    }

    /// Ask a yes/no question; anything but `y`/`yes` is no.
    pub async fn yes_no(&mut self, question: &str) -> io::Result<bool> {
        let answer = self.ask(&format!("{question} [y/N]: ")).await?;
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}

/// Answer confirmation dialogs on stdin until every sender is gone.
pub async fn answer_confirmations(mut receiver: ConfirmationReceiver) {
    let mut prompt = Prompt::stdin();
    while let Some(pending) = receiver.recv().await {
        let request = pending.request();
        let marker = match request.kind {
            Some(DialogKind::Danger) => "!! ",
            Some(DialogKind::Warning) => "! ",
            _ => "",
        };
        println!();
        println!("{marker}{}", request.title);
        println!("{}", request.message);
        let question = format!("{}? (cancel: {})", request.confirm_text, request.cancel_text);

        match prompt.yes_no(&question).await {
            Ok(confirmed) => pending.respond(confirmed),
            Err(e) => {
                debug!(error = %e, "Confirmation prompt failed, cancelling");
                pending.decline();
            }
        }
    }
}

/// Prints notifications as they arrive.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let marker = match notification.kind {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✗",
            NotificationKind::Warning => "!",
            NotificationKind::Info => "i",
        };
        println!("{marker} {}", notification.message);
    }
}

pub fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }
    for product in products {
        println!(
            "{:>4}  {:<60}  {:>10}  {}",
            product.id.to_string(),
            product.title,
            product.price.to_string(),
            product.category
        );
    }
}

pub fn print_product(product: &Product) {
    println!("{} (#{})", product.title, product.id);
    println!("Price:    {}", product.price);
    println!("Category: {}", product.category);
    if let Some(rating) = &product.rating {
        println!("Rating:   {:.1} ({} reviews)", rating.rate, rating.count);
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
}

pub fn print_cart(items: &[CartItem], summary: &OrderSummary) {
    if items.is_empty() {
        println!("Your cart is empty");
        return;
    }
    for item in items {
        println!(
            "{:>4}  {:<50}  {:>3} x {:>9}  {:>10}",
            item.id.to_string(),
            item.title,
            item.quantity,
            item.price.to_string(),
            format_amount(item.line_total())
        );
    }
    print_summary(summary);
}

pub fn print_summary(summary: &OrderSummary) {
    println!();
    println!("Subtotal  {:>10}", format_amount(summary.subtotal));
    println!("Shipping  {:>10}", format_amount(summary.shipping));
    println!("Tax       {:>10}", format_amount(summary.tax));
    println!("Total     {:>10}", format_amount(summary.total));
}

pub fn print_field_errors(errors: &FieldErrors) {
    for (_, message) in errors.iter() {
        println!("  - {message}");
    }
}

pub fn print_heading(text: &str) {
    println!();
    println!("{text}");
    println!("{}", "-".repeat(text.chars().count()));
}

pub fn print_line(text: &str) {
    println!("{text}");
}
