//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for the command-line front end. Errors
//! the shopper cannot fix are captured to Sentry when they are reported; the
//! shopper only ever sees [`AppError::user_message`].

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing or invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog API operation failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Checkout could not be completed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Database connection failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad input from the shopper.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error is captured to Sentry when reported.
    ///
    /// Order store failures inside a checkout are captured where they
    /// happen and are not captured again.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Database(_) | Self::Migration(_) | Self::Io(_) => true,
            Self::Catalog(err) => !matches!(err, CatalogError::NotFound(_)),
            Self::Checkout(_) | Self::Config(_) | Self::BadRequest(_) => false,
        }
    }

    /// Message safe to show the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        // Don't expose internal error details
        match self {
            Self::Catalog(CatalogError::NotFound(_)) => "Product not found".to_string(),
            Self::Catalog(_) => "The product catalog is unavailable".to_string(),
            Self::Checkout(err) => err.user_message(),
            Self::Config(err) => err.to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Database(_) | Self::Migration(_) | Self::Io(_) => {
                "Something went wrong".to_string()
            }
        }
    }

    /// Log the error, capturing internal ones to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command failed"
            );
        } else {
            tracing::warn!(error = %self, "Command failed");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this once the shopper is known to associate errors with them.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
