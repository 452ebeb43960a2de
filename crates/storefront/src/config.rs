//! Shopfront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SHOPFRONT_DATABASE_URL` - `PostgreSQL` connection string for the order
//!   store (falls back to `DATABASE_URL`; without either, orders are kept in
//!   memory)
//! - `SHOPFRONT_CART_PATH` - Cart file (default: `.shopfront/cart.json`)
//! - `SHOPFRONT_CATALOG_URL` - Catalog API base URL (default: `https://fakestoreapi.com`)
//! - `SHOPFRONT_CATALOG_CACHE_TTL_SECS` - Product cache TTL (default: 300)
//! - `SHOPFRONT_SHIPPING_FLAT` - Flat shipping charge (default: 5.99)
//! - `SHOPFRONT_TAX_RATE` - Tax rate applied to the subtotal (default: 0.08)
//! - `SHOPFRONT_USER_ID` / `SHOPFRONT_USER_EMAIL` - Signed-in user (both or neither)
//! - `SHOPFRONT_LOG_FORMAT` - `pretty` (default) or `json`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry traces sample rate (default: 0.1)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::SecretString;
use shopfront_core::{Email, PricingRates, UserId};
use thiserror::Error;
use url::Url;

use crate::identity::CurrentUser;

const DEFAULT_CART_PATH: &str = ".shopfront/cart.json";
const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com";
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Shopfront application configuration.
#[derive(Clone)]
pub struct ShopfrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// Where the cart is persisted
    pub cart_path: PathBuf,
    /// Product catalog API configuration
    pub catalog: CatalogConfig,
    /// Shipping and tax rates applied at checkout
    pub pricing: PricingRates,
    /// Signed-in user, if configured
    pub current_user: Option<CurrentUser>,
    /// Logging and error tracking
    pub telemetry: TelemetryConfig,
}

impl std::fmt::Debug for ShopfrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopfrontConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("cart_path", &self.cart_path)
            .field("catalog", &self.catalog)
            .field("pricing", &self.pricing)
            .field("current_user", &self.current_user)
            .field("telemetry", &self.telemetry)
            .finish()
    }
}

/// Product catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the catalog API
    pub base_url: Url,
    /// How long fetched products stay cached
    pub cache_ttl: Duration,
}

/// Logging and Sentry configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of traces sent to Sentry
    pub sentry_sample_rate: f32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.1,
        }
    }
}

impl ShopfrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value, or if
    /// only one of `SHOPFRONT_USER_ID` / `SHOPFRONT_USER_EMAIL` is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`ShopfrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let database_url = env.get_database_url("SHOPFRONT_DATABASE_URL");
        let cart_path = PathBuf::from(env.get_or_default("SHOPFRONT_CART_PATH", DEFAULT_CART_PATH));

        let catalog = CatalogConfig {
            base_url: env
                .get_or_default("SHOPFRONT_CATALOG_URL", DEFAULT_CATALOG_URL)
                .parse::<Url>()
                .map_err(|e| {
                    ConfigError::InvalidEnvVar("SHOPFRONT_CATALOG_URL".to_string(), e.to_string())
                })?,
            cache_ttl: Duration::from_secs(env.parse_or("SHOPFRONT_CATALOG_CACHE_TTL_SECS", || {
                DEFAULT_CATALOG_CACHE_TTL_SECS
            })?),
        };

        let defaults = PricingRates::default();
        let pricing = PricingRates {
            shipping: env.parse_or("SHOPFRONT_SHIPPING_FLAT", || defaults.shipping)?,
            tax_rate: env.parse_or("SHOPFRONT_TAX_RATE", || defaults.tax_rate)?,
        };
        validate_non_negative("SHOPFRONT_SHIPPING_FLAT", pricing.shipping)?;
        validate_non_negative("SHOPFRONT_TAX_RATE", pricing.tax_rate)?;

        let current_user = env.get_current_user()?;

        let telemetry = TelemetryConfig {
            log_format: env.parse_or("SHOPFRONT_LOG_FORMAT", LogFormat::default)?,
            sentry_dsn: env.get_optional("SENTRY_DSN"),
            sentry_environment: env.get_optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", || 0.1)?,
        };

        Ok(Self {
            database_url,
            cart_path,
            catalog,
            pricing,
            current_user,
            telemetry,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with the helpers used by [`ShopfrontConfig::from_lookup`].
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable. Empty values count as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, or fall back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: impl FnOnce() -> T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_optional(key).map_or_else(
            || Ok(default()),
            |value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
            },
        )
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn get_database_url(&self, primary_key: &str) -> Option<SecretString> {
        self.get_optional(primary_key)
            .or_else(|| self.get_optional("DATABASE_URL"))
            .map(SecretString::from)
    }

    /// Signed-in user from `SHOPFRONT_USER_ID` and `SHOPFRONT_USER_EMAIL`.
    fn get_current_user(&self) -> Result<Option<CurrentUser>, ConfigError> {
        let id = self.get_optional("SHOPFRONT_USER_ID");
        let email = self.get_optional("SHOPFRONT_USER_EMAIL");

        match (id, email) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::MissingEnvVar(
                "SHOPFRONT_USER_EMAIL".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::MissingEnvVar("SHOPFRONT_USER_ID".to_string())),
            (Some(id), Some(email)) => {
                let id = id.parse::<UserId>().map_err(|e| {
                    ConfigError::InvalidEnvVar("SHOPFRONT_USER_ID".to_string(), e.to_string())
                })?;
                let email = Email::parse(email.trim()).map_err(|e| {
                    ConfigError::InvalidEnvVar("SHOPFRONT_USER_EMAIL".to_string(), e.to_string())
                })?;
                Ok(Some(CurrentUser { id, email }))
            }
        }
    }
}

fn validate_non_negative(key: &str, value: Decimal) -> Result<(), ConfigError> {
    if value.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ShopfrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ShopfrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.cart_path, PathBuf::from(".shopfront/cart.json"));
        assert_eq!(config.catalog.base_url.as_str(), "https://fakestoreapi.com/");
        assert_eq!(config.catalog.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.pricing, PricingRates::default());
        assert!(config.current_user.is_none());
        assert_eq!(config.telemetry.log_format, LogFormat::Pretty);
        assert!(config.telemetry.sentry_dsn.is_none());
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[("DATABASE_URL", "postgres://fly/db")]).unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://fly/db"
        );

        let config = load(&[
            ("DATABASE_URL", "postgres://fly/db"),
            ("SHOPFRONT_DATABASE_URL", "postgres://local/shopfront"),
        ])
        .unwrap();
        assert_eq!(
            config.database_url.unwrap().expose_secret(),
            "postgres://local/shopfront"
        );
    }

    #[test]
    fn test_pricing_overrides() {
        let config = load(&[
            ("SHOPFRONT_SHIPPING_FLAT", "0"),
            ("SHOPFRONT_TAX_RATE", "0.2"),
        ])
        .unwrap();
        assert_eq!(config.pricing.shipping, Decimal::ZERO);
        assert_eq!(config.pricing.tax_rate, Decimal::new(2, 1));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("SHOPFRONT_TAX_RATE", "eight percent")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "SHOPFRONT_TAX_RATE"
        ));
        assert!(matches!(
            load(&[("SHOPFRONT_SHIPPING_FLAT", "-1")]),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "SHOPFRONT_SHIPPING_FLAT"
        ));
        assert!(load(&[("SHOPFRONT_CATALOG_URL", "not a url")]).is_err());
        assert!(load(&[("SHOPFRONT_LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_current_user_requires_both_variables() {
        let config = load(&[
            ("SHOPFRONT_USER_ID", "42"),
            ("SHOPFRONT_USER_EMAIL", "jane@example.com"),
        ])
        .unwrap();
        let user = config.current_user.unwrap();
        assert_eq!(user.id, UserId::new(42));
        assert_eq!(user.email.as_str(), "jane@example.com");

        assert!(matches!(
            load(&[("SHOPFRONT_USER_ID", "42")]),
            Err(ConfigError::MissingEnvVar(key)) if key == "SHOPFRONT_USER_EMAIL"
        ));
        assert!(load(&[
            ("SHOPFRONT_USER_ID", "42"),
            ("SHOPFRONT_USER_EMAIL", "not-an-email"),
        ])
        .is_err());
    }

    #[test]
    fn test_json_log_format() {
        let config = load(&[("SHOPFRONT_LOG_FORMAT", "JSON")]).unwrap();
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let config = load(&[("SHOPFRONT_DATABASE_URL", "postgres://user:hunter2@db/shop")]).unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("hunter2"));
    }
}
