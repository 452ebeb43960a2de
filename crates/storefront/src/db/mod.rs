//! Database operations for the Shopfront `PostgreSQL` order store.
//!
//! # Schema: `shopfront`
//!
//! ## Tables
//!
//! - `orders` - Placed orders, one row per submission key
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p shopfront-cli -- migrate
//! ```

mod orders;

pub use orders::PgOrderStore;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply any pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history does
/// not match the migration files.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running shopfront migrations");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Shopfront migrations complete");
    Ok(())
}
