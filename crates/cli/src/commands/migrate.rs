//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! shopfront migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! # Migration Files
//!
//! Migrations live in `crates/storefront/migrations/`:
//! ```text
//! migrations/
//! └── 20261018000001_create_orders.sql
//! ```

use shopfront::config::{ConfigError, ShopfrontConfig};
use shopfront::db;
use shopfront::error::Result;
use tracing::info;

/// Run the order store migrations.
///
/// # Errors
///
/// Returns an error if no database is configured, the connection fails, or
/// a migration fails.
pub async fn run(config: &ShopfrontConfig) -> Result<()> {
    let database_url = config
        .database_url
        .as_ref()
        .ok_or_else(|| ConfigError::MissingEnvVar("SHOPFRONT_DATABASE_URL".to_string()))?;

    info!("Connecting to shopfront database...");
    let pool = db::create_pool(database_url).await?;

    db::run_migrations(&pool).await?;
    pool.close().await;
    Ok(())
}
