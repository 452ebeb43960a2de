//! `PostgreSQL` order store.

use shopfront_core::{OrderId, OrderRecord};
use sqlx::PgPool;
use sqlx::error::ErrorKind;
use sqlx::types::Json;
use tracing::instrument;

use crate::orders::{OrderStore, StoreError};

/// Order store writing to `shopfront.orders`.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl OrderStore for PgOrderStore {
    /// Insert the order, or return the id of the row already holding its
    /// submission key.
    #[instrument(skip_all, fields(submission_key = %record.order.submission_key))]
    async fn create_record(&self, record: &OrderRecord) -> Result<OrderId, StoreError> {
        let order = &record.order;

        // The no-op update makes RETURNING yield the existing row on conflict
        let id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO shopfront.orders (
                id, submission_key, user_id, email, first_name, last_name, phone,
                address, city, zip_code, items,
                subtotal, shipping, tax, total,
                status, payment_method, card_last4, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                $8, $9, $10, $11,
                $12, $13, $14, $15,
                $16, $17, $18, $19, $20
            )
            ON CONFLICT (submission_key) DO UPDATE
                SET submission_key = EXCLUDED.submission_key
            RETURNING id
            ",
        )
        .bind(OrderId::generate())
        .bind(order.submission_key)
        .bind(order.customer.user_id)
        .bind(order.customer.email.as_str())
        .bind(&order.customer.first_name)
        .bind(&order.customer.last_name)
        .bind(&order.customer.phone)
        .bind(&order.shipping_address.address)
        .bind(&order.shipping_address.city)
        .bind(&order.shipping_address.zip_code)
        .bind(Json(&order.items))
        .bind(order.summary.subtotal)
        .bind(order.summary.shipping)
        .bind(order.summary.tax)
        .bind(order.summary.total)
        .bind(record.status.as_str())
        .bind(order.payment_method.as_str())
        .bind(&order.payment.card_last4)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(id)
    }
}

/// Constraint violations mean the row itself is bad; retrying won't help.
fn store_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db)
            if matches!(db.kind(), ErrorKind::CheckViolation | ErrorKind::NotNullViolation) =>
        {
            StoreError::Rejected(db.message().to_string())
        }
        other => StoreError::Database(other),
    }
}
