//! Order submission.
//!
//! Orders are written to an external [`OrderStore`]. [`OrderSubmission`]
//! stamps the record (`pending`, creation timestamps), guards against a
//! second submission while one is in flight and reports failures to Sentry.
//!
//! Every attempt of one checkout carries the same [`SubmissionKey`], and
//! stores return the existing order id when they see a key twice, so a retry
//! after an ambiguous failure never creates a duplicate order.
//!
//! [`SubmissionKey`]: shopfront_core::SubmissionKey

mod memory;

pub use memory::MemoryOrderStore;

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use shopfront_core::{NewOrder, OrderId, OrderRecord};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// Shopper-facing message for a failed order.
pub const ORDER_FAILED_MESSAGE: &str = "Failed to place order. Please try again.";

/// Shopper-facing message for a successful order.
pub const ORDER_PLACED_MESSAGE: &str = "Order placed successfully!";

/// Errors from an order store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store refused the order as malformed.
    #[error("order rejected: {0}")]
    Rejected(String),

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A durable collection of order records.
pub trait OrderStore: Send + Sync {
    /// Insert `record` and return its new id.
    ///
    /// A record whose submission key is already stored must not be inserted
    /// again; the id of the existing record is returned instead.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the record could not be stored.
    fn create_record(
        &self,
        record: &OrderRecord,
    ) -> impl Future<Output = Result<OrderId, StoreError>> + Send;
}

impl<T: OrderStore + ?Sized> OrderStore for &T {
    fn create_record(
        &self,
        record: &OrderRecord,
    ) -> impl Future<Output = Result<OrderId, StoreError>> + Send {
        (**self).create_record(record)
    }
}

/// Errors from [`OrderSubmission::create_order`].
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Another submission through the same handle has not finished.
    #[error("an order submission is already in flight")]
    InFlight,
}

impl SubmissionError {
    /// Message suitable for showing to the shopper.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Store(_) => ORDER_FAILED_MESSAGE,
            Self::InFlight => "Your order is already being placed.",
        }
    }
}

/// Places orders into an [`OrderStore`], one at a time.
#[derive(Debug)]
pub struct OrderSubmission<O> {
    store: O,
    in_flight: AtomicBool,
}

impl<O: OrderStore> OrderSubmission<O> {
    #[must_use]
    pub const fn new(store: O) -> Self {
        Self {
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &O {
        &self.store
    }

    /// Whether a submission is currently running.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Persist `order` as a new `pending` record.
    ///
    /// # Errors
    ///
    /// - [`SubmissionError::InFlight`] if another call has not finished yet
    /// - [`SubmissionError::Store`] if the store fails; the error is captured
    ///   to Sentry before it is returned
    #[instrument(
        skip_all,
        fields(
            submission_key = %order.submission_key,
            item_count = order.items.len(),
            total = %order.total(),
        )
    )]
    pub async fn create_order(&self, order: NewOrder) -> Result<OrderId, SubmissionError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!("Order submission already in flight");
            return Err(SubmissionError::InFlight);
        };

        let record = OrderRecord::pending(order, Utc::now());
        match self.store.create_record(&record).await {
            Ok(order_id) => {
                info!(order_id = %order_id, "Order created");
                Ok(order_id)
            }
            Err(e) => {
                let event_id = sentry::capture_error(&e);
                error!(
                    error = %e,
                    sentry_event_id = %event_id,
                    "Failed to create order"
                );
                Err(SubmissionError::Store(e))
            }
        }
    }
}

/// Holds the in-flight flag for the lifetime of one submission.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
