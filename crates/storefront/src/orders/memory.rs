//! In-process order store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use shopfront_core::{OrderId, OrderRecord};
use tracing::debug;

use super::{OrderStore, StoreError};

/// Order store backed by a `Vec`, for tests and offline use.
///
/// Can be primed to fail a number of times and to delay every write, which
/// is enough to exercise retries and concurrent submissions.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    records: Mutex<Vec<(OrderId, OrderRecord)>>,
    failures_left: AtomicUsize,
    latency: Option<Duration>,
}

impl MemoryOrderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write.
    #[must_use]
    pub fn failing() -> Self {
        Self::new().fail_times(usize::MAX)
    }

    /// Reject the next `times` writes, then accept.
    #[must_use]
    pub fn fail_times(self, times: usize) -> Self {
        self.failures_left.store(times, Ordering::Release);
        self
    }

    /// Delay every write by `latency`.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Stored records in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<(OrderId, OrderRecord)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<(OrderId, OrderRecord)>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("Lock poisoned".to_string()))
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |left| {
                left.checked_sub(1)
            })
            .is_ok()
    }
}

impl OrderStore for MemoryOrderStore {
    async fn create_record(&self, record: &OrderRecord) -> Result<OrderId, StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.take_failure() {
            return Err(StoreError::Unavailable("order store offline".to_string()));
        }

        let mut records = self.lock()?;
        let key = record.order.submission_key;
        if let Some((id, _)) = records
            .iter()
            .find(|(_, existing)| existing.order.submission_key == key)
        {
            debug!(order_id = %id, "Submission key already stored");
            return Ok(*id);
        }

        let id = OrderId::generate();
        records.push((id, record.clone()));
        Ok(id)
    }
}
