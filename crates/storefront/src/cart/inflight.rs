//! Per-product in-flight locks.
//!
//! Operations on one product run one at a time, in arrival order; operations
//! on different products never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use shopeasy_core::ProductId;

#[derive(Debug, Default)]
pub(crate) struct ProductLocks {
    locks: Mutex<HashMap<ProductId, Arc<AsyncMutex<()>>>>,
}

/// Held while an operation on one product is in flight.
pub(crate) struct InFlight<'a> {
    locks: &'a ProductLocks,
    product_id: ProductId,
    lock: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ProductLocks {
    /// Wait for earlier operations on `product_id`, then claim it.
    pub(crate) async fn acquire(&self, product_id: ProductId) -> InFlight<'_> {
        let lock = Arc::clone(self.map().entry(product_id).or_default());
        let guard = Arc::clone(&lock).lock_owned().await;

        InFlight {
            locks: self,
            product_id,
            lock,
            guard: Some(guard),
        }
    }

    /// Whether an operation on `product_id` is in flight.
    pub(crate) fn is_pending(&self, product_id: ProductId) -> bool {
        self.map()
            .get(&product_id)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    fn map(&self) -> MutexGuard<'_, HashMap<ProductId, Arc<AsyncMutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Map entry plus this handle; anything more is a queued waiter
        let mut map = self.locks.map();
        if Arc::strong_count(&self.lock) == 2 {
            map.remove(&self.product_id);
        }
    }
}
