//! In-memory stand-ins for the remote cart and catalog.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::{Mutex as AsyncMutex, Semaphore, mpsc};

use shopeasy_core::{Price, Product, ProductId};
use shopeasy_storefront::cart::{
    CartDelta, CartSync, CartSyncConfig, LoadedCatalog, RemoteCart, RemoteCartError,
};

/// A remote call as seen by the fake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartCall {
    pub delta: CartDelta,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CartCall {
    #[must_use]
    pub const fn add(product_id: i64, quantity: u32) -> Self {
        Self {
            delta: CartDelta::Add,
            product_id: ProductId::new(product_id),
            quantity,
        }
    }

    #[must_use]
    pub const fn remove(product_id: i64, quantity: u32) -> Self {
        Self {
            delta: CartDelta::Remove,
            product_id: ProductId::new(product_id),
            quantity,
        }
    }
}

/// Scriptable remote cart.
///
/// Records every call when it starts. A gated fake holds each call until
/// [`FakeRemote::release`] hands out a permit, so tests can observe
/// operations while they are in flight.
pub struct FakeRemote {
    calls: Mutex<Vec<CartCall>>,
    fail_next: Mutex<VecDeque<RemoteCartError>>,
    failing_products: Mutex<HashSet<ProductId>>,
    gate: Option<Semaphore>,
    started_tx: mpsc::UnboundedSender<CartCall>,
    started_rx: AsyncMutex<mpsc::UnboundedReceiver<CartCall>>,
}

impl FakeRemote {
    /// Answers every call immediately with success.
    #[must_use]
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    /// Holds every call until released.
    #[must_use]
    pub fn gated() -> Arc<Self> {
        Arc::new(Self::build(Some(Semaphore::new(0))))
    }

    fn build(gate: Option<Semaphore>) -> Self {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        Self {
            calls: Mutex::default(),
            fail_next: Mutex::default(),
            failing_products: Mutex::default(),
            gate,
            started_tx,
            started_rx: AsyncMutex::new(started_rx),
        }
    }

    /// Fail the next call with `error`.
    pub fn fail_next(&self, error: RemoteCartError) {
        lock(&self.fail_next).push_back(error);
    }

    /// Fail every call for `product_id`.
    pub fn fail_product(&self, product_id: i64) {
        lock(&self.failing_products).insert(ProductId::new(product_id));
    }

    /// Let `calls` gated calls complete.
    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    /// Every call started so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<CartCall> {
        lock(&self.calls).clone()
    }

    /// Wait for the next call to start.
    ///
    /// # Panics
    ///
    /// Panics if the fake has been dropped.
    pub async fn next_started(&self) -> CartCall {
        self.started_rx
            .lock()
            .await
            .recv()
            .await
            .expect("fake remote dropped")
    }

    async fn handle(&self, call: CartCall) -> Result<(), RemoteCartError> {
        lock(&self.calls).push(call);
        let _ = self.started_tx.send(call);

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        if let Some(error) = lock(&self.fail_next).pop_front() {
            return Err(error);
        }
        if lock(&self.failing_products).contains(&call.product_id) {
            return Err(RemoteCartError::Rejected {
                status: 400,
                message: "Produto indisponível".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteCart for FakeRemote {
    async fn add_to_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RemoteCartError> {
        self.handle(CartCall {
            delta: CartDelta::Add,
            product_id,
            quantity,
        })
        .await
    }

    async fn remove_from_cart(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RemoteCartError> {
        self.handle(CartCall {
            delta: CartDelta::Remove,
            product_id,
            quantity,
        })
        .await
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A product priced in the store currency.
///
/// # Panics
///
/// Panics if `price` is not a valid non-negative decimal.
#[must_use]
pub fn product(id: i64, name: &str, price: &str) -> Product {
    let amount: Decimal = price.parse().expect("valid decimal");
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Price::store(amount).expect("non-negative price"),
        description: None,
        image: None,
        gallery: Vec::new(),
        category: None,
        on_sale: false,
    }
}

/// Products 1 to 3 plus 42.
#[must_use]
pub fn sample_catalog() -> LoadedCatalog {
    [
        product(1, "blusa de linho", "49.90"),
        product(2, "saia midi", "79.90"),
        product(3, "calça pantalona", "129.00"),
        product(42, "vestido floral", "99.90"),
    ]
    .into_iter()
    .collect()
}

/// Engine over `remote` and the sample catalog.
#[must_use]
pub fn engine(
    remote: &Arc<FakeRemote>,
    config: CartSyncConfig,
) -> CartSync<Arc<FakeRemote>, LoadedCatalog> {
    CartSync::new(Arc::clone(remote), sample_catalog(), config)
}
