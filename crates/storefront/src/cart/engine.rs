//! Cart synchronization engine.
//!
//! Connects the four cart intents to one delta call against the
//! [`RemoteCart`] and, only once that call is confirmed, to the matching
//! change of the [`CartMirror`].
//!
//! # Rules
//!
//! - The mirror is never touched before or without remote confirmation
//! - A failed or timed-out call leaves the mirror exactly as it was
//! - Operations on the same product are serialized in arrival order; each
//!   reads the mirror as left by the previous one
//! - The mirror lock is never held across an await point

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, instrument, warn};

use shopeasy_core::{CartMirror, Product, ProductId};

use super::catalog::{CatalogError, ProductLookup};
use super::inflight::ProductLocks;
use super::remote::{RemoteCart, RemoteCartError};
use crate::config::StorefrontConfig;

/// Default timeout for one remote cart call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Buffered events per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 64;

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSyncConfig {
    /// Upper bound on a single remote call; expiry counts as a failure.
    pub request_timeout: Duration,
}

impl Default for CartSyncConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl From<&StorefrontConfig> for CartSyncConfig {
    fn from(config: &StorefrontConfig) -> Self {
        Self {
            request_timeout: config.api.request_timeout,
        }
    }
}

/// Direction of a delta call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartDelta {
    Add,
    Remove,
}

impl fmt::Display for CartDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("add"),
            Self::Remove => f.write_str("remove"),
        }
    }
}

/// Why an operation did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The catalog does not know the product.
    UnknownProduct,
    /// The cart holds no line for the product.
    NotInCart,
    /// The line already holds `u32::MAX` units.
    QuantityLimit,
}

/// Result of an operation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The remote confirmed the delta and the mirror was updated.
    ///
    /// `quantity` is the line's new quantity; `0` means the line was removed.
    Applied { product_id: ProductId, quantity: u32 },
    /// Nothing was sent and nothing changed.
    Ignored {
        product_id: ProductId,
        reason: IgnoreReason,
    },
}

impl SyncOutcome {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Errors returned by cart operations. The mirror is unchanged in every case.
#[derive(Debug, Error)]
pub enum CartSyncError {
    /// The remote cart rejected or failed the delta.
    #[error("failed to {delta} {quantity} unit(s) of product {product_id}: {source}")]
    Remote {
        delta: CartDelta,
        product_id: ProductId,
        quantity: u32,
        #[source]
        source: RemoteCartError,
    },

    /// The remote cart did not answer in time.
    #[error("timed out after {after:?} trying to {delta} {quantity} unit(s) of product {product_id}")]
    Timeout {
        delta: CartDelta,
        product_id: ProductId,
        quantity: u32,
        after: Duration,
    },

    /// The product could not be resolved because the catalog failed.
    #[error("could not resolve product {product_id}: {source}")]
    Catalog {
        product_id: ProductId,
        #[source]
        source: CatalogError,
    },
}

impl CartSyncError {
    /// The product the failed operation targeted.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::Remote { product_id, .. }
            | Self::Timeout { product_id, .. }
            | Self::Catalog { product_id, .. } => *product_id,
        }
    }
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// The mirror changed; carries the new snapshot.
    MirrorChanged(CartMirror),
    /// A product was added; the cart view should be shown.
    RevealCart,
}

/// Cart synchronization engine for one page session.
///
/// Cheaply cloneable via `Arc`; all clones share one mirror.
pub struct CartSync<R, C> {
    inner: Arc<CartSyncInner<R, C>>,
}

struct CartSyncInner<R, C> {
    remote: R,
    catalog: C,
    mirror: Mutex<CartMirror>,
    locks: ProductLocks,
    events: broadcast::Sender<CartEvent>,
    request_timeout: Duration,
}

impl<R, C> Clone for CartSync<R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: RemoteCart, C: ProductLookup> CartSync<R, C> {
    /// Start a session with an empty mirror.
    #[must_use]
    pub fn new(remote: R, catalog: C, config: CartSyncConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(CartSyncInner {
                remote,
                catalog,
                mirror: Mutex::new(CartMirror::new()),
                locks: ProductLocks::default(),
                events,
                request_timeout: config.request_timeout,
            }),
        }
    }

    /// An owned copy of the current mirror.
    #[must_use]
    pub fn snapshot(&self) -> CartMirror {
        self.mirror().clone()
    }

    /// Receive mirror changes and reveal-cart signals.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.inner.events.subscribe()
    }

    /// Whether an operation on `product_id` is waiting on the remote.
    #[must_use]
    pub fn is_pending(&self, product_id: ProductId) -> bool {
        self.inner.locks.is_pending(product_id)
    }

    /// Add one unit of a product resolved through the catalog.
    ///
    /// An unknown product is ignored without contacting the remote.
    ///
    /// # Errors
    ///
    /// Returns `CartSyncError` if the lookup or the remote call fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_item(&self, product_id: ProductId) -> Result<SyncOutcome, CartSyncError> {
        let product = self
            .inner
            .catalog
            .get_product(product_id)
            .await
            .map_err(|source| {
                warn!(error = %source, "Product lookup failed");
                CartSyncError::Catalog { product_id, source }
            })?;

        let Some(product) = product else {
            debug!("Unknown product, nothing sent");
            return Ok(SyncOutcome::Ignored {
                product_id,
                reason: IgnoreReason::UnknownProduct,
            });
        };

        self.add_product(&product).await
    }

    /// Add one unit of an already-resolved product.
    ///
    /// On success, an existing line gains one unit; otherwise a new line is
    /// appended with this snapshot. Emits [`CartEvent::RevealCart`].
    ///
    /// # Errors
    ///
    /// Returns `CartSyncError` if the remote call fails or times out.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_product(&self, product: &Product) -> Result<SyncOutcome, CartSyncError> {
        let _in_flight = self.inner.locks.acquire(product.id).await;

        if !self.mirror().can_add_one(product.id) {
            return Ok(at_limit(product.id));
        }

        self.call_remote(CartDelta::Add, product.id, 1).await?;
        let quantity = self
            .mutate(|mirror| mirror.add_one(product))
            .unwrap_or_default();
        self.emit(CartEvent::RevealCart);

        Ok(SyncOutcome::Applied {
            product_id: product.id,
            quantity,
        })
    }

    /// Remove a product's line entirely.
    ///
    /// Sends one removal for the line's full quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartSyncError` if the remote call fails or times out.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_all_of_item(
        &self,
        product_id: ProductId,
    ) -> Result<SyncOutcome, CartSyncError> {
        let _in_flight = self.inner.locks.acquire(product_id).await;

        let Some(quantity) = self.mirror().quantity_of(product_id) else {
            return Ok(not_in_cart(product_id));
        };

        self.call_remote(CartDelta::Remove, product_id, quantity).await?;
        self.mutate(|mirror| mirror.remove(product_id));

        Ok(SyncOutcome::Applied {
            product_id,
            quantity: 0,
        })
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartSyncError` if the remote call fails or times out.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn increase_quantity(
        &self,
        product_id: ProductId,
    ) -> Result<SyncOutcome, CartSyncError> {
        let _in_flight = self.inner.locks.acquire(product_id).await;

        match self.mirror().quantity_of(product_id) {
            None => return Ok(not_in_cart(product_id)),
            Some(u32::MAX) => return Ok(at_limit(product_id)),
            Some(_) => {}
        }

        self.call_remote(CartDelta::Add, product_id, 1).await?;
        let quantity = self
            .mutate(|mirror| mirror.increment(product_id))
            .unwrap_or_default();

        Ok(SyncOutcome::Applied {
            product_id,
            quantity,
        })
    }

    /// Take one unit off an existing line; a line reaching zero is removed.
    ///
    /// # Errors
    ///
    /// Returns `CartSyncError` if the remote call fails or times out.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn decrease_quantity(
        &self,
        product_id: ProductId,
    ) -> Result<SyncOutcome, CartSyncError> {
        let _in_flight = self.inner.locks.acquire(product_id).await;

        if !self.mirror().contains(product_id) {
            return Ok(not_in_cart(product_id));
        }

        self.call_remote(CartDelta::Remove, product_id, 1).await?;
        let quantity = self
            .mutate(|mirror| mirror.decrement(product_id))
            .unwrap_or_default();

        Ok(SyncOutcome::Applied {
            product_id,
            quantity,
        })
    }

    /// Issue one delta call under the configured timeout.
    async fn call_remote(
        &self,
        delta: CartDelta,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartSyncError> {
        let timeout = self.inner.request_timeout;
        let call = match delta {
            CartDelta::Add => self.inner.remote.add_to_cart(product_id, quantity),
            CartDelta::Remove => self.inner.remote.remove_from_cart(product_id, quantity),
        };

        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(())) => {
                debug!(%delta, quantity, "Remote cart confirmed delta");
                Ok(())
            }
            Ok(Err(source)) => {
                warn!(
                    %delta,
                    quantity,
                    error = %source,
                    "Remote cart call failed; mirror unchanged"
                );
                Err(CartSyncError::Remote {
                    delta,
                    product_id,
                    quantity,
                    source,
                })
            }
            Err(_) => {
                warn!(%delta, quantity, ?timeout, "Remote cart call timed out; mirror unchanged");
                Err(CartSyncError::Timeout {
                    delta,
                    product_id,
                    quantity,
                    after: timeout,
                })
            }
        }
    }

    /// Apply a confirmed change and publish the new snapshot.
    fn mutate<T>(&self, apply: impl FnOnce(&mut CartMirror) -> T) -> T {
        let (result, snapshot) = {
            let mut mirror = self.mirror();
            let result = apply(&mut *mirror);
            (result, mirror.clone())
        };
        self.emit(CartEvent::MirrorChanged(snapshot));
        result
    }

    fn emit(&self, event: CartEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    fn mirror(&self) -> MutexGuard<'_, CartMirror> {
        self.inner.mirror.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

const fn not_in_cart(product_id: ProductId) -> SyncOutcome {
    SyncOutcome::Ignored {
        product_id,
        reason: IgnoreReason::NotInCart,
    }
}

const fn at_limit(product_id: ProductId) -> SyncOutcome {
    SyncOutcome::Ignored {
        product_id,
        reason: IgnoreReason::QuantityLimit,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::num::NonZeroU32;

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use shopeasy_core::{CartLine, Price};

    use super::*;
    use crate::cart::LoadedCatalog;

    /// Records every call; answers from a script, defaulting to success.
    #[derive(Default)]
    struct ScriptedRemote {
        calls: Mutex<Vec<(CartDelta, ProductId, u32)>>,
        script: Mutex<VecDeque<Result<(), RemoteCartError>>>,
    }

    impl ScriptedRemote {
        fn fail_next(&self) {
            self.script
                .lock()
                .unwrap()
                .push_back(Err(RemoteCartError::Transport("connection reset".to_string())));
        }

        fn calls(&self) -> Vec<(CartDelta, ProductId, u32)> {
            self.calls.lock().unwrap().clone()
        }

        fn record(
            &self,
            delta: CartDelta,
            product_id: ProductId,
            quantity: u32,
        ) -> Result<(), RemoteCartError> {
            self.calls.lock().unwrap().push((delta, product_id, quantity));
            self.script.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }
    }

    #[async_trait]
    impl RemoteCart for ScriptedRemote {
        async fn add_to_cart(
            &self,
            product_id: ProductId,
            quantity: u32,
        ) -> Result<(), RemoteCartError> {
            self.record(CartDelta::Add, product_id, quantity)
        }

        async fn remove_from_cart(
            &self,
            product_id: ProductId,
            quantity: u32,
        ) -> Result<(), RemoteCartError> {
            self.record(CartDelta::Remove, product_id, quantity)
        }
    }

    /// Never answers.
    struct HungRemote;

    #[async_trait]
    impl RemoteCart for HungRemote {
        async fn add_to_cart(&self, _: ProductId, _: u32) -> Result<(), RemoteCartError> {
            std::future::pending().await
        }

        async fn remove_from_cart(&self, _: ProductId, _: u32) -> Result<(), RemoteCartError> {
            std::future::pending().await
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl ProductLookup for BrokenCatalog {
        async fn get_product(&self, _: ProductId) -> Result<Option<Product>, CatalogError> {
            Err(CatalogError::new("catalog down"))
        }
    }

    fn product(id: i64, name: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Price::store(Decimal::new(cents, 2)).unwrap(),
            description: None,
            image: None,
            gallery: Vec::new(),
            category: None,
            on_sale: false,
        }
    }

    fn catalog() -> LoadedCatalog {
        [
            product(1, "blusa", 4990),
            product(2, "saia", 7990),
            product(42, "vestido", 9990),
        ]
        .into_iter()
        .collect()
    }

    fn engine() -> (Arc<ScriptedRemote>, CartSync<Arc<ScriptedRemote>, LoadedCatalog>) {
        let remote = Arc::new(ScriptedRemote::default());
        let engine = CartSync::new(Arc::clone(&remote), catalog(), CartSyncConfig::default());
        (remote, engine)
    }

    fn lines(engine: &CartSync<Arc<ScriptedRemote>, LoadedCatalog>) -> Vec<(i64, u32)> {
        engine
            .snapshot()
            .iter()
            .map(|line| (line.product_id().as_i64(), line.quantity()))
            .collect()
    }

    const P: ProductId = ProductId::new(42);

    #[tokio::test]
    async fn test_add_twice_merges_into_one_line() {
        let (remote, engine) = engine();

        engine.add_item(P).await.unwrap();
        let outcome = engine.add_item(P).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Applied { product_id: P, quantity: 2 });
        assert_eq!(lines(&engine), vec![(42, 2)]);
        assert_eq!(remote.calls(), vec![(CartDelta::Add, P, 1), (CartDelta::Add, P, 1)]);
    }

    #[tokio::test]
    async fn test_unknown_product_sends_nothing() {
        let (remote, engine) = engine();

        let outcome = engine.add_item(ProductId::new(999)).await.unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::Ignored {
                product_id: ProductId::new(999),
                reason: IgnoreReason::UnknownProduct
            }
        );
        assert!(remote.calls().is_empty());
        assert!(engine.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_sends_nothing() {
        let remote = Arc::new(ScriptedRemote::default());
        let engine = CartSync::new(Arc::clone(&remote), BrokenCatalog, CartSyncConfig::default());

        let err = engine.add_item(P).await.unwrap_err();

        assert!(matches!(err, CartSyncError::Catalog { .. }));
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remove_all_sends_full_quantity() {
        let (remote, engine) = engine();
        for _ in 0..3 {
            engine.add_item(P).await.unwrap();
        }

        let outcome = engine.remove_all_of_item(P).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Applied { product_id: P, quantity: 0 });
        assert!(engine.snapshot().is_empty());
        assert_eq!(remote.calls().last(), Some(&(CartDelta::Remove, P, 3)));
    }

    #[tokio::test]
    async fn test_decrease_from_one_removes_line() {
        let (_, engine) = engine();
        engine.add_item(P).await.unwrap();

        let outcome = engine.decrease_quantity(P).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Applied { product_id: P, quantity: 0 });
        assert!(engine.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_decrease_from_three_leaves_two() {
        let (_, engine) = engine();
        for _ in 0..3 {
            engine.add_item(P).await.unwrap();
        }

        engine.decrease_quantity(P).await.unwrap();

        assert_eq!(lines(&engine), vec![(42, 2)]);
    }

    #[tokio::test]
    async fn test_increase_keeps_first_add_order() {
        let (_, engine) = engine();

        engine.add_item(ProductId::new(1)).await.unwrap();
        engine.add_item(ProductId::new(2)).await.unwrap();
        engine.increase_quantity(ProductId::new(1)).await.unwrap();

        assert_eq!(lines(&engine), vec![(1, 2), (2, 1)]);
    }

    #[tokio::test]
    async fn test_operations_on_missing_line_are_ignored() {
        let (remote, engine) = engine();

        for outcome in [
            engine.increase_quantity(P).await.unwrap(),
            engine.decrease_quantity(P).await.unwrap(),
            engine.remove_all_of_item(P).await.unwrap(),
        ] {
            assert_eq!(
                outcome,
                SyncOutcome::Ignored {
                    product_id: P,
                    reason: IgnoreReason::NotInCart
                }
            );
        }
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn test_full_line_sends_nothing() {
        let (remote, engine) = engine();
        let full = CartLine::with_quantity(product(42, "vestido", 9990), NonZeroU32::MAX);
        *engine.mirror() = std::iter::once(full).collect();
        let before = engine.snapshot();

        let limit = SyncOutcome::Ignored {
            product_id: P,
            reason: IgnoreReason::QuantityLimit,
        };
        assert_eq!(engine.add_item(P).await.unwrap(), limit);
        assert_eq!(engine.increase_quantity(P).await.unwrap(), limit);

        assert!(remote.calls().is_empty());
        assert_eq!(engine.snapshot(), before);

        engine.decrease_quantity(P).await.unwrap();
        assert_eq!(lines(&engine), vec![(42, u32::MAX - 1)]);
        engine.increase_quantity(P).await.unwrap();
        assert_eq!(lines(&engine), vec![(42, u32::MAX)]);
    }

    #[tokio::test]
    async fn test_failed_call_leaves_mirror_unchanged() {
        let (remote, engine) = engine();
        engine.add_item(P).await.unwrap();
        engine.add_item(ProductId::new(1)).await.unwrap();
        let before = engine.snapshot();

        remote.fail_next();
        assert!(engine.add_item(P).await.is_err());
        remote.fail_next();
        assert!(engine.increase_quantity(P).await.is_err());
        remote.fail_next();
        assert!(engine.decrease_quantity(P).await.is_err());
        remote.fail_next();
        let err = engine.remove_all_of_item(P).await.unwrap_err();

        assert_eq!(engine.snapshot(), before);
        assert!(matches!(
            err,
            CartSyncError::Remote {
                delta: CartDelta::Remove,
                quantity: 1,
                ..
            }
        ));
        assert_eq!(err.product_id(), P);
    }

    #[tokio::test]
    async fn test_hung_remote_times_out() {
        let config = CartSyncConfig {
            request_timeout: Duration::from_millis(20),
        };
        let engine = CartSync::new(HungRemote, catalog(), config);

        let err = engine.add_item(P).await.unwrap_err();

        assert!(matches!(err, CartSyncError::Timeout { delta: CartDelta::Add, .. }));
        assert!(engine.snapshot().is_empty());
        assert!(!engine.is_pending(P));
    }

    #[tokio::test]
    async fn test_events_follow_successful_add() {
        let (_, engine) = engine();
        let mut events = engine.subscribe();

        engine.add_item(P).await.unwrap();

        let CartEvent::MirrorChanged(snapshot) = events.recv().await.unwrap() else {
            panic!("expected mirror change first");
        };
        assert_eq!(snapshot.quantity_of(P), Some(1));
        assert_eq!(events.recv().await.unwrap(), CartEvent::RevealCart);
    }

    #[tokio::test]
    async fn test_no_events_on_failure() {
        let (remote, engine) = engine();
        let mut events = engine.subscribe();

        remote.fail_next();
        assert!(engine.add_item(P).await.is_err());

        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_walkthrough() {
        let (remote, engine) = engine();

        engine.add_item(P).await.unwrap();
        assert_eq!(lines(&engine), vec![(42, 1)]);
        let line = engine.snapshot().get(P).cloned().unwrap();
        assert_eq!(line.product().name, "vestido");
        assert_eq!(line.product().price.amount(), Decimal::new(9990, 2));

        engine.increase_quantity(P).await.unwrap();
        assert_eq!(lines(&engine), vec![(42, 2)]);

        engine.decrease_quantity(P).await.unwrap();
        assert_eq!(lines(&engine), vec![(42, 1)]);

        engine.remove_all_of_item(P).await.unwrap();
        assert!(lines(&engine).is_empty());
        assert_eq!(remote.calls().last(), Some(&(CartDelta::Remove, P, 1)));
    }
}
