//! Cart synchronization.
//!
//! The [`CartSync`] engine keeps a local [`CartMirror`](shopeasy_core::CartMirror)
//! consistent with a [`RemoteCart`]: each intent issues one delta call and
//! the mirror changes only after the remote confirms it.

mod catalog;
mod engine;
mod inflight;
mod remote;

pub use catalog::{CatalogError, LoadedCatalog, ProductLookup};
pub use engine::{
    CartDelta, CartEvent, CartSync, CartSyncConfig, CartSyncError, DEFAULT_REQUEST_TIMEOUT,
    IgnoreReason, SyncOutcome,
};
pub use remote::{RemoteCart, RemoteCartError};
