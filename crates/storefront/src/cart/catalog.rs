//! Product lookup used to materialize new cart lines.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use shopeasy_core::{Product, ProductId};

/// The catalog could not answer a lookup.
#[derive(Debug, Error)]
#[error("catalog unavailable: {source}")]
pub struct CatalogError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl CatalogError {
    /// Wrap the underlying failure.
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Resolve a product identity to its snapshot.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// `Ok(None)` when the product is unknown.
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, CatalogError>;
}

#[async_trait]
impl<T: ProductLookup + ?Sized> ProductLookup for Arc<T> {
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, CatalogError> {
        (**self).get_product(product_id).await
    }
}

/// Products already loaded by the current page (listing or detail view).
///
/// Lookups never fail; a product the page did not load is unknown.
#[derive(Debug, Clone, Default)]
pub struct LoadedCatalog {
    products: HashMap<ProductId, Product>,
}

impl LoadedCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a product.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&Product> {
        self.products.get(&product_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl FromIterator<Product> for LoadedCatalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        Self {
            products: iter.into_iter().map(|p| (p.id, p)).collect(),
        }
    }
}

impl Extend<Product> for LoadedCatalog {
    fn extend<I: IntoIterator<Item = Product>>(&mut self, iter: I) {
        self.products.extend(iter.into_iter().map(|p| (p.id, p)));
    }
}

#[async_trait]
impl ProductLookup for LoadedCatalog {
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.products.get(&product_id).cloned())
    }
}
