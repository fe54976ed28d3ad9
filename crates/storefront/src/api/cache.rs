//! Cache types for catalog responses.

use shopeasy_core::{Category, Product, ProductId};

/// Cache key for products and categories.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products { category: Option<String> },
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    /// `None` records a confirmed 404 so repeated lookups stay cheap.
    Product(Option<Box<Product>>),
    Products(Vec<Product>),
    Categories(Vec<Category>),
}
