//! Read-only catalog client.
//!
//! Caches products and categories using `moka`; the lifetime comes from
//! `SHOPEASY_CATALOG_CACHE_TTL_SECS`.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, instrument};
use url::Url;

use shopeasy_core::{Category, Product, ProductId};

use super::cache::{CacheKey, CacheValue};
use super::conversions::{convert_category, convert_product};
use super::types::{CategoryRecord, Listing, ProductRecord};
use super::{ApiClient, ApiError};
use crate::cart::{CatalogError, ProductLookup};

/// Upper bound on pages followed for one listing.
const MAX_PAGES: usize = 50;

/// Filter for product listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Only products filed under this category name.
    pub category: Option<String>,
    /// Only products in the current promotion.
    pub on_sale_only: bool,
}

impl ProductFilter {
    /// All products in `name`.
    #[must_use]
    pub fn category(name: impl Into<String>) -> Self {
        Self {
            category: Some(name.into()),
            on_sale_only: false,
        }
    }

    /// Restrict to products on sale.
    #[must_use]
    pub const fn on_sale(mut self) -> Self {
        self.on_sale_only = true;
        self
    }

    /// Category names are stored lower-cased and trimmed.
    fn normalized_category(&self) -> Option<String> {
        self.category
            .as_deref()
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
    }
}

/// Client for product and category listings.
#[derive(Clone)]
pub struct CatalogClient {
    api: ApiClient,
    cache: Cache<CacheKey, CacheValue>,
}

impl CatalogClient {
    /// Create a catalog client with the given cache lifetime.
    #[must_use]
    pub fn new(api: ApiClient, cache_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(cache_ttl)
            .build();

        Self { api, cache }
    }

    /// List products matching `filter`, following every page.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or a record is invalid.
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        let category = filter.normalized_category();
        let cache_key = CacheKey::Products {
            category: category.clone(),
        };

        let cached = self.cache.get(&cache_key).await;
        let products = if let Some(CacheValue::Products(products)) = cached {
            debug!("Cache hit for products");
            products
        } else {
            let mut url = self.api.endpoint("produtos/")?;
            if let Some(name) = &category {
                url.query_pairs_mut().append_pair("categoria__nome", name);
            }

            let records: Vec<ProductRecord> = self.fetch_all(url).await?;
            let products = records
                .into_iter()
                .map(convert_product)
                .collect::<Result<Vec<_>, _>>()?;

            // Warm the per-product entries too; add-to-cart looks them up next
            for product in &products {
                self.cache
                    .insert(
                        CacheKey::Product(product.id),
                        CacheValue::Product(Some(Box::new(product.clone()))),
                    )
                    .await;
            }
            self.cache
                .insert(cache_key, CacheValue::Products(products.clone()))
                .await;
            products
        };

        if filter.on_sale_only {
            return Ok(products.into_iter().filter(|p| p.on_sale).collect());
        }
        Ok(products)
    }

    /// Get a single product; `Ok(None)` when the backend reports 404.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any other reason.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: ProductId) -> Result<Option<Product>, ApiError> {
        let cache_key = CacheKey::Product(product_id);

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(product.map(|p| *p));
        }

        let url = self.api.endpoint(&format!("produtos/{product_id}/"))?;
        let product = match self.api.get_json::<ProductRecord>(url).await {
            Ok(record) => Some(convert_product(record)?),
            Err(ApiError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        self.cache
            .insert(cache_key, CacheValue::Product(product.clone().map(Box::new)))
            .await;

        Ok(product)
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let records: Vec<CategoryRecord> = self.fetch_all(self.api.endpoint("categorias/")?).await?;
        let categories: Vec<Category> = records.into_iter().map(convert_category).collect();

        self.cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Drop every cached response.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }

    /// Collect the items of a listing across pages.
    async fn fetch_all<T>(&self, first: Url) -> Result<Vec<T>, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut next = Some(first);

        for _ in 0..MAX_PAGES {
            let Some(url) = next.take() else {
                break;
            };
            let listing: Listing<T> = self.api.get_json(url).await?;
            let (page, next_url) = listing.into_parts();
            items.extend(page);
            next = next_url.map(|u| Url::parse(&u)).transpose()?;
        }

        if next.is_some() {
            tracing::warn!(max_pages = MAX_PAGES, "Listing truncated at page limit");
        }

        Ok(items)
    }
}

#[async_trait]
impl ProductLookup for CatalogClient {
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, CatalogError> {
        self.product(product_id).await.map_err(CatalogError::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_normalizes_category() {
        let filter = ProductFilter::category("  Vestidos ");
        assert_eq!(filter.normalized_category().as_deref(), Some("vestidos"));

        let filter = ProductFilter::category("   ");
        assert!(filter.normalized_category().is_none());
    }

    #[test]
    fn test_on_sale_builder() {
        let filter = ProductFilter::default().on_sale();
        assert!(filter.on_sale_only);
        assert!(filter.category.is_none());
    }
}
