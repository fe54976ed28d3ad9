//! Catalog browsing commands.

use std::io::Write;

use shopeasy_core::{Product, ProductId};
use shopeasy_storefront::api::ProductFilter;
use shopeasy_storefront::error::AppError;
use shopeasy_storefront::state::Storefront;

/// List products, optionally filtered.
pub async fn products(
    store: &Storefront,
    category: Option<String>,
    on_sale: bool,
) -> Result<(), AppError> {
    let filter = ProductFilter {
        category,
        on_sale_only: on_sale,
    };
    let products = store.catalog().list_products(&filter).await?;

    let mut out = std::io::stdout().lock();
    if products.is_empty() {
        writeln!(out, "No products found")?;
    }
    for product in &products {
        writeln!(out, "{}", summary(product))?;
    }
    Ok(())
}

/// Show one product.
pub async fn product(store: &Storefront, id: ProductId) -> Result<(), AppError> {
    let mut out = std::io::stdout().lock();

    let Some(product) = store.catalog().product(id).await? else {
        writeln!(out, "Product {id} not found")?;
        return Ok(());
    };

    writeln!(out, "{}", summary(&product))?;
    if let Some(description) = &product.description {
        writeln!(out)?;
        writeln!(out, "{description}")?;
    }
    if let Some(image) = &product.image {
        writeln!(out, "image: {image}")?;
    }
    for (n, url) in product.gallery.iter().enumerate() {
        writeln!(out, "gallery {}: {url}", n + 1)?;
    }
    Ok(())
}

/// List categories.
pub async fn categories(store: &Storefront) -> Result<(), AppError> {
    let categories = store.catalog().list_categories().await?;

    let mut out = std::io::stdout().lock();
    for category in &categories {
        writeln!(out, "{:>5}  {}", category.id, category.display_name())?;
    }
    Ok(())
}

/// One-line product listing entry.
pub fn summary(product: &Product) -> String {
    let sale = if product.on_sale { "  [sale]" } else { "" };
    format!(
        "{:>5}  {}  {}{sale}",
        product.id,
        product.display_name(),
        product.price
    )
}
