//! Product snapshot as consumed by the cart.
//!
//! Products are supplied by the catalog and never mutated by the cart; a
//! [`CartLine`](crate::CartLine) keeps its own copy of the snapshot taken at
//! first add.

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable product identity.
    pub id: ProductId,
    /// Name as stored by the backend (lower-cased).
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Long-form description.
    pub description: Option<String>,
    /// Primary image URL.
    pub image: Option<String>,
    /// Image URLs for the product page, primary image first.
    #[serde(default)]
    pub gallery: Vec<String>,
    /// Category the product is filed under.
    pub category: Option<CategoryId>,
    /// Whether the product is part of the current promotion.
    #[serde(default)]
    pub on_sale: bool,
}

impl Product {
    /// Name with every word capitalized, for display.
    ///
    /// ```rust
    /// # use shopeasy_core::{Price, Product, ProductId};
    /// # use rust_decimal::Decimal;
    /// let product = Product {
    ///     id: ProductId::new(1),
    ///     name: "vestido longo floral".to_string(),
    ///     price: Price::store(Decimal::ONE).unwrap(),
    ///     description: None,
    ///     image: None,
    ///     gallery: Vec::new(),
    ///     category: None,
    ///     on_sale: false,
    /// };
    /// assert_eq!(product.display_name(), "Vestido Longo Floral");
    /// ```
    #[must_use]
    pub fn display_name(&self) -> String {
        capitalize_words(&self.name)
    }
}

/// Capitalize the first letter of each whitespace-separated word.
#[must_use]
pub fn capitalize_words(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category identity.
    pub id: CategoryId,
    /// Name as stored by the backend (lower-cased, unique).
    pub name: String,
}

impl Category {
    /// Name with every word capitalized, for display.
    #[must_use]
    pub fn display_name(&self) -> String {
        capitalize_words(&self.name)
    }
}
