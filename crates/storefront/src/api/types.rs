//! Wire types for the storefront REST API.
//!
//! Field names follow the backend's JSON exactly; conversion into the
//! domain types in `shopeasy_core` happens in `conversions`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopeasy_core::{CategoryId, ProductId};

/// One page of a paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    /// Total number of results across all pages.
    pub count: Option<u64>,
    /// Absolute URL of the next page.
    pub next: Option<String>,
    /// Absolute URL of the previous page.
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// A listing that may or may not be paginated.
///
/// Listing endpoints return a [`Page`] when pagination is enabled for them
/// and a bare array otherwise.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(Page<T>),
    Plain(Vec<T>),
}

impl<T> Listing<T> {
    /// Split into the items on this page and the next page's URL.
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        match self {
            Self::Page(page) => (page.results, page.next),
            Self::Plain(items) => (items, None),
        }
    }
}

/// Product record (`produtos/`).
#[derive(Debug, Clone, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub nome: String,
    #[serde(default)]
    pub descricao: Option<String>,
    pub preco: Decimal,
    /// Uploaded image path.
    #[serde(default)]
    pub imagem: Option<String>,
    /// External image URL.
    #[serde(default)]
    pub imagem_url: Option<String>,
    /// Absolute URL of whichever image the backend resolved.
    #[serde(default)]
    pub imagem_url_final: Option<String>,
    #[serde(default)]
    pub em_promocao: bool,
    #[serde(default)]
    pub categoria: Option<CategoryId>,
    #[serde(default)]
    pub imagens_extra: Vec<ProductImageRecord>,
}

/// Additional gallery image of a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductImageRecord {
    pub imagem: String,
}

/// Category record (`categorias/`).
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    pub id: CategoryId,
    pub nome: String,
}

/// Body of both cart delta endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartItemRequest {
    pub produto: ProductId,
    pub quantidade: u32,
}

/// Login request (`token/`).
#[derive(Serialize)]
pub struct TokenRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Issued JWT pair.
#[derive(Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Refresh request (`token/refresh/`).
#[derive(Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Refreshed access token.
#[derive(Deserialize)]
pub struct AccessToken {
    pub access: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_record_accepts_decimal_string() {
        let json = r#"{
            "id": 42,
            "nome": "vestido",
            "descricao": "Vestido midi",
            "preco": "99.90",
            "estoque": 3,
            "imagem": null,
            "imagem_url": "https://cdn.example.com/v.jpg",
            "imagem_url_final": "https://cdn.example.com/v.jpg",
            "em_promocao": true,
            "categoria": 2,
            "imagens_extra": [{"id": 1, "imagem": "/media/produtos/galeria/a.jpg", "legenda": ""}],
            "criado_em": "2025-03-01T12:00:00Z"
        }"#;
        let record: ProductRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.id, ProductId::new(42));
        assert_eq!(record.preco, Decimal::new(9990, 2));
        assert_eq!(record.categoria, Some(CategoryId::new(2)));
        assert_eq!(record.imagens_extra.len(), 1);
        assert!(record.em_promocao);
    }

    #[test]
    fn test_listing_page_and_plain() {
        let page: Listing<CategoryRecord> = serde_json::from_str(
            r#"{"count": 1, "next": "http://x/categorias/?page=2", "previous": null,
                "results": [{"id": 1, "nome": "vestidos"}]}"#,
        )
        .unwrap();
        let (items, next) = page.into_parts();
        assert_eq!(items.len(), 1);
        assert_eq!(next.as_deref(), Some("http://x/categorias/?page=2"));

        let plain: Listing<CategoryRecord> =
            serde_json::from_str(r#"[{"id": 1, "nome": "vestidos"}, {"id": 2, "nome": "saias"}]"#)
                .unwrap();
        let (items, next) = plain.into_parts();
        assert_eq!(items.len(), 2);
        assert!(next.is_none());
    }

    #[test]
    fn test_cart_item_request_shape() {
        let body = CartItemRequest {
            produto: ProductId::new(42),
            quantidade: 3,
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({"produto": 42, "quantidade": 3})
        );
    }
}
