//! Conversions from wire records to domain types.

use shopeasy_core::{Category, Price, Product};

use super::ApiError;
use super::types::{CategoryRecord, ProductRecord};

/// Convert a product record into a [`Product`] snapshot.
///
/// The primary image is the backend-resolved `imagem_url_final`, then the
/// uploaded `imagem`, then the external `imagem_url`. The gallery leads with
/// `imagem_url_final` or `imagem` and continues with the extra images.
pub(super) fn convert_product(record: ProductRecord) -> Result<Product, ApiError> {
    let price = Price::store(record.preco).map_err(|e| {
        ApiError::InvalidRecord(format!("product {}: {e}", record.id))
    })?;

    let gallery = gallery(&record);
    let image = [record.imagem_url_final, record.imagem, record.imagem_url]
        .into_iter()
        .flatten()
        .find(|url| !is_blank(url));

    Ok(Product {
        id: record.id,
        name: record.nome,
        price,
        description: record.descricao.filter(|d| !is_blank(d)),
        image,
        gallery,
        category: record.categoria,
        on_sale: record.em_promocao,
    })
}

fn gallery(record: &ProductRecord) -> Vec<String> {
    let primary = [&record.imagem_url_final, &record.imagem]
        .into_iter()
        .flatten()
        .find(|url| !is_blank(url));

    primary
        .into_iter()
        .chain(record.imagens_extra.iter().map(|extra| &extra.imagem))
        .filter(|url| !is_blank(url))
        .cloned()
        .collect()
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub(super) fn convert_category(record: CategoryRecord) -> Category {
    Category {
        id: record.id,
        name: record.nome,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use shopeasy_core::ProductId;

    use super::*;

    fn record(json: serde_json::Value) -> ProductRecord {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_convert_product_prefers_resolved_image() {
        let product = convert_product(record(serde_json::json!({
            "id": 1,
            "nome": "saia",
            "preco": "59.90",
            "imagem": "/media/produtos/saia.jpg",
            "imagem_url": "https://cdn.example.com/saia.jpg",
            "imagem_url_final": "http://localhost:8000/media/produtos/saia.jpg"
        })))
        .unwrap();

        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(
            product.image.as_deref(),
            Some("http://localhost:8000/media/produtos/saia.jpg")
        );
        assert_eq!(product.price.amount(), Decimal::new(5990, 2));
    }

    #[test]
    fn test_convert_product_falls_back_to_external_url() {
        let product = convert_product(record(serde_json::json!({
            "id": 1,
            "nome": "saia",
            "preco": "59.90",
            "imagem": "",
            "imagem_url": "https://cdn.example.com/saia.jpg"
        })))
        .unwrap();

        assert_eq!(product.image.as_deref(), Some("https://cdn.example.com/saia.jpg"));
    }

    #[test]
    fn test_gallery_leads_with_primary_then_extras() {
        let product = convert_product(record(serde_json::json!({
            "id": 1,
            "nome": "saia",
            "preco": "59.90",
            "imagem": "/media/produtos/saia.jpg",
            "imagem_url": "https://cdn.example.com/saia.jpg",
            "imagem_url_final": "http://localhost:8000/media/produtos/saia.jpg",
            "imagens_extra": [
                {"id": 7, "imagem": "/media/produtos/galeria/costas.jpg", "legenda": "costas"},
                {"id": 8, "imagem": " "},
                {"id": 9, "imagem": "/media/produtos/galeria/detalhe.jpg"}
            ]
        })))
        .unwrap();

        assert_eq!(
            product.gallery,
            vec![
                "http://localhost:8000/media/produtos/saia.jpg",
                "/media/produtos/galeria/costas.jpg",
                "/media/produtos/galeria/detalhe.jpg",
            ]
        );
    }

    #[test]
    fn test_gallery_skips_external_url_as_primary() {
        let product = convert_product(record(serde_json::json!({
            "id": 1,
            "nome": "saia",
            "preco": "59.90",
            "imagem_url": "https://cdn.example.com/saia.jpg",
            "imagens_extra": [{"imagem": "/media/produtos/galeria/a.jpg"}]
        })))
        .unwrap();

        assert_eq!(product.image.as_deref(), Some("https://cdn.example.com/saia.jpg"));
        assert_eq!(product.gallery, vec!["/media/produtos/galeria/a.jpg"]);
    }

    #[test]
    fn test_blank_description_is_none() {
        let product = convert_product(record(serde_json::json!({
            "id": 1, "nome": "saia", "preco": "10", "descricao": "  "
        })))
        .unwrap();
        assert!(product.description.is_none());
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = convert_product(record(serde_json::json!({
            "id": 1, "nome": "saia", "preco": "-1.00"
        })));
        assert!(matches!(result, Err(ApiError::InvalidRecord(_))));
    }
}
