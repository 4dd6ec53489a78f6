//! Catalog products.

use serde::{Deserialize, Serialize};

use shopfront_core::{Price, ProductId};

use super::cart::ProductSnapshot;

/// Table holding the product catalog.
pub const TABLE: &str = "products";

/// A catalog product. Read-only from the storefront's point of view.
///
/// The legacy `products.json` field names `img` and `img_hover` are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub old_price: Option<Price>,
    #[serde(alias = "img")]
    pub image: String,
    #[serde(default, alias = "img_hover")]
    pub image_hover: Option<String>,
    /// Explicit sale percentage; overrides the computed discount.
    #[serde(default)]
    pub sale: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
}

impl Product {
    /// Sale percentage for the badge, if the product is on sale.
    #[must_use]
    pub fn sale_percent(&self) -> Option<i64> {
        self.sale
            .or_else(|| self.old_price.and_then(|old| self.price.discount_percent_from(old)))
    }

    /// The fields copied into a cart row.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            name: self.name.clone(),
            price: self.price,
            image: self.image.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_legacy_json_names() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 3,
            "name": "Canvas Tote",
            "price": 30,
            "old_price": 40,
            "img": "img/tote.png",
            "img_hover": "img/tote-2.png"
        }))
        .unwrap();
        assert_eq!(product.image, "img/tote.png");
        assert_eq!(product.image_hover.as_deref(), Some("img/tote-2.png"));
        assert_eq!(product.sale_percent(), Some(25));
    }

    #[test]
    fn test_tiny_old_price_shows_no_badge() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 4,
            "name": "Wool Socks",
            "price": "1",
            "old_price": "0.0000000000000000000000000001",
            "image": "socks.png"
        }))
        .unwrap();
        assert_eq!(product.sale_percent(), None);
    }

    #[test]
    fn test_explicit_sale_wins() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Cap",
            "price": 10,
            "old_price": 20,
            "image": "cap.png",
            "sale": 15
        }))
        .unwrap();
        assert_eq!(product.sale_percent(), Some(15));
    }

    #[test]
    fn test_no_badge_without_discount_data() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Cap",
            "price": 10,
            "image": "cap.png"
        }))
        .unwrap();
        assert_eq!(product.sale_percent(), None);
    }
}
