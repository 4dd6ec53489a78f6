//! Cart rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shopfront_core::{CartItemId, Price, UserId};

use super::null_as_default;

/// Table holding cart lines.
pub const TABLE: &str = "cart_items";

/// One row of the `cart_items` table.
///
/// Rows are created with quantity 1 and deleted individually; they are
/// never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_name: String,
    pub product_price: Price,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_image: String,
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    /// Price × quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product_price.times(self.quantity)
    }
}

/// The product fields copied into a cart row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub name: String,
    pub price: Price,
    pub image: String,
}

/// Insert payload for `cart_items`.
///
/// `id` and `created_at` are assigned by the data store.
#[derive(Debug, Clone, Serialize)]
pub struct NewCartItem {
    pub user_id: UserId,
    pub product_name: String,
    pub product_price: Price,
    pub product_image: String,
    pub quantity: u32,
}

impl NewCartItem {
    /// A single unit of `product` for `user_id`.
    #[must_use]
    pub fn single(user_id: UserId, product: &ProductSnapshot) -> Self {
        Self {
            user_id,
            product_name: product.name.clone(),
            product_price: product.price,
            product_image: product.image.clone(),
            quantity: 1,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_decodes_store_row() {
        let row = serde_json::json!({
            "id": "0b5d2f3e-8f0a-4c55-9d1a-3a7c2b1e9f00",
            "user_id": "c1a7e0f2-4b9d-4d8e-a2f3-5e6d7c8b9a01",
            "product_name": "Shoe",
            "product_price": 40,
            "product_image": null,
            "quantity": 2,
            "created_at": "2024-05-01T10:00:00.123456+00:00"
        });
        let item: CartItem = serde_json::from_value(row).unwrap();
        assert_eq!(item.product_image, "");
        assert_eq!(item.line_total(), Price::new(Decimal::from(80)));
    }

    #[test]
    fn test_new_item_has_quantity_one_and_no_timestamp() {
        let product = ProductSnapshot {
            name: "Shoe".to_string(),
            price: Price::new(Decimal::from(40)),
            image: "/img/shoe.png".to_string(),
        };
        let json = serde_json::to_value(NewCartItem::single(UserId::random(), &product)).unwrap();
        assert_eq!(json["quantity"], 1);
        assert!(json.get("created_at").is_none());
        assert!(json.get("id").is_none());
    }
}
