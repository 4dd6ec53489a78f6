//! Domain models for the storefront.
//!
//! Row types mirror the remote tables (`cart_items`, `users`, `products`,
//! `orders`); session types describe what the browser session holds.

pub mod cart;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use cart::{CartItem, NewCartItem, ProductSnapshot};
pub use order::Order;
pub use product::Product;
pub use session::{AccessToken, AuthUser, Session, UserMetadata, keys as session_keys};
pub use user::{NewUserProfile, UserProfile, UserProfileUpdate};

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable column into its type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
