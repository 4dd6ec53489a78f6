//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different tables.

use uuid::Uuid;

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around the given inner type with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `get()`
/// - `Display`, `FromStr` and `From` conversions in both directions
///
/// # Example
///
/// ```rust
/// # use shopfront_core::define_id;
/// define_id!(WishlistId, i64);
/// define_id!(ReviewId, i64);
///
/// let wishlist_id = WishlistId::new(1);
/// let review_id = ReviewId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: WishlistId = review_id;
/// # let _ = (wishlist_id, review_id);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $inner:ty) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Wrap a raw ID value.
            #[must_use]
            pub const fn new(id: $inner) -> Self {
                Self(id)
            }

            /// Get the underlying value.
            #[must_use]
            pub const fn get(&self) -> $inner {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = <$inner as ::core::str::FromStr>::Err;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<$inner>().map(Self)
            }
        }

        impl From<$inner> for $name {
            fn from(id: $inner) -> Self {
                Self(id)
            }
        }

        impl From<$name> for $inner {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Auth identities are UUIDs issued by the auth provider; `users.id` mirrors them.
define_id!(UserId, Uuid);
define_id!(CartItemId, Uuid);
define_id!(ProductId, i64);
define_id!(OrderId, i64);

impl UserId {
    /// Generate a fresh random user ID.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl CartItemId {
    /// Generate a fresh random cart item ID.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_id_parses_and_displays() {
        let raw = "7f3c2a9e-52a4-4a3e-9d8f-1b2c3d4e5f60";
        let id: CartItemId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn test_numeric_id_trims_whitespace() {
        let id: ProductId = " 42 ".parse().unwrap();
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn test_id_is_transparent_in_json() {
        let id = ProductId::new(7);
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");

        let user = UserId::random();
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, format!("\"{user}\""));
    }

    #[test]
    fn test_invalid_uuid_rejected() {
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }
}
