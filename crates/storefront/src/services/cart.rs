//! Session-gated cart controller.
//!
//! Every cart action follows the same sequence: validate the session with the
//! auth provider, mutate the remote `cart_items` table, re-fetch the user's
//! rows, and rebuild the whole cart view from them. Nothing is cached between
//! actions and nothing is updated optimistically, so the rendered cart always
//! reflects the remote state as of the last completed fetch.
//!
//! Outcomes are tagged: an unauthenticated visitor, a missing row and a
//! failed remote call are distinct results rather than a shared `false`.

use tracing::instrument;

use shopfront_core::{CartItemId, Price};

use crate::backend::Backend;
use crate::db::{CartItemRepository, RepositoryError};
use crate::models::{AccessToken, CartItem, NewCartItem, ProductSnapshot, Session};

/// Shown when a signed-out visitor tries to change the cart.
pub const LOGIN_REQUIRED: &str = "Please login to add items to cart";
/// Shown after a successful add.
pub const ADD_SUCCESS: &str = "Product added to cart!";
/// Shown when an add fails remotely.
pub const ADD_FAILED: &str = "Failed to add product to cart";
/// Shown when a remove fails.
pub const REMOVE_FAILED: &str = "Failed to remove item from cart";

/// Result of reading the current user's cart.
#[derive(Debug)]
pub enum CartFetch {
    /// The user's rows, most recent first.
    Items(Vec<CartItem>),
    /// No valid session.
    Unauthenticated,
    /// The data store call failed.
    Unavailable(RepositoryError),
}

impl CartFetch {
    /// The rows, or an empty list for any other outcome.
    #[must_use]
    pub fn into_items(self) -> Vec<CartItem> {
        match self {
            Self::Items(items) => items,
            Self::Unauthenticated | Self::Unavailable(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        match self {
            Self::Items(items) => items,
            Self::Unauthenticated | Self::Unavailable(_) => &[],
        }
    }
}

/// Result of adding or removing a cart row.
#[derive(Debug)]
pub enum CartMutation {
    /// The row was inserted or deleted.
    Applied,
    /// No valid session; nothing was sent to the data store.
    Unauthenticated,
    /// The delete matched no row owned by this user.
    NotFound,
    /// The data store call failed.
    Failed(RepositoryError),
}

impl CartMutation {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Message for the outcome of an add.
    #[must_use]
    pub const fn add_message(&self) -> &'static str {
        match self {
            Self::Applied => ADD_SUCCESS,
            Self::Unauthenticated => LOGIN_REQUIRED,
            Self::NotFound | Self::Failed(_) => ADD_FAILED,
        }
    }

    /// Message for the outcome of a remove; a successful remove is silent.
    #[must_use]
    pub const fn remove_message(&self) -> Option<&'static str> {
        match self {
            Self::Applied => None,
            Self::Unauthenticated => Some(LOGIN_REQUIRED),
            Self::NotFound | Self::Failed(_) => Some(REMOVE_FAILED),
        }
    }
}

/// The session and cart rows as of the last fetch, threaded between steps.
#[derive(Debug)]
pub struct CartContext {
    pub session: Option<Session>,
    pub items: CartFetch,
}

impl CartContext {
    /// Rebuild the cart view from scratch.
    #[must_use]
    pub fn view(&self) -> CartView {
        CartView::build(self.items.items(), self.session.is_some())
    }
}

/// One rendered cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub id: CartItemId,
    pub name: String,
    pub image: String,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id,
            name: item.product_name.clone(),
            image: item.product_image.clone(),
            price: item.product_price.to_string(),
            quantity: item.quantity,
            line_total: item.line_total().to_string(),
        }
    }
}

/// The whole cart as rendered: badge count, subtotal and every line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub count: usize,
    pub subtotal: Price,
    pub lines: Vec<CartLineView>,
    pub signed_in: bool,
}

impl CartView {
    /// Count is the number of rows; subtotal is Σ price × quantity.
    #[must_use]
    pub fn build(items: &[CartItem], signed_in: bool) -> Self {
        Self {
            count: items.len(),
            subtotal: items.iter().map(CartItem::line_total).sum(),
            lines: items.iter().map(CartLineView::from).collect(),
            signed_in,
        }
    }

    /// An empty cart for a visitor without a session.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::build(&[], false)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Mediates between the auth provider, the `cart_items` table and the view.
pub struct CartController<'a> {
    backend: &'a Backend,
}

impl<'a> CartController<'a> {
    #[must_use]
    pub const fn new(backend: &'a Backend) -> Self {
        Self { backend }
    }

    fn items(&self) -> CartItemRepository<'a> {
        CartItemRepository::new(self.backend.store.as_ref())
    }

    /// Validate `token` with the auth provider.
    ///
    /// Returns `None` without a token, when the provider rejects it, or when
    /// the provider cannot be reached.
    #[instrument(skip_all)]
    pub async fn get_session(&self, token: Option<&AccessToken>) -> Option<Session> {
        let token = token?;
        match self.backend.auth.get_user(token).await {
            Ok(Some(user)) => Some(Session {
                access_token: token.clone(),
                user,
            }),
            Ok(None) => {
                tracing::debug!("Stored access token no longer accepted");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session check failed");
                None
            }
        }
    }

    /// Add one unit of `product` to the signed-in user's cart.
    ///
    /// Each call inserts a new row; repeated adds of the same product are not
    /// merged. Nothing is retried.
    #[instrument(skip(self, token, product), fields(product = %product.name))]
    pub async fn add_to_cart(
        &self,
        token: Option<&AccessToken>,
        product: &ProductSnapshot,
    ) -> CartMutation {
        let Some(session) = self.get_session(token).await else {
            return CartMutation::Unauthenticated;
        };
        self.add_for_session(&session, product).await
    }

    /// Insert one unit of `product` for an already validated session.
    #[instrument(skip_all, fields(product = %product.name))]
    pub async fn add_for_session(&self, session: &Session, product: &ProductSnapshot) -> CartMutation {
        let item = NewCartItem::single(session.user.id, product);
        match self.items().add(&session.access_token, &item).await {
            Ok(added) => {
                tracing::info!(item_id = %added.id, "Added to cart");
                CartMutation::Applied
            }
            Err(e) => {
                tracing::error!(error = %e, "Error adding to cart");
                CartMutation::Failed(e)
            }
        }
    }

    /// Every row of the session's user, most recent first.
    #[instrument(skip_all)]
    pub async fn get_cart_items(&self, session: Option<&Session>) -> CartFetch {
        let Some(session) = session else {
            return CartFetch::Unauthenticated;
        };

        match self
            .items()
            .list_for_user(&session.access_token, session.user.id)
            .await
        {
            Ok(items) => CartFetch::Items(items),
            Err(e) => {
                tracing::error!(error = %e, "Error fetching cart items");
                CartFetch::Unavailable(e)
            }
        }
    }

    /// Delete one row, matching both its id and the signed-in user.
    #[instrument(skip(self, token), fields(item_id = %item_id))]
    pub async fn remove_from_cart(
        &self,
        token: Option<&AccessToken>,
        item_id: CartItemId,
    ) -> CartMutation {
        let Some(session) = self.get_session(token).await else {
            return CartMutation::Unauthenticated;
        };

        match self
            .items()
            .remove(&session.access_token, session.user.id, item_id)
            .await
        {
            Ok(()) => CartMutation::Applied,
            Err(RepositoryError::NotFound) => {
                tracing::warn!("Remove matched no cart item for this user");
                CartMutation::NotFound
            }
            Err(e) => {
                tracing::error!(error = %e, "Error removing from cart");
                CartMutation::Failed(e)
            }
        }
    }

    /// Re-validate the session and re-fetch every row.
    ///
    /// Call [`CartContext::view`] on the result to rebuild the rendered cart.
    pub async fn update_cart_display(&self, token: Option<&AccessToken>) -> CartContext {
        let session = self.get_session(token).await;
        let items = self.get_cart_items(session.as_ref()).await;
        CartContext { session, items }
    }
}
