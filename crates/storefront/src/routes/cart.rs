//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every successful mutation re-fetches the whole cart and swaps both the
//! panel and the count badge out of band.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopfront_core::{CartItemId, ProductId};

use crate::error::{AppError, add_breadcrumb};
use crate::middleware::OptionalToken;
use crate::models::AccessToken;
use crate::routes::{MessageKind, MessageTemplate};
use crate::services::auth::AuthError;
use crate::services::cart::{ADD_FAILED, CartController, CartView, LOGIN_REQUIRED};
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart panel fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel.html")]
pub struct CartPanelTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: usize,
}

/// Response to a successful mutation: an optional message, plus the panel
/// and badge swapped out of band.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_update.html")]
pub struct CartUpdateTemplate {
    pub message: Option<String>,
    pub kind: MessageKind,
    pub cart: CartView,
}

// =============================================================================
// Handlers
// =============================================================================

async fn current_view(state: &AppState, token: Option<&AccessToken>) -> CartView {
    match state.backend() {
        Some(backend) => CartController::new(backend)
            .update_cart_display(token)
            .await
            .view(),
        None => CartView::signed_out(),
    }
}

/// Display the cart panel (HTMX fragment).
#[instrument(skip(state, token))]
pub async fn show(State(state): State<AppState>, OptionalToken(token): OptionalToken) -> Response {
    CartPanelTemplate {
        cart: current_view(&state, token.as_ref()).await,
    }
    .into_response()
}

/// Get cart count badge (HTMX fragment).
#[instrument(skip(state, token))]
pub async fn count(State(state): State<AppState>, OptionalToken(token): OptionalToken) -> Response {
    CartCountTemplate {
        count: current_view(&state, token.as_ref()).await.count,
    }
    .into_response()
}

/// Add one unit of a catalog product to the cart (HTMX).
///
/// The session is checked before the product id is looked at. A failed add
/// answers with the message alone so the rendered cart stays as it was.
#[instrument(skip(state, token))]
pub async fn add(
    State(state): State<AppState>,
    OptionalToken(token): OptionalToken,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    let Some(backend) = state.backend() else {
        return Ok(MessageTemplate::error(AuthError::Unavailable.user_message()).into_response());
    };

    let controller = CartController::new(backend);
    let Some(session) = controller.get_session(token.as_ref()).await else {
        return Ok(MessageTemplate::error(LOGIN_REQUIRED).into_response());
    };

    let product_id: ProductId = form
        .product_id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid product id: {}", form.product_id)))?;

    let product = match state.catalog().find(product_id).await {
        Ok(Some(product)) => product,
        Ok(None) => return Err(AppError::NotFound(format!("product {product_id}"))),
        Err(e) => {
            tracing::error!(error = %e, "Catalog lookup failed during add to cart");
            return Ok(MessageTemplate::error(ADD_FAILED).into_response());
        }
    };

    let outcome = controller.add_for_session(&session, &product.snapshot()).await;

    if !outcome.is_applied() {
        return Ok(MessageTemplate::error(outcome.add_message()).into_response());
    }

    let id = product_id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));

    let cart = controller
        .update_cart_display(token.as_ref())
        .await
        .view();

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartUpdateTemplate {
            message: Some(outcome.add_message().to_string()),
            kind: MessageKind::Success,
            cart,
        },
    )
        .into_response())
}

/// Remove a cart row (HTMX).
///
/// Success is silent apart from the refreshed cart.
#[instrument(skip(state, token))]
pub async fn remove(
    State(state): State<AppState>,
    OptionalToken(token): OptionalToken,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response, AppError> {
    let Some(backend) = state.backend() else {
        return Ok(MessageTemplate::error(AuthError::Unavailable.user_message()).into_response());
    };

    let item_id: CartItemId = form
        .item_id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid cart item id: {}", form.item_id)))?;

    let controller = CartController::new(backend);
    let outcome = controller.remove_from_cart(token.as_ref(), item_id).await;

    if let Some(message) = outcome.remove_message() {
        return Ok(MessageTemplate::error(message).into_response());
    }

    let cart = controller
        .update_cart_display(token.as_ref())
        .await
        .view();

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartUpdateTemplate {
            message: None,
            kind: MessageKind::Success,
            cart,
        },
    )
        .into_response())
}
