//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (carousels, auth chrome, cart panel)
//! GET  /health                 - Health check
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart panel fragment
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/add               - Add to cart (message + out-of-band cart refresh)
//! POST /cart/remove            - Remove item (out-of-band cart refresh)
//!
//! # Auth (HTMX fragments)
//! POST /auth/login             - Sign in
//! POST /auth/signup            - Create an account
//! POST /auth/logout            - Sign out
//!
//! # Admin (admins only, others are sent home)
//! GET  /admin                  - Dashboard
//! GET  /admin/{page}           - dashboard, products, orders or users
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod home;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/{page}", get(admin::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Cart routes
        .nest("/cart", cart_routes())
        // Auth routes
        .nest("/auth", auth_routes())
        // Admin panel
        .nest("/admin", admin_routes())
}

// =============================================================================
// Shared Fragments
// =============================================================================

/// Whether a flash message reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    /// CSS modifier for the message box.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// A single user-facing message, swapped into the page's message area.
#[derive(Template, WebTemplate)]
#[template(path = "partials/message.html")]
pub struct MessageTemplate {
    pub message: String,
    pub kind: MessageKind,
}

impl MessageTemplate {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: MessageKind::Success,
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: MessageKind::Error,
        }
    }
}
