//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::middleware::OptionalToken;
use crate::models::{AccessToken, Session};
use crate::services::admin::AdminPage;
use crate::services::auth::{AuthService, AuthState};
use crate::services::cart::{CartController, CartView};
use crate::services::catalog::{CarouselView, carousels};
use crate::state::AppState;

/// Auth state and cart shared by every full page.
pub struct PageContext {
    pub session: Option<Session>,
    pub auth: AuthState,
    pub cart: CartView,
}

impl PageContext {
    /// Validate the stored token once and derive everything the chrome needs.
    pub async fn load(state: &AppState, token: Option<&AccessToken>) -> Self {
        let Some(backend) = state.backend() else {
            return Self {
                session: None,
                auth: AuthState::Unauthenticated,
                cart: CartView::signed_out(),
            };
        };

        let context = CartController::new(backend)
            .update_cart_display(token)
            .await;
        let auth = AuthService::new(backend, state.admin_email())
            .resolve_state(context.session.as_ref())
            .await;
        let cart = context.view();

        Self {
            session: context.session,
            auth,
            cart,
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub config_error: Option<String>,
    pub auth: AuthState,
    pub admin_pages: [AdminPage; 4],
    pub carousels: Vec<CarouselView>,
    pub catalog_failed: bool,
    pub cart: CartView,
}

/// Display the home page.
#[instrument(skip(state, token))]
pub async fn home(State(state): State<AppState>, OptionalToken(token): OptionalToken) -> Response {
    let page = PageContext::load(&state, token.as_ref()).await;

    let (carousels, catalog_failed) = match state.catalog().products().await {
        Ok(products) => (carousels(&products), false),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load products for home page");
            (Vec::new(), true)
        }
    };

    IndexTemplate {
        config_error: state.config_error().map(String::from),
        auth: page.auth,
        admin_pages: AdminPage::ALL,
        carousels,
        catalog_failed,
        cart: page.cart,
    }
    .into_response()
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
pub async fn health() -> &'static str {
    "ok"
}
