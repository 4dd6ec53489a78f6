//! Admin panel route handlers.
//!
//! Visitors who are not admins are redirected home. The panel reads with the
//! admin's own token, so the data store's access rules still apply.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use crate::db::OrderSummary;
use crate::error::AppError;
use crate::middleware::OptionalToken;
use crate::routes::home::PageContext;
use crate::services::admin::{
    AdminPage, AdminPageView, AdminService, DashboardMetrics, UnknownPage, UserListing, UserRowView,
};
use crate::services::auth::AuthState;
use crate::services::cart::CartView;
use crate::state::AppState;

/// Placeholder for a metric that failed to load.
const UNAVAILABLE: &str = "n/a";

/// Dashboard counters, formatted for display.
pub struct MetricsView {
    pub users: String,
    pub products: String,
    pub orders: String,
    pub revenue: String,
}

fn count_or_unavailable(count: Option<usize>) -> String {
    count.map_or_else(|| UNAVAILABLE.to_string(), |n| n.to_string())
}

impl From<&DashboardMetrics> for MetricsView {
    fn from(metrics: &DashboardMetrics) -> Self {
        Self {
            users: count_or_unavailable(metrics.users),
            products: count_or_unavailable(metrics.products),
            orders: count_or_unavailable(metrics.orders.map(|o| o.count)),
            revenue: metrics
                .orders
                .map_or_else(|| UNAVAILABLE.to_string(), |o| o.revenue.to_string()),
        }
    }
}

/// One admin page's body, flattened for the template.
#[derive(Default)]
pub struct AdminContent {
    pub notice: Option<&'static str>,
    pub metrics: Option<MetricsView>,
    pub orders: Option<OrderSummary>,
    pub users: Vec<UserRowView>,
}

impl From<AdminPageView> for AdminContent {
    fn from(view: AdminPageView) -> Self {
        match view {
            AdminPageView::Dashboard(metrics) => Self {
                metrics: Some(MetricsView::from(&metrics)),
                ..Self::default()
            },
            AdminPageView::Products { notice } => Self {
                notice: Some(notice),
                ..Self::default()
            },
            AdminPageView::Orders { notice, summary } => Self {
                notice: Some(notice),
                orders: summary,
                ..Self::default()
            },
            AdminPageView::Users(listing) => {
                let notice = listing.notice();
                let users = match listing {
                    UserListing::Users(rows) => rows,
                    _ => Vec::new(),
                };
                Self {
                    notice,
                    users,
                    ..Self::default()
                }
            }
        }
    }
}

/// Admin page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/page.html")]
pub struct AdminTemplate {
    pub page: AdminPage,
    pub admin_pages: [AdminPage; 4],
    pub auth: AuthState,
    pub cart: CartView,
    pub content: AdminContent,
}

/// Display the dashboard.
pub async fn dashboard(state: State<AppState>, token: OptionalToken) -> Response {
    render(state, token, AdminPage::Dashboard).await
}

/// Display one admin page by name.
#[instrument(skip(state, token))]
pub async fn show(
    state: State<AppState>,
    token: OptionalToken,
    Path(page): Path<String>,
) -> Result<Response, AppError> {
    let page: AdminPage = page
        .parse()
        .map_err(|e: UnknownPage| AppError::NotFound(e.to_string()))?;
    Ok(render(state, token, page).await)
}

async fn render(
    State(state): State<AppState>,
    OptionalToken(token): OptionalToken,
    page: AdminPage,
) -> Response {
    let context = PageContext::load(&state, token.as_ref()).await;

    let (Some(backend), Some(session)) = (state.backend(), context.session.as_ref()) else {
        return Redirect::to("/").into_response();
    };
    if !context.auth.is_admin() {
        tracing::warn!(user_id = %session.user.id, page = %page, "Non-admin sent away from admin panel");
        return Redirect::to("/").into_response();
    }

    let view = AdminService::new(backend)
        .page(&session.access_token, page)
        .await;

    AdminTemplate {
        page,
        admin_pages: AdminPage::ALL,
        auth: context.auth,
        cart: context.cart,
        content: view.into(),
    }
    .into_response()
}
