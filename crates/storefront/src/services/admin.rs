//! Admin panel pages.
//!
//! Pages are keyed by name. Every read uses the admin's own access token, so
//! what an admin sees is whatever the data store's access rules allow.

use std::fmt;
use std::str::FromStr;

use tracing::instrument;

use shopfront_core::UserId;

use crate::backend::Backend;
use crate::db::{OrderRepository, OrderSummary, ProductRepository, RepositoryError, UserRepository};
use crate::models::{AccessToken, UserProfile, UserProfileUpdate};

pub const PRODUCTS_NOTICE: &str = "Product management panel - Coming soon!";
pub const ORDERS_NOTICE: &str = "Order management panel - Coming soon!";
pub const NO_USERS: &str = "No users found in the database.";
pub const USERS_FAILED: &str = "Error loading user data. Please try again.";

/// The admin panel's pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminPage {
    Dashboard,
    Products,
    Orders,
    Users,
}

impl AdminPage {
    pub const ALL: [Self; 4] = [Self::Dashboard, Self::Products, Self::Orders, Self::Users];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Users => "users",
        }
    }

    /// Navigation label.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Products => "Manage Products",
            Self::Orders => "Manage Orders",
            Self::Users => "Manage Users",
        }
    }
}

impl fmt::Display for AdminPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a page name that does not exist.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown admin page: {0}")]
pub struct UnknownPage(pub String);

impl FromStr for AdminPage {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|page| page.as_str() == s)
            .ok_or_else(|| UnknownPage(s.to_string()))
    }
}

/// Counts shown on the dashboard. A `None` means that count failed to load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardMetrics {
    pub users: Option<usize>,
    pub products: Option<usize>,
    pub orders: Option<OrderSummary>,
}

/// One row of the user listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRowView {
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub created: String,
    pub last_login: String,
    pub active: &'static str,
}

impl From<&UserProfile> for UserRowView {
    fn from(profile: &UserProfile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            email: profile.email.to_string(),
            role: profile.role.to_string(),
            created: profile.created_at.format("%Y-%m-%d").to_string(),
            last_login: profile
                .last_login
                .map_or_else(|| "Never".to_string(), |at| at.format("%Y-%m-%d").to_string()),
            active: if profile.is_active.unwrap_or(false) {
                "Yes"
            } else {
                "No"
            },
        }
    }
}

/// Outcome of loading the user listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserListing {
    Users(Vec<UserRowView>),
    Empty,
    Failed,
}

impl UserListing {
    /// Message shown instead of a table, if any.
    #[must_use]
    pub const fn notice(&self) -> Option<&'static str> {
        match self {
            Self::Users(_) => None,
            Self::Empty => Some(NO_USERS),
            Self::Failed => Some(USERS_FAILED),
        }
    }
}

/// Rendered content of one admin page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminPageView {
    Dashboard(DashboardMetrics),
    Products { notice: &'static str },
    Orders {
        notice: &'static str,
        summary: Option<OrderSummary>,
    },
    Users(UserListing),
}

/// Loads admin page content with the admin's token.
pub struct AdminService<'a> {
    backend: &'a Backend,
}

impl<'a> AdminService<'a> {
    #[must_use]
    pub const fn new(backend: &'a Backend) -> Self {
        Self { backend }
    }

    /// Content for `page`.
    #[instrument(skip(self, token), fields(page = %page))]
    pub async fn page(&self, token: &AccessToken, page: AdminPage) -> AdminPageView {
        match page {
            AdminPage::Dashboard => AdminPageView::Dashboard(self.dashboard(token).await),
            AdminPage::Products => AdminPageView::Products {
                notice: PRODUCTS_NOTICE,
            },
            AdminPage::Orders => AdminPageView::Orders {
                notice: ORDERS_NOTICE,
                summary: self.order_summary(token).await,
            },
            AdminPage::Users => AdminPageView::Users(self.users(token).await),
        }
    }

    /// Users, products, orders and revenue; each count fails independently.
    pub async fn dashboard(&self, token: &AccessToken) -> DashboardMetrics {
        let store = self.backend.store.as_ref();

        let users = UserRepository::new(store)
            .count(token)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to count users"))
            .ok();
        let products = ProductRepository::new(store)
            .count(Some(token))
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to count products"))
            .ok();

        DashboardMetrics {
            users,
            products,
            orders: self.order_summary(token).await,
        }
    }

    async fn order_summary(&self, token: &AccessToken) -> Option<OrderSummary> {
        OrderRepository::new(self.backend.store.as_ref())
            .summary(token)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to load orders"))
            .ok()
    }

    /// Every profile, newest first.
    pub async fn users(&self, token: &AccessToken) -> UserListing {
        match UserRepository::new(self.backend.store.as_ref())
            .list_all(token)
            .await
        {
            Ok(profiles) if profiles.is_empty() => UserListing::Empty,
            Ok(profiles) => UserListing::Users(profiles.iter().map(UserRowView::from).collect()),
            Err(e) => {
                tracing::error!(error = %e, "Error fetching all users");
                UserListing::Failed
            }
        }
    }

    /// Activate or deactivate a profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile has that id.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn set_active(
        &self,
        token: &AccessToken,
        id: UserId,
        active: bool,
    ) -> Result<UserProfile, RepositoryError> {
        let update = UserProfileUpdate {
            is_active: Some(active),
            ..UserProfileUpdate::default()
        };
        let profile = UserRepository::new(self.backend.store.as_ref())
            .update(token, id, &update)
            .await?;
        tracing::info!(active, "Updated user status");
        Ok(profile)
    }

    /// Delete a profile row. The auth account itself is not removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no profile has that id.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn delete_user(&self, token: &AccessToken, id: UserId) -> Result<(), RepositoryError> {
        UserRepository::new(self.backend.store.as_ref())
            .delete(token, id)
            .await?;
        tracing::info!("Deleted user profile");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use serde_json::json;
    use shopfront_core::{Email, Price};

    use super::*;
    use crate::backend::{FakeBackend, FakeFailure, FakeOp};
    use crate::models::{order, product, user};

    fn admin_session(fake: &FakeBackend) -> AccessToken {
        let admin = fake.add_user(&Email::parse("owner@shop.test").unwrap(), "secret1", None);
        fake.session_for(&admin).access_token
    }

    #[test]
    fn test_page_names_round_trip() {
        for page in AdminPage::ALL {
            assert_eq!(page.as_str().parse::<AdminPage>().unwrap(), page);
        }
        assert!("settings".parse::<AdminPage>().is_err());
    }

    #[tokio::test]
    async fn test_placeholder_pages() {
        let fake = Arc::new(FakeBackend::new());
        let token = admin_session(&fake);
        let backend = Backend::fake(fake);
        let admin = AdminService::new(&backend);

        assert_eq!(
            admin.page(&token, AdminPage::Products).await,
            AdminPageView::Products {
                notice: "Product management panel - Coming soon!"
            }
        );
        match admin.page(&token, AdminPage::Orders).await {
            AdminPageView::Orders { notice, summary } => {
                assert_eq!(notice, "Order management panel - Coming soon!");
                assert_eq!(summary.unwrap().count, 0);
            }
            other => panic!("unexpected view: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_user_listing_states() {
        let fake = Arc::new(FakeBackend::new());
        let token = admin_session(&fake);
        let backend = Backend::fake(fake.clone());
        let admin = AdminService::new(&backend);

        assert_eq!(admin.users(&token).await.notice(), Some("No users found in the database."));

        fake.seed(
            user::TABLE,
            [
                json!({
                    "id": "c1a7e0f2-4b9d-4d8e-a2f3-5e6d7c8b9a01",
                    "email": "old@shop.test",
                    "full_name": "Old",
                    "role": "user",
                    "created_at": "2024-01-01T00:00:00Z",
                    "last_login": null,
                    "is_active": true
                }),
                json!({
                    "id": "0b5d2f3e-8f0a-4c55-9d1a-3a7c2b1e9f00",
                    "email": "new@shop.test",
                    "full_name": "New",
                    "role": "admin",
                    "created_at": "2024-03-01T00:00:00Z",
                    "last_login": "2024-03-02T09:30:00Z"
                }),
            ],
        );
        let UserListing::Users(rows) = admin.users(&token).await else {
            panic!("expected users");
        };
        assert_eq!(rows[0].email, "new@shop.test");
        assert_eq!(rows[0].last_login, "2024-03-02");
        assert_eq!(rows[0].active, "No");
        assert_eq!(rows[1].last_login, "Never");
        assert_eq!(rows[1].active, "Yes");
        assert_eq!(rows[1].created, "2024-01-01");

        fake.fail(FakeOp::Select, FakeFailure::Unreachable);
        assert_eq!(
            admin.users(&token).await.notice(),
            Some("Error loading user data. Please try again.")
        );
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let fake = Arc::new(FakeBackend::new());
        let token = admin_session(&fake);
        fake.seed(
            product::TABLE,
            [json!({"name": "Cap", "price": "10", "image": "cap.png"})],
        );
        fake.seed(
            order::TABLE,
            [json!({"total": "12.50", "status": "paid"}), json!({"total": "7.50", "status": "paid"})],
        );
        let backend = Backend::fake(fake);

        let metrics = AdminService::new(&backend).dashboard(&token).await;
        assert_eq!(metrics.users, Some(0));
        assert_eq!(metrics.products, Some(1));
        let orders = metrics.orders.unwrap();
        assert_eq!(orders.count, 2);
        assert_eq!(orders.revenue, Price::new(Decimal::from(20)));
    }

    #[tokio::test]
    async fn test_deactivate_and_delete_user() {
        let fake = Arc::new(FakeBackend::new());
        let token = admin_session(&fake);
        let id: UserId = "c1a7e0f2-4b9d-4d8e-a2f3-5e6d7c8b9a01".parse().unwrap();
        fake.seed(
            user::TABLE,
            [json!({
                "id": id.to_string(),
                "email": "jane@shop.test",
                "full_name": "Jane",
                "role": "user",
                "is_active": true
            })],
        );
        let backend = Backend::fake(fake.clone());
        let admin = AdminService::new(&backend);

        let profile = admin.set_active(&token, id, false).await.unwrap();
        assert_eq!(profile.is_active, Some(false));
        let UserListing::Users(rows) = admin.users(&token).await else {
            panic!("expected users");
        };
        assert_eq!(rows[0].active, "No");

        admin.delete_user(&token, id).await.unwrap();
        assert!(fake.rows(user::TABLE).is_empty());
        assert!(matches!(
            admin.delete_user(&token, id).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            admin.set_active(&token, id, true).await,
            Err(RepositoryError::NotFound)
        ));
    }
}
