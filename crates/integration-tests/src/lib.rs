//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! Everything runs in-process against [`FakeBackend`]; no hosted service is
//! needed.
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Cart controller behaviour against the fake backend
//! - `storefront_routes` - Full router requests with a session cookie
//! - `degraded_mode` - Server behaviour without backend configuration

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use shopfront_core::Email;
use shopfront_storefront::backend::{Backend, FakeBackend};
use shopfront_storefront::config::{BackendConfigIssue, CatalogConfig, StorefrontConfig};
use shopfront_storefront::middleware::session::SESSION_COOKIE_NAME;
use shopfront_storefront::models::product;
use shopfront_storefront::state::AppState;

/// Address configured as the store admin in tests.
pub const ADMIN_EMAIL: &str = "owner@shop.test";

/// Storefront configuration for tests, with or without a usable backend.
#[must_use]
pub fn test_config(admin_email: Option<&str>) -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        backend: Err(BackendConfigIssue(
            "SUPABASE_URL not configured: set it in .env".to_string(),
        )),
        admin_email: admin_email.map(|email| Email::parse(email).unwrap()),
        products: CatalogConfig {
            file: None,
            cache_ttl: Duration::from_secs(60),
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Catalog rows used across tests.
#[must_use]
pub fn sample_products() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Shoe", "price": "40", "image": "img/shoe.png"}),
        json!({"id": 2, "name": "Sock", "price": "25", "old_price": "50", "image": "img/sock.png", "img_hover": "img/sock-2.png"}),
        json!({"id": 3, "name": "Cap", "price": "19.99", "image": "img/cap.png"}),
    ]
}

/// A response with its body read to a string.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Value of a header, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The storefront router plus a browser-like cookie jar of one cookie.
pub struct TestApp {
    pub fake: Arc<FakeBackend>,
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    /// App backed by a fresh fake seeded with [`sample_products`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_fake(Arc::new(FakeBackend::new()))
    }

    /// App backed by `fake`, seeded with [`sample_products`].
    #[must_use]
    pub fn with_fake(fake: Arc<FakeBackend>) -> Self {
        fake.seed(product::TABLE, sample_products());
        let state =
            AppState::with_backend(test_config(Some(ADMIN_EMAIL)), Backend::fake(fake.clone()));
        Self {
            fake,
            router: shopfront_storefront::app(state),
            cookie: None,
        }
    }

    /// App started without backend configuration.
    #[must_use]
    pub fn degraded() -> Self {
        let state = AppState::new(test_config(Some(ADMIN_EMAIL)));
        Self {
            fake: Arc::new(FakeBackend::new()),
            router: shopfront_storefront::app(state),
            cookie: None,
        }
    }

    /// Whether the jar currently holds a session cookie.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::get(path);
        self.send(request, Body::empty()).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = Request::post(path).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        self.send(request, Body::from(body)).await
    }

    /// Sign in through the login route.
    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        self.post_form("/auth/login", &[("email", email), ("password", password)])
            .await
    }

    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let value = value.to_str().unwrap();
            let pair = value.split(';').next().unwrap_or_default().trim();
            if pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")) {
                self.cookie = Some(pair.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
