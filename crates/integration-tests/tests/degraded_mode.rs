//! Server behaviour when the backend is not configured.
//!
//! Run with: cargo test -p shopfront-integration-tests --test degraded_mode

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use shopfront_integration_tests::TestApp;

const NOT_AVAILABLE: &str =
    "Authentication service not available. Please check your configuration.";

#[tokio::test]
async fn test_home_shows_configuration_banner() {
    let mut app = TestApp::degraded();

    let resp = app.get("/").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("config-banner"));
    assert!(resp.body.contains("SUPABASE_URL not configured"));
    assert!(resp.body.contains("Products are unavailable right now"));
}

#[tokio::test]
async fn test_auth_actions_short_circuit() {
    let mut app = TestApp::degraded();

    let login = app
        .post_form("/auth/login", &[("email", "jane@shop.test"), ("password", "secret1")])
        .await;
    assert!(login.body.contains(NOT_AVAILABLE));
    assert!(!app.has_session());

    let signup = app
        .post_form(
            "/auth/signup",
            &[
                ("email", "jane@shop.test"),
                ("password", "secret1"),
                ("confirm_password", "secret1"),
            ],
        )
        .await;
    assert!(signup.body.contains(NOT_AVAILABLE));

    let logout = app.post_form("/auth/logout", &[]).await;
    assert!(logout.body.contains(NOT_AVAILABLE));
}

#[tokio::test]
async fn test_cart_routes_short_circuit() {
    let mut app = TestApp::degraded();

    let add = app.post_form("/cart/add", &[("product_id", "1")]).await;
    assert!(add.body.contains(NOT_AVAILABLE));

    let count = app.get("/cart/count").await;
    assert_eq!(count.body.trim(), "0");
}

#[tokio::test]
async fn test_admin_redirects_home() {
    let mut app = TestApp::degraded();

    let resp = app.get("/admin/dashboard").await;

    assert!(resp.status.is_redirection());
}
