//! Cart controller scenarios against the in-memory backend.
//!
//! Run with: cargo test -p shopfront-integration-tests --test cart_scenarios

#![allow(clippy::unwrap_used)]

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use shopfront_core::{CartItemId, Email, Price};
use shopfront_storefront::backend::{Backend, FakeBackend, FakeFailure, FakeOp};
use shopfront_storefront::models::{ProductSnapshot, Session, cart};
use shopfront_storefront::services::cart::{
    ADD_SUCCESS, CartController, CartFetch, CartMutation, CartView, LOGIN_REQUIRED, REMOVE_FAILED,
};

fn setup() -> (Arc<FakeBackend>, Backend) {
    let fake = Arc::new(FakeBackend::new());
    let backend = Backend::fake(fake.clone());
    (fake, backend)
}

fn shopper(fake: &FakeBackend, email: &str) -> Session {
    let user = fake.add_user(&Email::parse(email).unwrap(), "secret1", None);
    fake.session_for(&user)
}

fn product(name: &str, price: &str) -> ProductSnapshot {
    ProductSnapshot {
        name: name.to_string(),
        price: Price::new(Decimal::from_str(price).unwrap()),
        image: format!("img/{}.png", name.to_lowercase()),
    }
}

// ============================================================================
// Unauthenticated
// ============================================================================

#[tokio::test]
async fn test_add_without_session_inserts_nothing() {
    let (fake, backend) = setup();
    let controller = CartController::new(&backend);

    let outcome = controller.add_to_cart(None, &product("Tee", "25")).await;

    assert!(!outcome.is_applied());
    assert_eq!(outcome.add_message(), LOGIN_REQUIRED);
    assert_eq!(outcome.add_message(), "Please login to add items to cart");
    assert_eq!(fake.call_count(FakeOp::Insert), 0);
    assert_eq!(fake.mutation_count(), 0);
    assert!(fake.rows(cart::TABLE).is_empty());
}

#[tokio::test]
async fn test_remove_without_session_deletes_nothing() {
    let (fake, backend) = setup();
    let controller = CartController::new(&backend);

    let outcome = controller
        .remove_from_cart(None, CartItemId::random())
        .await;

    assert!(matches!(outcome, CartMutation::Unauthenticated));
    assert_eq!(outcome.remove_message(), Some(LOGIN_REQUIRED));
    assert_eq!(fake.call_count(FakeOp::Delete), 0);
}

#[tokio::test]
async fn test_expired_token_counts_as_signed_out() {
    let (fake, backend) = setup();
    let session = shopper(&fake, "jane@shop.test");
    fake.revoke(&session.access_token);
    let controller = CartController::new(&backend);

    let outcome = controller
        .add_to_cart(Some(&session.access_token), &product("Tee", "25"))
        .await;

    assert!(matches!(outcome, CartMutation::Unauthenticated));
    assert_eq!(fake.call_count(FakeOp::Insert), 0);
}

// ============================================================================
// Adding
// ============================================================================

#[tokio::test]
async fn test_repeated_add_keeps_separate_rows() {
    let (fake, backend) = setup();
    let session = shopper(&fake, "jane@shop.test");
    let controller = CartController::new(&backend);
    let shoe = product("Shoe", "40");

    for _ in 0..2 {
        let outcome = controller
            .add_to_cart(Some(&session.access_token), &shoe)
            .await;
        assert_eq!(outcome.add_message(), ADD_SUCCESS);
    }

    let view = controller
        .update_cart_display(Some(&session.access_token))
        .await
        .view();

    assert_eq!(fake.rows(cart::TABLE).len(), 2);
    assert_eq!(view.count, 2);
    assert_eq!(view.subtotal.to_string(), "$80.00");
    assert!(view.lines.iter().all(|line| line.quantity == 1));
    assert_ne!(view.lines[0].id, view.lines[1].id);
}

#[tokio::test]
async fn test_badge_matches_fetched_rows() {
    let (fake, backend) = setup();
    let session = shopper(&fake, "jane@shop.test");
    let controller = CartController::new(&backend);
    let token = Some(&session.access_token);

    for (i, (name, price)) in [("Shoe", "40"), ("Sock", "25"), ("Cap", "19.99"), ("Shoe", "40")]
        .into_iter()
        .enumerate()
    {
        assert!(controller.add_to_cart(token, &product(name, price)).await.is_applied());

        let context = controller.update_cart_display(token).await;
        let fetched = controller.get_cart_items(context.session.as_ref()).await;
        assert_eq!(context.view().count, i + 1);
        assert_eq!(context.view().count, fetched.items().len());
    }
}

#[tokio::test]
async fn test_newest_item_listed_first() {
    let (fake, backend) = setup();
    let session = shopper(&fake, "jane@shop.test");
    let controller = CartController::new(&backend);
    let token = Some(&session.access_token);

    controller.add_to_cart(token, &product("Shoe", "40")).await;
    controller.add_to_cart(token, &product("Cap", "19.99")).await;

    let items = controller
        .get_cart_items(Some(&session))
        .await
        .into_items();
    let names: Vec<_> = items.iter().map(|i| i.product_name.as_str()).collect();
    assert_eq!(names, ["Cap", "Shoe"]);
}

#[tokio::test]
async fn test_failed_insert_reports_failure() {
    let (fake, backend) = setup();
    let session = shopper(&fake, "jane@shop.test");
    fake.fail(
        FakeOp::Insert,
        FakeFailure::Api {
            status: 500,
            message: "internal".to_string(),
        },
    );
    let controller = CartController::new(&backend);

    let outcome = controller
        .add_to_cart(Some(&session.access_token), &product("Shoe", "40"))
        .await;

    assert!(matches!(outcome, CartMutation::Failed(_)));
    assert_eq!(outcome.add_message(), "Failed to add product to cart");
    assert_eq!(fake.call_count(FakeOp::Insert), 1);
}

// ============================================================================
// Subtotal
// ============================================================================

#[tokio::test]
async fn test_subtotal_is_exact_sum_of_lines() {
    let (fake, backend) = setup();
    let session = shopper(&fake, "jane@shop.test");
    fake.seed(
        cart::TABLE,
        [
            json!({"user_id": session.user.id, "product_name": "Pin", "product_price": "0.10", "product_image": "pin.png", "quantity": 3}),
            json!({"user_id": session.user.id, "product_name": "Cap", "product_price": "19.99", "product_image": "cap.png", "quantity": 2}),
            json!({"user_id": session.user.id, "product_name": "Tee", "product_price": "0.005", "product_image": "tee.png", "quantity": 1}),
        ],
    );
    let controller = CartController::new(&backend);

    let view = controller
        .update_cart_display(Some(&session.access_token))
        .await
        .view();

    let expected = Price::new(Decimal::from_str("40.285").unwrap());
    assert_eq!(view.subtotal, expected);
    assert_eq!(view.subtotal.to_string(), "$40.285");
    assert_eq!(view.count, 3);
}

#[test]
fn test_empty_cart_subtotal_is_zero() {
    let view = CartView::build(&[], true);
    assert_eq!(view.subtotal, Price::ZERO);
    assert_eq!(view.subtotal.to_string(), "$0.00");
}

// ============================================================================
// Removing
// ============================================================================

#[tokio::test]
async fn test_remove_deletes_own_row() {
    let (fake, backend) = setup();
    let session = shopper(&fake, "jane@shop.test");
    let controller = CartController::new(&backend);
    let token = Some(&session.access_token);

    controller.add_to_cart(token, &product("Shoe", "40")).await;
    controller.add_to_cart(token, &product("Sock", "25")).await;
    let items = controller.get_cart_items(Some(&session)).await.into_items();
    let sock = items.iter().find(|i| i.product_name == "Sock").unwrap();

    let outcome = controller.remove_from_cart(token, sock.id).await;
    assert!(outcome.is_applied());
    assert_eq!(outcome.remove_message(), None);

    let view = controller.update_cart_display(token).await.view();
    assert_eq!(view.count, 1);
    assert_eq!(view.subtotal.to_string(), "$40.00");
}

#[tokio::test]
async fn test_remove_ignores_other_users_rows() {
    let (fake, backend) = setup();
    let owner = shopper(&fake, "owner@shop.test");
    let intruder = shopper(&fake, "intruder@shop.test");
    let controller = CartController::new(&backend);

    controller
        .add_to_cart(Some(&owner.access_token), &product("Shoe", "40"))
        .await;
    let item = controller.get_cart_items(Some(&owner)).await.into_items()[0].id;

    let outcome = controller
        .remove_from_cart(Some(&intruder.access_token), item)
        .await;

    assert!(matches!(outcome, CartMutation::NotFound));
    assert_eq!(outcome.remove_message(), Some(REMOVE_FAILED));
    assert_eq!(fake.rows(cart::TABLE).len(), 1);
}

// ============================================================================
// Fetch failures
// ============================================================================

#[tokio::test]
async fn test_fetch_failure_renders_empty_cart() {
    let (fake, backend) = setup();
    let session = shopper(&fake, "jane@shop.test");
    let controller = CartController::new(&backend);
    controller
        .add_to_cart(Some(&session.access_token), &product("Shoe", "40"))
        .await;
    fake.fail(FakeOp::Select, FakeFailure::Unreachable);

    let context = controller
        .update_cart_display(Some(&session.access_token))
        .await;

    assert!(matches!(context.items, CartFetch::Unavailable(_)));
    assert!(context.items.items().is_empty());
    let view = context.view();
    assert_eq!(view.count, 0);
    assert_eq!(view.subtotal, Price::ZERO);
    assert!(view.signed_in);
}

#[tokio::test]
async fn test_signed_out_fetch_is_distinct_from_failure() {
    let (_fake, backend) = setup();
    let controller = CartController::new(&backend);

    let context = controller.update_cart_display(None).await;

    assert!(context.session.is_none());
    assert!(matches!(context.items, CartFetch::Unauthenticated));
    assert!(!context.view().signed_in);
}
