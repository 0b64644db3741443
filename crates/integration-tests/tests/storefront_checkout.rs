//! Integration tests for checkout and purchase history.

use reqwest::StatusCode;

use greengrocer_core::Money;
use greengrocer_integration_tests::TestContext;

// ============================================================================
// Review Page
// ============================================================================

#[tokio::test]
async fn empty_carts_bounce_back_to_the_cart_page() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;

    let resp = ctx.get("/checkout").await;

    assert_eq!(resp.url().path(), "/cart");
    assert_eq!(ctx.grocer.hits("POST /orders/checkout"), 0);
}

#[tokio::test]
async fn review_page_lists_the_order() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;
    ctx.add_to_cart("Sourdough Loaf", 2).await; // 2 x $4.00

    let body = ctx.get_text("/checkout").await;

    assert!(body.contains("Review Your Order"));
    assert!(body.contains("Sourdough Loaf"));
    assert!(body.contains(&Money::from_cents(800).display()));
    assert!(body.contains("Payment on Delivery"));
    assert!(body.contains("Confirm &amp; Place Order"));
}

// ============================================================================
// Placing Orders
// ============================================================================

#[tokio::test]
async fn checkout_confirms_and_zeroes_the_badge() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;
    ctx.add_to_cart("Braeburn Apples", 2).await; // 2 x $3.50
    ctx.add_to_cart("Whole Milk", 1).await; // 1 x $2.50

    let resp = ctx.hx_post("/checkout", &[]).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("hx-trigger").and_then(|v| v.to_str().ok()),
        Some("cart-updated")
    );
    let body = resp.text().await.expect("read confirmation");

    assert!(body.contains("Order Confirmed!"));
    assert!(body.contains("Total Paid"));
    assert!(body.contains(&Money::from_cents(950).display()));

    // Receipts show the shortened order code.
    let code = ctx.grocer.latest_order_code().expect("order recorded");
    let short: String = code.chars().take(8).collect::<String>().to_uppercase();
    assert!(body.contains(&short));

    // The backend folded the cart into the order, so the badge goes dark.
    assert!(ctx.grocer.shopper_cart().is_empty());
    let badge = ctx.get_text("/cart/badge").await;
    assert!(badge.contains(">0<"));
    assert!(badge.contains("hidden"));
}

#[tokio::test]
async fn a_failed_checkout_leaves_the_cart_alone() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;
    ctx.add_to_cart("Braeburn Apples", 1).await;
    ctx.grocer.set_checkout_unavailable(true);

    let resp = ctx.hx_post("/checkout", &[]).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("hx-retarget").and_then(|v| v.to_str().ok()),
        Some("#toasts")
    );
    let body = resp.text().await.expect("read toast");
    assert!(body.contains("Checkout is temporarily unavailable"));

    assert_eq!(
        ctx.grocer.shopper_cart().len(),
        1,
        "the cart should survive the failure"
    );
}

// ============================================================================
// Purchase History
// ============================================================================

#[tokio::test]
async fn profile_requires_signing_in() {
    let ctx = TestContext::start().await;

    let resp = ctx.get("/profile").await;

    assert_eq!(resp.url().path(), "/login");
}

#[tokio::test]
async fn profile_lists_past_orders_newest_first() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;

    ctx.add_to_cart("Braeburn Apples", 1).await; // $3.50
    ctx.hx_post("/checkout", &[]).await;
    ctx.add_to_cart("Whole Milk", 2).await; // $5.00
    ctx.hx_post("/checkout", &[]).await;

    let body = ctx.get_text("/profile").await;

    assert!(body.contains("Purchase History"));
    assert!(body.contains("Logged in as:"));
    assert!(body.contains("2 items"));
    // The mock stamps a fixed order date.
    assert!(body.contains("Mar 7, 2026"));

    let newest = body.find(&Money::from_cents(500).display()).expect("newest order total");
    let oldest = body.find(&Money::from_cents(350).display()).expect("older order total");
    assert!(newest < oldest, "orders should list newest first");
}

#[tokio::test]
async fn an_empty_history_points_back_at_the_shop() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;

    let body = ctx.get_text("/profile").await;

    assert!(body.contains("No purchases yet"));
    assert!(body.contains("Start Shopping"));
}

#[tokio::test]
async fn order_items_fragment_shows_frozen_lines() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;
    ctx.add_to_cart("Mature Cheddar", 3).await; // 3 x $4.75
    ctx.hx_post("/checkout", &[]).await;

    let code = ctx.grocer.latest_order_code().expect("order recorded");
    let resp = ctx.hx_get(&format!("/orders/{code}")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("read order detail");

    assert!(body.contains("Item Details"));
    assert!(body.contains("Mature Cheddar"));
    assert!(body.contains(&Money::from_cents(475).display()));
    assert!(body.contains(&Money::from_cents(1425).display()));
}
