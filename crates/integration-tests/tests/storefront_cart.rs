//! Integration tests for cart mutations and the cart fragments.

use reqwest::StatusCode;

use greengrocer_core::Money;
use greengrocer_integration_tests::TestContext;

// ============================================================================
// Adding Products
// ============================================================================

#[tokio::test]
async fn adding_a_product_toasts_and_pings_the_badge() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;

    let resp = ctx.add_to_cart("Braeburn Apples", 2).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("hx-trigger").and_then(|v| v.to_str().ok()),
        Some("cart-updated")
    );
    let body = resp.text().await.expect("read toast");
    assert!(body.contains("Added to cart"));

    let apples = ctx.grocer.product_id("Braeburn Apples").expect("seeded product");
    let cart: Vec<(i64, u32)> = ctx
        .grocer
        .shopper_cart()
        .into_iter()
        .map(|(_, product_id, quantity)| (product_id, quantity))
        .collect();
    assert_eq!(cart, vec![(apples, 2)]);

    let badge = ctx.get_text("/cart/badge").await;
    assert!(badge.contains(">2<"));
    assert!(!badge.contains("hidden"));
}

#[tokio::test]
async fn adding_the_same_product_merges_lines() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;

    ctx.add_to_cart("Bananas", 1).await;
    ctx.add_to_cart("Bananas", 2).await;

    let cart = ctx.grocer.shopper_cart();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].2, 3);

    let badge = ctx.get_text("/cart/badge").await;
    assert!(badge.contains(">3<"));
}

#[tokio::test]
async fn guests_cannot_add_to_the_cart() {
    let ctx = TestContext::start().await;

    let resp = ctx
        .hx_post("/cart/items", &[("product_id", "1"), ("quantity", "1")])
        .await;

    assert_eq!(
        resp.headers().get("hx-redirect").and_then(|v| v.to_str().ok()),
        Some("/login")
    );
    assert_eq!(ctx.grocer.hits("POST /cart"), 0, "no backend call for guests");
}

#[tokio::test]
async fn backend_rejections_come_back_as_error_toasts() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;

    let resp = ctx
        .hx_post("/cart/items", &[("product_id", "999999"), ("quantity", "1")])
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("hx-retarget").and_then(|v| v.to_str().ok()),
        Some("#toasts")
    );
    assert_eq!(
        resp.headers().get("hx-reswap").and_then(|v| v.to_str().ok()),
        Some("beforeend")
    );
    let body = resp.text().await.expect("read toast");
    assert!(body.contains("Product not found"));
}

// ============================================================================
// Cart Page
// ============================================================================

#[tokio::test]
async fn cart_page_requires_signing_in() {
    let ctx = TestContext::start().await;

    let resp = ctx.get("/cart").await;

    assert_eq!(resp.url().path(), "/login");
}

#[tokio::test]
async fn cart_page_totals_follow_the_lines() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;
    ctx.add_to_cart("Braeburn Apples", 2).await; // 2 x $3.50
    ctx.add_to_cart("Whole Milk", 1).await; // 1 x $2.50

    let body = ctx.get_text("/cart").await;

    assert!(body.contains("Braeburn Apples"));
    assert!(body.contains("Whole Milk"));
    assert!(body.contains("Subtotal (3 items)"));
    // 2 x 3.50 + 1 x 2.50, formatted by the shared money type.
    assert!(body.contains(&Money::from_cents(950).display()));
    assert!(body.contains("Checkout Now"));
}

#[tokio::test]
async fn an_empty_cart_page_points_back_at_the_shop() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;

    let body = ctx.get_text("/cart").await;

    assert!(body.contains("Your cart is empty"));
    assert!(body.contains("Go Shopping"));
}

// ============================================================================
// Quantity Changes
// ============================================================================

#[tokio::test]
async fn quantity_updates_round_trip_to_the_backend() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;
    ctx.add_to_cart("Braeburn Apples", 1).await;

    let (line_id, _, _) = ctx.grocer.shopper_cart()[0];
    let resp = ctx
        .hx_put(&format!("/cart/items/{line_id}"), &[("quantity", "4")])
        .await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        resp.headers().get("hx-trigger").and_then(|v| v.to_str().ok()),
        Some("cart-updated")
    );
    assert_eq!(ctx.grocer.shopper_cart()[0].2, 4);
}

#[tokio::test]
async fn quantity_updates_clamp_to_one_unit() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;
    ctx.add_to_cart("Braeburn Apples", 3).await;

    let (line_id, _, _) = ctx.grocer.shopper_cart()[0];
    ctx.hx_put(&format!("/cart/items/{line_id}"), &[("quantity", "0")])
        .await;

    assert_eq!(ctx.grocer.shopper_cart()[0].2, 1, "zero clamps to one unit");
}

#[tokio::test]
async fn removing_a_line_empties_the_cart() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;
    ctx.add_to_cart("Braeburn Apples", 1).await;

    let (line_id, _, _) = ctx.grocer.shopper_cart()[0];
    let resp = ctx.hx_delete(&format!("/cart/items/{line_id}")).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(ctx.grocer.shopper_cart().is_empty());

    let badge = ctx.get_text("/cart/badge").await;
    assert!(badge.contains("hidden"));
}

// ============================================================================
// Mini-Cart
// ============================================================================

#[tokio::test]
async fn mini_cart_lists_lines_and_the_total() {
    let ctx = TestContext::start().await;
    ctx.sign_in_shopper().await;
    ctx.add_to_cart("Mature Cheddar", 2).await; // 2 x $4.75

    let body = ctx.get_text("/cart/preview").await;

    assert!(body.contains("Mature Cheddar"));
    assert!(body.contains("2 items"));
    assert!(body.contains(&Money::from_cents(950).display()));
    assert!(body.contains("View Cart"));
}

#[tokio::test]
async fn an_empty_mini_cart_says_so() {
    let ctx = TestContext::start().await;

    let body = ctx.get_text("/cart/preview").await;

    assert!(body.contains("Your cart is empty"));
    assert!(!body.contains("View Cart"));
}
