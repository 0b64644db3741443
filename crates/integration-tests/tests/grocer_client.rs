//! Integration tests for the typed backend client, driven against the
//! mock grocer directly rather than through the storefront pages.

use url::Url;

use greengrocer_core::{DepartmentId, Money, ProductId};
use greengrocer_integration_tests::{MockGrocer, SHOPPER_EMAIL, SHOPPER_PASSWORD};
use greengrocer_storefront::config::GrocerApiConfig;
use greengrocer_storefront::grocer::{GrocerClient, GrocerError};

async fn client() -> (GrocerClient, MockGrocer) {
    let grocer = MockGrocer::start().await;
    let config = GrocerApiConfig {
        base_url: Url::parse(grocer.url()).expect("mock grocer url"),
    };
    (GrocerClient::new(&config), grocer)
}

#[tokio::test]
async fn login_issues_a_usable_token() {
    let (client, _grocer) = client().await;

    let grant = client
        .login(SHOPPER_EMAIL, SHOPPER_PASSWORD)
        .await
        .expect("login");
    assert!(!grant.is_admin);
    assert_eq!(grant.email, SHOPPER_EMAIL);

    let profile = client
        .current_user(&grant.access_token)
        .await
        .expect("profile");
    assert_eq!(profile.email, SHOPPER_EMAIL);
    assert!(!profile.is_admin);
}

#[tokio::test]
async fn bad_credentials_map_to_unauthorized() {
    let (client, _grocer) = client().await;

    let err = client
        .login(SHOPPER_EMAIL, "not-the-password")
        .await
        .expect_err("wrong password must fail");

    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Invalid email or password");
}

#[tokio::test]
async fn products_filter_by_department() {
    let (client, grocer) = client().await;
    let dairy = DepartmentId::new(grocer.department_id("Dairy").expect("seeded department"));

    let products = client.products(Some(dairy)).await.expect("products");

    assert_eq!(products.len(), 2);
    assert!(products.iter().all(|p| p.department_id == dairy));
}

#[tokio::test]
async fn unknown_products_are_not_found() {
    let (client, _grocer) = client().await;

    let err = client
        .product(ProductId::new(999_999))
        .await
        .expect_err("unknown product must fail");

    assert!(matches!(err, GrocerError::Api { status: 404, .. }));
}

#[tokio::test]
async fn cart_lines_merge_and_clear() {
    let (client, grocer) = client().await;
    let grant = client
        .login(SHOPPER_EMAIL, SHOPPER_PASSWORD)
        .await
        .expect("login");
    let bananas = ProductId::new(grocer.product_id("Bananas").expect("seeded product"));

    client
        .add_to_cart(&grant.access_token, bananas, 1)
        .await
        .expect("first add");
    client
        .add_to_cart(&grant.access_token, bananas, 2)
        .await
        .expect("second add");

    let cart = client.cart(&grant.access_token).await.expect("cart");
    assert_eq!(cart.len(), 1, "same product should merge into one line");
    assert_eq!(cart[0].product_id, bananas);
    assert_eq!(cart[0].quantity, 3);
    assert_eq!(cart[0].subtotal, cart[0].price.times(3));

    client
        .clear_cart(&grant.access_token)
        .await
        .expect("clear cart");
    let cart = client
        .cart(&grant.access_token)
        .await
        .expect("cart after clear");
    assert!(cart.is_empty());
}

#[tokio::test]
async fn empty_checkout_is_a_backend_error() {
    let (client, _grocer) = client().await;
    let grant = client
        .login(SHOPPER_EMAIL, SHOPPER_PASSWORD)
        .await
        .expect("login");

    let err = client
        .checkout(&grant.access_token)
        .await
        .expect_err("empty cart must fail");

    assert_eq!(err.user_message(), "Cart is empty");
}

#[tokio::test]
async fn checkout_folds_the_cart_into_an_order() {
    let (client, grocer) = client().await;
    let grant = client
        .login(SHOPPER_EMAIL, SHOPPER_PASSWORD)
        .await
        .expect("login");
    let sourdough = ProductId::new(grocer.product_id("Sourdough Loaf").expect("seeded product"));
    client
        .add_to_cart(&grant.access_token, sourdough, 2)
        .await
        .expect("add");

    let receipt = client.checkout(&grant.access_token).await.expect("checkout");
    assert_eq!(receipt.total_price, Money::from_cents(800));

    let orders = client.orders(&grant.access_token).await.expect("orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].item_count, 2);
    assert_eq!(orders[0].unique_code, receipt.order_code);

    let detail = client
        .order(&grant.access_token, &receipt.order_code)
        .await
        .expect("order detail");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].price_at_purchase, Money::from_cents(400));
    assert_eq!(detail.items[0].subtotal, Money::from_cents(800));
}
