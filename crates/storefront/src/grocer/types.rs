//! Wire types for the grocer backend API.
//!
//! Field names match the backend's JSON exactly; prices arrive as plain
//! numbers and order timestamps as naive ISO-8601 (the backend stores UTC
//! without an offset).

use chrono::NaiveDateTime;
use greengrocer_core::{CartItemId, DepartmentId, Money, OrderCode, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use super::AccessToken;

/// Response to a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginGrant {
    /// Bearer token for subsequent requests.
    pub access_token: AccessToken,
    pub is_admin: bool,
    pub email: String,
}

/// The authenticated user, as reported by `GET /auth/me`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub is_admin: bool,
}

/// A product department (e.g. Produce, Dairy).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

/// A product in the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub image_url: Option<String>,
    pub department_id: DepartmentId,
}

/// One line of the authenticated user's cart.
///
/// Product fields are denormalized by the backend; `subtotal` is
/// server-computed as `price * quantity`.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Money,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub subtotal: Money,
}

/// Response to a successful checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutReceipt {
    pub order_code: OrderCode,
    pub total_price: Money,
}

/// One row of the order history list, newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub timestamp: NaiveDateTime,
    pub unique_code: OrderCode,
    pub total_price: Money,
    pub item_count: u32,
}

/// A line item within an order, with the price frozen at purchase time.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    pub product_name: String,
    pub quantity: u32,
    pub price_at_purchase: Money,
    pub subtotal: Money,
}

/// A full order, fetched by its unique code.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDetail {
    pub id: OrderId,
    pub timestamp: NaiveDateTime,
    pub unique_code: OrderCode,
    pub total_price: Money,
    pub items: Vec<OrderLine>,
}

/// Fields for creating or updating a product via the admin endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPayload {
    pub name: String,
    pub price: Money,
    pub department_id: DepartmentId,
    pub image_url: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_item_from_backend_json() {
        let json = r#"{
            "id": 3,
            "product_id": 12,
            "product_name": "Braeburn Apples",
            "price": 3.0,
            "image_url": null,
            "quantity": 2,
            "subtotal": 6.0
        }"#;
        let item: CartItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, CartItemId::new(3));
        assert_eq!(item.quantity, 2);
        assert_eq!(item.price, Money::from_cents(300));
        assert_eq!(item.subtotal, item.price.times(item.quantity));
        assert!(item.image_url.is_none());
    }

    #[test]
    fn test_order_summary_parses_naive_timestamp() {
        // The backend emits utcnow().isoformat(): no offset suffix,
        // microseconds present only when nonzero.
        let json = r#"{
            "id": 7,
            "timestamp": "2026-08-25T09:15:42.123456",
            "unique_code": "a3f8c2d1-77e4-4b09-9d35-0c612f6b1a55",
            "total_price": 11.0,
            "item_count": 3
        }"#;
        let order: OrderSummary = serde_json::from_str(json).unwrap();
        assert_eq!(order.total_price, Money::from_cents(1100));
        assert_eq!(order.unique_code.short(), "A3F8C2D1");

        let no_micros = r#"{
            "id": 8,
            "timestamp": "2026-08-25T09:15:42",
            "unique_code": "b1",
            "total_price": 5,
            "item_count": 1
        }"#;
        assert!(serde_json::from_str::<OrderSummary>(no_micros).is_ok());
    }

    #[test]
    fn test_login_grant_redacts_token_in_debug() {
        let json = r#"{"access_token": "secret.jwt.value", "is_admin": false, "email": "shopper@example.com"}"#;
        let grant: LoginGrant = serde_json::from_str(json).unwrap();
        let debugged = format!("{grant:?}");
        assert!(!debugged.contains("secret.jwt.value"));
        assert_eq!(grant.access_token.expose(), "secret.jwt.value");
    }

    #[test]
    fn test_product_payload_serializes_price_as_number() {
        let payload = ProductPayload {
            name: "Sourdough Loaf".to_owned(),
            price: Money::from_cents(649),
            department_id: DepartmentId::new(2),
            image_url: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("price").unwrap().is_number());
        assert!(json.get("image_url").unwrap().is_null());
    }
}
