//! Typed client for the grocer backend REST API.
//!
//! Every storefront interaction with the backend goes through
//! [`GrocerClient`]: one method per endpoint, bearer-token auth attached
//! when the caller is signed in, JSON bodies both ways. No retries, no
//! response caching - failures surface immediately to the calling route.

pub mod types;

use core::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use greengrocer_core::{CartItemId, DepartmentId, OrderCode, ProductId};

use crate::config::GrocerApiConfig;
use types::{
    CartItem, CheckoutReceipt, Department, LoginGrant, OrderDetail, OrderSummary, Product,
    ProductPayload, UserProfile,
};

/// Maximum number of characters of a non-JSON error body kept in messages.
const ERROR_BODY_PREVIEW_LEN: usize = 200;

/// A bearer token issued by the backend at login.
///
/// Lives in the server-side session for the length of the sign-in. `Debug`
/// is redacted so the token never lands in logs or error reports.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token received from the backend.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building the Authorization header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(REDACTED)")
    }
}

/// Errors that can occur when talking to the grocer backend.
#[derive(Debug, Error)]
pub enum GrocerError {
    /// Transport-level failure (connection refused, DNS, aborted body).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an error status and a message payload.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code returned by the backend.
        status: u16,
        /// The backend's `message` field, or a preview of the raw body.
        message: String,
    },

    /// A success response whose body could not be decoded.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GrocerError {
    /// Build an [`Api`](Self::Api) error from a response body, pulling the
    /// backend's `{"message": ...}` when present.
    fn api(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body).map_or_else(
            |_| body.chars().take(ERROR_BODY_PREVIEW_LEN).collect(),
            |parsed| parsed.message,
        );
        Self::Api { status, message }
    }

    /// Whether the backend rejected the caller's token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }

    /// A message suitable for direct display next to a form.
    ///
    /// Backend-reported failures carry their own wording; transport and
    /// decode failures collapse to a generic line so internals never leak
    /// into the page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Http(_) | Self::Parse(_) => {
                "Something went wrong talking to the store. Please try again.".to_owned()
            }
        }
    }
}

/// Error payload shape used by every backend endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Serialize)]
struct CredentialsPayload<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct AddToCartPayload {
    product_id: ProductId,
    quantity: u32,
}

#[derive(Serialize)]
struct QuantityPayload {
    quantity: u32,
}

#[derive(Serialize)]
struct DepartmentPayload<'a> {
    name: &'a str,
}

/// Client for the grocer backend API.
///
/// Cheap to clone; the HTTP client and base URL live behind an `Arc`.
#[derive(Clone)]
pub struct GrocerClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
}

impl GrocerClient {
    /// Create a new client for the configured backend.
    #[must_use]
    pub fn new(config: &GrocerApiConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http: reqwest::Client::new(),
                base_url: config.base_url.as_str().trim_end_matches('/').to_owned(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn bearer(
        req: reqwest::RequestBuilder,
        token: Option<&AccessToken>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => req.bearer_auth(token.expose()),
            None => req,
        }
    }

    /// Send a request and decode a JSON success body.
    async fn read_json<T: serde::de::DeserializeOwned>(
        req: reqwest::RequestBuilder,
    ) -> Result<T, GrocerError> {
        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GrocerError::api(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Send a request where only the status matters (deletes, updates).
    async fn read_ok(req: reqwest::RequestBuilder) -> Result<(), GrocerError> {
        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GrocerError::api(status.as_u16(), &body));
        }

        Ok(())
    }

    // ── Health ──────────────────────────────────────────────────────────

    /// Ping the backend's health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn health(&self) -> Result<(), GrocerError> {
        Self::read_ok(self.inner.http.get(self.url("/health"))).await
    }

    // ── Auth ────────────────────────────────────────────────────────────

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `Api { status: 401, .. }` for bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginGrant, GrocerError> {
        let payload = CredentialsPayload { email, password };
        Self::read_json(self.inner.http.post(self.url("/auth/login")).json(&payload)).await
    }

    /// Create an account. The backend returns no token here; call
    /// [`login`](Self::login) afterwards with the same credentials.
    ///
    /// # Errors
    ///
    /// Returns `Api { status: 400, .. }` when the email is taken.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<(), GrocerError> {
        let payload = CredentialsPayload { email, password };
        Self::read_ok(
            self.inner
                .http
                .post(self.url("/auth/register"))
                .json(&payload),
        )
        .await
    }

    /// Fetch the profile belonging to a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or the backend is down.
    #[instrument(skip(self, token))]
    pub async fn current_user(&self, token: &AccessToken) -> Result<UserProfile, GrocerError> {
        Self::read_json(Self::bearer(
            self.inner.http.get(self.url("/auth/me")),
            Some(token),
        ))
        .await
    }

    // ── Catalog ─────────────────────────────────────────────────────────

    /// List all departments.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decoding fails.
    #[instrument(skip(self))]
    pub async fn departments(&self) -> Result<Vec<Department>, GrocerError> {
        Self::read_json(self.inner.http.get(self.url("/departments"))).await
    }

    /// List products, optionally restricted to one department.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or decoding fails.
    #[instrument(skip(self))]
    pub async fn products(
        &self,
        department: Option<DepartmentId>,
    ) -> Result<Vec<Product>, GrocerError> {
        let mut req = self.inner.http.get(self.url("/products"));
        if let Some(department) = department {
            req = req.query(&[("department_id", department.as_i64())]);
        }
        Self::read_json(req).await
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns `Api { status: 404, .. }` for an unknown id.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Product, GrocerError> {
        Self::read_json(self.inner.http.get(self.url(&format!("/products/{id}")))).await
    }

    // ── Cart ────────────────────────────────────────────────────────────

    /// Fetch the caller's full cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: &AccessToken) -> Result<Vec<CartItem>, GrocerError> {
        Self::read_json(Self::bearer(
            self.inner.http.get(self.url("/cart")),
            Some(token),
        ))
        .await
    }

    /// Add a product to the cart. The backend merges quantities when the
    /// product is already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the product is unknown.
    #[instrument(skip(self, token))]
    pub async fn add_to_cart(
        &self,
        token: &AccessToken,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), GrocerError> {
        let payload = AddToCartPayload {
            product_id,
            quantity,
        };
        Self::read_ok(Self::bearer(
            self.inner.http.post(self.url("/cart")).json(&payload),
            Some(token),
        ))
        .await
    }

    /// Set the quantity of a cart line. Callers clamp to a minimum of 1;
    /// the backend would treat zero as a removal.
    ///
    /// # Errors
    ///
    /// Returns `Api { status: 403, .. }` for another user's line.
    #[instrument(skip(self, token))]
    pub async fn update_cart_item(
        &self,
        token: &AccessToken,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<(), GrocerError> {
        let payload = QuantityPayload { quantity };
        Self::read_ok(Self::bearer(
            self.inner
                .http
                .put(self.url(&format!("/cart/{item_id}")))
                .json(&payload),
            Some(token),
        ))
        .await
    }

    /// Remove one line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the line is unknown.
    #[instrument(skip(self, token))]
    pub async fn remove_cart_item(
        &self,
        token: &AccessToken,
        item_id: CartItemId,
    ) -> Result<(), GrocerError> {
        Self::read_ok(Self::bearer(
            self.inner.http.delete(self.url(&format!("/cart/{item_id}"))),
            Some(token),
        ))
        .await
    }

    /// Empty the cart entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: &AccessToken) -> Result<(), GrocerError> {
        Self::read_ok(Self::bearer(
            self.inner.http.delete(self.url("/cart")),
            Some(token),
        ))
        .await
    }

    // ── Orders ──────────────────────────────────────────────────────────

    /// Convert the current cart into an order. Atomic on the backend: the
    /// cart is emptied and the order created in one request.
    ///
    /// # Errors
    ///
    /// Returns `Api { status: 400, .. }` when the cart is empty.
    #[instrument(skip(self, token))]
    pub async fn checkout(&self, token: &AccessToken) -> Result<CheckoutReceipt, GrocerError> {
        Self::read_json(Self::bearer(
            self.inner.http.post(self.url("/orders/checkout")),
            Some(token),
        ))
        .await
    }

    /// The caller's order history, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn orders(&self, token: &AccessToken) -> Result<Vec<OrderSummary>, GrocerError> {
        Self::read_json(Self::bearer(
            self.inner.http.get(self.url("/orders")),
            Some(token),
        ))
        .await
    }

    /// One order with its frozen line items.
    ///
    /// # Errors
    ///
    /// Returns `Api { status: 403, .. }` for another user's order.
    #[instrument(skip(self, token))]
    pub async fn order(
        &self,
        token: &AccessToken,
        code: &OrderCode,
    ) -> Result<OrderDetail, GrocerError> {
        Self::read_json(Self::bearer(
            self.inner.http.get(self.url(&format!("/orders/{code}"))),
            Some(token),
        ))
        .await
    }

    // ── Admin ───────────────────────────────────────────────────────────

    /// Create a product (admin token required).
    ///
    /// # Errors
    ///
    /// Returns an error if the token lacks the admin flag.
    #[instrument(skip(self, token, payload))]
    pub async fn create_product(
        &self,
        token: &AccessToken,
        payload: &ProductPayload,
    ) -> Result<(), GrocerError> {
        Self::read_ok(Self::bearer(
            self.inner
                .http
                .post(self.url("/admin/products"))
                .json(payload),
            Some(token),
        ))
        .await
    }

    /// Update a product (admin token required).
    ///
    /// # Errors
    ///
    /// Returns an error if the token lacks the admin flag.
    #[instrument(skip(self, token, payload))]
    pub async fn update_product(
        &self,
        token: &AccessToken,
        id: ProductId,
        payload: &ProductPayload,
    ) -> Result<(), GrocerError> {
        Self::read_ok(Self::bearer(
            self.inner
                .http
                .put(self.url(&format!("/admin/products/{id}")))
                .json(payload),
            Some(token),
        ))
        .await
    }

    /// Delete a product (admin token required).
    ///
    /// # Errors
    ///
    /// Returns an error if the token lacks the admin flag.
    #[instrument(skip(self, token))]
    pub async fn delete_product(
        &self,
        token: &AccessToken,
        id: ProductId,
    ) -> Result<(), GrocerError> {
        Self::read_ok(Self::bearer(
            self.inner
                .http
                .delete(self.url(&format!("/admin/products/{id}"))),
            Some(token),
        ))
        .await
    }

    /// Create a department (admin token required).
    ///
    /// # Errors
    ///
    /// Returns an error if the token lacks the admin flag.
    #[instrument(skip(self, token))]
    pub async fn create_department(
        &self,
        token: &AccessToken,
        name: &str,
    ) -> Result<(), GrocerError> {
        let payload = DepartmentPayload { name };
        Self::read_ok(Self::bearer(
            self.inner
                .http
                .post(self.url("/admin/departments"))
                .json(&payload),
            Some(token),
        ))
        .await
    }

    /// Rename a department (admin token required).
    ///
    /// # Errors
    ///
    /// Returns an error if the token lacks the admin flag.
    #[instrument(skip(self, token))]
    pub async fn update_department(
        &self,
        token: &AccessToken,
        id: DepartmentId,
        name: &str,
    ) -> Result<(), GrocerError> {
        let payload = DepartmentPayload { name };
        Self::read_ok(Self::bearer(
            self.inner
                .http
                .put(self.url(&format!("/admin/departments/{id}")))
                .json(&payload),
            Some(token),
        ))
        .await
    }

    /// Delete a department (admin token required).
    ///
    /// # Errors
    ///
    /// Returns `Api { status: 400, .. }` when products still reference it.
    #[instrument(skip(self, token))]
    pub async fn delete_department(
        &self,
        token: &AccessToken,
        id: DepartmentId,
    ) -> Result<(), GrocerError> {
        Self::read_ok(Self::bearer(
            self.inner
                .http
                .delete(self.url(&format!("/admin/departments/{id}"))),
            Some(token),
        ))
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_extracts_backend_message() {
        let err = GrocerError::api(400, r#"{"message": "Cart is empty"}"#);
        match &err {
            GrocerError::Api { status, message } => {
                assert_eq!(*status, 400);
                assert_eq!(message, "Cart is empty");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.user_message(), "Cart is empty");
    }

    #[test]
    fn test_api_error_falls_back_to_body_preview() {
        let err = GrocerError::api(502, "<html>Bad Gateway</html>");
        match err {
            GrocerError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "<html>Bad Gateway</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_truncates_long_bodies() {
        let body = "x".repeat(1000);
        match GrocerError::api(500, &body) {
            GrocerError::Api { message, .. } => {
                assert_eq!(message.len(), ERROR_BODY_PREVIEW_LEN);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_is_unauthorized() {
        assert!(GrocerError::api(401, r#"{"message": "Invalid token"}"#).is_unauthorized());
        assert!(!GrocerError::api(403, r#"{"message": "Forbidden"}"#).is_unauthorized());
    }

    #[test]
    fn test_error_display() {
        let err = GrocerError::Api {
            status: 404,
            message: "Product not found".to_owned(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Product not found");
    }

    #[test]
    fn test_parse_error_has_generic_user_message() {
        let parse = serde_json::from_str::<ErrorBody>("not json").unwrap_err();
        let err = GrocerError::Parse(parse);
        assert!(err.user_message().contains("try again"));
    }
}
