//! In-process integration harness for the Greengrocer storefront.
//!
//! [`TestContext::start`] boots two servers on ephemeral ports: a mock
//! grocer backend seeded with a small catalog, and the real storefront
//! router pointed at it. Tests drive the storefront over HTTP with a
//! cookie-holding client, the way a browser plus HTMX would, and inspect
//! the traffic the storefront sent to the backend through the
//! [`MockGrocer`] handle.
//!
//! ```rust,ignore
//! let ctx = TestContext::start().await;
//! ctx.sign_in_shopper().await;
//!
//! let resp = ctx.add_to_cart("Whole Milk", 2).await;
//! assert_eq!(resp.headers()["hx-trigger"], "cart-updated");
//! assert_eq!(ctx.grocer.hits("POST /cart"), 1);
//! ```

#![allow(clippy::missing_panics_doc)]

pub mod mock_grocer;

use reqwest::{Client, Response};
use secrecy::SecretString;
use url::Url;

use greengrocer_storefront::config::{GrocerApiConfig, StorefrontConfig};
use greengrocer_storefront::routes;
use greengrocer_storefront::state::AppState;

pub use mock_grocer::{ADMIN_EMAIL, ADMIN_PASSWORD, MockGrocer, SHOPPER_EMAIL, SHOPPER_PASSWORD};

/// A running storefront wired to a running mock backend, plus a client
/// that keeps its session cookie between requests.
pub struct TestContext {
    pub client: Client,
    pub storefront_url: String,
    pub grocer: MockGrocer,
}

impl TestContext {
    /// Boot the mock backend and the storefront, each on an ephemeral
    /// loopback port.
    pub async fn start() -> Self {
        let grocer = MockGrocer::start().await;
        let app = routes::app(AppState::new(test_config(grocer.url())));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind storefront listener");
        let addr = listener.local_addr().expect("storefront listener address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve storefront");
        });

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("build HTTP client");

        Self {
            client,
            storefront_url: format!("http://{addr}"),
            grocer,
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// GET a page, following redirects the way a browser would.
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET a page and return its body.
    pub async fn get_text(&self, path: &str) -> String {
        self.get(path).await.text().await.expect("read response body")
    }

    /// GET a fragment with the `HX-Request` header set, as HTMX does.
    pub async fn hx_get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .header("HX-Request", "true")
            .send()
            .await
            .expect("HTMX GET request failed")
    }

    /// POST a form with the `HX-Request` header set.
    pub async fn hx_post(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .expect("HTMX POST request failed")
    }

    /// PUT a form with the `HX-Request` header set.
    pub async fn hx_put(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .put(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .expect("HTMX PUT request failed")
    }

    /// DELETE with the `HX-Request` header set.
    pub async fn hx_delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .header("HX-Request", "true")
            .send()
            .await
            .expect("HTMX DELETE request failed")
    }

    /// Sign in as the seeded shopper and land on the home page.
    pub async fn sign_in_shopper(&self) {
        self.sign_in(SHOPPER_EMAIL, SHOPPER_PASSWORD).await;
    }

    /// Sign in as the seeded admin and land on the home page.
    pub async fn sign_in_admin(&self) {
        self.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    }

    async fn sign_in(&self, email: &str, password: &str) {
        let resp = self
            .client
            .post(self.url("/login"))
            .form(&[("email", email), ("password", password)])
            .send()
            .await
            .expect("login request failed");

        assert_eq!(resp.status(), 200, "login did not complete");
        assert_eq!(resp.url().path(), "/", "login should land on the home page");
    }

    /// Add a seeded product to the signed-in shopper's cart through the
    /// storefront, returning the toast response.
    pub async fn add_to_cart(&self, product: &str, quantity: u32) -> Response {
        let product_id = self
            .grocer
            .product_id(product)
            .expect("product exists in the mock")
            .to_string();
        let quantity = quantity.to_string();

        self.hx_post(
            "/cart/items",
            &[
                ("product_id", product_id.as_str()),
                ("quantity", quantity.as_str()),
            ],
        )
        .await
    }
}

fn test_config(grocer_url: &str) -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().expect("loopback address"),
        port: 0,
        base_url: "http://localhost:3000".to_owned(),
        session_secret: SecretString::from("kP7#vN2qLx9$Wm4@Zr8&Jt5^Bh3*Yd6c"),
        grocer: GrocerApiConfig {
            base_url: Url::parse(grocer_url).expect("mock grocer url"),
        },
        sentry_dsn: None,
        sentry_environment: "test".to_owned(),
    }
}
