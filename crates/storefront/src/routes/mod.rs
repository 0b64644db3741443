//! HTTP route handlers for the storefront.
//!
//! Full pages render server-side off a [`Shell`] (identity, cart badge,
//! theme); everything interactive swaps HTMX fragments served by the same
//! modules. Route map:
//!
//! | Method      | Path                          | Handler                        |
//! |-------------|-------------------------------|--------------------------------|
//! | GET         | `/`                           | Home page with catalog         |
//! | GET         | `/catalog`                    | Catalog section fragment       |
//! | GET         | `/catalog/grid`               | Product grid fragment (search) |
//! | GET/POST    | `/login`                      | Sign-in page / form            |
//! | GET/POST    | `/register`                   | Registration page / form       |
//! | POST        | `/logout`                     | Sign out                       |
//! | POST        | `/theme/toggle`               | Flip light/dark theme          |
//! | GET         | `/cart`                       | Cart page                      |
//! | GET         | `/cart/badge`                 | Navbar badge fragment          |
//! | GET         | `/cart/preview`               | Mini-cart fragment             |
//! | GET         | `/cart/contents`              | Cart contents fragment         |
//! | POST        | `/cart/items`                 | Add a product                  |
//! | PUT/DELETE  | `/cart/items/{id}`            | Change / remove a line         |
//! | GET/POST    | `/checkout`                   | Review page / place order      |
//! | GET         | `/profile`                    | Purchase history page          |
//! | GET         | `/orders/{code}`              | Order line items fragment      |
//! | GET         | `/admin`                      | Admin dashboard                |
//! | GET/POST    | `/admin/products`             | Products panel / create        |
//! | GET         | `/admin/products/new`         | Blank product form             |
//! | PUT/DELETE  | `/admin/products/{id}`        | Update / delete a product      |
//! | GET         | `/admin/products/{id}/edit`   | Pre-filled product form        |
//! | GET/POST    | `/admin/departments`          | Departments panel / create     |
//! | GET         | `/admin/departments/new`      | Blank department form          |
//! | PUT/DELETE  | `/admin/departments/{id}`     | Rename / delete a department   |
//! | GET         | `/admin/departments/{id}/edit`| Pre-filled department form     |
//! | GET         | `/health`                     | Liveness probe                 |
//! | GET         | `/health/ready`               | Readiness probe                |

use askama::Template;
use askama_web::WebTemplate;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use tower_http::services::ServeDir;
use tower_sessions::Session;

use crate::filters;
use crate::middleware::auth::{AuthRejection, clear_current_user};
use crate::middleware::{OptionalAuth, create_session_layer};
use crate::models::{CurrentUser, Theme, session_keys};
use crate::services::cart::CartSummary;
use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod theme;

// =============================================================================
// Page Shell
// =============================================================================

/// Everything the page chrome renders regardless of which page it is:
/// who is signed in, the cart badge numbers, and the theme class.
#[derive(Clone)]
pub struct Shell {
    pub user: Option<CurrentUser>,
    pub cart: CartSummary,
    pub theme: Theme,
}

impl Shell {
    /// Assemble the shell for a page render.
    ///
    /// Refreshing the cart can discover that the backend no longer honors
    /// the session's token, in which case it clears the stored identity.
    /// The user is re-read from the session afterwards rather than
    /// trusting the extractor's snapshot, so the navbar never shows a
    /// signed-in state the backend just rejected.
    pub async fn load(state: &AppState, session: &Session, user: Option<CurrentUser>) -> Self {
        let cart = CartSummary::refresh(state, session, user.as_ref()).await;

        let user = match user {
            Some(_) => session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        let theme = theme::current_theme(session).await;

        Self { user, cart, theme }
    }
}

/// Answer an HTMX request whose bearer token the backend just rejected:
/// drop the stale identity and send the browser to the sign-in page.
pub(crate) async fn expired_session(session: &Session) -> Response {
    if let Err(e) = clear_current_user(session).await {
        tracing::warn!("failed to clear stale session: {e}");
    }

    AuthRejection::HxRedirectToLogin.into_response()
}

// =============================================================================
// Not Found
// =============================================================================

/// 404 page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub shell: Shell,
}

/// Fallback for unmatched paths.
async fn not_found(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let shell = Shell::load(&state, &session, user).await;

    (StatusCode::NOT_FOUND, NotFoundTemplate { shell })
}

// =============================================================================
// Probes
// =============================================================================

/// Liveness probe.
async fn health() -> &'static str {
    "ok"
}

/// Readiness probe: ready once the grocer backend answers.
async fn readiness(State(state): State<AppState>) -> Response {
    match state.grocer().health().await {
        Ok(()) => (StatusCode::OK, "ready").into_response(),
        Err(err) => {
            tracing::warn!("readiness check failed: {err}");
            (StatusCode::SERVICE_UNAVAILABLE, "grocer backend unreachable").into_response()
        }
    }
}

// =============================================================================
// Routers
// =============================================================================

fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/catalog", get(home::catalog_section))
        .route("/catalog/grid", get(home::catalog_grid))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/theme/toggle", post(theme::toggle))
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/badge", get(cart::badge))
        .route("/cart/preview", get(cart::preview))
        .route("/cart/contents", get(cart::contents))
        .route("/cart/items", post(cart::add))
        .route("/cart/items/{id}", put(cart::update).delete(cart::remove))
        .route(
            "/checkout",
            get(checkout::review).post(checkout::place_order),
        )
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(orders::profile))
        .route("/orders/{code}", get(orders::order_items))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin::index))
        .route(
            "/admin/products",
            get(admin::products_panel).post(admin::create_product),
        )
        .route("/admin/products/new", get(admin::new_product_form))
        .route(
            "/admin/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/admin/products/{id}/edit", get(admin::edit_product_form))
        .route(
            "/admin/departments",
            get(admin::departments_panel).post(admin::create_department),
        )
        .route("/admin/departments/new", get(admin::new_department_form))
        .route(
            "/admin/departments/{id}",
            put(admin::update_department).delete(admin::delete_department),
        )
        .route(
            "/admin/departments/{id}/edit",
            get(admin::edit_department_form),
        )
}

/// All storefront routes, without layers or state.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .merge(auth_routes())
        .merge(cart_routes())
        .merge(order_routes())
        .merge(admin_routes())
        .fallback(not_found)
}

/// The complete application: routes, probes, static assets, and the
/// session layer.
///
/// Assembled apart from `main` so integration tests can drive the whole
/// app in-process.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new("crates/storefront/static"))
        .layer(session_layer)
        .with_state(state)
}
