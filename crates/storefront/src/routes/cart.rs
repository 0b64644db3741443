//! Cart route handlers.
//!
//! Mutations all follow one pattern: change the backend cart, then answer
//! with an `HX-Trigger: cart-updated` header. The navbar badge, the
//! mini-cart, and the cart page each listen for that event and re-fetch
//! their own fragment, so totals are recomputed server-side instead of
//! being patched piecemeal in the page.

use askama::Template;
use askama_web::WebTemplate;
use axum::Form;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse, Response};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use greengrocer_core::{CartItemId, ProductId};

use crate::filters;
use crate::grocer::GrocerError;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::routes::{Shell, expired_session};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub product_id: ProductId,
    /// Units to add; product cards always send 1, the backend merges
    /// repeats into one line.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

const fn default_quantity() -> u32 {
    1
}

/// Quantity update form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub quantity: u32,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/index.html")]
pub struct CartPageTemplate {
    pub shell: Shell,
}

/// Cart contents fragment: line items plus the order summary panel.
#[derive(Template, WebTemplate)]
#[template(path = "cart/contents.html")]
pub struct CartContentsTemplate {
    pub shell: Shell,
}

/// Navbar badge fragment.
#[derive(Template, WebTemplate)]
#[template(path = "cart/badge.html")]
pub struct BadgeTemplate {
    pub shell: Shell,
}

/// Mini-cart dropdown fragment.
#[derive(Template, WebTemplate)]
#[template(path = "cart/preview.html")]
pub struct PreviewTemplate {
    pub shell: Shell,
}

/// Toast fragment. Success toasts are the normal answer to add-to-cart;
/// failure toasts double as the error channel for every cart mutation.
#[derive(Template, WebTemplate)]
#[template(path = "partials/toast.html")]
pub struct ToastTemplate {
    pub success: bool,
    pub message: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let shell = Shell::load(&state, &session, Some(user)).await;

    CartPageTemplate { shell }
}

/// Cart contents fragment (HTMX).
///
/// The cart page swaps this in whenever a `cart-updated` event fires.
#[instrument(skip(state, session))]
pub async fn contents(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> impl IntoResponse {
    let shell = Shell::load(&state, &session, Some(user)).await;

    CartContentsTemplate { shell }
}

/// Navbar badge fragment (HTMX).
///
/// Guests get the zero-count badge without a backend call.
#[instrument(skip(state, session))]
pub async fn badge(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let shell = Shell::load(&state, &session, user).await;

    BadgeTemplate { shell }
}

/// Mini-cart dropdown fragment (HTMX).
#[instrument(skip(state, session))]
pub async fn preview(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> impl IntoResponse {
    let shell = Shell::load(&state, &session, user).await;

    PreviewTemplate { shell }
}

/// Add a product to the cart (HTMX).
///
/// Answers with a toast for the `#toasts` region and fires `cart-updated`
/// so the badge and mini-cart refresh themselves.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddForm>,
) -> Response {
    let quantity = form.quantity.max(1);

    match state
        .grocer()
        .add_to_cart(&user.access_token, form.product_id, quantity)
        .await
    {
        Ok(()) => (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            ToastTemplate {
                success: true,
                message: "Added to cart".to_owned(),
            },
        )
            .into_response(),
        Err(err) if err.is_unauthorized() => expired_session(&session).await,
        Err(err) => toast_error("Failed to add to cart", &err),
    }
}

/// Set a line's quantity (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(item_id): Path<CartItemId>,
    Form(form): Form<QuantityForm>,
) -> Response {
    // The minus button is disabled at one unit; clamp anyway so a crafted
    // request cannot zero a line through this route.
    let quantity = form.quantity.max(1);

    match state
        .grocer()
        .update_cart_item(&user.access_token, item_id, quantity)
        .await
    {
        Ok(()) => cart_updated(),
        Err(err) if err.is_unauthorized() => expired_session(&session).await,
        Err(err) => toast_error("Failed to update quantity", &err),
    }
}

/// Remove one line from the cart (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(item_id): Path<CartItemId>,
) -> Response {
    match state
        .grocer()
        .remove_cart_item(&user.access_token, item_id)
        .await
    {
        Ok(()) => cart_updated(),
        Err(err) if err.is_unauthorized() => expired_session(&session).await,
        Err(err) => toast_error("Failed to remove item", &err),
    }
}

/// The bodyless success answer for quantity and removal changes: nothing
/// to swap, just the event that makes the cart fragments re-fetch.
fn cart_updated() -> Response {
    (
        StatusCode::NO_CONTENT,
        AppendHeaders([("HX-Trigger", "cart-updated")]),
    )
        .into_response()
}

/// Log a backend failure and render it as an error toast.
pub(crate) fn toast_error(context: &str, err: &GrocerError) -> Response {
    tracing::error!("{context}: {err}");

    error_toast(err.user_message())
}

/// An error toast, retargeted at the `#toasts` region no matter what the
/// requesting element meant to swap.
///
/// Status 200 because htmx leaves error-status responses unswapped by
/// default.
pub(crate) fn error_toast(message: String) -> Response {
    (
        AppendHeaders([("HX-Retarget", "#toasts"), ("HX-Reswap", "beforeend")]),
        ToastTemplate {
            success: false,
            message,
        },
    )
        .into_response()
}
