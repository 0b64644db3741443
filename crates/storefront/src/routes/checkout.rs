//! Checkout route handlers.
//!
//! The review page recaps the cart next to the fixed delivery and payment
//! terms. Confirming posts back over HTMX and swaps the whole review
//! section for the confirmation, so the browser never leaves the page and
//! an impatient double-click has nothing left to submit.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::grocer::types::CheckoutReceipt;
use crate::middleware::RequireAuth;
use crate::routes::cart::toast_error;
use crate::routes::{Shell, expired_session};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Checkout review page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/review.html")]
pub struct CheckoutPageTemplate {
    pub shell: Shell,
}

/// Order confirmation fragment, swapped in place of the review section.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/complete.html")]
pub struct CheckoutCompleteTemplate {
    pub receipt: CheckoutReceipt,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout review page.
///
/// An empty cart has nothing to review and bounces back to the cart page,
/// so the confirm button can never appear without items behind it.
#[instrument(skip(state, session))]
pub async fn review(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Response {
    let shell = Shell::load(&state, &session, Some(user)).await;

    if shell.cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    CheckoutPageTemplate { shell }.into_response()
}

/// Place the order (HTMX).
///
/// The backend empties the cart and creates the order in one request; the
/// `cart-updated` event zeroes the badge to match. A failure leaves the
/// review section in place and reports through the toast region instead.
#[instrument(skip(state, session))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Response {
    match state.grocer().checkout(&user.access_token).await {
        Ok(receipt) => {
            tracing::info!(
                user_id = %user.id,
                order_code = %receipt.order_code,
                "order placed"
            );
            (
                AppendHeaders([("HX-Trigger", "cart-updated")]),
                CheckoutCompleteTemplate { receipt },
            )
                .into_response()
        }
        Err(err) if err.is_unauthorized() => expired_session(&session).await,
        Err(err) => toast_error("Checkout failed", &err),
    }
}
