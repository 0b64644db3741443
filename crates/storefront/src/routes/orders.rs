//! Purchase history route handlers.
//!
//! The profile page lists order history rows; each row expands on demand
//! and fetches its frozen line items as a fragment, so the history page
//! itself never pays for detail lookups the visitor does not open.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;
use tracing::instrument;

use greengrocer_core::OrderCode;

use crate::filters;
use crate::grocer::types::{OrderDetail, OrderSummary};
use crate::middleware::RequireAuth;
use crate::middleware::auth::clear_current_user;
use crate::routes::cart::toast_error;
use crate::routes::{Shell, expired_session};
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// Profile page template: account line plus purchase history.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct ProfileTemplate {
    pub shell: Shell,
    pub orders: Vec<OrderSummary>,
}

/// Line items fragment for one expanded order.
#[derive(Template, WebTemplate)]
#[template(path = "orders/detail.html")]
pub struct OrderItemsTemplate {
    pub order: OrderDetail,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the profile page with the visitor's order history.
#[instrument(skip(state, session))]
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Response {
    let orders = match state.grocer().orders(&user.access_token).await {
        Ok(orders) => orders,
        Err(err) if err.is_unauthorized() => {
            if let Err(e) = clear_current_user(&session).await {
                tracing::warn!("failed to clear stale session: {e}");
            }
            return Redirect::to("/login").into_response();
        }
        Err(err) => {
            tracing::error!("Failed to fetch order history: {err}");
            Vec::new()
        }
    };

    let shell = Shell::load(&state, &session, Some(user)).await;

    ProfileTemplate { shell, orders }.into_response()
}

/// Line items for one order (HTMX), fetched when the row is expanded.
#[instrument(skip(state, session))]
pub async fn order_items(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(code): Path<OrderCode>,
) -> Response {
    match state.grocer().order(&user.access_token, &code).await {
        Ok(order) => OrderItemsTemplate { order }.into_response(),
        Err(err) if err.is_unauthorized() => expired_session(&session).await,
        Err(err) => toast_error("Failed to fetch order details", &err),
    }
}
