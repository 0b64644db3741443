//! Theme preference route handler.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use tower_sessions::Session;

use crate::models::{Theme, session_keys};

/// Read the visitor's theme preference, defaulting to light.
pub async fn current_theme(session: &Session) -> Theme {
    session
        .get(session_keys::THEME)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Flip the theme (HTMX).
///
/// Stores the new preference in the session and asks the browser to
/// reload, so the whole page re-renders under the new `<html>` class.
pub async fn toggle(session: Session) -> impl IntoResponse {
    let next = current_theme(&session).await.toggled();

    if let Err(e) = session.insert(session_keys::THEME, next).await {
        tracing::error!("Failed to store theme preference: {e}");
    }

    (StatusCode::NO_CONTENT, [("HX-Refresh", "true")])
}
