//! Authentication service.
//!
//! Thin orchestration over the grocer backend's auth endpoints: exchange
//! credentials for a bearer token, resolve the profile, and stash the
//! identity in the session. The storefront never sees or stores passwords
//! beyond forwarding them here.

use tower_sessions::Session;
use tracing::instrument;

use greengrocer_core::Email;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Sign a visitor in with email and password.
///
/// On success the session holds a [`CurrentUser`] (including the bearer
/// token) and Sentry events are tagged with the user.
///
/// # Errors
///
/// Returns [`AppError::Grocer`] when the backend rejects the credentials
/// or is unreachable, and [`AppError::Internal`] if the session cannot be
/// written.
#[instrument(skip(state, session, password))]
pub async fn login(
    state: &AppState,
    session: &Session,
    email: &str,
    password: &str,
) -> Result<CurrentUser> {
    let grant = state.grocer().login(email, password).await?;

    // The login grant carries no user id, so resolve the profile with the
    // fresh token before building the session identity.
    let profile = state.grocer().current_user(&grant.access_token).await?;

    let email = Email::parse(&profile.email)
        .map_err(|e| AppError::Internal(format!("backend returned malformed email: {e}")))?;

    let user = CurrentUser {
        id: profile.id,
        email,
        is_admin: grant.is_admin,
        access_token: grant.access_token,
    };

    set_current_user(session, &user)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store session: {e}")))?;

    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "user signed in");

    Ok(user)
}

/// Register a new account, then sign it in.
///
/// The backend's register endpoint only acknowledges creation, so the
/// sign-in is a second call with the same credentials.
///
/// # Errors
///
/// Returns [`AppError::Grocer`] when registration or the follow-up login
/// fails (for example, the email is already taken).
#[instrument(skip(state, session, password))]
pub async fn register(
    state: &AppState,
    session: &Session,
    email: &str,
    password: &str,
) -> Result<CurrentUser> {
    state.grocer().register(email, password).await?;
    login(state, session, email, password).await
}

/// Sign the visitor out.
///
/// Clears the stored identity but keeps the rest of the session, so the
/// theme preference survives.
pub async fn logout(session: &Session) {
    if let Err(e) = clear_current_user(session).await {
        tracing::warn!("failed to clear session on logout: {e}");
    }
    clear_sentry_user();
    tracing::info!("user signed out");
}
