//! Sign-in, registration, and sign-out route handlers.
//!
//! Classic form posts, no HTMX: success redirects, failure re-renders the
//! page with the backend's message next to the form and the typed email
//! kept. Passwords are forwarded to the backend and never stored or
//! logged here.

use askama::Template;
use askama_web::WebTemplate;
use axum::Form;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::Shell;
use crate::services;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub shell: Shell,
    /// Message shown above the form after a rejected attempt.
    pub error: Option<String>,
    /// Previously typed email, kept across a rejected attempt.
    pub email: String,
}

/// Registration page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub shell: Shell,
    pub error: Option<String>,
    pub email: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the sign-in page. Signed-in visitors go home instead.
#[instrument(skip(state, session))]
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    let shell = Shell::load(&state, &session, None).await;

    LoginTemplate {
        shell,
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Handle the sign-in form.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match services::auth::login(&state, &session, &form.email, &form.password).await {
        Ok(_user) => Ok(Redirect::to("/").into_response()),
        Err(AppError::Grocer(err)) => {
            tracing::warn!("sign-in rejected: {err}");
            let shell = Shell::load(&state, &session, None).await;
            Ok(LoginTemplate {
                shell,
                error: Some(err.user_message()),
                email: form.email,
            }
            .into_response())
        }
        Err(err) => Err(err),
    }
}

/// Display the registration page. Signed-in visitors go home instead.
#[instrument(skip(state, session))]
pub async fn register_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    let shell = Shell::load(&state, &session, None).await;

    RegisterTemplate {
        shell,
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Handle the registration form.
///
/// The confirmation check runs here; everything else (email format,
/// duplicates, password rules) is the backend's call and its message is
/// shown verbatim.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    if form.password != form.password_confirm {
        let shell = Shell::load(&state, &session, None).await;
        return Ok(RegisterTemplate {
            shell,
            error: Some("Passwords do not match".to_owned()),
            email: form.email,
        }
        .into_response());
    }

    match services::auth::register(&state, &session, &form.email, &form.password).await {
        Ok(_user) => Ok(Redirect::to("/").into_response()),
        Err(AppError::Grocer(err)) => {
            tracing::warn!("registration rejected: {err}");
            let shell = Shell::load(&state, &session, None).await;
            Ok(RegisterTemplate {
                shell,
                error: Some(err.user_message()),
                email: form.email,
            }
            .into_response())
        }
        Err(err) => Err(err),
    }
}

/// Sign out and return home.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    services::auth::logout(&session).await;

    Redirect::to("/")
}
