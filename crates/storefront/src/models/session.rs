//! Session-related types.
//!
//! Types stored in the session for authentication and presentation state.

use serde::{Deserialize, Serialize};

use greengrocer_core::{Email, UserId};

use crate::grocer::AccessToken;

/// Session-stored user identity.
///
/// Carries the bearer token issued by the grocer backend so handlers can
/// call authenticated endpoints without a second lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's backend ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Whether the backend granted admin rights.
    pub is_admin: bool,
    /// Bearer token for authenticated grocer API calls.
    pub access_token: AccessToken,
}

/// Colour scheme preference, persisted per session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Default light palette.
    #[default]
    Light,
    /// Dark palette.
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Class applied to `<html>`; Tailwind's `dark:` variants key off it.
    #[must_use]
    pub const fn html_class(self) -> &'static str {
        match self {
            Self::Light => "",
            Self::Dark => "dark",
        }
    }

    /// Label for the toggle button, naming the theme it switches to.
    #[must_use]
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "Dark mode",
            Self::Dark => "Light mode",
        }
    }

    /// Template helper for picking the toggle icon.
    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }
}

/// Session keys for stored state.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the colour scheme preference.
    pub const THEME: &str = "theme";
}
