//! Middleware for the storefront server.
//!
//! # Middleware
//!
//! - `auth` - Authentication extractors (`RequireAuth`, `RequireAdmin`, `OptionalAuth`)
//! - `session` - Session layer configuration (signed cookie, in-memory store)

pub mod auth;
pub mod session;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth};
pub use session::create_session_layer;
