//! Domain models for the storefront.
//!
//! # Models
//!
//! - `session` - Types stored in the visitor session (identity, theme)

pub mod session;

pub use session::{CurrentUser, Theme, keys as session_keys};
