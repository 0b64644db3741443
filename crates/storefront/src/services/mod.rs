//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Sign-in, registration, and sign-out against the grocer backend
//! - `cart` - Cart summary derivation shared by every cart-aware fragment

pub mod auth;
pub mod cart;
