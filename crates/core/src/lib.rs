//! Greengrocer Core - Shared domain types.
//!
//! This crate provides the common vocabulary used by the storefront and the
//! integration tests: type-safe IDs, decimal money, order codes, and emails.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, order codes, and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
