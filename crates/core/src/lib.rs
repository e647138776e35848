//! Gallery Core - Shared types library.
//!
//! This crate provides common types used across the gallery storefront
//! components:
//! - `storefront` - cart, checkout, and catalog client library
//! - `integration-tests` - end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O and no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and
//!   availability statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
