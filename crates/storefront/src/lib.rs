//! Gallery storefront core library.
//!
//! # Architecture
//!
//! Two components composed in a single-threaded, event-driven shell:
//!
//! - [`catalog`] - Catalog Client: fetches artwork collections from the
//!   catalog service, optionally filtered by category. A leaf with no state
//!   of its own beyond a short-lived response cache.
//! - [`cart`] - Cart & Checkout Controller: owns the cart contents, derives
//!   totals on demand, and drives the checkout handoff to the external
//!   payment processor plus the return-state reconciliation.
//!
//! All mutations happen through [`cart::CartController`], which notifies
//! registered observers synchronously and in order. Page rendering is the
//! embedding shell's concern; nothing in this crate draws anything.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod state;
pub mod view;
