//! Hearth Core - Shared types library.
//!
//! This crate provides common types used across the Hearth storefront:
//! - `storefront` - Cart, checkout, and payment reconciliation service
//! - `integration-tests` - End-to-end checkout scenarios
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no async runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
