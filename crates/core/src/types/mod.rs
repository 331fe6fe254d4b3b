//! Core types for Hearth.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod delivery;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use delivery::DeliveryMethod;
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use status::*;
