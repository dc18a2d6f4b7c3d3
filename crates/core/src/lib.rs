//! EV Market Core - Shared domain types.
//!
//! This crate provides the types exchanged with the marketplace backend:
//! - listings (vehicles and batteries) and their moderation status
//! - favorites, orders, payments and notifications
//! - the signed-in user's profile
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. Wire-format quirks (inconsistent casing, stringly
//! numbers) are handled by the client crate before values reach these types.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, products, statuses, prices and payment types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
