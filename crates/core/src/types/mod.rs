//! Core types for EV Market.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod favorite;
pub mod id;
pub mod notification;
pub mod order;
pub mod payment;
pub mod price;
pub mod product;
pub mod status;
pub mod user;

pub use favorite::Favorite;
pub use id::*;
pub use notification::Notification;
pub use order::Order;
pub use payment::{Payment, PaymentType, PaymentTypeError};
pub use price::Price;
pub use product::{PRICE_ON_REQUEST, Product, ProductCategory};
pub use status::*;
pub use user::UserProfile;
