//! EV Market client library.
//!
//! Everything the marketplace front-end does besides rendering:
//!
//! - [`api`] - REST client with bearer auth, typed error classification and
//!   a normalization boundary for loosely-shaped backend records
//! - [`catalog`] - listing classification, client-side filtering and
//!   advanced search with a local fallback
//! - [`favorites`] - best-effort favorite toggling
//! - [`session`] / [`storage`] - persisted auth state over a local-storage
//!   style key/value store
//! - [`seller_names`] - bounded, persisted seller display-name cache
//! - [`payment_return`] - parsing of payment provider redirect parameters
//! - [`signals`] - cross-window event notification with dedup by event id
//! - [`toast`] - auto-expiring UI notifications

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod favorites;
pub mod outcome;
pub mod payment_return;
pub mod seller_names;
pub mod session;
pub mod signals;
pub mod storage;
pub mod toast;

pub use api::{ApiClient, ApiError, ErrorKind};
pub use config::ClientConfig;
pub use outcome::SoftResult;
pub use session::SessionManager;
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
