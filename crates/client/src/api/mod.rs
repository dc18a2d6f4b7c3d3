//! REST client for the marketplace backend.
//!
//! # Architecture
//!
//! - The backend is the source of truth - no local sync, direct API calls
//! - Every request carries the session's bearer token when one is stored
//! - Backend records are loosely shaped (mixed casing, stringly numbers), so
//!   [`conversions`] maps raw JSON into core types immediately on receipt
//! - Listing pages are cached in memory via `moka`
//!
//! # Example
//!
//! ```rust,ignore
//! use ev_market_client::{ApiClient, ClientConfig};
//!
//! let client = ApiClient::new(&config, storage)?;
//!
//! let product = client.get_product(ProductId::new(12)).await?;
//! let payment = client
//!     .create_payment(&CreatePayment::for_order(order_id, amount, PaymentType::Deposit))
//!     .await?;
//! ```

mod cache;
mod client;
pub mod conversions;
mod favorites;
mod images;
mod notifications;
mod payments;
mod products;
mod users;

pub use client::{ApiClient, RequestBody};
pub use images::ImageUpload;
pub use notifications::NewNotification;
pub use payments::{CreateOrder, CreatePayment};
pub use products::ProductInput;
pub use users::LoginRequest;

use thiserror::Error;

use crate::storage::StorageError;

/// Message shown when no response was received at all.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Không thể kết nối tới máy chủ. Vui lòng kiểm tra kết nối mạng.";

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (connection refused, DNS, timeout).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Backend-supplied message, or a localized default.
        message: String,
        /// Parsed response body, when it was JSON.
        data: Option<serde_json::Value>,
    },

    /// A success response could not be decoded.
    #[error("Invalid response: {0}")]
    Parse(String),

    /// The request could not be built (bad path, bad header value).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Reading the stored session failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response; retrying later may help.
    Network,
    /// 4xx: generally user-correctable (validation, auth, not found, conflict).
    Client,
    /// 5xx: not user-correctable.
    Server,
    /// Malformed success response.
    Parse,
    /// Failure before the request left this process.
    Local,
}

impl ApiError {
    /// HTTP status, present only when the backend actually responded.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed error body returned by the backend.
    #[must_use]
    pub const fn data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Http { data, .. } => data.as_ref(),
            _ => None,
        }
    }

    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Http { status, .. } if *status >= 500 => ErrorKind::Server,
            Self::Http { .. } => ErrorKind::Client,
            Self::Parse(_) => ErrorKind::Parse,
            Self::InvalidRequest(_) | Self::Storage(_) => ErrorKind::Local,
        }
    }

    /// Whether the stored credentials were rejected.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }

    /// Whether the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }

    /// Whether the endpoint itself looks unavailable rather than the request
    /// being wrong: no response, missing route, or a server failure.
    #[must_use]
    pub const fn is_feature_unavailable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => matches!(*status, 404 | 405 | 501) || *status >= 500,
            _ => false,
        }
    }

    /// Message suitable for a toast or inline banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            Self::Http { message, .. } => message.clone(),
            Self::Parse(_) | Self::InvalidRequest(_) | Self::Storage(_) => {
                "Đã xảy ra lỗi, vui lòng thử lại.".to_string()
            }
        }
    }
}

/// Localized default message for common statuses.
#[must_use]
pub const fn default_message(status: u16) -> Option<&'static str> {
    match status {
        400 => Some("Dữ liệu không hợp lệ. Vui lòng kiểm tra lại thông tin."),
        401 => Some("Phiên đăng nhập đã hết hạn. Vui lòng đăng nhập lại."),
        403 => Some("Bạn không có quyền thực hiện thao tác này."),
        404 => Some("Không tìm thấy dữ liệu yêu cầu."),
        409 => Some("Dữ liệu bị trùng lặp hoặc xung đột."),
        500 => Some("Lỗi máy chủ. Vui lòng thử lại sau."),
        _ => None,
    }
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{ "message": ... }`, `{ "error": ... }`, ASP.NET validation
/// problems (`{ "title": ..., "errors": { "Field": ["..."] } }`) and bare
/// JSON strings.
#[must_use]
pub fn extract_message(data: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    let non_empty = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    if let Value::String(s) = data {
        return Some(s.trim().to_string()).filter(|s| !s.is_empty());
    }

    for key in ["message", "Message", "error", "Error", "detail"] {
        if let Some(message) = non_empty(data.get(key)) {
            return Some(message);
        }
    }

    if let Some(Value::Object(errors)) = data.get("errors") {
        let messages: Vec<String> = errors
            .values()
            .flat_map(|v| match v {
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect(),
                Value::String(s) => vec![s.clone()],
                _ => Vec::new(),
            })
            .collect();
        if !messages.is_empty() {
            return Some(messages.join("; "));
        }
    }

    non_empty(data.get("title"))
}

/// Message for a failed response: the backend's own, else the default.
pub(crate) fn message_for(status: u16, data: Option<&serde_json::Value>) -> String {
    data.and_then(extract_message)
        .or_else(|| default_message(status).map(String::from))
        .unwrap_or_else(|| format!("Yêu cầu thất bại (mã lỗi {status})."))
}
