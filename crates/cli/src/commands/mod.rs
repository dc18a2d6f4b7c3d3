//! Command implementations.

pub mod auth;
pub mod favorites;
pub mod notifications;
pub mod payments;
pub mod products;

use std::sync::Arc;

use ev_market_client::{ApiClient, ApiError, ClientConfig, SoftResult, Storage, StorageError};
use ev_market_core::UserId;
use thiserror::Error;

/// Errors reported by commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),

    #[error("Local storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Bạn chưa đăng nhập. Chạy `evm login` trước.")]
    NotSignedIn,

    #[error("Phiên đăng nhập đã hết hạn. Vui lòng đăng nhập lại (`evm login`).")]
    SessionExpired,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Everything a command needs.
pub struct Context {
    pub client: ApiClient,
    pub config: ClientConfig,
    pub storage: Arc<dyn Storage>,
}

impl Context {
    /// The signed-in user, or an error telling the user to log in.
    pub fn require_user(&self) -> Result<UserId, CliError> {
        self.client
            .session()
            .user_id()?
            .ok_or(CliError::NotSignedIn)
    }
}

/// Print a degraded outcome's warning and hand back the value.
pub fn report<T>(result: SoftResult<T>) -> T {
    if let Some(warning) = &result.warning {
        println!("! {warning}");
    }
    result.into_value()
}
