//! User endpoints (`/api/User`) and the login flow.

use ev_market_core::{UserId, UserProfile};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{info, instrument};

use super::conversions::{convert_user, field, single_item, string_field};
use super::{ApiClient, ApiError, RequestBody};
use crate::session::AuthSession;

/// Credentials for `POST /api/User/login`.
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

impl ApiClient {
    /// Public profile of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: UserId) -> Result<UserProfile, ApiError> {
        let payload = self
            .request(Method::GET, &format!("/api/User/{id}"), RequestBody::Empty)
            .await?;
        convert_user(&payload)
    }

    /// Sign in and store the session.
    ///
    /// # Errors
    ///
    /// Returns the backend's error for bad credentials, `ApiError::Parse`
    /// if the response carries no token or user, and storage errors.
    #[instrument(skip(self, login), fields(email = %login.email))]
    pub async fn login(&self, login: &LoginRequest) -> Result<AuthSession, ApiError> {
        let body = json!({
            "email": login.email,
            "password": login.password.expose_secret(),
        });
        let payload = self
            .request(Method::POST, "/api/User/login", RequestBody::Json(body))
            .await?;
        let record = single_item(&payload);

        let token = string_field(record, &["token", "accessToken", "jwt"])
            .ok_or_else(|| ApiError::Parse("login response without token".to_string()))?;
        let user = match field(record, &["user"]) {
            Some(user) => convert_user(user)?,
            None => convert_user(record)?,
        };
        let profile = field(record, &["profile"]).cloned();

        let session = AuthSession {
            token: SecretString::from(token),
            user,
            profile,
        };
        self.session().set(&session)?;
        info!(user_id = %session.user.user_id, "Signed in");
        Ok(session)
    }

    /// Sign out locally. The backend keeps no session state to revoke.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session().clear()?;
        self.invalidate_cache();
        info!("Signed out");
        Ok(())
    }
}
