//! Persisted authentication session.
//!
//! The session lives under a single storage key as
//! `{ "token": ..., "user": ..., "profile": ... }`. [`SessionManager`] is
//! the only code that reads or writes that key; login, logout and profile
//! updates all go through it.

use std::sync::Arc;

use ev_market_core::{UserId, UserProfile};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{Storage, StorageError};

/// Storage key holding the auth session.
pub const AUTH_STORAGE_KEY: &str = "evtb_auth";

/// A signed-in session.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct AuthSession {
    /// Bearer token issued by the backend.
    pub token: SecretString,
    /// The signed-in account.
    pub user: UserProfile,
    /// Extended profile record, kept as the backend sent it.
    pub profile: Option<serde_json::Value>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .field("profile", &self.profile)
            .finish()
    }
}

/// On-disk layout of the session key.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    token: String,
    user: UserProfile,
    #[serde(default)]
    profile: Option<serde_json::Value>,
}

/// Owner of the persisted auth session.
#[derive(Clone)]
pub struct SessionManager {
    storage: Arc<dyn Storage>,
}

impl SessionManager {
    /// Create a session manager over a storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Read the current session, if any.
    ///
    /// A stored value that cannot be parsed is discarded and treated as
    /// signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn load(&self) -> Result<Option<AuthSession>, StorageError> {
        let Some(raw) = self.storage.get(AUTH_STORAGE_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) if !stored.token.is_empty() => Ok(Some(AuthSession {
                token: SecretString::from(stored.token),
                user: stored.user,
                profile: stored.profile,
            })),
            Ok(_) => Ok(None),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable auth session");
                self.storage.remove(AUTH_STORAGE_KEY)?;
                Ok(None)
            }
        }
    }

    /// Bearer token of the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn token(&self) -> Result<Option<SecretString>, StorageError> {
        Ok(self.load()?.map(|s| s.token))
    }

    /// Account of the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn user(&self) -> Result<Option<UserProfile>, StorageError> {
        Ok(self.load()?.map(|s| s.user))
    }

    /// Id of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn user_id(&self) -> Result<Option<UserId>, StorageError> {
        Ok(self.load()?.map(|s| s.user.user_id))
    }

    /// Whether a session with a token is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn is_authenticated(&self) -> Result<bool, StorageError> {
        Ok(self.load()?.is_some())
    }

    /// Replace the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn set(&self, session: &AuthSession) -> Result<(), StorageError> {
        let stored = StoredSession {
            token: session.token.expose_secret().to_string(),
            user: session.user.clone(),
            profile: session.profile.clone(),
        };
        self.storage
            .set(AUTH_STORAGE_KEY, &serde_json::to_string(&stored)?)?;
        debug!(user_id = %session.user.user_id, "Session stored");
        Ok(())
    }

    /// Update the account details of the current session, keeping the token.
    ///
    /// Returns `false` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or written.
    pub fn update_user(&self, user: UserProfile) -> Result<bool, StorageError> {
        let Some(mut session) = self.load()? else {
            return Ok(false);
        };
        session.user = user;
        self.set(&session)?;
        Ok(true)
    }

    /// Update the extended profile of the current session, keeping the token.
    ///
    /// Returns `false` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or written.
    pub fn update_profile(&self, profile: serde_json::Value) -> Result<bool, StorageError> {
        let Some(mut session) = self.load()? else {
            return Ok(false);
        };
        session.profile = Some(profile);
        self.set(&session)?;
        Ok(true)
    }

    /// Sign out locally.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(AUTH_STORAGE_KEY)?;
        debug!("Session cleared");
        Ok(())
    }
}
