//! Persisted seller display-name cache.
//!
//! Listing cards show the seller's name, which the listing record does not
//! carry. Names are cached under one storage key, bounded to the most
//! recently inserted sellers, and looked up with a short timeout so a slow
//! user endpoint never holds up a page.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use ev_market_core::UserId;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::storage::{Storage, StorageError};

/// Storage key holding the cache.
pub const SELLER_NAMES_STORAGE_KEY: &str = "evtb_seller_names";

/// Entries kept; the oldest inserted are evicted first.
pub const MAX_CACHED_SELLERS: usize = 50;

/// Shown when a seller's name cannot be resolved.
pub const PLACEHOLDER_SELLER_NAME: &str = "Người bán";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedName {
    id: UserId,
    name: String,
}

/// Insertion-ordered seller name cache backed by [`Storage`].
pub struct SellerNameCache {
    storage: Arc<dyn Storage>,
    entries: Mutex<Vec<CachedName>>,
}

impl SellerNameCache {
    /// Load the cache from storage. A missing or unreadable entry starts
    /// an empty cache.
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let mut entries = match storage.get(SELLER_NAMES_STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<CachedName>>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding unreadable seller name cache");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Could not read seller name cache");
                Vec::new()
            }
        };
        let excess = entries.len().saturating_sub(MAX_CACHED_SELLERS);
        entries.drain(..excess);

        Self {
            storage,
            entries: Mutex::new(entries),
        }
    }

    /// Cached name of a seller.
    pub fn get(&self, id: UserId) -> Option<String> {
        self.lock()
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.clone())
    }

    /// Number of cached sellers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Cache a name and persist the cache.
    ///
    /// A known seller keeps its position. When storage is full the stored
    /// cache is dropped entirely rather than left half-written.
    pub fn insert(&self, id: UserId, name: impl Into<String>) {
        let name = name.into();
        let mut entries = self.lock();

        if let Some(existing) = entries.iter_mut().find(|e| e.id == id) {
            existing.name = name;
        } else {
            entries.push(CachedName { id, name });
            let excess = entries.len().saturating_sub(MAX_CACHED_SELLERS);
            entries.drain(..excess);
        }

        match self.persist(&entries) {
            Ok(()) => {}
            Err(StorageError::QuotaExceeded(reason)) => {
                warn!(reason = %reason, "Storage full, dropping seller name cache");
                entries.clear();
                if let Err(e) = self.storage.remove(SELLER_NAMES_STORAGE_KEY) {
                    warn!(error = %e, "Could not remove seller name cache");
                }
            }
            Err(e) => warn!(error = %e, "Could not persist seller name cache"),
        }
    }

    /// Seller's display name, fetched from the backend on a cache miss.
    ///
    /// Never fails: an unknown seller, a failed request or a lookup slower
    /// than `timeout` all yield [`PLACEHOLDER_SELLER_NAME`].
    pub async fn resolve(&self, client: &ApiClient, id: UserId, timeout: Duration) -> String {
        self.resolve_with(id, timeout, |id| async move {
            client.get_user(id).await.map(|user| user.display_name().to_string())
        })
        .await
    }

    /// [`Self::resolve`] with a caller-supplied lookup.
    #[instrument(skip(self, lookup), fields(seller_id = %id))]
    pub async fn resolve_with<F, Fut>(&self, id: UserId, timeout: Duration, lookup: F) -> String
    where
        F: FnOnce(UserId) -> Fut,
        Fut: Future<Output = Result<String, ApiError>>,
    {
        if let Some(name) = self.get(id) {
            return name;
        }

        match tokio::time::timeout(timeout, lookup(id)).await {
            Ok(Ok(name)) if !name.trim().is_empty() => {
                self.insert(id, name.trim());
                name.trim().to_string()
            }
            Ok(Ok(_)) => {
                debug!("Seller has no display name");
                PLACEHOLDER_SELLER_NAME.to_string()
            }
            Ok(Err(e)) => {
                debug!(error = %e, "Seller lookup failed");
                PLACEHOLDER_SELLER_NAME.to_string()
            }
            Err(_) => {
                debug!(timeout_ms = timeout.as_millis(), "Seller lookup timed out");
                PLACEHOLDER_SELLER_NAME.to_string()
            }
        }
    }

    fn persist(&self, entries: &[CachedName]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entries)?;
        self.storage.set(SELLER_NAMES_STORAGE_KEY, &raw)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CachedName>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
