//! Best-effort favorite toggling.
//!
//! Toggling is check-then-act over two requests with no transactional
//! guarantee. Failures never surface as errors: the returned state is the
//! one the user should see, with a warning when a request failed.

use std::future::Future;

use ev_market_core::{Favorite, FavoriteId, ProductId, UserId};
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::outcome::SoftResult;

const TOGGLE_FAILED_MESSAGE: &str = "Không thể cập nhật danh sách yêu thích.";

/// Backend operations the toggle needs.
pub trait FavoriteStore: Sync {
    fn list_favorites(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Favorite>, ApiError>> + Send;

    fn add_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Option<Favorite>, ApiError>> + Send;

    fn delete_favorite(
        &self,
        favorite_id: FavoriteId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl FavoriteStore for ApiClient {
    fn list_favorites(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Favorite>, ApiError>> + Send {
        Self::list_favorites(self, user_id)
    }

    fn add_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Option<Favorite>, ApiError>> + Send {
        Self::add_favorite(self, user_id, product_id)
    }

    fn delete_favorite(
        &self,
        favorite_id: FavoriteId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send {
        Self::delete_favorite(self, favorite_id)
    }
}

/// Flip the favorite state of a listing for a user.
///
/// Returns whether the listing is favorited afterwards:
/// - already favorited: delete it; on failure it stays favorited
/// - not favorited: create it; on failure it stays unfavorited
/// - favorites cannot be listed: reported as not favorited
#[instrument(skip(store), fields(user_id = %user_id, product_id = %product_id))]
pub async fn toggle_favorite<S: FavoriteStore>(
    store: &S,
    user_id: UserId,
    product_id: ProductId,
) -> SoftResult<bool> {
    let favorites = match store.list_favorites(user_id).await {
        Ok(favorites) => favorites,
        Err(e) => {
            warn!(error = %e, "Could not list favorites");
            return SoftResult::degraded(false, TOGGLE_FAILED_MESSAGE);
        }
    };

    if let Some(existing) = favorites.iter().find(|f| f.product_id == product_id) {
        return match store.delete_favorite(existing.favorite_id).await {
            Ok(()) => {
                info!(favorite_id = %existing.favorite_id, "Favorite removed");
                SoftResult::ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Could not remove favorite");
                SoftResult::degraded(true, TOGGLE_FAILED_MESSAGE)
            }
        };
    }

    match store.add_favorite(user_id, product_id).await {
        Ok(_) => {
            info!("Favorite added");
            SoftResult::ok(true)
        }
        Err(e) => {
            warn!(error = %e, "Could not add favorite");
            SoftResult::degraded(false, TOGGLE_FAILED_MESSAGE)
        }
    }
}

/// Whether a listing is among a user's favorites; `false` if unknown.
#[instrument(skip(store), fields(user_id = %user_id, product_id = %product_id))]
pub async fn is_favorited<S: FavoriteStore>(
    store: &S,
    user_id: UserId,
    product_id: ProductId,
) -> SoftResult<bool> {
    match store.list_favorites(user_id).await {
        Ok(favorites) => SoftResult::ok(favorites.iter().any(|f| f.product_id == product_id)),
        Err(e) => {
            warn!(error = %e, "Could not list favorites");
            SoftResult::degraded(false, TOGGLE_FAILED_MESSAGE)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

    #[derive(Default)]
    struct FakeStore {
        favorites: Mutex<Vec<Favorite>>,
        next_id: AtomicI64,
        fail_list: AtomicBool,
        fail_add: AtomicBool,
        fail_delete: AtomicBool,
    }

    fn failure() -> ApiError {
        ApiError::Http {
            status: 500,
            message: "boom".to_string(),
            data: None,
        }
    }

    impl FavoriteStore for FakeStore {
        async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, ApiError> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(failure());
            }
            let favorites = self.favorites.lock().unwrap();
            Ok(favorites
                .iter()
                .filter(|f| f.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn add_favorite(
            &self,
            user_id: UserId,
            product_id: ProductId,
        ) -> Result<Option<Favorite>, ApiError> {
            if self.fail_add.load(Ordering::SeqCst) {
                return Err(failure());
            }
            let favorite = Favorite {
                favorite_id: FavoriteId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
                user_id,
                product_id,
                created_at: None,
            };
            self.favorites.lock().unwrap().push(favorite.clone());
            Ok(Some(favorite))
        }

        async fn delete_favorite(&self, favorite_id: FavoriteId) -> Result<(), ApiError> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(failure());
            }
            self.favorites
                .lock()
                .unwrap()
                .retain(|f| f.favorite_id != favorite_id);
            Ok(())
        }
    }

    const USER: UserId = UserId::new(1);
    const PRODUCT: ProductId = ProductId::new(42);

    #[tokio::test]
    async fn test_toggle_twice_restores_state() {
        let store = FakeStore::default();
        let before = is_favorited(&store, USER, PRODUCT).await.value;

        let first = toggle_favorite(&store, USER, PRODUCT).await;
        assert!(!first.is_degraded());
        assert_eq!(first.value, !before);

        let second = toggle_favorite(&store, USER, PRODUCT).await;
        assert_eq!(second.value, before);
        assert_eq!(is_favorited(&store, USER, PRODUCT).await.value, before);
    }

    #[tokio::test]
    async fn test_failed_delete_reports_still_favorited() {
        let store = FakeStore::default();
        toggle_favorite(&store, USER, PRODUCT).await;
        store.fail_delete.store(true, Ordering::SeqCst);

        let result = toggle_favorite(&store, USER, PRODUCT).await;
        assert!(result.value);
        assert!(result.is_degraded());
    }

    #[tokio::test]
    async fn test_failed_create_reports_not_favorited() {
        let store = FakeStore::default();
        store.fail_add.store(true, Ordering::SeqCst);

        let result = toggle_favorite(&store, USER, PRODUCT).await;
        assert!(!result.value);
        assert!(result.is_degraded());
    }

    #[tokio::test]
    async fn test_failed_list_reports_not_favorited() {
        let store = FakeStore::default();
        store.fail_list.store(true, Ordering::SeqCst);

        let result = toggle_favorite(&store, USER, PRODUCT).await;
        assert!(!result.value);
        assert!(store.favorites.lock().unwrap().is_empty());
    }
}
