//! Favorite endpoints (`/api/Favorite`).

use ev_market_core::{Favorite, FavoriteId, ProductId, UserId};
use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use super::conversions::{convert_favorite, convert_favorites};
use super::{ApiClient, ApiError, RequestBody};

impl ApiClient {
    /// Favorites of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, ApiError> {
        let payload = self
            .request(
                Method::GET,
                &format!("/api/Favorite/user/{user_id}"),
                RequestBody::Empty,
            )
            .await?;
        Ok(convert_favorites(&payload))
    }

    /// Add a listing to a user's favorites.
    ///
    /// Returns `None` when the backend acknowledges without echoing the
    /// record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_favorite(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<Favorite>, ApiError> {
        let body = json!({ "userId": user_id, "productId": product_id });
        let payload = self
            .request(Method::POST, "/api/Favorite", RequestBody::Json(body))
            .await?;
        Ok(convert_favorite(&payload).ok())
    }

    /// Remove a favorite.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(favorite_id = %favorite_id))]
    pub async fn delete_favorite(&self, favorite_id: FavoriteId) -> Result<(), ApiError> {
        self.request(
            Method::DELETE,
            &format!("/api/Favorite/{favorite_id}"),
            RequestBody::Empty,
        )
        .await?;
        Ok(())
    }
}
