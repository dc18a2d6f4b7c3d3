//! Favorite (watch-list) entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FavoriteId, ProductId, UserId};

/// A user's favorite listing.
///
/// Favorites are created or deleted, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub favorite_id: FavoriteId,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub created_at: Option<DateTime<Utc>>,
}
