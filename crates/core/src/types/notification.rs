//! In-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{NotificationId, UserId};

/// A notification addressed to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub notification_id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}
