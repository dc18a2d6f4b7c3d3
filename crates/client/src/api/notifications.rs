//! Notification endpoints (`/api/Notification`).
//!
//! Notifications are a non-critical feature: badge counts degrade to zero
//! with a warning instead of failing the page around them.

use ev_market_core::{Notification, NotificationId, UserId};
use reqwest::Method;
use serde::Serialize;
use tracing::{instrument, warn};

use super::conversions::{convert_notification, convert_notifications};
use super::{ApiClient, ApiError, RequestBody};
use crate::outcome::SoftResult;

/// A notification to send to a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: UserId,
    pub title: String,
    pub content: String,
}

impl ApiClient {
    /// Notifications of a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_notifications(&self, user_id: UserId) -> Result<Vec<Notification>, ApiError> {
        let payload = self
            .request(
                Method::GET,
                &format!("/api/Notification/user/{user_id}"),
                RequestBody::Empty,
            )
            .await?;
        let mut notifications = convert_notifications(&payload);
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    /// Number of unread notifications, zero with a warning if unavailable.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn unread_notification_count(&self, user_id: UserId) -> SoftResult<usize> {
        match self.list_notifications(user_id).await {
            Ok(notifications) => {
                SoftResult::ok(notifications.iter().filter(|n| !n.is_read).count())
            }
            Err(e) => {
                warn!(error = %e, "Notifications unavailable");
                SoftResult::degraded(0, "Không thể tải thông báo.")
            }
        }
    }

    /// Send a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, notification), fields(user_id = %notification.user_id))]
    pub async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Option<Notification>, ApiError> {
        let body = serde_json::to_value(notification)
            .map_err(|e| ApiError::InvalidRequest(format!("notification body: {e}")))?;
        let payload = self
            .request(Method::POST, "/api/Notification", RequestBody::Json(body))
            .await?;
        Ok(convert_notification(&payload).ok())
    }

    /// Mark a notification as read.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(notification_id = %id))]
    pub async fn mark_notification_read(&self, id: NotificationId) -> Result<(), ApiError> {
        self.request(
            Method::PUT,
            &format!("/api/Notification/{id}/read"),
            RequestBody::Empty,
        )
        .await?;
        Ok(())
    }

    /// Delete a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(notification_id = %id))]
    pub async fn delete_notification(&self, id: NotificationId) -> Result<(), ApiError> {
        self.request(
            Method::DELETE,
            &format!("/api/Notification/{id}"),
            RequestBody::Empty,
        )
        .await?;
        Ok(())
    }
}
