//! Conversion of favorites, notifications, payments, orders and users.

use ev_market_core::{Favorite, Notification, Order, OrderStatus, Payment, UserProfile};
use serde_json::Value;
use tracing::warn;

use super::{
    bool_field, datetime_field, decimal_field, i64_field, list_items, require_id, single_item,
    string_field,
};
use crate::api::ApiError;

/// Convert every item of a list response with `convert`, skipping failures.
fn convert_list<T>(
    payload: &Value,
    kind: &str,
    convert: impl Fn(&Value) -> Result<T, ApiError>,
) -> Vec<T> {
    list_items(payload)
        .iter()
        .filter_map(|item| match convert(item) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, kind, "Skipping malformed record");
                None
            }
        })
        .collect()
}

// =============================================================================
// Favorites
// =============================================================================

/// Convert a favorite record.
///
/// # Errors
///
/// Returns `ApiError::Parse` if ids are missing.
pub fn convert_favorite(payload: &Value) -> Result<Favorite, ApiError> {
    let record = single_item(payload);
    Ok(Favorite {
        favorite_id: require_id(record, &["favoriteId", "id"], "favorite")?,
        user_id: require_id(record, &["userId"], "favorite user")?,
        product_id: require_id(record, &["productId"], "favorite product")?,
        created_at: datetime_field(record, &["createdAt", "createdDate"]),
    })
}

/// Convert a favorites list.
#[must_use]
pub fn convert_favorites(payload: &Value) -> Vec<Favorite> {
    convert_list(payload, "favorite", convert_favorite)
}

// =============================================================================
// Notifications
// =============================================================================

/// Convert a notification record.
///
/// # Errors
///
/// Returns `ApiError::Parse` if ids are missing.
pub fn convert_notification(payload: &Value) -> Result<Notification, ApiError> {
    let record = single_item(payload);
    Ok(Notification {
        notification_id: require_id(record, &["notificationId", "id"], "notification")?,
        user_id: require_id(record, &["userId", "receiverId"], "notification user")?,
        title: string_field(record, &["title", "notificationType"]).unwrap_or_default(),
        content: string_field(record, &["content", "message"]).unwrap_or_default(),
        is_read: bool_field(record, &["isRead", "read"]).unwrap_or(false),
        created_at: datetime_field(record, &["createdAt", "createdDate"]),
    })
}

/// Convert a notifications list.
#[must_use]
pub fn convert_notifications(payload: &Value) -> Vec<Notification> {
    convert_list(payload, "notification", convert_notification)
}

// =============================================================================
// Payments and orders
// =============================================================================

/// Convert a payment record.
///
/// A missing or unknown payment type is left as `None`.
///
/// # Errors
///
/// Returns `ApiError::Parse` if the payment id is missing.
pub fn convert_payment(payload: &Value) -> Result<Payment, ApiError> {
    let record = single_item(payload);
    Ok(Payment {
        payment_id: require_id(record, &["paymentId", "id"], "payment")?,
        order_id: i64_field(record, &["orderId"]).map(Into::into),
        product_id: i64_field(record, &["productId"]).map(Into::into),
        amount: decimal_field(record, &["amount", "totalAmount"]).unwrap_or_default(),
        payment_type: string_field(record, &["paymentType", "type"])
            .and_then(|t| t.parse().ok()),
        status: string_field(record, &["status", "paymentStatus"]).unwrap_or_default(),
        payment_url: string_field(record, &["paymentUrl", "checkoutUrl", "url"]),
    })
}

/// Convert an order record.
///
/// # Errors
///
/// Returns `ApiError::Parse` if required ids are missing.
pub fn convert_order(payload: &Value) -> Result<Order, ApiError> {
    let record = single_item(payload);
    let status = string_field(record, &["status", "orderStatus"])
        .and_then(|s| serde_json::from_value::<OrderStatus>(Value::String(s)).ok())
        .unwrap_or_default();

    Ok(Order {
        order_id: require_id(record, &["orderId", "id"], "order")?,
        buyer_id: require_id(record, &["buyerId", "userId"], "order buyer")?,
        seller_id: i64_field(record, &["sellerId"]).map(Into::into),
        product_id: require_id(record, &["productId"], "order product")?,
        total_amount: decimal_field(record, &["totalAmount", "amount"]).unwrap_or_default(),
        status,
    })
}

// =============================================================================
// Users
// =============================================================================

/// Convert a user record.
///
/// # Errors
///
/// Returns `ApiError::Parse` if the user id is missing.
pub fn convert_user(payload: &Value) -> Result<UserProfile, ApiError> {
    let record = single_item(payload);
    Ok(UserProfile {
        user_id: require_id(record, &["userId", "id"], "user")?,
        email: string_field(record, &["email"]).unwrap_or_default(),
        full_name: string_field(record, &["fullName", "name", "displayName", "username"]),
        phone: string_field(record, &["phone", "phoneNumber"]),
        role: string_field(record, &["role", "roleName"]).unwrap_or_default(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ev_market_core::{FavoriteId, PaymentType, ProductId};
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_convert_favorites_mixed_casing() {
        let payload = json!([
            {"favoriteId": 1, "userId": 2, "productId": 3},
            {"FavoriteId": 4, "UserId": 2, "ProductId": 5},
            {"favoriteId": 6}
        ]);
        let favorites = convert_favorites(&payload);
        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[1].favorite_id, FavoriteId::new(4));
        assert_eq!(favorites[1].product_id, ProductId::new(5));
    }

    #[test]
    fn test_convert_payment_without_type() {
        let payment = convert_payment(&json!({
            "paymentId": 10,
            "amount": 5000000,
            "paymentUrl": "https://pay/x"
        }))
        .unwrap();
        assert_eq!(payment.payment_type, None);
        assert_eq!(payment.amount, Decimal::from(5_000_000));
        assert_eq!(payment.payment_url.as_deref(), Some("https://pay/x"));
    }

    #[test]
    fn test_convert_payment_reads_backend_type() {
        let verification =
            convert_payment(&json!({"id": 11, "paymentType": "verification"})).unwrap();
        assert_eq!(verification.payment_type, Some(PaymentType::Verification));

        let unknown = convert_payment(&json!({"id": 12, "type": "refund"})).unwrap();
        assert_eq!(unknown.payment_type, None);
    }

    #[test]
    fn test_convert_order_unknown_status() {
        let order = convert_order(&json!({
            "orderId": 1, "buyerId": 2, "productId": 3, "totalAmount": 10, "status": "Disputed"
        }))
        .unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);
    }

    #[test]
    fn test_convert_user_wrapped_in_data() {
        let user = convert_user(&json!({"data": {"UserId": 8, "Email": "a@b.vn", "FullName": "A"}}))
            .unwrap();
        assert_eq!(user.user_id.as_i64(), 8);
        assert_eq!(user.display_name(), "A");
    }

    #[test]
    fn test_convert_notification_read_flag() {
        let n = convert_notification(&json!({
            "notificationId": 1, "userId": 2, "title": "Đơn hàng mới", "isRead": "true"
        }))
        .unwrap();
        assert!(n.is_read);
    }
}
