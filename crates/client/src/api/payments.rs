//! Order and payment endpoints (`/api/Order`, `/api/Payment`).
//!
//! The backend owns the order and payment state machines. The client only
//! starts them and reads back what the backend reports.

use ev_market_core::{Order, OrderId, Payment, PaymentId, PaymentType, ProductId, UserId};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use super::conversions::{convert_order, convert_payment};
use super::{ApiClient, ApiError, RequestBody};

/// Request body for `POST /api/Order`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub buyer_id: UserId,
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<UserId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

/// Request body for `POST /api/Payment`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub payment_type: PaymentType,
}

impl CreatePayment {
    /// Deposit or final payment for an order.
    #[must_use]
    pub const fn for_order(order_id: OrderId, amount: Decimal, payment_type: PaymentType) -> Self {
        Self {
            order_id: Some(order_id),
            product_id: None,
            amount,
            payment_type,
        }
    }

    /// Verification fee funding the inspection of a listing.
    #[must_use]
    pub const fn verification(product_id: ProductId, amount: Decimal) -> Self {
        Self {
            order_id: None,
            product_id: Some(product_id),
            amount,
            payment_type: PaymentType::Verification,
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.amount <= Decimal::ZERO {
            return Err(ApiError::InvalidRequest(
                "payment amount must be positive".to_string(),
            ));
        }
        match self.payment_type {
            PaymentType::Verification if self.product_id.is_none() => Err(
                ApiError::InvalidRequest("verification payment needs a product".to_string()),
            ),
            PaymentType::Deposit | PaymentType::FinalPayment if self.order_id.is_none() => Err(
                ApiError::InvalidRequest(format!("{} payment needs an order", self.payment_type)),
            ),
            _ => Ok(()),
        }
    }
}

impl ApiClient {
    /// Place an order for a listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the order.
    #[instrument(skip(self, order), fields(product_id = %order.product_id))]
    pub async fn create_order(&self, order: &CreateOrder) -> Result<Order, ApiError> {
        let body = serde_json::to_value(order)
            .map_err(|e| ApiError::InvalidRequest(format!("order body: {e}")))?;
        let payload = self
            .request(Method::POST, "/api/Order", RequestBody::Json(body))
            .await?;
        let order = convert_order(&payload)?;
        info!(order_id = %order.order_id, "Order created");
        Ok(order)
    }

    /// Start a payment. Redirect the user to `payment_url` when present.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` for inconsistent requests (no order
    /// for a deposit, no product for a verification) and any backend error.
    #[instrument(skip(self, payment), fields(payment_type = %payment.payment_type, amount = %payment.amount))]
    pub async fn create_payment(&self, payment: &CreatePayment) -> Result<Payment, ApiError> {
        payment.validate()?;
        let body = serde_json::to_value(payment)
            .map_err(|e| ApiError::InvalidRequest(format!("payment body: {e}")))?;
        let payload = self
            .request(Method::POST, "/api/Payment", RequestBody::Json(body))
            .await?;
        let mut created = convert_payment(&payload)?;
        // An echo without a type is the payment just requested
        created.payment_type = created.payment_type.or(Some(payment.payment_type));
        info!(payment_id = %created.payment_id, "Payment created");
        Ok(created)
    }

    /// Read a payment's current state.
    ///
    /// `payment_type` is whatever the backend reports, `None` if it reports
    /// nothing usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment does not exist or the request fails.
    #[instrument(skip(self), fields(payment_id = %id))]
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, ApiError> {
        let payload = self
            .request(Method::GET, &format!("/api/Payment/{id}"), RequestBody::Empty)
            .await?;
        convert_payment(&payload)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_inconsistent_payments() {
        let no_order = CreatePayment {
            order_id: None,
            product_id: Some(ProductId::new(1)),
            amount: Decimal::from(100),
            payment_type: PaymentType::Deposit,
        };
        assert!(no_order.validate().is_err());

        let zero = CreatePayment::verification(ProductId::new(1), Decimal::ZERO);
        assert!(zero.validate().is_err());

        let ok = CreatePayment::for_order(OrderId::new(3), Decimal::from(100), PaymentType::FinalPayment);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_body_shape() {
        let body = serde_json::to_value(CreatePayment::verification(
            ProductId::new(4),
            Decimal::from(50_000),
        ))
        .unwrap();
        assert_eq!(body["productId"], 4);
        assert_eq!(body["paymentType"], "Verification");
        assert_eq!(body["amount"], 50_000.0);
        assert!(body.get("orderId").is_none());
    }
}
