//! Purchase orders.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderId, OrderStatus, ProductId, UserId};

/// An order placed by a buyer for a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub buyer_id: UserId,
    pub seller_id: Option<UserId>,
    pub product_id: ProductId,
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
}
