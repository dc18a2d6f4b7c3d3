//! Payment types.
//!
//! The client never owns payment state. It initiates payments and reads
//! whatever the backend reports back.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{OrderId, PaymentId, ProductId};

/// Kind of payment being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    /// Partial payment reserving a listing.
    Deposit,
    /// Remaining balance of a purchase.
    FinalPayment,
    /// Fee funding a moderation/inspection request for a listing.
    Verification,
}

/// Error parsing a payment type from text.
#[derive(Debug, Error)]
#[error("invalid payment type: {0} (expected deposit, final or verification)")]
pub struct PaymentTypeError(String);

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "Deposit"),
            Self::FinalPayment => write!(f, "FinalPayment"),
            Self::Verification => write!(f, "Verification"),
        }
    }
}

impl std::str::FromStr for PaymentType {
    type Err = PaymentTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['_', '-'], "").as_str() {
            "deposit" => Ok(Self::Deposit),
            "final" | "finalpayment" => Ok(Self::FinalPayment),
            "verification" => Ok(Self::Verification),
            _ => Err(PaymentTypeError(s.to_string())),
        }
    }
}

/// A payment as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub payment_id: PaymentId,
    pub order_id: Option<OrderId>,
    pub product_id: Option<ProductId>,
    pub amount: Decimal,
    /// `None` when the backend record names no known payment type.
    pub payment_type: Option<PaymentType>,
    /// Free-text status (the backend owns the state machine).
    #[serde(default)]
    pub status: String,
    /// Provider checkout URL to redirect the buyer to, when one was issued.
    pub payment_url: Option<String>,
}
