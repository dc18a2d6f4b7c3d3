//! Status enums for listings, orders and notifications.

use serde::{Deserialize, Serialize};

/// Moderation / sale status of a listing.
///
/// The backend reports status as free text with several synonyms. Use
/// [`ProductStatus::normalize`] to collapse it into one of these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Awaiting moderation.
    #[default]
    Pending,
    /// Rejected once and sent back for another review.
    Resubmit,
    /// Visible on the marketplace.
    Approved,
    /// Rejected by a moderator (see the listing's rejection reason).
    Rejected,
    /// Sold or reserved by a buyer.
    Sold,
}

impl ProductStatus {
    /// Collapse a free-text backend status into a canonical status.
    ///
    /// Unknown or empty values are treated as pending.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "approved" | "active" | "verified" => Self::Approved,
            "sold" | "reserved" => Self::Sold,
            "rejected" => Self::Rejected,
            "resubmit" | "re-submit" | "resubmitted" => Self::Resubmit,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Resubmit => write!(f, "resubmit"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
            Self::Sold => write!(f, "sold"),
        }
    }
}

/// Order status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Deposited,
    Paid,
    Completed,
    Cancelled,
    /// Any status this client does not know about.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_synonyms() {
        assert_eq!(ProductStatus::normalize("Active"), ProductStatus::Approved);
        assert_eq!(ProductStatus::normalize("VERIFIED"), ProductStatus::Approved);
        assert_eq!(ProductStatus::normalize("reserved"), ProductStatus::Sold);
        assert_eq!(ProductStatus::normalize("Re-submit"), ProductStatus::Resubmit);
        assert_eq!(ProductStatus::normalize(" rejected "), ProductStatus::Rejected);
    }

    #[test]
    fn test_normalize_unknown_is_pending() {
        assert_eq!(ProductStatus::normalize(""), ProductStatus::Pending);
        assert_eq!(ProductStatus::normalize("draft"), ProductStatus::Pending);
    }

    #[test]
    fn test_order_status_unknown() {
        let status: OrderStatus = serde_json::from_str("\"Refunding\"").unwrap();
        assert_eq!(status, OrderStatus::Unknown);
    }
}
