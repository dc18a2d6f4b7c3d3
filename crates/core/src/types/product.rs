//! Listing types for vehicles and batteries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Price, ProductId, ProductStatus, UserId};

/// Coarse display grouping for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    /// Electric vehicles (cars, motorbikes, scooters).
    #[default]
    Vehicle,
    /// Standalone battery packs.
    Battery,
}

impl ProductCategory {
    /// Wire representation (`"vehicle"` / `"battery"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vehicle => "vehicle",
            Self::Battery => "battery",
        }
    }

    /// Parse a category case-insensitively. Returns `None` for anything else.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "vehicle" => Some(Self::Vehicle),
            "battery" => Some(Self::Battery),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A marketplace listing in canonical shape.
///
/// Only one of the vehicle or battery attribute groups is meaningful for a
/// given listing; the backend does not enforce this, so both are optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub seller_id: Option<UserId>,
    pub title: String,
    pub description: Option<String>,
    /// `None` when the backend sent no price or one that does not parse.
    pub price: Option<Price>,
    /// Raw status text as sent by the backend.
    pub status: String,
    /// Raw `productType` as sent by the backend, if any.
    pub product_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub condition: Option<String>,
    pub vehicle_type: Option<String>,
    pub fuel_type: Option<String>,
    pub battery_type: Option<String>,

    // Vehicle attributes
    pub mileage: Option<f64>,
    pub year: Option<i32>,
    pub license_plate: Option<String>,
    pub transmission: Option<String>,

    // Battery attributes
    pub capacity: Option<f64>,
    pub voltage: Option<f64>,
    pub cycle_count: Option<i64>,
    pub battery_health: Option<f64>,

    /// Moderator's note when the listing was rejected.
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Shown in place of a price the listing does not carry.
pub const PRICE_ON_REQUEST: &str = "Liên hệ";

impl Product {
    /// Formatted price, or [`PRICE_ON_REQUEST`] when there is none.
    #[must_use]
    pub fn price_display(&self) -> String {
        self.price
            .as_ref()
            .map_or_else(|| PRICE_ON_REQUEST.to_string(), Price::display)
    }

    /// Canonical moderation status.
    #[must_use]
    pub fn status(&self) -> ProductStatus {
        ProductStatus::normalize(&self.status)
    }

    /// Rejection reason to show the seller, only when the listing is rejected.
    #[must_use]
    pub fn visible_rejection_reason(&self) -> Option<&str> {
        match self.status() {
            ProductStatus::Rejected | ProductStatus::Resubmit => self
                .rejection_reason
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!(ProductCategory::parse("Battery"), Some(ProductCategory::Battery));
        assert_eq!(ProductCategory::parse(" VEHICLE "), Some(ProductCategory::Vehicle));
        assert_eq!(ProductCategory::parse("scooter"), None);
    }

    #[test]
    fn test_missing_price_display() {
        let mut product = Product::default();
        assert_eq!(product.price_display(), PRICE_ON_REQUEST);

        let price = Price::new(rust_decimal::Decimal::from(1_500));
        product.price = Some(price);
        assert_eq!(product.price_display(), price.display());
    }

    #[test]
    fn test_rejection_reason_only_when_rejected() {
        let mut product = Product {
            status: "Rejected".to_string(),
            rejection_reason: Some("Ảnh không rõ".to_string()),
            ..Product::default()
        };
        assert_eq!(product.visible_rejection_reason(), Some("Ảnh không rõ"));

        product.status = "Approved".to_string();
        assert_eq!(product.visible_rejection_reason(), None);

        product.status = "rejected".to_string();
        product.rejection_reason = Some("   ".to_string());
        assert_eq!(product.visible_rejection_reason(), None);
    }
}
