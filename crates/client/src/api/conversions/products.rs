//! Product record conversion.

use ev_market_core::{Price, Product, ProductId};
use serde_json::Value;
use tracing::warn;

use super::{
    datetime_field, decimal_field, f64_field, field, i64_field, list_items, require_id,
    single_item, string_field,
};
use crate::api::ApiError;

/// Keys holding the listing type.
pub const PRODUCT_TYPE_FIELDS: &[&str] = &["productType", "type", "category"];
/// Keys of the vehicle-only attributes used for classification.
pub const MILEAGE_FIELDS: &[&str] = &["mileage", "manufactureMileage"];
pub const YEAR_FIELDS: &[&str] = &["year", "manufactureYear"];
pub const LICENSE_PLATE_FIELDS: &[&str] = &["licensePlate"];
/// Keys of the battery-only attributes used for classification.
pub const CAPACITY_FIELDS: &[&str] = &["capacity", "batteryCapacity"];
pub const VOLTAGE_FIELDS: &[&str] = &["voltage"];
pub const CYCLE_COUNT_FIELDS: &[&str] = &["cycleCount"];

/// Model year; values outside the `i32` range are dropped.
#[must_use]
pub fn year_field(record: &Value) -> Option<i32> {
    i64_field(record, YEAR_FIELDS).and_then(|y| i32::try_from(y).ok())
}

/// Collect image URLs from the shapes the backend uses: a flat list of
/// strings, or a list of image records with `imageUrl`/`url`.
fn image_urls(record: &Value) -> Vec<String> {
    let Some(images) = field(
        record,
        &["imageUrls", "images", "productImages", "imageUrl"],
    ) else {
        return Vec::new();
    };

    let items: &[Value] = match images {
        Value::Array(items) => items,
        Value::String(url) if !url.trim().is_empty() => return vec![url.trim().to_string()],
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(url) => Some(url.trim().to_string()).filter(|u| !u.is_empty()),
            Value::Object(_) => string_field(item, &["imageUrl", "url", "imageData"]),
            _ => None,
        })
        .collect()
}

/// Convert one raw product record.
///
/// # Errors
///
/// Returns `ApiError::Parse` if the record has no usable id.
pub fn convert_product(payload: &Value) -> Result<Product, ApiError> {
    let record = single_item(payload);
    let id: ProductId = require_id(record, &["productId", "id"], "product")?;

    Ok(Product {
        id,
        seller_id: i64_field(record, &["sellerId", "userId", "ownerId"]).map(Into::into),
        title: string_field(record, &["title", "name", "productName"]).unwrap_or_default(),
        description: string_field(record, &["description"]),
        price: decimal_field(record, &["price"]).map(Price::new),
        status: string_field(record, &["status"]).unwrap_or_default(),
        product_type: string_field(record, PRODUCT_TYPE_FIELDS),
        brand: string_field(record, &["brand"]),
        model: string_field(record, &["model"]),
        condition: string_field(record, &["condition"]),
        vehicle_type: string_field(record, &["vehicleType"]),
        fuel_type: string_field(record, &["fuelType"]),
        battery_type: string_field(record, &["batteryType"]),
        mileage: f64_field(record, MILEAGE_FIELDS),
        year: year_field(record),
        license_plate: string_field(record, LICENSE_PLATE_FIELDS),
        transmission: string_field(record, &["transmission"]),
        capacity: f64_field(record, CAPACITY_FIELDS),
        voltage: f64_field(record, VOLTAGE_FIELDS),
        cycle_count: i64_field(record, CYCLE_COUNT_FIELDS),
        battery_health: f64_field(record, &["batteryHealth"]),
        rejection_reason: string_field(record, &["rejectionReason", "rejectReason"]),
        image_urls: image_urls(record),
        created_at: datetime_field(record, &["createdAt", "createdDate"]),
    })
}

/// Convert a list response, skipping records that cannot be normalized.
#[must_use]
pub fn convert_products(payload: &Value) -> Vec<Product> {
    list_items(payload)
        .iter()
        .filter_map(|item| match convert_product(item) {
            Ok(product) => Some(product),
            Err(e) => {
                warn!(error = %e, "Skipping malformed product record");
                None
            }
        })
        .collect()
}
