//! Vehicle / battery classification.
//!
//! Rules, first match wins:
//! 1. an explicit `productType` of `vehicle` or `battery` (any case)
//! 2. any vehicle attribute (license plate, mileage, year) means vehicle
//! 3. any battery attribute (capacity, voltage, cycle count) means battery
//! 4. otherwise vehicle
//!
//! Classification never fails.

use ev_market_core::{Product, ProductCategory};
use serde_json::Value;

use crate::api::conversions::products::{
    CAPACITY_FIELDS, CYCLE_COUNT_FIELDS, LICENSE_PLATE_FIELDS, MILEAGE_FIELDS,
    PRODUCT_TYPE_FIELDS, VOLTAGE_FIELDS, year_field,
};
use crate::api::conversions::{f64_field, i64_field, single_item, string_field};

/// Classify a normalized listing.
#[must_use]
pub fn classify(product: &Product) -> ProductCategory {
    if let Some(category) = product.product_type.as_deref().and_then(ProductCategory::parse) {
        return category;
    }

    let has_plate = product
        .license_plate
        .as_deref()
        .is_some_and(|p| !p.trim().is_empty());
    if has_plate || product.mileage.is_some() || product.year.is_some() {
        return ProductCategory::Vehicle;
    }

    if product.capacity.is_some() || product.voltage.is_some() || product.cycle_count.is_some() {
        return ProductCategory::Battery;
    }

    ProductCategory::Vehicle
}

/// Classify a raw backend record without normalizing it first.
///
/// Attributes are read with the same parsing the normalizer uses, so a value
/// the normalizer would drop (`"mileage": "n/a"`) does not count here either.
/// The answer always matches [`classify`] on the normalized record.
#[must_use]
pub fn classify_record(record: &Value) -> ProductCategory {
    let record = single_item(record);
    if let Some(category) =
        string_field(record, PRODUCT_TYPE_FIELDS).and_then(|t| ProductCategory::parse(&t))
    {
        return category;
    }

    if string_field(record, LICENSE_PLATE_FIELDS).is_some()
        || f64_field(record, MILEAGE_FIELDS).is_some()
        || year_field(record).is_some()
    {
        return ProductCategory::Vehicle;
    }

    if f64_field(record, CAPACITY_FIELDS).is_some()
        || f64_field(record, VOLTAGE_FIELDS).is_some()
        || i64_field(record, CYCLE_COUNT_FIELDS).is_some()
    {
        return ProductCategory::Battery;
    }

    ProductCategory::Vehicle
}

/// Split listings into `(vehicles, batteries)`, keeping their order.
#[must_use]
pub fn partition_by_category(products: Vec<Product>) -> (Vec<Product>, Vec<Product>) {
    products
        .into_iter()
        .partition(|p| classify(p) == ProductCategory::Vehicle)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::conversions::convert_product;
    use serde_json::json;

    #[test]
    fn test_explicit_type_wins_over_heuristics() {
        let raw = json!({"productType": "Battery", "mileage": 12000});
        assert_eq!(classify_record(&raw), ProductCategory::Battery);

        let product = Product {
            product_type: Some("Battery".to_string()),
            mileage: Some(12000.0),
            ..Product::default()
        };
        assert_eq!(classify(&product), ProductCategory::Battery);
    }

    #[test]
    fn test_unknown_record_defaults_to_vehicle() {
        assert_eq!(
            classify_record(&json!({"title": "Unknown item"})),
            ProductCategory::Vehicle
        );
        assert_eq!(classify(&Product::default()), ProductCategory::Vehicle);
    }

    #[test]
    fn test_battery_attributes() {
        let raw = json!({"id": 1, "capacity": 75, "voltage": "400"});
        assert_eq!(classify_record(&raw), ProductCategory::Battery);
        assert_eq!(
            classify(&convert_product(&raw).unwrap()),
            ProductCategory::Battery
        );
    }

    #[test]
    fn test_vehicle_attribute_beats_battery_attribute() {
        let raw = json!({"id": 2, "year": 2021, "capacity": 42});
        assert_eq!(classify_record(&raw), ProductCategory::Vehicle);
        assert_eq!(
            classify(&convert_product(&raw).unwrap()),
            ProductCategory::Vehicle
        );
    }

    #[test]
    fn test_unrecognized_type_falls_through() {
        let raw = json!({"productType": "Accessory", "cycleCount": 10});
        assert_eq!(classify_record(&raw), ProductCategory::Battery);
    }

    #[test]
    fn test_blank_plate_is_absent() {
        let product = Product {
            license_plate: Some("  ".to_string()),
            voltage: Some(48.0),
            ..Product::default()
        };
        assert_eq!(classify(&product), ProductCategory::Battery);
        assert_eq!(classify(&product), classify(&product));
    }

    #[test]
    fn test_raw_and_normalized_agree_on_malformed_records() {
        let records = [
            json!({"id": 1, "mileage": "n/a", "capacity": 50}),
            json!({"id": 2, "year": 9_999_999_999_i64, "voltage": 48}),
            json!({"id": 3, "year": "2020", "capacity": 40}),
            json!({"id": 4, "licensePlate": {"value": "30A"}, "cycleCount": 12}),
            json!({"id": 5, "licensePlate": "   ", "cycleCount": "many"}),
            json!({"id": 6, "capacity": "", "manufactureMileage": "12,500"}),
            json!({"id": 7, "cycleCount": 1.5, "batteryCapacity": "n/a"}),
            json!({"data": {"id": 8, "voltage": "72"}}),
            json!({"id": 9, "productType": "  ", "mileage": []}),
            json!({"id": 10, "type": "BATTERY", "year": 2022}),
        ];

        for raw in &records {
            let normalized = classify(&convert_product(raw).unwrap());
            assert_eq!(classify_record(raw), normalized, "record {raw}");
        }
    }

    #[test]
    fn test_unparseable_vehicle_attribute_is_ignored() {
        let raw = json!({"id": 1, "mileage": "n/a", "capacity": 50});
        assert_eq!(classify_record(&raw), ProductCategory::Battery);
    }

    #[test]
    fn test_partition_keeps_order() {
        let products = vec![
            Product { id: 1.into(), capacity: Some(10.0), ..Product::default() },
            Product { id: 2.into(), ..Product::default() },
            Product { id: 3.into(), product_type: Some("battery".to_string()), ..Product::default() },
        ];
        let (vehicles, batteries) = partition_by_category(products);
        assert_eq!(vehicles.len(), 1);
        assert_eq!(batteries.iter().map(|p| p.id.as_i64()).collect::<Vec<_>>(), vec![1, 3]);
    }
}
