//! Client-side advanced filtering.
//!
//! Reproduces the server's advanced search over an already fetched list.
//! Every present criterion must hold (conjunction). Blank criteria are
//! ignored. A listing lacking the field a criterion looks at is excluded.

use ev_market_core::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw statuses a listing must carry to show up in search results.
const SEARCHABLE_STATUSES: &[&str] = &["approved", "active", "verified"];

/// Sparse search criteria. `None` and blank strings mean "don't care".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFilter {
    // Exact, case-insensitive
    pub product_type: Option<String>,
    pub condition: Option<String>,
    pub vehicle_type: Option<String>,
    pub fuel_type: Option<String>,
    pub battery_type: Option<String>,
    pub year: Option<String>,
    pub voltage: Option<String>,

    // Substring, case-insensitive
    pub brand: Option<String>,
    pub model: Option<String>,
    pub license_plate: Option<String>,

    // Inclusive ranges
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub max_mileage: Option<f64>,
    pub min_battery_health: Option<f64>,
    pub max_battery_health: Option<f64>,
    pub min_capacity: Option<f64>,
    pub max_capacity: Option<f64>,
    pub min_cycle_count: Option<i64>,
    pub max_cycle_count: Option<i64>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn exact(wanted: Option<&String>, actual: Option<&str>) -> bool {
    present(wanted).is_none_or(|wanted| {
        actual.unwrap_or_default().trim().to_lowercase() == wanted.to_lowercase()
    })
}

fn contains(wanted: Option<&String>, actual: Option<&str>) -> bool {
    present(wanted).is_none_or(|wanted| {
        actual.is_some_and(|a| a.to_lowercase().contains(&wanted.to_lowercase()))
    })
}

fn within<T: PartialOrd + Copy>(min: Option<T>, max: Option<T>, actual: Option<T>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(actual) = actual else {
        return false;
    };
    min.is_none_or(|min| actual >= min) && max.is_none_or(|max| actual <= max)
}

/// Whether a listing's raw status allows it in search results.
///
/// A listing without any status is treated as publicly listed, since the
/// public list endpoints only return listed items.
#[must_use]
pub fn is_searchable(product: &Product) -> bool {
    let status = product.status.trim();
    if status.is_empty() {
        return true;
    }
    SEARCHABLE_STATUSES
        .iter()
        .any(|s| s.eq_ignore_ascii_case(status))
}

impl ProductFilter {
    /// Whether no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }

    /// Whether a single listing passes the status gate and every criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        is_searchable(product)
            && exact(self.product_type.as_ref(), product.product_type.as_deref())
            && exact(self.condition.as_ref(), product.condition.as_deref())
            && exact(self.vehicle_type.as_ref(), product.vehicle_type.as_deref())
            && exact(self.fuel_type.as_ref(), product.fuel_type.as_deref())
            && exact(self.battery_type.as_ref(), product.battery_type.as_deref())
            && exact(self.year.as_ref(), product.year.map(|y| y.to_string()).as_deref())
            && exact(self.voltage.as_ref(), product.voltage.map(|v| v.to_string()).as_deref())
            && contains(self.brand.as_ref(), product.brand.as_deref())
            && contains(self.model.as_ref(), product.model.as_deref())
            && contains(self.license_plate.as_ref(), product.license_plate.as_deref())
            && within(self.min_price, self.max_price, product.price.map(|p| p.amount()))
            && within(None, self.max_mileage, product.mileage)
            && within(
                self.min_battery_health,
                self.max_battery_health,
                product.battery_health,
            )
            && within(self.min_capacity, self.max_capacity, product.capacity)
            && within(self.min_cycle_count, self.max_cycle_count, product.cycle_count)
    }

    /// The matching subset, in input order.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect()
    }

    /// Query parameters for the server advanced-search endpoint.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();

        let text = [
            ("productType", &self.product_type),
            ("condition", &self.condition),
            ("vehicleType", &self.vehicle_type),
            ("fuelType", &self.fuel_type),
            ("batteryType", &self.battery_type),
            ("year", &self.year),
            ("voltage", &self.voltage),
            ("brand", &self.brand),
            ("model", &self.model),
            ("licensePlate", &self.license_plate),
        ];
        for (name, value) in text {
            if let Some(value) = present(value.as_ref()) {
                query.push((name, value.to_string()));
            }
        }

        let numbers = [
            ("minPrice", self.min_price.map(|v| v.to_string())),
            ("maxPrice", self.max_price.map(|v| v.to_string())),
            ("maxMileage", self.max_mileage.map(|v| v.to_string())),
            ("minBatteryHealth", self.min_battery_health.map(|v| v.to_string())),
            ("maxBatteryHealth", self.max_battery_health.map(|v| v.to_string())),
            ("minCapacity", self.min_capacity.map(|v| v.to_string())),
            ("maxCapacity", self.max_capacity.map(|v| v.to_string())),
            ("minCycleCount", self.min_cycle_count.map(|v| v.to_string())),
            ("maxCycleCount", self.max_cycle_count.map(|v| v.to_string())),
        ];
        query.extend(
            numbers
                .into_iter()
                .filter_map(|(name, value)| value.map(|v| (name, v))),
        );

        query
    }
}
