//! Normalization of backend payloads into core types.
//!
//! The backend is inconsistent about key casing (`sellerId`, `SellerId`,
//! `seller_id`) and about number encoding (numbers vs numeric strings).
//! Everything received goes through this module once; the rest of the crate
//! only sees canonical types.

pub mod products;
pub mod records;

pub use products::{convert_product, convert_products};
pub use records::{
    convert_favorite, convert_favorites, convert_notification, convert_notifications,
    convert_order, convert_payment, convert_user,
};

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::api::ApiError;

/// Compare keys ignoring case and `_`/`-` separators.
fn key_matches(key: &str, wanted: &str) -> bool {
    let mut a = key.chars().filter(|c| *c != '_' && *c != '-');
    let mut b = wanted.chars().filter(|c| *c != '_' && *c != '-');
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x.eq_ignore_ascii_case(&y) => {}
            _ => return false,
        }
    }
}

/// Look up the first non-null field among `names`, tolerating casing and
/// separator differences.
#[must_use]
pub fn field<'a>(record: &'a Value, names: &[&str]) -> Option<&'a Value> {
    let object = record.as_object()?;
    names.iter().find_map(|name| {
        object
            .get(*name)
            .or_else(|| {
                object
                    .iter()
                    .find(|(key, _)| key_matches(key, name))
                    .map(|(_, v)| v)
            })
            .filter(|v| !v.is_null())
    })
}

/// Text value; numbers and booleans are stringified, blanks are `None`.
#[must_use]
pub fn string_field(record: &Value, names: &[&str]) -> Option<String> {
    match field(record, names)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Floating point value from a number or numeric string.
#[must_use]
pub fn f64_field(record: &Value, names: &[&str]) -> Option<f64> {
    match field(record, names)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

/// Integer value from a number or numeric string.
#[must_use]
pub fn i64_field(record: &Value, names: &[&str]) -> Option<i64> {
    match field(record, names)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_f64_to_i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)] // range and fraction are checked first
fn whole_f64_to_i64(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f <= i64::MAX as f64;
    (in_range && f.fract().abs() < f64::EPSILON).then_some(f as i64)
}

/// Exact decimal value from a number or numeric string.
#[must_use]
pub fn decimal_field(record: &Value, names: &[&str]) -> Option<Decimal> {
    match field(record, names)? {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Value::String(s) => Decimal::from_str(s.trim().replace(',', "").as_str()).ok(),
        _ => None,
    }
}

/// Boolean from `true`/`false`, `"true"`/`"false"` or `1`/`0`.
#[must_use]
pub fn bool_field(record: &Value, names: &[&str]) -> Option<bool> {
    match field(record, names)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Timestamp in RFC 3339, or a naive timestamp assumed to be UTC.
#[must_use]
pub fn datetime_field(record: &Value, names: &[&str]) -> Option<DateTime<Utc>> {
    let raw = string_field(record, names)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Required id field, or a parse error naming the record kind.
pub(crate) fn require_id<T: From<i64>>(
    record: &Value,
    names: &[&str],
    kind: &str,
) -> Result<T, ApiError> {
    i64_field(record, names)
        .map(T::from)
        .ok_or_else(|| ApiError::Parse(format!("{kind} record without id")))
}

/// Items of a collection response.
///
/// Accepts a bare array or a wrapper object (`data`, `items`, `$values`,
/// `result`), the shapes the backend uses for list endpoints.
#[must_use]
pub fn list_items(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(_) => ["data", "items", "$values", "result", "results"]
            .iter()
            .find_map(|key| field(payload, &[*key]))
            .map_or(&[][..], list_items),
        _ => &[],
    }
}

/// Unwrap a single-record response that may be wrapped in `data`.
#[must_use]
pub fn single_item(payload: &Value) -> &Value {
    match field(payload, &["data", "result"]) {
        Some(inner) if inner.is_object() => inner,
        _ => payload,
    }
}
