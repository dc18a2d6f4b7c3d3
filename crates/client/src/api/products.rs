//! Listing endpoints (`/api/Product`).

use std::sync::Arc;

use ev_market_core::{Product, ProductCategory, ProductId, UserId};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::cache::{CacheValue, all_products_key, product_key, seller_products_key};
use super::conversions::{convert_product, convert_products};
use super::images::ImageUpload;
use super::{ApiClient, ApiError, RequestBody};
use crate::catalog::ProductFilter;
use crate::outcome::SoftResult;

/// Fields a seller submits when creating or editing a listing.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub seller_id: Option<UserId>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub product_type: ProductCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_health: Option<f64>,
}

impl ProductInput {
    /// Request body with only the attribute group matching the listing type.
    fn to_body(&self) -> Result<serde_json::Value, ApiError> {
        let mut input = self.clone();
        match input.product_type {
            ProductCategory::Vehicle => {
                input.capacity = None;
                input.voltage = None;
                input.cycle_count = None;
                input.battery_health = None;
                input.battery_type = None;
            }
            ProductCategory::Battery => {
                input.mileage = None;
                input.license_plate = None;
                input.transmission = None;
            }
        }
        serde_json::to_value(&input)
            .map_err(|e| ApiError::InvalidRequest(format!("product body: {e}")))
    }
}

impl ApiClient {
    /// All listings.
    ///
    /// Cached for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let key = all_products_key();
        if let Some(CacheValue::Products(products)) = self.cache().get(&key).await {
            debug!("Cache hit for product list");
            return Ok(products.as_ref().clone());
        }

        let payload = self
            .request(Method::GET, "/api/Product", RequestBody::Empty)
            .await?;
        let products = convert_products(&payload);

        self.cache()
            .insert(key, CacheValue::Products(Arc::new(products.clone())))
            .await;
        Ok(products)
    }

    /// A single listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = product_key(id);
        if let Some(CacheValue::Product(product)) = self.cache().get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let payload = self
            .request(Method::GET, &format!("/api/Product/{id}"), RequestBody::Empty)
            .await?;
        let product = convert_product(&payload)?;

        self.cache()
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Listings owned by a seller, in any moderation status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(seller_id = %seller_id))]
    pub async fn list_seller_products(&self, seller_id: UserId) -> Result<Vec<Product>, ApiError> {
        let key = seller_products_key(seller_id);
        if let Some(CacheValue::Products(products)) = self.cache().get(&key).await {
            return Ok(products.as_ref().clone());
        }

        let payload = self
            .request(
                Method::GET,
                &format!("/api/Product/seller/{seller_id}"),
                RequestBody::Empty,
            )
            .await?;
        let products = convert_products(&payload);

        self.cache()
            .insert(key, CacheValue::Products(Arc::new(products.clone())))
            .await;
        Ok(products)
    }

    /// Server-side advanced search.
    ///
    /// Most callers want [`crate::catalog::search_products`], which falls back
    /// to local filtering when this endpoint is unavailable.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, filter))]
    pub async fn advanced_search(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        let query = filter.to_query();
        let payload = self
            .request_with_query(Method::GET, "/api/Product/search", &query, RequestBody::Empty)
            .await?;
        Ok(convert_products(&payload))
    }

    /// Create a listing. New listings start in moderation.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the listing.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let payload = self
            .request(Method::POST, "/api/Product", RequestBody::Json(input.to_body()?))
            .await?;
        self.invalidate_cache();
        convert_product(&payload)
    }

    /// Replace a listing's editable fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let payload = self
            .request(
                Method::PUT,
                &format!("/api/Product/{id}"),
                RequestBody::Json(input.to_body()?),
            )
            .await?;
        self.invalidate_cache();

        // Some backend versions answer 204 No Content on update
        if payload.is_null() {
            return self.get_product(id).await;
        }
        convert_product(&payload)
    }

    /// Create a listing, then upload its images.
    ///
    /// The listing counts as created even if the upload fails; the failure
    /// is reported as a warning.
    ///
    /// # Errors
    ///
    /// Returns an error only if creating the listing itself fails.
    #[instrument(skip(self, input, images), fields(title = %input.title, images = images.len()))]
    pub async fn create_listing(
        &self,
        input: &ProductInput,
        images: Vec<ImageUpload>,
    ) -> Result<SoftResult<Product>, ApiError> {
        let mut product = self.create_product(input).await?;
        if images.is_empty() {
            return Ok(SoftResult::ok(product));
        }

        match self.upload_product_images(product.id, images).await {
            Ok(urls) => {
                product.image_urls.extend(urls);
                Ok(SoftResult::ok(product))
            }
            Err(e) => {
                warn!(product_id = %product.id, error = %e, "Image upload failed, listing kept");
                Ok(SoftResult::degraded(
                    product,
                    format!("Tin đăng đã được tạo nhưng tải ảnh thất bại: {}", e.user_message()),
                ))
            }
        }
    }
}
