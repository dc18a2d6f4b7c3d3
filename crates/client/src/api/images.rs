//! Listing image uploads (`/api/ProductImage`).

use ev_market_core::ProductId;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use tracing::instrument;

use super::conversions::{list_items, string_field};
use super::{ApiClient, ApiError, RequestBody};

/// An image file to attach to a listing.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload, guessing the content type from the file extension.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    fn into_part(self) -> Result<Part, ApiError> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)
            .map_err(|e| ApiError::InvalidRequest(format!("image content type: {e}")))
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// URLs of the stored images in an upload response.
fn uploaded_urls(payload: &serde_json::Value) -> Vec<String> {
    let items = list_items(payload);
    if items.is_empty() {
        return string_field(payload, &["imageUrl", "url"]).into_iter().collect();
    }
    items
        .iter()
        .filter_map(|item| match item {
            serde_json::Value::String(url) => Some(url.clone()),
            _ => string_field(item, &["imageUrl", "url"]),
        })
        .collect()
}

impl ApiClient {
    /// Upload one image for a listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is rejected or the request fails.
    #[instrument(skip(self, image), fields(product_id = %product_id, file = %image.file_name))]
    pub async fn upload_product_image(
        &self,
        product_id: ProductId,
        image: ImageUpload,
    ) -> Result<Vec<String>, ApiError> {
        let form = Form::new()
            .text("productId", product_id.to_string())
            .part("imageFile", image.into_part()?);

        let payload = self
            .request(Method::POST, "/api/ProductImage", RequestBody::Multipart(form))
            .await?;
        Ok(uploaded_urls(&payload))
    }

    /// Upload several images for a listing in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload is rejected or the request fails.
    #[instrument(skip(self, images), fields(product_id = %product_id, count = images.len()))]
    pub async fn upload_product_images(
        &self,
        product_id: ProductId,
        images: Vec<ImageUpload>,
    ) -> Result<Vec<String>, ApiError> {
        let mut form = Form::new().text("productId", product_id.to_string());
        for image in images {
            form = form.part("images", image.into_part()?);
        }

        let payload = self
            .request(
                Method::POST,
                "/api/ProductImage/multiple",
                RequestBody::Multipart(form),
            )
            .await?;
        Ok(uploaded_urls(&payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(ImageUpload::new("front.JPG", vec![]).content_type, "image/jpeg");
        assert_eq!(content_type_for("pack.webp"), "image/webp");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_uploaded_urls_shapes() {
        assert_eq!(
            uploaded_urls(&json!({"imageUrl": "https://cdn/1.jpg"})),
            vec!["https://cdn/1.jpg".to_string()]
        );
        assert_eq!(
            uploaded_urls(&json!([{"ImageUrl": "a"}, "b"])),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(uploaded_urls(&json!(null)).is_empty());
    }
}
