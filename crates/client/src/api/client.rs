//! Request execution: auth header, body encoding, error classification.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::Method;
use secrecy::ExposeSecret;
use tracing::{Span, debug, instrument, warn};
use url::Url;
use uuid::Uuid;

use super::cache::CacheValue;
use super::{ApiError, message_for};
use crate::config::ClientConfig;
use crate::session::SessionManager;
use crate::storage::Storage;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest non-JSON error body that is still shown to the user as a message.
const MAX_TEXT_MESSAGE_LEN: usize = 200;

/// Body of an outgoing request.
#[derive(Debug, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON document; sent with `Content-Type: application/json`.
    Json(serde_json::Value),
    /// Multipart form (file uploads); the boundary content type is set by
    /// the form itself, never JSON.
    Multipart(reqwest::multipart::Form),
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the marketplace REST API.
///
/// Cheap to clone; clones share the HTTP connection pool, the session and
/// the listing cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    session: SessionManager,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a client whose session is stored in `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, storage: Arc<dyn Storage>) -> Result<Self, ApiError> {
        Self::with_session(config, SessionManager::new(storage))
    }

    /// Create a client around an existing session manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_session(config: &ClientConfig, session: SessionManager) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;

        let cache = Cache::builder()
            .max_capacity(200)
            .time_to_live(config.product_cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                session,
                cache,
            }),
        })
    }

    /// The session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    /// Backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub(crate) fn cache(&self) -> &Cache<String, CacheValue> {
        &self.inner.cache
    }

    /// Drop every cached listing page and product.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    /// Clear stored credentials when `err` is a 401.
    ///
    /// Returns `true` if the session was cleared; the caller should then
    /// send the user to the login flow.
    pub fn clear_session_if_unauthorized(&self, err: &ApiError) -> bool {
        if !err.is_unauthorized() {
            return false;
        }
        match self.inner.session.clear() {
            Ok(()) => {
                warn!("Credentials rejected by backend, session cleared");
                true
            }
            Err(e) => {
                warn!(error = %e, "Credentials rejected but session could not be cleared");
                false
            }
        }
    }

    /// Execute a request and return the decoded JSON body.
    ///
    /// An empty success body decodes to `Value::Null`.
    ///
    /// # Errors
    ///
    /// - `ApiError::Network` when no response arrives
    /// - `ApiError::Http` for non-2xx responses, carrying status and body
    /// - `ApiError::Parse` when a success body is not JSON
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<serde_json::Value, ApiError> {
        self.request_with_query(method, path, &[], body).await
    }

    /// Like [`request`](Self::request), with query parameters.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    #[instrument(
        skip(self, query, body),
        fields(method = %method, path = %path, request_id = tracing::field::Empty)
    )]
    pub async fn request_with_query(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: RequestBody,
    ) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(path)?;
        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", &request_id);

        let mut builder = self
            .inner
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, &request_id)
            .header(reqwest::header::ACCEPT, "application/json");

        if !query.is_empty() {
            builder = builder.query(query);
        }

        if let Some(token) = self.inner.session.token()? {
            builder = builder.bearer_auth(token.expose_secret());
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                ApiError::InvalidRequest(e.to_string())
            } else {
                warn!(error = %e, "Backend unreachable");
                ApiError::Network(e)
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(ApiError::Network)?;

        if status.is_success() {
            debug!(status = status.as_u16(), "Request succeeded");
            if text.trim().is_empty() {
                return Ok(serde_json::Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| {
                warn!(
                    error = %e,
                    body = %text.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                ApiError::Parse(e.to_string())
            });
        }

        let data = parse_error_body(&text);
        let message = message_for(status.as_u16(), data.as_ref());

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "Backend returned server error"
            );
        } else {
            warn!(status = %status, message = %message, "Backend rejected request");
        }

        Err(ApiError::Http {
            status: status.as_u16(),
            message,
            data,
        })
    }

    /// Resolve an API path against the base URL, keeping any base path prefix.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|e| ApiError::InvalidRequest(format!("invalid path {path}: {e}")))
    }
}

/// Parse an error body: JSON when possible, short plain text otherwise.
fn parse_error_body(text: &str) -> Option<serde_json::Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }
    if trimmed.len() <= MAX_TEXT_MESSAGE_LEN && !trimmed.starts_with('<') {
        return Some(serde_json::Value::String(trimmed.to_string()));
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn client(base: &str) -> ApiClient {
        let config = ClientConfig::new(Url::parse(base).unwrap());
        ApiClient::new(&config, Arc::new(MemoryStorage::new())).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("http://localhost:5000/backend/");
        assert_eq!(
            client.endpoint("/api/Product").unwrap().as_str(),
            "http://localhost:5000/backend/api/Product"
        );
    }

    #[test]
    fn test_endpoint_without_base_path() {
        let client = client("http://localhost:5000");
        assert_eq!(
            client.endpoint("api/Favorite/user/3").unwrap().as_str(),
            "http://localhost:5000/api/Favorite/user/3"
        );
    }

    #[test]
    fn test_parse_error_body() {
        assert_eq!(parse_error_body("  "), None);
        assert_eq!(
            parse_error_body("{\"message\":\"x\"}").unwrap()["message"],
            "x"
        );
        assert_eq!(
            parse_error_body("Product not found").unwrap(),
            serde_json::Value::String("Product not found".to_string())
        );
        assert_eq!(parse_error_body("<html><body>502</body></html>"), None);
    }

    #[tokio::test]
    async fn test_network_error_has_no_status() {
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let client = client("http://127.0.0.1:9");
        let err = client
            .request(Method::GET, "/api/Product", RequestBody::Empty)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_clear_session_only_on_401() {
        let client = client("http://localhost:5000");
        let not_found = ApiError::Http {
            status: 404,
            message: String::new(),
            data: None,
        };
        assert!(!client.clear_session_if_unauthorized(&not_found));

        let unauthorized = ApiError::Http {
            status: 401,
            message: String::new(),
            data: None,
        };
        assert!(client.clear_session_if_unauthorized(&unauthorized));
    }
}
