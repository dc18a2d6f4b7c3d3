//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `EV_MARKET_API_URL` - Backend base URL (default: `http://localhost:5000`)
//! - `EV_MARKET_STORAGE_PATH` - Local storage file (default: `.ev-market/storage.json`)
//! - `EV_MARKET_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `EV_MARKET_SELLER_LOOKUP_TIMEOUT_MS` - Seller name lookup timeout, clamped
//!   to 3000-8000 (default: 5000)
//! - `EV_MARKET_PRODUCT_CACHE_TTL_SECS` - Listing cache TTL (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default backend address for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

const DEFAULT_STORAGE_PATH: &str = ".ev-market/storage.json";
const MIN_SELLER_LOOKUP_MS: u64 = 3_000;
const MAX_SELLER_LOOKUP_MS: u64 = 8_000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL; API paths (`/api/...`) are joined onto it.
    pub api_base_url: Url,
    /// Path of the JSON file backing local storage.
    pub storage_path: PathBuf,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
    /// Upper bound on a single seller-name lookup.
    pub seller_lookup_timeout: Duration,
    /// How long listing pages stay in the in-memory cache.
    pub product_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl ClientConfig {
    /// Configuration with defaults for everything except the base URL.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            request_timeout: Duration::from_secs(30),
            seller_lookup_timeout: Duration::from_millis(5_000),
            product_cache_ttl: Duration::from_secs(300),
            sentry_dsn: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let raw_url = get_env_or_default("EV_MARKET_API_URL", DEFAULT_API_URL);
        let api_base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("EV_MARKET_API_URL".to_string(), e.to_string())
        })?;

        let seller_ms: u64 = get_parsed_env("EV_MARKET_SELLER_LOOKUP_TIMEOUT_MS", 5_000)?;

        Ok(Self {
            api_base_url,
            storage_path: PathBuf::from(get_env_or_default(
                "EV_MARKET_STORAGE_PATH",
                DEFAULT_STORAGE_PATH,
            )),
            request_timeout: Duration::from_secs(get_parsed_env(
                "EV_MARKET_REQUEST_TIMEOUT_SECS",
                30,
            )?),
            seller_lookup_timeout: Duration::from_millis(clamp_seller_lookup_ms(seller_ms)),
            product_cache_ttl: Duration::from_secs(get_parsed_env(
                "EV_MARKET_PRODUCT_CACHE_TTL_SECS",
                300,
            )?),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Keep seller lookups within the 3-8 second window.
const fn clamp_seller_lookup_ms(ms: u64) -> u64 {
    if ms < MIN_SELLER_LOOKUP_MS {
        MIN_SELLER_LOOKUP_MS
    } else if ms > MAX_SELLER_LOOKUP_MS {
        MAX_SELLER_LOOKUP_MS
    } else {
        ms
    }
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an optional environment variable, falling back to a default.
fn get_parsed_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}
