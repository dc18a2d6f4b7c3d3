//! Advanced search with a local fallback.

use ev_market_core::Product;
use tracing::{info, instrument, warn};

use super::ProductFilter;
use crate::api::{ApiClient, ApiError};

/// Where a result set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSource {
    /// The server advanced-search endpoint.
    Server,
    /// The full listing, filtered locally.
    LocalFallback,
}

#[derive(Debug, Clone)]
pub struct SearchResults {
    pub products: Vec<Product>,
    pub source: SearchSource,
}

/// Search listings.
///
/// Uses the server advanced search. When that endpoint is unavailable
/// (network failure, 404, 405, 501 or 5xx) fetches every listing and
/// filters it locally instead. Server results pass through the local status
/// gate too, so unlisted items never leak.
///
/// # Errors
///
/// Returns other client errors from the search endpoint, and any error
/// from the fallback listing request.
#[instrument(skip(client, filter))]
pub async fn search_products(
    client: &ApiClient,
    filter: &ProductFilter,
) -> Result<SearchResults, ApiError> {
    match client.advanced_search(filter).await {
        Ok(products) => {
            let products: Vec<Product> = products
                .into_iter()
                .filter(super::filter::is_searchable)
                .collect();
            info!(count = products.len(), "Server search");
            Ok(SearchResults {
                products,
                source: SearchSource::Server,
            })
        }
        Err(e) if e.is_feature_unavailable() => {
            warn!(error = %e, "Advanced search unavailable, filtering locally");
            let all = client.list_products().await?;
            let products = filter.apply(&all);
            info!(count = products.len(), total = all.len(), "Local search");
            Ok(SearchResults {
                products,
                source: SearchSource::LocalFallback,
            })
        }
        Err(e) => Err(e),
    }
}
