//! Listing classification, filtering and search.
//!
//! - [`classify`] - vehicle vs battery grouping for loosely-typed records
//! - [`filter`] - client-side advanced filtering over fetched listings
//! - [`search`] - server advanced search with a local fallback

pub mod classify;
pub mod filter;
pub mod search;

pub use classify::{classify, classify_record, partition_by_category};
pub use filter::ProductFilter;
pub use search::{SearchResults, SearchSource, search_products};
