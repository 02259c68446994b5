//! Route handlers for the REST API
//!
//! - [`aggregate`] - Fan-out aggregation with filter and sort
//! - [`cache`] - Result cache maintenance
//! - [`system`] - Health and OpenAPI

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::types::AggregateResult;

mod aggregate;
mod cache;
mod system;

pub use aggregate::*;
pub use cache::*;
pub use system::*;

/// Body of POST /api/aggregate
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct AggregateRequest {
    /// Source URLs to aggregate (also accepted as `apiUrls` or `APIURLs`)
    #[serde(default, alias = "apiUrls", alias = "APIURLs")]
    pub api_urls: Vec<String>,
}

/// Query parameters for POST /api/aggregate
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AggregateQuery {
    /// Sort list-shaped payloads by this field (e.g. `title`, `userId`, `first_name`)
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,

    /// Keep only entries containing this text (case-insensitive)
    #[serde(rename = "filterBy")]
    pub filter_by: Option<String>,
}

/// Response of POST /api/aggregate
#[derive(Debug, Serialize, ToSchema)]
pub struct AggregateResponse {
    /// One outcome per source, keyed by source URL
    #[schema(value_type = Object)]
    pub api_responses: AggregateResult,
}

/// Response of DELETE /api/aggregate/cache
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CacheClearedResponse {
    /// Number of entries removed
    pub cleared: usize,
}
