//! OpenAPI documentation and schema generation

use utoipa::OpenApi;

/// OpenAPI documentation for the api-aggregator REST API
///
/// Served at `/openapi.json` and rendered at `/swagger-ui` when enabled.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "api-aggregator REST API",
        version = "0.1.0",
        description = "Fan-out aggregation of third-party JSON APIs with caching, filtering and sorting",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5080", description = "Local development server")
    ),
    paths(
        crate::api::routes::aggregate,
        crate::api::routes::clear_cache,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::api::routes::AggregateRequest,
        crate::api::routes::AggregateResponse,
        crate::api::routes::CacheClearedResponse,
        crate::decode::WeatherReport,
        crate::decode::Coordinates,
        crate::decode::PostList,
        crate::decode::Post,
        crate::decode::UserPage,
        crate::decode::User,
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "aggregate", description = "Aggregation - Fetch several sources at once, then filter and sort"),
        (name = "cache", description = "Result cache maintenance"),
        (name = "system", description = "System endpoints - Health check and OpenAPI spec"),
    )
)]
pub struct ApiDoc;
