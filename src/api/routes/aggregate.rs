//! Aggregation handler

use super::{AggregateQuery, AggregateRequest, AggregateResponse};
use crate::api::AppState;
use crate::error::{ApiError, Error};
use crate::types::SourceSet;
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Header reporting how the result cache served the request
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// POST /api/aggregate - Fetch several sources concurrently and merge the results
#[utoipa::path(
    post,
    path = "/api/aggregate",
    tag = "aggregate",
    params(AggregateQuery),
    request_body = AggregateRequest,
    responses(
        (status = 200, description = "Merged outcomes keyed by source", body = AggregateResponse,
            headers(("x-cache" = String, description = "HIT, MISS, SHARED or BYPASS"))),
        (status = 400, description = "No sources given or malformed body", body = ApiError),
        (status = 404, description = "Nothing left after filtering", body = ApiError),
        (status = 500, description = "Unexpected engine error", body = ApiError),
        (status = 503, description = "Upstream unavailable", body = ApiError)
    )
)]
pub async fn aggregate(
    State(state): State<AppState>,
    Query(query): Query<AggregateQuery>,
    body: Result<Json<AggregateRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiError::validation(rejection.body_text())),
            )
                .into_response();
        }
    };

    let sources = match SourceSet::new(request.api_urls) {
        Ok(sources) => sources,
        Err(e) => return e.into_response(),
    };

    match state
        .engine
        .aggregate(
            &sources,
            query.sort_by.as_deref(),
            query.filter_by.as_deref(),
        )
        .await
    {
        Ok(aggregation) if aggregation.result.is_empty() => {
            Error::NotFound("No data was found.".to_string()).into_response()
        }
        Ok(aggregation) => (
            StatusCode::OK,
            [(CACHE_STATUS_HEADER, aggregation.cache.as_str())],
            Json(AggregateResponse {
                api_responses: aggregation.result,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, sources = sources.len(), "Aggregation failed");
            e.into_response()
        }
    }
}
