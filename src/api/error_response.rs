//! HTTP error response handling for the API
//!
//! Converts domain errors into HTTP responses with the status code given by
//! [`ToHttpStatus`] and an [`ApiError`] JSON body.

use crate::error::{ApiError, EngineError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        Error::Engine(self).into_response()
    }
}
