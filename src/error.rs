//! Error types for api-aggregator
//!
//! This module provides error handling for the library, including:
//! - The engine-level error taxonomy ([`EngineError`]) shared by every waiter of an aggregation
//! - Per-attempt fetch failures ([`FetchError`]) that feed the retry loop
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use crate::classifier::Shape;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for api-aggregator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for api-aggregator
#[derive(Debug, Error)]
pub enum Error {
    /// Aggregation engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "fetch.timeout")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Nothing left to return after post-processing
    #[error("{0}")]
    NotFound(String),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

/// Errors surfaced by the aggregation engine
///
/// Individual source failures never appear here: they are folded into a
/// [`FetchOutcome::Failed`](crate::types::FetchOutcome::Failed) entry of the result.
/// The type is `Clone` so that one in-flight computation can hand the same error
/// to every request waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The caller supplied zero sources
    #[error("Please provide at least one API's URL.")]
    EmptySourceSet,

    /// A transport-class failure escaped the fetcher's retry loop
    #[error("External API request failed due to {0}")]
    UpstreamUnavailable(String),

    /// Anything else (panicked fetch task, broken invariant)
    #[error("Unexpected error occurred: {0}")]
    Unexpected(String),
}

/// Failure of a single fetch attempt
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection error, timeout or non-success status
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Body did not match the shape the source was classified as
    #[error("could not decode {shape} payload: {source}")]
    Decode {
        /// Shape the body was decoded against
        shape: Shape,
        /// Underlying JSON error
        source: serde_json::Error,
    },
}

/// API error response format
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "empty_source_set",
///     "message": "Please provide at least one API's URL."
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "not_found", "empty_source_set")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for EngineError {
    fn status_code(&self) -> u16 {
        match self {
            EngineError::EmptySourceSet => 400,
            EngineError::UpstreamUnavailable(_) => 503,
            EngineError::Unexpected(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            EngineError::EmptySourceSet => "empty_source_set",
            EngineError::UpstreamUnavailable(_) => "upstream_unavailable",
            EngineError::Unexpected(_) => "unexpected_error",
        }
    }
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            Error::Engine(e) => e.status_code(),

            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 500 Internal Server Error - Server-side issues
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Engine(e) => e.error_code(),
            Error::Config { .. } => "config_error",
            Error::NotFound(_) => "not_found",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}
