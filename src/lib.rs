//! # api-aggregator
//!
//! Fan-out aggregation of third-party JSON APIs.
//!
//! A request names a set of source URLs. Each source is classified into one
//! of a few known payload shapes by substring match on its URL, fetched
//! concurrently with bounded retry, and decoded into a typed record (or
//! passed through as raw text when the shape is unknown). The merged result
//! is memoized per source set, then filtered and sorted per request.
//!
//! ## Quick Start
//!
//! ```no_run
//! use api_aggregator::{AggregationEngine, Config, SourceSet};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = AggregationEngine::new(&Config::default())?;
//!
//!     let sources = SourceSet::new([
//!         "https://jsonplaceholder.typicode.com/posts",
//!         "https://reqres.in/api/users?page=2",
//!     ])?;
//!     let aggregation = engine.aggregate(&sources, Some("id"), None).await?;
//!
//!     println!("{}", serde_json::to_string_pretty(&aggregation.result)?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Concurrent fan-out over a source set
pub mod aggregator;
/// REST API module
pub mod api;
/// Result cache with dual expiration
pub mod cache;
/// Source classification by URL substring
pub mod classifier;
/// Configuration types
pub mod config;
/// Shape decoding and payload records
pub mod decode;
/// Aggregation engine entry point
pub mod engine;
/// Error types
pub mod error;
/// Per-source fetching
pub mod fetcher;
/// Filter and sort stages
pub mod postprocess;
/// Bounded retry loop
pub mod retry;
/// Core types
pub mod types;

// Re-export commonly used types
pub use classifier::{Classifier, ClassifierRule, Shape};
pub use config::Config;
pub use engine::{Aggregation, AggregationEngine};
pub use error::{ApiError, EngineError, Error, ErrorDetail, FetchError, Result, ToHttpStatus};
pub use fetcher::{HttpFetcher, SourceFetcher};
pub use types::{AggregateResult, CacheStatus, FetchOutcome, Payload, SourceId, SourceSet};

/// Resolve when the process is asked to stop
///
/// Unix: SIGTERM or SIGINT. Elsewhere: Ctrl+C. If no handler can be
/// registered the future never resolves, so the server keeps running.
pub async fn shutdown_signal() {
    wait_for_signal().await;
    tracing::info!("Shutdown signal received");
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not register SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    let interrupt = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            Err(e) => {
                tracing::warn!(error = %e, "Could not register SIGINT handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = terminate => {}
        _ = interrupt => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C signal"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    }
}
