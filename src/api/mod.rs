//! REST API server module
//!
//! Thin axum layer over [`AggregationEngine`]: request validation, status
//! code mapping, OpenAPI document and graceful shutdown.

use crate::{AggregationEngine, Config, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// - `POST /api/aggregate?sortBy=&filterBy=` - Aggregate sources
/// - `DELETE /api/aggregate/cache` - Clear the result cache
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(engine: AggregationEngine, config: Arc<Config>) -> Router {
    let state = AppState::new(engine, config.clone());

    let router = Router::new()
        .route("/api/aggregate", post(routes::aggregate))
        .route("/api/aggregate/cache", delete(routes::clear_cache))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    let router = if config.server.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state).layer(TraceLayer::new_for_http());

    if config.server.cors_enabled {
        router.layer(build_cors_layer(&config.server.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer for the configured origins ("*" allows any)
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        layer.allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Start the API server on the configured bind address
///
/// Runs until SIGINT or SIGTERM (Ctrl+C on non-Unix platforms).
///
/// # Example
///
/// ```no_run
/// use api_aggregator::{AggregationEngine, Config};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let engine = AggregationEngine::new(&config)?;
///
/// api_aggregator::api::start_api_server(engine, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(engine: AggregationEngine, config: Arc<Config>) -> Result<()> {
    let bind_address = config.server.bind_address;
    tracing::info!(address = %bind_address, "Starting API server");

    let listener = TcpListener::bind(bind_address).await?;
    serve(listener, engine, config, crate::shutdown_signal()).await
}

/// Serve the API on an already bound listener until `shutdown` completes
///
/// Also runs the cache sweeper for the lifetime of the server.
pub async fn serve<F>(
    listener: TcpListener,
    engine: AggregationEngine,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = listener.local_addr()?;
    let token = CancellationToken::new();
    let sweeper = config.cache.enabled.then(|| {
        engine
            .cache()
            .spawn_sweeper(config.cache.sweep_interval, token.clone())
    });

    let app = create_router(engine, config);
    tracing::info!(address = %address, "API server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()));

    token.cancel();
    if let Some(sweeper) = sweeper {
        if let Err(e) = sweeper.await {
            tracing::warn!(error = %e, "Cache sweeper did not stop cleanly");
        }
    }

    tracing::info!("API server stopped");
    served
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
